//! Diagonal and bidiagonal kernels.

use crate::{ColMut, ColRef, ComplexField, MatMut, MatRef, Trans};
use assert2::assert as fancy_assert;
use reborrow::*;

#[inline(always)]
fn diag_entry<E: ComplexField>(a: MatRef<'_, E>, trans: Trans, i: usize) -> E {
    let value = unsafe { a.read_unchecked(i, i) };
    match trans {
        Trans::No => value,
        Trans::Yes => value.conj(),
    }
}

/// Scales `x[i]` by `f(i)` for each row `i < n`, or each column if `xtrans` is set.
fn scale_lines<E: ComplexField>(
    x: MatMut<'_, E>,
    xtrans: Trans,
    n: usize,
    mut f: impl FnMut(usize) -> E,
) {
    let mut x = match xtrans {
        Trans::No => x.transpose(),
        Trans::Yes => x,
    };
    for i in 0..n {
        let factor = f(i);
        let mut col = x.rb_mut().col(i);
        for j in 0..col.nrows() {
            unsafe {
                let value = col.read_unchecked(j);
                col.write_unchecked(j, value * factor);
            }
        }
    }
}

/// Solves `op(diag(a)) * x = rhs` in place, using the first `min(a.nrows(), a.ncols())`
/// diagonal entries of `a`.
#[track_caller]
pub fn diagsolve_vec<E: ComplexField>(trans: Trans, a: MatRef<'_, E>, mut x: ColMut<'_, E>) {
    let n = a.nrows().min(a.ncols());
    fancy_assert!(x.nrows() >= n);
    for i in 0..n {
        unsafe {
            let value = x.read_unchecked(i);
            x.write_unchecked(i, value / diag_entry(a, trans, i));
        }
    }
}

/// Solves `op(diag(a)) * x = rhs` in place, or `x * op(diag(a)) = rhs` if `xtrans` is
/// [`Trans::Yes`].
#[track_caller]
pub fn diagsolve<E: ComplexField>(trans: Trans, a: MatRef<'_, E>, xtrans: Trans, x: MatMut<'_, E>) {
    let n = a.nrows().min(a.ncols());
    match xtrans {
        Trans::No => fancy_assert!(x.nrows() >= n),
        Trans::Yes => fancy_assert!(x.ncols() >= n),
    }
    scale_lines(x, xtrans, n, |i| diag_entry(a, trans, i).inv());
}

/// Computes `x = op(diag(a)) * x`.
///
/// # Panics
///
/// Requires `x.nrows() >= a.ncols()`.
#[track_caller]
pub fn diageval_vec<E: ComplexField>(trans: Trans, a: MatRef<'_, E>, mut x: ColMut<'_, E>) {
    fancy_assert!(x.nrows() >= a.ncols());
    let n = a.nrows().min(a.ncols());
    for i in 0..n {
        unsafe {
            let value = x.read_unchecked(i);
            x.write_unchecked(i, value * diag_entry(a, trans, i));
        }
    }
}

/// Computes `x = op(diag(a)) * x`, or `x = x * op(diag(a))` if `xtrans` is [`Trans::Yes`].
#[track_caller]
pub fn diageval<E: ComplexField>(trans: Trans, a: MatRef<'_, E>, xtrans: Trans, x: MatMut<'_, E>) {
    let n = a.nrows().min(a.ncols());
    match xtrans {
        Trans::No => fancy_assert!(x.nrows() >= n),
        Trans::Yes => fancy_assert!(x.ncols() >= n),
    }
    scale_lines(x, xtrans, n, |i| diag_entry(a, trans, i));
}

/// Scales `x` by `alpha * op(diag(d))` for a real diagonal `d`: rows of `x` are scaled by
/// `alpha * d[i]`, or, if `xtrans` is [`Trans::Yes`], columns are scaled by
/// `conj(alpha * d[i])`. Since `d` is real, `trans` does not change the factors.
///
/// # Panics
///
/// Requires that `d` holds a factor for each scaled row (or column).
#[track_caller]
pub fn diageval_real<E: ComplexField>(
    alpha: E,
    trans: Trans,
    d: &[E::Real],
    xtrans: Trans,
    x: MatMut<'_, E>,
) {
    match xtrans {
        Trans::Yes => {
            fancy_assert!(x.ncols() <= d.len());
            if d.is_empty() || x.nrows() == 0 {
                return;
            }
            let n = x.ncols();
            scale_lines(x, xtrans, n, |i| match trans {
                Trans::No => alpha.scale_real(d[i]).conj(),
                Trans::Yes => alpha.conj().scale_real(d[i]),
            });
        }
        Trans::No => {
            fancy_assert!(x.nrows() <= d.len());
            if d.is_empty() || x.ncols() == 0 {
                return;
            }
            let n = x.nrows();
            scale_lines(x, xtrans, n, |i| alpha.scale_real(d[i]));
        }
    }
}

/// Multiplies `a` in place by the bidiagonal matrix `alpha * B` with diagonal `d` and
/// subdiagonal `l`: `a = a * alpha * B`, or `a = (alpha * B)^H * a` if `trans` is
/// [`Trans::Yes`].
///
/// # Panics
///
/// Requires `l.nrows() + 1 == d.nrows()`, and `d.nrows()` equal to `a.ncols()` (or `a.nrows()`
/// if `trans` is set).
#[track_caller]
pub fn bidiagmul<E: ComplexField>(
    alpha: E,
    trans: Trans,
    a: MatMut<'_, E>,
    d: ColRef<'_, E>,
    l: ColRef<'_, E>,
) {
    fancy_assert!(l.nrows() + 1 == d.nrows());
    let (mut a, conj) = match trans {
        Trans::No => {
            fancy_assert!(a.ncols() == d.nrows());
            (a, false)
        }
        Trans::Yes => {
            fancy_assert!(a.nrows() == d.nrows());
            (a.transpose(), true)
        }
    };
    if a.nrows() == 0 || a.ncols() == 0 {
        return;
    }

    let factor = |value: E| {
        let value = alpha * value;
        if conj {
            value.conj()
        } else {
            value
        }
    };

    let m = a.nrows();
    let n = a.ncols();
    for j in 0..n - 1 {
        let gamma = factor(d.read(j));
        let beta = factor(l.read(j));
        for i in 0..m {
            unsafe {
                let value = gamma * a.read_unchecked(i, j) + beta * a.read_unchecked(i, j + 1);
                a.write_unchecked(i, j, value);
            }
        }
    }
    let gamma = factor(d.read(n - 1));
    for i in 0..m {
        unsafe {
            let value = a.read_unchecked(i, n - 1);
            a.write_unchecked(i, n - 1, value * gamma);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{c64, mat, Mat};

    #[test]
    fn diag_solve_then_eval() {
        let a = mat![
            [c64::new(2.0, 1.0), c64::new(9.0, 0.0)],
            [c64::new(9.0, 0.0), c64::new(0.0, -4.0)],
            [c64::new(9.0, 0.0), c64::new(9.0, 0.0)],
        ];
        for trans in [Trans::No, Trans::Yes] {
            let mut x = [c64::new(1.0, 2.0), c64::new(-3.0, 0.5)];
            let original = x;
            diageval_vec(trans, a.as_ref(), ColMut::from_slice_mut(&mut x));
            diagsolve_vec(trans, a.as_ref(), ColMut::from_slice_mut(&mut x));
            for i in 0..2 {
                fancy_assert!((x[i] - original[i]).norm() < 1e-14);
            }
        }
    }

    #[test]
    fn diag_conjugates_when_transposed() {
        let a = mat![[c64::new(0.0, 1.0)]];
        let mut x = [c64::new(1.0, 0.0)];
        diageval_vec(Trans::Yes, a.as_ref(), ColMut::from_slice_mut(&mut x));
        fancy_assert!(x[0] == c64::new(0.0, -1.0));
    }

    #[test]
    fn diag_scales_rows_or_columns() {
        let a = mat![[2.0, 0.0], [0.0, 4.0]];
        let mut x = Mat::from_fn(2, 2, |_, _| 1.0);
        diageval(Trans::No, a.as_ref(), Trans::No, x.as_mut());
        fancy_assert!(x == mat![[2.0, 2.0], [4.0, 4.0]]);

        let mut x = Mat::from_fn(2, 2, |_, _| 8.0);
        diagsolve(Trans::No, a.as_ref(), Trans::Yes, x.as_mut());
        fancy_assert!(x == mat![[4.0, 2.0], [4.0, 2.0]]);
    }

    #[test]
    fn real_diagonal() {
        let d = [2.0, -1.0, 5.0];
        let mut x = Mat::from_fn(2, 3, |_, _| c64::new(1.0, 0.0));
        diageval_real(c64::new(0.0, 1.0), Trans::No, &d, Trans::Yes, x.as_mut());
        fancy_assert!(x[(0, 0)] == c64::new(0.0, -2.0));
        fancy_assert!(x[(1, 1)] == c64::new(0.0, 1.0));
        fancy_assert!(x[(0, 2)] == c64::new(0.0, -5.0));

        let mut y = Mat::from_fn(2, 1, |_, _| c64::new(1.0, 0.0));
        diageval_real(c64::new(0.0, 1.0), Trans::No, &d, Trans::No, y.as_mut());
        fancy_assert!(y[(0, 0)] == c64::new(0.0, 2.0));
        fancy_assert!(y[(1, 0)] == c64::new(0.0, -1.0));
    }

    #[test]
    #[should_panic]
    fn real_diagonal_too_short() {
        let d = [1.0];
        let mut x = Mat::<f64>::zeros(2, 2);
        diageval_real(1.0, Trans::No, &d, Trans::No, x.as_mut());
    }

    #[test]
    fn bidiagonal_product() {
        // a * B with B = [[d0, 0], [l0, d1]]
        let mut a = mat![[1.0, 2.0], [3.0, 4.0]];
        let d = [2.0, 3.0];
        let l = [1.0];
        bidiagmul(
            1.0,
            Trans::No,
            a.as_mut(),
            ColRef::from_slice(&d),
            ColRef::from_slice(&l),
        );
        fancy_assert!(a == mat![[4.0, 6.0], [10.0, 12.0]]);

        // B^H * a
        let mut a = mat![[1.0, 2.0], [3.0, 4.0]];
        bidiagmul(
            1.0,
            Trans::Yes,
            a.as_mut(),
            ColRef::from_slice(&d),
            ColRef::from_slice(&l),
        );
        fancy_assert!(a == mat![[5.0, 8.0], [9.0, 12.0]]);
    }

    #[test]
    fn bidiagonal_empty_is_noop() {
        let mut a = Mat::<f64>::zeros(0, 2);
        let d = [1.0, 1.0];
        let l = [1.0];
        bidiagmul(
            2.0,
            Trans::No,
            a.as_mut(),
            ColRef::from_slice(&d),
            ColRef::from_slice(&l),
        );
        fancy_assert!(a.nrows() == 0);
    }
}
