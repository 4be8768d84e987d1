//! Elementwise operations, copies and norms of dense matrices.

use crate::{
    mul::{addmul, mvm},
    random::random_scalar,
    ColMut, ColRef, ComplexField, Mat, MatMut, MatRef, OpRef, Parallelism, Trans,
};
use assert2::assert as fancy_assert;
use dyn_stack::{DynStack, SizeOverflow, StackReq};
use rand::{rngs::StdRng, SeedableRng};

/// Number of power iteration steps used by [`norm2`] and [`norm2diff`].
pub const NORM_STEPS: usize = 20;

const NORM_SEED: u64 = 0x4832_6465_6e73_6521;

#[inline]
fn for_each_mut<E: ComplexField>(mut a: MatMut<'_, E>, mut f: impl FnMut(usize, usize, E) -> E) {
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            unsafe {
                let value = a.read_unchecked(i, j);
                a.write_unchecked(i, j, f(i, j, value));
            }
        }
    }
}

/// Sets every element of `a` to zero.
pub fn clear<E: ComplexField>(a: MatMut<'_, E>) {
    for_each_mut(a, |_, _, _| E::zero());
}

/// Sets the lower triangle of `a` to zero. If `strict` is set, the diagonal is kept.
pub fn clear_lower<E: ComplexField>(mut a: MatMut<'_, E>, strict: bool) {
    let first = usize::from(strict);
    for j in 0..a.ncols() {
        for i in (j + first).min(a.nrows())..a.nrows() {
            unsafe { a.write_unchecked(i, j, E::zero()) };
        }
    }
}

/// Sets the upper triangle of `a` to zero. If `strict` is set, the diagonal is kept.
pub fn clear_upper<E: ComplexField>(mut a: MatMut<'_, E>, strict: bool) {
    let last = usize::from(!strict);
    for j in 0..a.ncols() {
        for i in 0..(j + last).min(a.nrows()) {
            unsafe { a.write_unchecked(i, j, E::zero()) };
        }
    }
}

/// Overwrites `a` with the identity matrix, padded with zeros if it is not square.
pub fn identity<E: ComplexField>(a: MatMut<'_, E>) {
    for_each_mut(a, |i, j, _| if i == j { E::one() } else { E::zero() });
}

/// Computes `a = alpha * a`.
pub fn scale<E: ComplexField>(alpha: E, a: MatMut<'_, E>) {
    for_each_mut(a, |_, _, value| value * alpha);
}

/// Replaces every element of `a` by its conjugate. Does nothing for real fields.
pub fn conjugate<E: ComplexField>(a: MatMut<'_, E>) {
    for_each_mut(a, |_, _, value| value.conj());
}

/// Returns the sum of the leading diagonal entries of `a`.
pub fn trace<E: ComplexField>(a: MatRef<'_, E>) -> E {
    let diag = a.diagonal();
    let mut sum = E::zero();
    for i in 0..diag.nrows() {
        sum = sum + unsafe { diag.read_unchecked(i) };
    }
    sum
}

/// Computes `b = b + alpha * op(a)`.
///
/// # Panics
///
/// `op(a)` must fit into `b`: only the leading `op(a).nrows() × op(a).ncols()` block of `b` is
/// updated.
#[track_caller]
pub fn add<E: ComplexField>(alpha: E, trans: Trans, a: MatRef<'_, E>, mut b: MatMut<'_, E>) {
    let a = OpRef::new(trans, a);
    fancy_assert!(a.nrows() <= b.nrows());
    fancy_assert!(a.ncols() <= b.ncols());
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            unsafe {
                let value = b.read_unchecked(i, j) + alpha * a.read_unchecked(i, j);
                b.write_unchecked(i, j, value);
            }
        }
    }
}

/// Copies `op(src)` into `dst`, as far as both shapes overlap. The remaining elements of `dst`
/// are left untouched.
///
/// # Example
///
/// ```
/// use h2dense_core::{mat, ops::copy, Mat, Trans};
///
/// let src = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
/// let mut dst = Mat::<f64>::zeros(2, 2);
/// copy(Trans::Yes, src.as_ref(), dst.as_mut());
///
/// assert_eq!(dst, mat![[1.0, 4.0], [2.0, 5.0]]);
/// ```
pub fn copy<E: ComplexField>(trans: Trans, src: MatRef<'_, E>, mut dst: MatMut<'_, E>) {
    let src = OpRef::new(trans, src);
    let nrows = src.nrows().min(dst.nrows());
    let ncols = src.ncols().min(dst.ncols());
    for j in 0..ncols {
        for i in 0..nrows {
            unsafe { dst.write_unchecked(i, j, src.read_unchecked(i, j)) };
        }
    }
}

/// Copies `op(src)` into `dst`.
///
/// # Panics
///
/// Requires the shape of `op(src)` to match the shape of `dst`.
#[track_caller]
pub fn copy_exact<E: ComplexField>(trans: Trans, src: MatRef<'_, E>, dst: MatMut<'_, E>) {
    let op = OpRef::new(trans, src);
    fancy_assert!(op.nrows() == dst.nrows());
    fancy_assert!(op.ncols() == dst.ncols());
    copy(trans, src, dst);
}

/// Copies the lower triangle of `a` into `b` and zeros the strict upper triangle of `b`. If
/// `unit` is set, the diagonal of `b` is set to one instead of copied.
///
/// Only the rows shared by both matrices are written. Columns of `b` beyond `a.ncols()` are
/// cleared.
pub fn copy_lower<E: ComplexField>(a: MatRef<'_, E>, unit: bool, mut b: MatMut<'_, E>) {
    let nrows = a.nrows().min(b.nrows());
    let ncols = a.ncols().min(b.ncols());
    for j in 0..b.ncols() {
        for i in 0..nrows {
            let value = if j >= ncols || i < j {
                E::zero()
            } else if i == j && unit {
                E::one()
            } else {
                unsafe { a.read_unchecked(i, j) }
            };
            unsafe { b.write_unchecked(i, j, value) };
        }
    }
}

/// Copies the upper triangle of `a` into `b` and zeros the strict lower triangle of `b`. If
/// `unit` is set, the diagonal of `b` is set to one instead of copied.
///
/// Only the columns shared by both matrices are written.
pub fn copy_upper<E: ComplexField>(a: MatRef<'_, E>, unit: bool, mut b: MatMut<'_, E>) {
    let nrows = a.nrows().min(b.nrows());
    let ncols = a.ncols().min(b.ncols());
    for j in 0..ncols {
        for i in 0..b.nrows() {
            let value = if i >= nrows || i > j {
                E::zero()
            } else if i == j && unit {
                E::one()
            } else {
                unsafe { a.read_unchecked(i, j) }
            };
            unsafe { b.write_unchecked(i, j, value) };
        }
    }
}

/// Returns `sum(conj(a[i, j]) * b[i, j])`.
#[track_caller]
pub fn dotprod<E: ComplexField>(a: MatRef<'_, E>, b: MatRef<'_, E>) -> E {
    fancy_assert!(a.nrows() == b.nrows());
    fancy_assert!(a.ncols() == b.ncols());
    let mut sum = E::zero();
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            sum = sum + unsafe { a.read_unchecked(i, j).conj() * b.read_unchecked(i, j) };
        }
    }
    sum
}

/// Returns the Frobenius norm of `a`.
pub fn normfrob<E: ComplexField>(a: MatRef<'_, E>) -> E::Real {
    let mut sum = <E::Real as ComplexField>::zero();
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            sum = sum + unsafe { a.read_unchecked(i, j) }.abs2();
        }
    }
    sum.sqrt()
}

fn vec_norm<E: ComplexField>(x: &[E]) -> E::Real {
    let mut sum = <E::Real as ComplexField>::zero();
    for value in x {
        sum = sum + value.abs2();
    }
    sum.sqrt()
}

/// Computes the size and alignment of the workspace required by [`norm2`] for an
/// `nrows × ncols` matrix.
pub fn norm2_req<E: ComplexField>(nrows: usize, ncols: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_all_of([StackReq::try_new::<E>(ncols)?, StackReq::try_new::<E>(nrows)?])
}

/// Computes the size and alignment of the workspace required by [`norm2diff`] for two
/// `nrows × ncols` matrices.
#[inline]
pub fn norm2diff_req<E: ComplexField>(
    nrows: usize,
    ncols: usize,
) -> Result<StackReq, SizeOverflow> {
    norm2_req::<E>(nrows, ncols)
}

/// Power iteration on `(a - b)^H (a - b)`, or `a^H a` if `b` is `None`.
fn power_iteration<E: ComplexField>(
    a: MatRef<'_, E>,
    b: Option<MatRef<'_, E>>,
    stack: DynStack<'_>,
) -> E::Real {
    let zero = <E::Real as ComplexField>::zero();
    let mut rng = StdRng::seed_from_u64(NORM_SEED);

    let (mut x, stack) = stack.make_with(a.ncols(), |_| random_scalar::<E, _>(&mut rng));
    let (mut y, _) = stack.make_with(a.nrows(), |_| E::zero());

    let mut norm = vec_norm(&x);
    let mut step = 0;
    while step < NORM_STEPS && norm > zero {
        let inv = norm.inv();
        for value in x.iter_mut() {
            *value = value.scale_real(inv);
        }

        y.fill(E::zero());
        mvm(E::one(), Trans::No, a, ColRef::from_slice(&x), ColMut::from_slice_mut(&mut y));
        if let Some(b) = b {
            mvm(-E::one(), Trans::No, b, ColRef::from_slice(&x), ColMut::from_slice_mut(&mut y));
        }

        x.fill(E::zero());
        mvm(E::one(), Trans::Yes, a, ColRef::from_slice(&y), ColMut::from_slice_mut(&mut x));
        if let Some(b) = b {
            mvm(-E::one(), Trans::Yes, b, ColRef::from_slice(&y), ColMut::from_slice_mut(&mut x));
        }

        norm = vec_norm(&x);
        step += 1;
    }

    norm.sqrt()
}

/// Approximates the spectral norm of `a` with [`NORM_STEPS`] steps of the power iteration,
/// starting from a fixed pseudo-random vector. The result is a lower bound that is usually
/// accurate to a few digits.
///
/// The workspace is described by [`norm2_req`].
pub fn norm2<E: ComplexField>(a: MatRef<'_, E>, stack: DynStack<'_>) -> E::Real {
    power_iteration(a, None, stack)
}

/// Approximates the spectral norm of `a - b` without forming the difference.
///
/// The workspace is described by [`norm2diff_req`].
///
/// # Panics
///
/// Requires `a` and `b` to have the same shape.
#[track_caller]
pub fn norm2diff<E: ComplexField>(
    a: MatRef<'_, E>,
    b: MatRef<'_, E>,
    stack: DynStack<'_>,
) -> E::Real {
    fancy_assert!(a.nrows() == b.nrows());
    fancy_assert!(a.ncols() == b.ncols());
    power_iteration(a, Some(b), stack)
}

/// Returns `‖I - a^H a‖_F` if `trans` is [`Trans::No`], or `‖I - a a^H‖_F` otherwise. The
/// result is close to zero when the columns (or rows) of `a` are orthonormal.
pub fn check_ortho<E: ComplexField>(trans: Trans, a: MatRef<'_, E>) -> E::Real {
    let n = match trans {
        Trans::No => a.ncols(),
        Trans::Yes => a.nrows(),
    };
    let mut err = Mat::<E>::identity(n, n);
    let (lhs, rhs) = match trans {
        Trans::No => (Trans::Yes, Trans::No),
        Trans::Yes => (Trans::No, Trans::Yes),
    };
    addmul(-E::one(), lhs, a, rhs, a, err.as_mut(), Parallelism::None);
    normfrob(err.as_ref())
}
