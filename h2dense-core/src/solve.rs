//! Triangular matrix solve routines.
//!
//! Only the leading `min(rows, cols)` square block of the triangular factor is used, and its
//! diagonal is never checked for zeros: a singular factor produces non-finite values.

use crate::{mul::triangular::BlockStructure, ColMut, ComplexField, MatMut, MatRef, OpRef, Trans};
use assert2::assert as fancy_assert;
use reborrow::*;

/// How a pivot is removed from the right-hand side.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Pivot {
    Divide,
    MulInverse,
}

#[inline(always)]
fn apply_pivot<E: ComplexField>(value: E, pivot: E, mode: Pivot) -> E {
    match mode {
        Pivot::Divide => value / pivot,
        Pivot::MulInverse => value * pivot.inv(),
    }
}

/// Solves `t * x = rhs` in place, where `t` is triangular.
fn solve_op<E: ComplexField>(
    t: OpRef<'_, E>,
    lower: bool,
    unit: bool,
    mut x: ColMut<'_, E>,
    mode: Pivot,
) {
    let n = t.nrows().min(t.ncols());

    let pivot = |x: &mut ColMut<'_, E>, j: usize| unsafe {
        if unit {
            x.read_unchecked(j)
        } else {
            let value = apply_pivot(x.read_unchecked(j), t.read_unchecked(j, j), mode);
            x.write_unchecked(j, value);
            value
        }
    };

    if lower {
        for j in 0..n {
            let value = pivot(&mut x, j);
            for i in j + 1..n {
                unsafe {
                    let xi = x.read_unchecked(i);
                    x.write_unchecked(i, xi - t.read_unchecked(i, j) * value);
                }
            }
        }
    } else {
        for j in (0..n).rev() {
            let value = pivot(&mut x, j);
            for i in 0..j {
                unsafe {
                    let xi = x.read_unchecked(i);
                    x.write_unchecked(i, xi - t.read_unchecked(i, j) * value);
                }
            }
        }
    }
}

/// Solves `op(a) * x = rhs` in place, where `x` holds `rhs` on entry.
///
/// # Panics
///
/// Requires `x.nrows() >= a.nrows()` and `x.nrows() >= a.ncols()`.
///
/// # Example
///
/// ```
/// use h2dense_core::{mat, mul::triangular::BlockStructure, solve::triangular_solve_vec, ColMut, Trans};
///
/// let l = mat![[2.0, 0.0], [1.0, 4.0]];
/// let mut x = [2.0, 9.0];
///
/// triangular_solve_vec(
///     BlockStructure::TriangularLower,
///     Trans::No,
///     l.as_ref(),
///     ColMut::from_slice_mut(&mut x),
/// );
///
/// assert_eq!(x, [1.0, 2.0]);
/// ```
#[track_caller]
pub fn triangular_solve_vec<E: ComplexField>(
    structure: BlockStructure,
    trans: Trans,
    a: MatRef<'_, E>,
    x: ColMut<'_, E>,
) {
    fancy_assert!(x.nrows() >= a.nrows());
    fancy_assert!(x.nrows() >= a.ncols());
    let structure = structure.apply(trans);
    solve_op(
        OpRef::new(trans, a),
        structure.is_lower(),
        structure.is_unit(),
        x,
        Pivot::Divide,
    );
}

/// Solves `op(a) * x = rhs` in place, or `x * op(a)^H = rhs` if `xtrans` is [`Trans::Yes`].
///
/// # Panics
///
/// Requires that `x.nrows()` (or `x.ncols()`, if `xtrans` is set) is at least
/// `min(a.nrows(), a.ncols())`.
#[track_caller]
pub fn triangular_solve<E: ComplexField>(
    structure: BlockStructure,
    trans: Trans,
    a: MatRef<'_, E>,
    xtrans: Trans,
    x: MatMut<'_, E>,
) {
    let n = a.nrows().min(a.ncols());
    let structure = structure.apply(trans);
    let mut t = OpRef::new(trans, a);
    let mut x = x;
    if xtrans.is_trans() {
        // each row of `x` is solved against conj(op(a))
        fancy_assert!(x.ncols() >= n);
        x = x.transpose();
        t = t.conjugate();
    } else {
        fancy_assert!(x.nrows() >= n);
    }

    for k in 0..x.ncols() {
        solve_op(
            t,
            structure.is_lower(),
            structure.is_unit(),
            x.rb_mut().col(k),
            Pivot::MulInverse,
        );
    }
}
