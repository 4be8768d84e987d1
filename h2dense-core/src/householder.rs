//! Householder reflectors.
//!
//! A reflector is stored as its essential part `v` (the tail of the vector `[1; v]`) and a
//! scalar coefficient `tau`, and represents the matrix `H = I - tau * [1; v] * [1; v]^H`. The
//! coefficients produced by [`make_householder_in_place`] are real, so that `H` is self-adjoint
//! and unitary.

use crate::{ColMut, ColRef, ComplexField, MatMut, MatRef, Trans};
use assert2::assert as fancy_assert;
use reborrow::*;

/// Computes the reflector that maps the column `[head; essential]` to a multiple of the first
/// unit vector. `tail_squared_norm` is the squared norm of `essential`.
///
/// On exit, `essential` holds the essential part of the reflector. Returns `(tau, alpha)`, where
/// `alpha = -sign(head) * norm` is the new head of the column. A zero column yields `tau = 0`
/// and leaves everything unchanged.
pub fn make_householder_in_place<E: ComplexField>(
    mut essential: ColMut<'_, E>,
    head: E,
    tail_squared_norm: E::Real,
) -> (E, E) {
    let norm2 = head.abs2() + tail_squared_norm;
    if norm2 == <E::Real as ComplexField>::zero() {
        return (E::zero(), head);
    }
    let norm = norm2.sqrt();
    let alpha = -head.sign().scale_real(norm);

    let tau = (E::from_real(norm2) - alpha.conj() * head)
        .inv()
        .scale_real((head - alpha).abs2());

    let inv = (head - alpha).inv();
    for i in 0..essential.nrows() {
        unsafe {
            let value = essential.read_unchecked(i);
            essential.write_unchecked(i, value * inv);
        }
    }

    (tau, alpha)
}

/// Returns the squared norm of `x`.
pub fn squared_norm<E: ComplexField>(x: ColRef<'_, E>) -> E::Real {
    let mut sum = <E::Real as ComplexField>::zero();
    for i in 0..x.nrows() {
        sum = sum + unsafe { x.read_unchecked(i) }.abs2();
    }
    sum
}

/// Computes `matrix = H * matrix`, where `H` is the reflector given by `essential` and `tau`.
///
/// # Panics
///
/// Requires `matrix.nrows() == 1 + essential.nrows()`.
#[track_caller]
pub fn apply_householder_on_the_left<E: ComplexField>(
    mut matrix: MatMut<'_, E>,
    essential: ColRef<'_, E>,
    tau: E,
) {
    fancy_assert!(matrix.nrows() == 1 + essential.nrows());
    if tau.is_zero() {
        return;
    }
    let m = essential.nrows();
    for j in 0..matrix.ncols() {
        unsafe {
            let mut gamma = matrix.read_unchecked(0, j);
            for i in 0..m {
                gamma = gamma + essential.read_unchecked(i).conj() * matrix.read_unchecked(i + 1, j);
            }
            gamma = gamma * tau;

            let head = matrix.read_unchecked(0, j);
            matrix.write_unchecked(0, j, head - gamma);
            for i in 0..m {
                let value = matrix.read_unchecked(i + 1, j);
                matrix.write_unchecked(i + 1, j, value - gamma * essential.read_unchecked(i));
            }
        }
    }
}

/// Applies the product `Q = H_0 * H_1 * ... * H_{r-1}` of the reflectors stored below the
/// diagonal of `essentials` to `matrix`: `matrix = Q * matrix`, or `matrix = Q^H * matrix` if
/// `trans` is [`Trans::Yes`].
///
/// The number of reflectors is `r = min(essentials.nrows(), essentials.ncols(), coeffs.len())`.
/// Only the first `essentials.nrows()` rows of `matrix` take part.
///
/// # Panics
///
/// Requires `matrix.nrows() >= essentials.nrows()`.
#[track_caller]
pub fn apply_householder_sequence_on_the_left<E: ComplexField>(
    mut matrix: MatMut<'_, E>,
    essentials: MatRef<'_, E>,
    coeffs: &[E],
    trans: Trans,
) {
    let m = essentials.nrows();
    fancy_assert!(matrix.nrows() >= m);
    let n = matrix.ncols();
    let refl = m.min(essentials.ncols()).min(coeffs.len());

    let mut apply = |k: usize, tau: E| {
        let essential = essentials.col(k).subrows(k + 1, m - k - 1);
        apply_householder_on_the_left(matrix.rb_mut().submatrix(k, 0, m - k, n), essential, tau);
    };

    match trans {
        Trans::Yes => (0..refl).for_each(|k| apply(k, coeffs[k].conj())),
        Trans::No => (0..refl).rev().for_each(|k| apply(k, coeffs[k])),
    }
}
