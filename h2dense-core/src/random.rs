//! Random matrix generators for tests and benchmarks.
//!
//! Every entry is drawn uniformly from `[-1, 1]`, separately for the real and imaginary parts.
//! The structured generators produce diagonally dominant matrices, so that they are safe inputs
//! for the factorizations.

use crate::{ComplexField, MatMut, RealField};
use assert2::assert as fancy_assert;
use rand::Rng;
use reborrow::*;

/// Returns a real number drawn uniformly from `[-1, 1]`.
#[inline]
pub fn random_real<R: RealField, G: Rng + ?Sized>(rng: &mut G) -> R {
    R::from_f64(rng.gen_range(-1.0..=1.0))
}

/// Returns a scalar whose real and imaginary parts are drawn uniformly from `[-1, 1]`.
#[inline]
pub fn random_scalar<E: ComplexField, G: Rng + ?Sized>(rng: &mut G) -> E {
    let re = random_real::<E::Real, G>(rng);
    let im = random_real::<E::Real, G>(rng);
    E::from_real_imag(re, im)
}

/// Fills `a` with random entries.
pub fn fill_random<E: ComplexField, G: Rng + ?Sized>(mut a: MatMut<'_, E>, rng: &mut G) {
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            unsafe { a.write_unchecked(i, j, random_scalar(rng)) };
        }
    }
}

/// Sets each diagonal entry of the square matrix `a` to the absolute column sum of its
/// off-diagonal entries plus `alpha`.
fn dominate_diagonal<E: ComplexField>(mut a: MatMut<'_, E>, alpha: E::Real) {
    let n = a.nrows();
    for j in 0..n {
        let mut sum = <E::Real as ComplexField>::zero();
        for i in 0..n {
            if i != j {
                sum = sum + unsafe { a.read_unchecked(i, j) }.abs();
            }
        }
        unsafe { a.write_unchecked(j, j, E::from_real(sum + alpha)) };
    }
}

/// Fills the square matrix `a` with random off-diagonal entries and a dominant diagonal.
/// With `alpha > 0`, the result is invertible.
#[track_caller]
pub fn random_invertible<E: ComplexField, G: Rng + ?Sized>(
    mut a: MatMut<'_, E>,
    alpha: E::Real,
    rng: &mut G,
) {
    fancy_assert!(a.nrows() == a.ncols());
    fill_random(a.rb_mut(), rng);
    dominate_diagonal(a, alpha);
}

fn fill_selfadjoint<E: ComplexField, G: Rng + ?Sized>(a: &mut MatMut<'_, E>, rng: &mut G) {
    let n = a.nrows();
    for j in 0..n {
        for i in 0..j {
            let value: E = random_scalar(rng);
            unsafe {
                a.write_unchecked(i, j, value);
                a.write_unchecked(j, i, value.conj());
            }
        }
        let diag = random_real::<E::Real, G>(rng);
        unsafe { a.write_unchecked(j, j, E::from_real(diag)) };
    }
}

/// Fills the square matrix `a` with a random self-adjoint matrix with a real diagonal.
#[track_caller]
pub fn random_selfadjoint<E: ComplexField, G: Rng + ?Sized>(mut a: MatMut<'_, E>, rng: &mut G) {
    fancy_assert!(a.nrows() == a.ncols());
    fill_selfadjoint(&mut a, rng);
}

/// Fills the square matrix `a` with a random self-adjoint, diagonally dominant matrix. With
/// `alpha > 0`, the result is positive definite.
#[track_caller]
pub fn random_spd<E: ComplexField, G: Rng + ?Sized>(
    mut a: MatMut<'_, E>,
    alpha: E::Real,
    rng: &mut G,
) {
    fancy_assert!(a.nrows() == a.ncols());
    fill_selfadjoint(&mut a, rng);
    dominate_diagonal(a, alpha);
}
