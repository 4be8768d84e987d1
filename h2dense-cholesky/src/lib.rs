//! Decompositions of self-adjoint matrices.
//!
//! - [`llt`]: the Cholesky decomposition $A = LL^H$ of a positive definite matrix.
//! - [`ldlt`]: the decomposition $A = LDL^H$ of a self-adjoint matrix with nonzero leading
//!   principal minors, where $L$ is unit lower triangular and $D$ is diagonal.
//!
//! Both decompositions only read the lower triangle of the input.

#![warn(rust_2018_idioms)]

use h2dense_core::{ComplexField, RealField};

pub mod ldlt;
pub mod llt;

/// Largest imaginary part accepted on a pivot, which must be real for a self-adjoint matrix.
const IMAG_TOLERANCE: f64 = 1e-12;

/// Returns the real part of `pivot` if its distance to the real axis is within tolerance.
#[inline]
fn real_pivot<E: ComplexField>(pivot: E) -> Option<E::Real> {
    let diag = pivot.real();
    if (pivot - E::from_real(diag)).abs() > <E::Real as RealField>::from_f64(IMAG_TOLERANCE) {
        None
    } else {
        Some(diag)
    }
}
