//! Householder QR decompositions.
//!
//! - [`no_pivoting`]: the decomposition $A = QR$, the application of $Q$ and $Q^H$, the
//!   expansion of $Q$ into an explicit matrix, and the solve and inversion routines built on top.
//! - [`col_pivoting`]: the decomposition $AP = QR$ with column pivoting, and its rank revealing
//!   variant that stops once the remaining columns are negligible.
//!
//! $R$ is stored in the upper triangle of the input, and the essential parts of the Householder
//! vectors below the diagonal, with an implicit leading one. The reflector coefficients are
//! returned separately in `tau`.

#![warn(rust_2018_idioms)]

pub mod col_pivoting;
pub mod no_pivoting;

/// Stopping criterion of [`col_pivoting::compute::qr_in_place_rank`].
///
/// In absolute mode, the decomposition stops once the Frobenius norm of the remaining columns is
/// at most `eps`. In relative mode, it stops once that norm is at most `eps` times the norm of the
/// whole matrix, measured either with the Frobenius norm or with the largest column norm as an
/// estimate of the spectral norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationMode {
    pub absolute: bool,
    pub frobenius: bool,
}

impl TruncationMode {
    /// Relative criterion, with the spectral norm estimate as baseline.
    #[inline]
    pub fn relative_euclidean() -> Self {
        Self {
            absolute: false,
            frobenius: false,
        }
    }

    /// Relative criterion, with the Frobenius norm as baseline.
    #[inline]
    pub fn relative_frobenius() -> Self {
        Self {
            absolute: false,
            frobenius: true,
        }
    }

    /// Absolute criterion.
    #[inline]
    pub fn absolute() -> Self {
        Self {
            absolute: true,
            frobenius: false,
        }
    }
}

impl Default for TruncationMode {
    #[inline]
    fn default() -> Self {
        Self::relative_euclidean()
    }
}
