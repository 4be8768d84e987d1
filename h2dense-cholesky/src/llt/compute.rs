use super::CholeskyError;
use crate::real_pivot;
use assert2::assert as fancy_assert;
use h2dense_core::{ComplexField, MatMut};

/// Computes the Cholesky factor $L$ of the hermitian positive definite matrix `matrix`, and
/// stores it in place of the lower triangle.
///
/// Only the lower triangle of `matrix` is read. Fails at the first pivot that is not real or
/// not positive, and reports its one-based index.
///
/// # Panics
///
/// Panics if `matrix` is not square.
#[track_caller]
pub fn cholesky_in_place<E: ComplexField>(matrix: MatMut<'_, E>) -> Result<(), CholeskyError> {
    fancy_assert!(matrix.nrows() == matrix.ncols());

    #[cfg(feature = "perf-warn")]
    if matrix.row_stride().unsigned_abs() != 1 && h2dense_core::__perf_warn!(CHOLESKY_WARN) {
        if matrix.col_stride().unsigned_abs() == 1 {
            log::warn!(target: "h2dense_perf", "Cholesky decomposition prefers column-major matrix. Found row-major matrix.");
        } else {
            log::warn!(target: "h2dense_perf", "Cholesky decomposition prefers column-major matrix. Found matrix with generic strides.");
        }
    }

    let mut a = matrix;
    let n = a.nrows();
    let zero = <E::Real as ComplexField>::zero();

    for i in 0..n {
        let diag = match real_pivot(a.read(i, i)) {
            Some(diag) if diag > zero => diag,
            _ => {
                return Err(CholeskyError {
                    non_positive_definite_minor: i + 1,
                })
            }
        };

        let root = diag.sqrt();
        a.write(i, i, E::from_real(root));
        let inv = root.inv();

        unsafe {
            for j in i + 1..n {
                let value = a.read_unchecked(j, i).scale_real(inv);
                a.write_unchecked(j, i, value);
            }
            for j in i + 1..n {
                let l_ji = a.read_unchecked(j, i);
                for k in i + 1..=j {
                    let value = a.read_unchecked(j, k) - l_ji * a.read_unchecked(k, i).conj();
                    a.write_unchecked(j, k, value);
                }
            }
        }
    }

    Ok(())
}
