use super::LdltError;
use crate::real_pivot;
use assert2::assert as fancy_assert;
use h2dense_core::{ComplexField, MatMut};

/// Computes the $LDL^H$ decomposition of the self-adjoint matrix `matrix` in place, without
/// pivoting.
///
/// Only the lower triangle of `matrix` is read. The diagonal entries of $D$ keep the value of
/// the pivots found during elimination. Fails at the first pivot that is zero or not real,
/// and reports its one-based index.
///
/// # Panics
///
/// Panics if `matrix` is not square.
#[track_caller]
pub fn ldlt_in_place<E: ComplexField>(matrix: MatMut<'_, E>) -> Result<(), LdltError> {
    fancy_assert!(matrix.nrows() == matrix.ncols());

    #[cfg(feature = "perf-warn")]
    if matrix.row_stride().unsigned_abs() != 1 && h2dense_core::__perf_warn!(LDLT_WARN) {
        if matrix.col_stride().unsigned_abs() == 1 {
            log::warn!(target: "h2dense_perf", "LDLT decomposition prefers column-major matrix. Found row-major matrix.");
        } else {
            log::warn!(target: "h2dense_perf", "LDLT decomposition prefers column-major matrix. Found matrix with generic strides.");
        }
    }

    let mut a = matrix;
    let n = a.nrows();

    for i in 0..n {
        let diag = match real_pivot(a.read(i, i)) {
            Some(diag) if !diag.is_zero() => diag,
            _ => return Err(LdltError { zero_pivot_minor: i + 1 }),
        };
        let inv = diag.inv();

        unsafe {
            for j in i + 1..n {
                let value = a.read_unchecked(j, i).scale_real(inv);
                a.write_unchecked(j, i, value);
            }
            for j in i + 1..n {
                let l_ji = a.read_unchecked(j, i).scale_real(diag);
                for k in i + 1..=j {
                    let value = a.read_unchecked(j, k) - l_ji * a.read_unchecked(k, i).conj();
                    a.write_unchecked(j, k, value);
                }
            }
        }
    }

    Ok(())
}
