use super::LuError;
use assert2::assert as fancy_assert;
use h2dense_core::{ComplexField, MatMut};

/// Computes the LU decomposition of the square matrix `matrix` without pivoting, and stores
/// both factors in place: the strictly lower part of `L` below the diagonal, and `U` on and
/// above the diagonal.
///
/// Stops at the first zero pivot and reports its one-based index. The matrix is then left
/// partially factored.
///
/// # Panics
///
/// Panics if `matrix` is not square.
#[track_caller]
pub fn lu_in_place<E: ComplexField>(matrix: MatMut<'_, E>) -> Result<(), LuError> {
    fancy_assert!(matrix.nrows() == matrix.ncols());

    #[cfg(feature = "perf-warn")]
    if matrix.row_stride().unsigned_abs() != 1 && h2dense_core::__perf_warn!(LU_WARN) {
        if matrix.col_stride().unsigned_abs() == 1 {
            log::warn!(target: "h2dense_perf", "LU prefers column-major matrix. Found row-major matrix.");
        } else {
            log::warn!(target: "h2dense_perf", "LU prefers column-major matrix. Found matrix with generic strides.");
        }
    }

    let mut a = matrix;
    let n = a.nrows();

    for i in 0..n {
        let pivot = a.read(i, i);
        if pivot.is_zero() {
            return Err(LuError {
                singular_minor: i + 1,
            });
        }
        let inv = pivot.inv();

        for j in i + 1..n {
            unsafe {
                let l = a.read_unchecked(j, i) * inv;
                a.write_unchecked(j, i, l);
                for k in i + 1..n {
                    let value = a.read_unchecked(j, k) - l * a.read_unchecked(i, k);
                    a.write_unchecked(j, k, value);
                }
            }
        }
    }

    Ok(())
}
