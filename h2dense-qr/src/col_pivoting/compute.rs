use crate::{no_pivoting::compute::reflect_column, TruncationMode};
use assert2::assert as fancy_assert;
use h2dense_core::{householder::squared_norm, ComplexField, MatMut, MatRef};
use reborrow::*;

/// Squared norm of column `j`, restricted to the rows from `k` on.
#[inline]
fn active_squared_norm<E: ComplexField>(a: MatRef<'_, E>, k: usize, j: usize) -> E::Real {
    squared_norm(a.col(j).subrows(k, a.nrows() - k))
}

fn swap_columns<E: ComplexField>(mut a: MatMut<'_, E>, j0: usize, j1: usize) {
    for i in 0..a.nrows() {
        unsafe {
            let x0 = a.read_unchecked(i, j0);
            let x1 = a.read_unchecked(i, j1);
            a.write_unchecked(i, j0, x1);
            a.write_unchecked(i, j1, x0);
        }
    }
}

fn qr_in_place_impl<E: ComplexField>(
    matrix: MatMut<'_, E>,
    tau: &mut Vec<E>,
    stop: Option<(TruncationMode, E::Real)>,
    col_perm: Option<&mut [usize]>,
) -> usize {
    #[cfg(feature = "perf-warn")]
    if matrix.row_stride().unsigned_abs() != 1 && h2dense_core::__perf_warn!(QR_WARN) {
        if matrix.col_stride().unsigned_abs() == 1 {
            log::warn!(target: "h2dense_perf", "Pivoted QR prefers column-major matrix. Found row-major matrix.");
        } else {
            log::warn!(target: "h2dense_perf", "Pivoted QR prefers column-major matrix. Found matrix with generic strides.");
        }
    }

    let mut a = matrix;
    let n = a.ncols();
    let refl = a.nrows().min(n);
    if tau.len() < refl {
        tau.resize(refl, E::zero());
    }

    let mut col_perm = col_perm;
    if let Some(perm) = col_perm.as_deref_mut() {
        fancy_assert!(perm.len() == n);
        perm.iter_mut().enumerate().for_each(|(j, p)| *p = j);
    }

    let mut first_norm2 = <E::Real as ComplexField>::zero();
    let mut k = 0;
    while k < refl {
        let mut max_norm2 = active_squared_norm(a.rb(), k, k);
        let mut frob_norm2 = max_norm2;
        let mut jmax = k;
        for j in k + 1..n {
            let norm2 = active_squared_norm(a.rb(), k, j);
            if norm2 > max_norm2 {
                max_norm2 = norm2;
                jmax = j;
            }
            frob_norm2 = frob_norm2 + norm2;
        }

        if jmax != k {
            swap_columns(a.rb_mut(), k, jmax);
            if let Some(perm) = col_perm.as_deref_mut() {
                perm.swap(k, jmax);
            }
        }

        if let Some((mode, eps)) = stop {
            let eps2 = eps * eps;
            if mode.absolute {
                if frob_norm2 <= eps2 {
                    break;
                }
            } else if k == 0 {
                first_norm2 = if mode.frobenius { frob_norm2 } else { max_norm2 };
            } else if frob_norm2 <= eps2 * first_norm2 {
                break;
            }
        }

        tau[k] = reflect_column(a.rb_mut(), k);
        k += 1;
    }

    if stop.is_some() {
        tau.truncate(k);
    }
    k
}

/// Computes the QR decomposition with column pivoting of `matrix` in place, and returns the
/// number of reflectors, `min(nrows, ncols)`.
///
/// At each step, the remaining column with the largest norm below the current row is moved into
/// place, the first one on ties. The columns of `matrix` are swapped in place. If `col_perm` is
/// provided, `col_perm[k]` receives the original index of the column that ends up at position
/// `k`.
///
/// The layout of the factors and of `tau` is that of
/// [`crate::no_pivoting::compute::qr_in_place`].
///
/// # Panics
///
/// Panics if `col_perm` is provided and its length differs from `matrix.ncols()`.
#[track_caller]
pub fn qr_in_place_pivot<E: ComplexField>(
    matrix: MatMut<'_, E>,
    tau: &mut Vec<E>,
    col_perm: Option<&mut [usize]>,
) -> usize {
    qr_in_place_impl(matrix, tau, None, col_perm)
}

/// Computes a truncated QR decomposition with column pivoting of `matrix` in place, and returns
/// the numerical rank found, which is the number of reflectors computed.
///
/// The decomposition proceeds as in [`qr_in_place_pivot`], but before computing reflector `k`,
/// it stops if the remaining columns are negligible according to `mode` and `eps`. `tau` is then
/// truncated to the returned rank. The entries below row `k` of the unprocessed columns are left
/// as they were after the last reflector.
///
/// # Panics
///
/// Panics if `col_perm` is provided and its length differs from `matrix.ncols()`.
#[track_caller]
pub fn qr_in_place_rank<E: ComplexField>(
    matrix: MatMut<'_, E>,
    tau: &mut Vec<E>,
    mode: TruncationMode,
    eps: E::Real,
    col_perm: Option<&mut [usize]>,
) -> usize {
    qr_in_place_impl(matrix, tau, Some((mode, eps)), col_perm)
}
