use assert2::assert as fancy_assert;
use h2dense_core::{
    householder::apply_householder_on_the_left, ComplexField, MatMut, MatRef,
};
use reborrow::*;

/// Writes the first `q.ncols()` columns of the unitary factor $Q$ stored in `qr_factors` and
/// `tau` to `q`.
///
/// Only the first `qr_factors.nrows()` rows of `q` are written. The reflectors used are the first
/// `min(q.ncols(), tau.len(), nrows, ncols)`, so the result stays orthonormal for the output of
/// a truncated decomposition.
///
/// # Panics
///
/// Requires `q.nrows() >= qr_factors.nrows()` and `q.ncols() <= qr_factors.nrows()`.
#[track_caller]
pub fn expand_q<E: ComplexField>(qr_factors: MatRef<'_, E>, tau: &[E], q: MatMut<'_, E>) {
    let rows = qr_factors.nrows();
    fancy_assert!(q.nrows() >= rows);
    fancy_assert!(q.ncols() <= rows);

    let mut q = q;
    let qcols = q.ncols();
    let refl = qcols
        .min(tau.len())
        .min(rows)
        .min(qr_factors.ncols());

    for j in 0..qcols {
        for i in 0..rows {
            q.write(i, j, E::zero());
        }
        q.write(j, j, E::one());
    }

    for k in (0..refl).rev() {
        let essential = qr_factors.col(k).subrows(k + 1, rows - k - 1);
        apply_householder_on_the_left(
            q.rb_mut().submatrix(k, k, rows - k, qcols - k),
            essential,
            tau[k],
        );
    }
}
