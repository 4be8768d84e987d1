use assert2::assert as fancy_assert;
use h2dense_core::{
    mul::triangular::{triangular_addmul, BlockStructure},
    ops, ComplexField, MatMut, MatRef, Trans,
};
use reborrow::*;

/// Computes the product $LL^H$ from the Cholesky factor stored in the lower triangle of
/// `cholesky_factor`, and writes it to `dst`.
///
/// # Panics
///
/// Panics if `cholesky_factor` is not square, or if `dst` does not have the same shape.
#[track_caller]
pub fn reconstruct_lower<E: ComplexField>(dst: MatMut<'_, E>, cholesky_factor: MatRef<'_, E>) {
    let n = cholesky_factor.nrows();
    fancy_assert!(cholesky_factor.ncols() == n);
    fancy_assert!((dst.nrows(), dst.ncols()) == (n, n));

    let mut dst = dst;
    ops::clear(dst.rb_mut());
    triangular_addmul(
        E::one(),
        BlockStructure::TriangularLower,
        Trans::No,
        cholesky_factor,
        BlockStructure::TriangularLower,
        Trans::Yes,
        cholesky_factor,
        dst,
    );
}
