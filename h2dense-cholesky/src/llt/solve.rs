use assert2::assert as fancy_assert;
use h2dense_core::{
    mul::triangular::BlockStructure,
    solve::{triangular_solve, triangular_solve_vec},
    ColMut, ComplexField, MatMut, MatRef, Trans,
};
use reborrow::*;

/// Given the Cholesky factor of a matrix $A$, overwrites `rhs` with the solution $x$ of
/// $Ax = b$, where `rhs` holds $b$ on entry.
///
/// # Panics
///
/// Panics if `cholesky_factor` is not square, or if `rhs` has fewer rows than it.
#[track_caller]
pub fn solve_in_place_vec<E: ComplexField>(cholesky_factor: MatRef<'_, E>, rhs: ColMut<'_, E>) {
    fancy_assert!(cholesky_factor.nrows() == cholesky_factor.ncols());
    let mut rhs = rhs;
    triangular_solve_vec(
        BlockStructure::TriangularLower,
        Trans::No,
        cholesky_factor,
        rhs.rb_mut(),
    );
    triangular_solve_vec(
        BlockStructure::TriangularLower,
        Trans::Yes,
        cholesky_factor,
        rhs,
    );
}

/// Given the Cholesky factor of a matrix $A$, overwrites `rhs` with the solution $X$ of
/// $AX = B$, where `rhs` holds $B$ on entry.
///
/// # Panics
///
/// Panics if `cholesky_factor` is not square, or if `rhs` does not have as many rows as it.
#[track_caller]
pub fn solve_in_place<E: ComplexField>(cholesky_factor: MatRef<'_, E>, rhs: MatMut<'_, E>) {
    fancy_assert!(cholesky_factor.nrows() == cholesky_factor.ncols());
    fancy_assert!(cholesky_factor.ncols() == rhs.nrows());
    let mut rhs = rhs;
    triangular_solve(
        BlockStructure::TriangularLower,
        Trans::No,
        cholesky_factor,
        Trans::No,
        rhs.rb_mut(),
    );
    triangular_solve(
        BlockStructure::TriangularLower,
        Trans::Yes,
        cholesky_factor,
        Trans::No,
        rhs,
    );
}
