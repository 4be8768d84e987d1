use assert2::assert as fancy_assert;
use h2dense_core::{
    mul::triangular::BlockStructure,
    solve::{triangular_solve, triangular_solve_vec},
    ColMut, ComplexField, MatMut, MatRef, Trans,
};
use reborrow::*;

/// Given the LU factors of a matrix $A$, overwrites `rhs` with the solution $x$ of $Ax = b$,
/// where `rhs` holds $b$ on entry.
///
/// # Panics
///
/// Panics if `lu_factors` is not square, or if `rhs` has fewer rows than it.
#[track_caller]
pub fn solve_in_place_vec<E: ComplexField>(lu_factors: MatRef<'_, E>, rhs: ColMut<'_, E>) {
    fancy_assert!(lu_factors.nrows() == lu_factors.ncols());
    let mut rhs = rhs;
    triangular_solve_vec(
        BlockStructure::UnitTriangularLower,
        Trans::No,
        lu_factors,
        rhs.rb_mut(),
    );
    triangular_solve_vec(BlockStructure::TriangularUpper, Trans::No, lu_factors, rhs);
}

/// Given the LU factors of a matrix $A$, overwrites `rhs` with the solution $X$ of $AX = B$,
/// where `rhs` holds $B$ on entry.
///
/// # Panics
///
/// Panics if `lu_factors` is not square, or if `rhs` has fewer rows than it.
#[track_caller]
pub fn solve_in_place<E: ComplexField>(lu_factors: MatRef<'_, E>, rhs: MatMut<'_, E>) {
    fancy_assert!(lu_factors.nrows() == lu_factors.ncols());
    let mut rhs = rhs;
    triangular_solve(
        BlockStructure::UnitTriangularLower,
        Trans::No,
        lu_factors,
        Trans::No,
        rhs.rb_mut(),
    );
    triangular_solve(
        BlockStructure::TriangularUpper,
        Trans::No,
        lu_factors,
        Trans::No,
        rhs,
    );
}
