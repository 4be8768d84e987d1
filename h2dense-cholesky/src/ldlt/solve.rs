use assert2::assert as fancy_assert;
use h2dense_core::{
    diag::{diagsolve, diagsolve_vec},
    mul::triangular::BlockStructure,
    solve::{triangular_solve, triangular_solve_vec},
    ColMut, ComplexField, MatMut, MatRef, Trans,
};
use reborrow::*;

/// Given the $LDL^H$ factors of a matrix $A$, overwrites `rhs` with the solution $x$ of
/// $Ax = b$, where `rhs` holds $b$ on entry.
///
/// # Panics
///
/// Panics if `ldlt_factors` is not square, or if `rhs` has fewer rows than it.
#[track_caller]
pub fn solve_in_place_vec<E: ComplexField>(ldlt_factors: MatRef<'_, E>, rhs: ColMut<'_, E>) {
    fancy_assert!(ldlt_factors.nrows() == ldlt_factors.ncols());
    let mut rhs = rhs;
    triangular_solve_vec(
        BlockStructure::UnitTriangularLower,
        Trans::No,
        ldlt_factors,
        rhs.rb_mut(),
    );
    diagsolve_vec(Trans::No, ldlt_factors, rhs.rb_mut());
    triangular_solve_vec(
        BlockStructure::UnitTriangularLower,
        Trans::Yes,
        ldlt_factors,
        rhs,
    );
}

/// Given the $LDL^H$ factors of a matrix $A$, overwrites `rhs` with the solution $X$ of
/// $AX = B$, where `rhs` holds $B$ on entry.
///
/// # Panics
///
/// Panics if `ldlt_factors` is not square, or if `rhs` does not have as many rows as it.
#[track_caller]
pub fn solve_in_place<E: ComplexField>(ldlt_factors: MatRef<'_, E>, rhs: MatMut<'_, E>) {
    fancy_assert!(ldlt_factors.nrows() == ldlt_factors.ncols());
    fancy_assert!(ldlt_factors.ncols() == rhs.nrows());
    let mut rhs = rhs;
    triangular_solve(
        BlockStructure::UnitTriangularLower,
        Trans::No,
        ldlt_factors,
        Trans::No,
        rhs.rb_mut(),
    );
    diagsolve(Trans::No, ldlt_factors, Trans::No, rhs.rb_mut());
    triangular_solve(
        BlockStructure::UnitTriangularLower,
        Trans::Yes,
        ldlt_factors,
        Trans::No,
        rhs,
    );
}
