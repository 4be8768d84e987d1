use assert2::assert as fancy_assert;
use h2dense_core::{
    householder::apply_householder_sequence_on_the_left,
    mul::triangular::BlockStructure,
    solve::{triangular_solve, triangular_solve_vec},
    ColMut, ComplexField, MatMut, MatRef, Trans,
};
use reborrow::*;

/// Computes `rhs = Q * rhs`, or `rhs = Q^H * rhs` if `trans` is [`Trans::Yes`], where $Q$ is
/// the unitary factor stored in `qr_factors` and `tau`.
///
/// The first `min(nrows, ncols, tau.len())` reflectors take part, and only the first
/// `qr_factors.nrows()` entries of `rhs` are modified.
///
/// # Panics
///
/// Panics if `rhs` has fewer rows than `qr_factors`.
#[track_caller]
pub fn apply_q_vec<E: ComplexField>(
    trans: Trans,
    qr_factors: MatRef<'_, E>,
    tau: &[E],
    rhs: ColMut<'_, E>,
) {
    fancy_assert!(rhs.nrows() >= qr_factors.nrows());
    apply_householder_sequence_on_the_left(rhs.as_2d(), qr_factors, tau, trans);
}

/// Computes `rhs = Q * rhs`, or `rhs = Q^H * rhs` if `trans` is [`Trans::Yes`], for each column
/// of `rhs`. See [`apply_q_vec`].
#[track_caller]
pub fn apply_q<E: ComplexField>(
    trans: Trans,
    qr_factors: MatRef<'_, E>,
    tau: &[E],
    rhs: MatMut<'_, E>,
) {
    fancy_assert!(rhs.nrows() >= qr_factors.nrows());
    apply_householder_sequence_on_the_left(rhs, qr_factors, tau, trans);
}

/// Given the QR factors of a matrix $A$, overwrites `rhs` with the solution $x$ of $Ax = b$,
/// where `rhs` holds $b$ on entry.
///
/// If $A$ has more rows than columns, the first `ncols` entries of the result hold the least
/// squares solution.
#[track_caller]
pub fn solve_in_place_vec<E: ComplexField>(qr_factors: MatRef<'_, E>, tau: &[E], rhs: ColMut<'_, E>) {
    let mut rhs = rhs;
    apply_q_vec(Trans::Yes, qr_factors, tau, rhs.rb_mut());
    triangular_solve_vec(BlockStructure::TriangularUpper, Trans::No, qr_factors, rhs);
}

/// Given the QR factors of a matrix $A$, overwrites `rhs` with the solution $X$ of $AX = B$,
/// where `rhs` holds $B$ on entry. See [`solve_in_place_vec`].
#[track_caller]
pub fn solve_in_place<E: ComplexField>(qr_factors: MatRef<'_, E>, tau: &[E], rhs: MatMut<'_, E>) {
    let mut rhs = rhs;
    apply_q(Trans::Yes, qr_factors, tau, rhs.rb_mut());
    triangular_solve(
        BlockStructure::TriangularUpper,
        Trans::No,
        qr_factors,
        Trans::No,
        rhs,
    );
}
