use assert2::assert as fancy_assert;
use dyn_stack::{DynStack, SizeOverflow, StackReq};
use h2dense_core::{mul, ops, temp_mat_req, temp_mat_zeroed, ComplexField, MatMut, MatRef, Parallelism, Trans};
use reborrow::*;

/// Computes the product $LU$ from the factors stored in `lu_factors`, and writes it to `dst`.
///
/// The workspace is described by [`reconstruct_req`].
///
/// # Panics
///
/// Panics if `lu_factors` is not square, or if `dst` does not have the same shape.
#[track_caller]
pub fn reconstruct<E: ComplexField>(
    dst: MatMut<'_, E>,
    lu_factors: MatRef<'_, E>,
    parallelism: Parallelism,
    stack: DynStack<'_>,
) {
    let n = lu_factors.nrows();
    fancy_assert!(lu_factors.ncols() == n);
    fancy_assert!((dst.nrows(), dst.ncols()) == (n, n));

    temp_mat_zeroed! {
        let (mut l, stack) = temp_mat_zeroed::<E>(n, n, stack);
    }
    temp_mat_zeroed! {
        let (mut u, _) = temp_mat_zeroed::<E>(n, n, stack);
    }
    ops::copy_lower(lu_factors, true, l.rb_mut());
    ops::copy_upper(lu_factors, false, u.rb_mut());

    let mut dst = dst;
    ops::clear(dst.rb_mut());
    mul::addmul(
        E::one(),
        Trans::No,
        l.rb(),
        Trans::No,
        u.rb(),
        dst,
        parallelism,
    );
}

/// Computes the size and alignment of the workspace required by [`reconstruct`] for an
/// `n × n` matrix.
pub fn reconstruct_req<E: ComplexField>(n: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_all_of([temp_mat_req::<E>(n, n)?, temp_mat_req::<E>(n, n)?])
}
