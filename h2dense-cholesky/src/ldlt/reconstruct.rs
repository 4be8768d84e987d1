use assert2::assert as fancy_assert;
use dyn_stack::{DynStack, SizeOverflow, StackReq};
use h2dense_core::{
    diag::diageval,
    mul::addmul,
    ops, temp_mat_req, temp_mat_zeroed, ComplexField, MatMut, MatRef, Parallelism, Trans,
};
use reborrow::*;

/// Computes the product $LDL^H$ from the factors stored in the lower triangle of
/// `ldlt_factors`, and writes it to `dst`.
///
/// The workspace is described by [`reconstruct_lower_req`].
///
/// # Panics
///
/// Panics if `ldlt_factors` is not square, or if `dst` does not have the same shape.
#[track_caller]
pub fn reconstruct_lower<E: ComplexField>(
    dst: MatMut<'_, E>,
    ldlt_factors: MatRef<'_, E>,
    parallelism: Parallelism,
    stack: DynStack<'_>,
) {
    let n = ldlt_factors.nrows();
    fancy_assert!(ldlt_factors.ncols() == n);
    fancy_assert!((dst.nrows(), dst.ncols()) == (n, n));

    temp_mat_zeroed! {
        let (mut l, stack) = temp_mat_zeroed::<E>(n, n, stack);
    }
    temp_mat_zeroed! {
        let (mut ld, _) = temp_mat_zeroed::<E>(n, n, stack);
    }
    ops::copy_lower(ldlt_factors, true, l.rb_mut());
    ops::copy(Trans::No, l.rb(), ld.rb_mut());
    diageval(Trans::No, ldlt_factors, Trans::Yes, ld.rb_mut());

    let mut dst = dst;
    ops::clear(dst.rb_mut());
    addmul(
        E::one(),
        Trans::No,
        ld.rb(),
        Trans::Yes,
        l.rb(),
        dst,
        parallelism,
    );
}

/// Computes the size and alignment of the workspace required by [`reconstruct_lower`] for an
/// `n × n` matrix.
pub fn reconstruct_lower_req<E: ComplexField>(n: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_all_of([temp_mat_req::<E>(n, n)?, temp_mat_req::<E>(n, n)?])
}
