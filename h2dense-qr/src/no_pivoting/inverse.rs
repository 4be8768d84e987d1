use super::{compute::qr_in_place, solve::solve_in_place_vec};
use assert2::assert as fancy_assert;
use dyn_stack::{DynStack, SizeOverflow, StackReq};
use h2dense_core::{ops, temp_mat_req, temp_mat_zeroed, ComplexField, MatMut, Trans};
use reborrow::*;

/// Overwrites the square matrix `matrix` with its inverse, computed from the QR decomposition of
/// a copy.
///
/// The input must be invertible, otherwise the result contains non-finite values. The workspace
/// is described by [`invert_in_place_req`].
///
/// # Panics
///
/// Panics if `matrix` is not square.
#[track_caller]
pub fn invert_in_place<E: ComplexField>(matrix: MatMut<'_, E>, stack: DynStack<'_>) {
    let n = matrix.nrows();
    fancy_assert!(matrix.ncols() == n);

    temp_mat_zeroed! {
        let (mut qr, _) = temp_mat_zeroed::<E>(n, n, stack);
    }
    let mut matrix = matrix;
    ops::copy(Trans::No, matrix.rb(), qr.rb_mut());

    let mut tau = Vec::with_capacity(n);
    qr_in_place(qr.rb_mut(), &mut tau);

    ops::identity(matrix.rb_mut());
    for j in 0..n {
        solve_in_place_vec(qr.rb(), &tau, matrix.rb_mut().col(j));
    }
}

/// Computes the size and alignment of the workspace required by [`invert_in_place`] for an
/// `n × n` matrix.
pub fn invert_in_place_req<E: ComplexField>(n: usize) -> Result<StackReq, SizeOverflow> {
    temp_mat_req::<E>(n, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use dyn_stack::GlobalMemBuffer;
    use h2dense_core::{c64, mat, mul, random, Mat, Parallelism};
    use rand::{rngs::StdRng, SeedableRng};

    fn invert(a: &mut Mat<c64>) {
        let n = a.nrows();
        invert_in_place(
            a.as_mut(),
            DynStack::new(&mut GlobalMemBuffer::new(invert_in_place_req::<c64>(n).unwrap())),
        );
    }

    #[test]
    fn test_inverse() {
        let mut rng = StdRng::seed_from_u64(0);
        for n in [1, 2, 5, 30] {
            let mut a = Mat::<c64>::zeros(n, n);
            random::random_invertible(a.as_mut(), 1.0, &mut rng);
            let a_orig = a.clone();
            invert(&mut a);

            let mut prod = Mat::<c64>::zeros(n, n);
            mul::addmul(
                c64::one(),
                Trans::No,
                a_orig.as_ref(),
                Trans::No,
                a.as_ref(),
                prod.as_mut(),
                Parallelism::None,
            );
            let id = Mat::<c64>::identity(n, n);
            for j in 0..n {
                for i in 0..n {
                    assert_approx_eq!(prod[(i, j)], id[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_inverse_2x2() {
        let mut a = mat![[4.0, 7.0], [2.0, 6.0]];
        invert_in_place(
            a.as_mut(),
            DynStack::new(&mut GlobalMemBuffer::new(invert_in_place_req::<f64>(2).unwrap())),
        );
        assert_approx_eq!(a[(0, 0)], 0.6);
        assert_approx_eq!(a[(0, 1)], -0.7);
        assert_approx_eq!(a[(1, 0)], -0.2);
        assert_approx_eq!(a[(1, 1)], 0.4);
    }

    #[test]
    fn test_empty() {
        let mut a = Mat::<f64>::zeros(0, 0);
        invert_in_place(
            a.as_mut(),
            DynStack::new(&mut GlobalMemBuffer::new(invert_in_place_req::<f64>(0).unwrap())),
        );
        assert2::assert!(a.nrows() == 0);
    }
}
