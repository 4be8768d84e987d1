//! The $LDL^H$ decomposition of a self-adjoint matrix $A$ is such that:
//! $$A = LDL^H,$$
//! where $L$ is a unit lower triangular matrix, and $D$ is a real diagonal matrix. Unlike the
//! Cholesky decomposition, $A$ may be indefinite.
//!
//! The strictly lower part of $L$ is stored below the diagonal, and $D$ on the diagonal. The
//! strict upper triangle is neither read nor written.

pub mod compute;
pub mod reconstruct;
pub mod solve;

/// A pivot of the decomposition is zero, or not real.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LdltError {
    /// One-based index of the first leading principal minor that failed the check.
    pub zero_pivot_minor: usize,
}

impl core::fmt::Display for LdltError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LdltError {}

#[cfg(test)]
mod tests {
    use super::{compute::*, reconstruct::*, solve::*, LdltError};
    use assert2::assert as fancy_assert;
    use assert_approx_eq::assert_approx_eq;
    use dyn_stack::{DynStack, GlobalMemBuffer};
    use h2dense_core::{c64, mat, mul, ops, random, ColMut, ComplexField, Mat, MatRef, Parallelism, Trans};
    use rand::{rngs::StdRng, SeedableRng};

    type E = c64;

    fn reconstruct_matrix(ldlt_factors: MatRef<'_, E>) -> Mat<E> {
        let n = ldlt_factors.nrows();
        let mut a_reconstructed = Mat::zeros(n, n);
        reconstruct_lower(
            a_reconstructed.as_mut(),
            ldlt_factors,
            Parallelism::None,
            DynStack::new(&mut GlobalMemBuffer::new(reconstruct_lower_req::<E>(n).unwrap())),
        );
        a_reconstructed
    }

    #[test]
    fn test_known_factors() {
        let mut a = mat![[4.0, 12.0, -16.0], [12.0, 37.0, -43.0], [-16.0, -43.0, 98.0]];
        fancy_assert!(ldlt_in_place(a.as_mut()) == Ok(()));

        let expected = [[4.0, 0.0, 0.0], [3.0, 1.0, 0.0], [-4.0, 5.0, 9.0]];
        for j in 0..3 {
            for i in j..3 {
                assert_approx_eq!(a[(i, j)], expected[i][j]);
            }
        }
    }

    #[test]
    fn test_indefinite() {
        let mut a = mat![[1.0, 2.0], [2.0, 1.0]];
        fancy_assert!(ldlt_in_place(a.as_mut()).is_ok());
        fancy_assert!(a[(1, 0)] == 2.0);
        fancy_assert!(a[(1, 1)] == -3.0);
    }

    #[test]
    fn test_roundtrip() {
        let mut rng = StdRng::seed_from_u64(0);
        for n in [1, 2, 7, 32, 50] {
            let mut a = Mat::<E>::zeros(n, n);
            random::random_spd(a.as_mut(), 1.0, &mut rng);
            // flip the sign of the trailing block to make the matrix indefinite
            for j in n / 2..n {
                for i in n / 2..n {
                    a[(i, j)] = -a[(i, j)];
                }
            }
            let mut factors = a.clone();
            fancy_assert!(ldlt_in_place(factors.as_mut()).is_ok());

            let a_reconstructed = reconstruct_matrix(factors.as_ref());
            for j in 0..n {
                for i in 0..n {
                    assert_approx_eq!(a_reconstructed[(i, j)], a[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_solve() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [1, 6, 20] {
            let mut a = Mat::<E>::zeros(n, n);
            random::random_spd(a.as_mut(), 1.0, &mut rng);
            ops::scale(E::new(-1.0, 0.0), a.as_mut());

            let k = 3;
            let mut x = Mat::<E>::zeros(n, k);
            random::fill_random(x.as_mut(), &mut rng);
            let mut rhs = Mat::<E>::zeros(n, k);
            mul::addmul(
                E::one(),
                Trans::No,
                a.as_ref(),
                Trans::No,
                x.as_ref(),
                rhs.as_mut(),
                Parallelism::None,
            );

            let mut factors = a.clone();
            fancy_assert!(ldlt_in_place(factors.as_mut()).is_ok());

            let mut sol = rhs.clone();
            solve_in_place(factors.as_ref(), sol.as_mut());
            let mut sol_vec = rhs.as_ref().col(2).to_vec();
            solve_in_place_vec(factors.as_ref(), ColMut::from_slice_mut(&mut sol_vec));

            for i in 0..n {
                assert_approx_eq!(sol_vec[i], x[(i, 2)]);
                for j in 0..k {
                    assert_approx_eq!(sol[(i, j)], x[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_zero_pivot() {
        let mut a = mat![[0.0, 1.0], [1.0, 0.0]];
        fancy_assert!(ldlt_in_place(a.as_mut()) == Err(LdltError { zero_pivot_minor: 1 }));

        let mut a = mat![[1.0, 1.0], [1.0, 1.0]];
        fancy_assert!(ldlt_in_place(a.as_mut()) == Err(LdltError { zero_pivot_minor: 2 }));
    }

    #[test]
    fn test_non_real_pivot() {
        let mut a = mat![[E::new(1.0, 0.5)]];
        fancy_assert!(ldlt_in_place(a.as_mut()) == Err(LdltError { zero_pivot_minor: 1 }));
    }

    #[test]
    fn test_empty() {
        let mut a = Mat::<f64>::zeros(0, 0);
        fancy_assert!(ldlt_in_place(a.as_mut()).is_ok());
    }
}
