//! The Cholesky decomposition of a hermitian positive definite matrix $A$ is such that:
//! $$A = LL^H,$$
//! where $L$ is a lower triangular matrix with a real positive diagonal.
//!
//! The factor is stored in place of the lower triangle of $A$. The strict upper triangle is
//! neither read nor written.

pub mod compute;
pub mod reconstruct;
pub mod solve;

/// The matrix is not positive definite, or its diagonal is not real.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CholeskyError {
    /// One-based index of the first leading principal minor that failed the check.
    pub non_positive_definite_minor: usize,
}

impl core::fmt::Display for CholeskyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CholeskyError {}

#[cfg(test)]
mod tests {
    use super::{compute::*, reconstruct::*, solve::*, CholeskyError};
    use assert2::assert as fancy_assert;
    use assert_approx_eq::assert_approx_eq;
    use h2dense_core::{c64, mat, mul, random, ColMut, ComplexField, Mat, Parallelism, Trans};
    use rand::{rngs::StdRng, SeedableRng};

    type E = c64;

    fn random_spd(n: usize, rng: &mut StdRng) -> Mat<E> {
        let mut a = Mat::zeros(n, n);
        random::random_spd(a.as_mut(), 1.0, rng);
        a
    }

    #[test]
    fn test_known_factor() {
        let mut a = mat![[4.0, 12.0, -16.0], [12.0, 37.0, -43.0], [-16.0, -43.0, 98.0]];
        fancy_assert!(cholesky_in_place(a.as_mut()) == Ok(()));

        let expected = [[2.0, 0.0, 0.0], [6.0, 1.0, 0.0], [-8.0, 5.0, 3.0]];
        for j in 0..3 {
            for i in j..3 {
                assert_approx_eq!(a[(i, j)], expected[i][j]);
            }
        }
        // the upper triangle is left untouched
        fancy_assert!(a[(0, 1)] == 12.0);
        fancy_assert!(a[(0, 2)] == -16.0);
        fancy_assert!(a[(1, 2)] == -43.0);
    }

    #[test]
    fn test_roundtrip() {
        let mut rng = StdRng::seed_from_u64(0);
        for n in [1, 2, 3, 10, 31, 64] {
            let a = random_spd(n, &mut rng);
            let mut factor = a.clone();
            fancy_assert!(cholesky_in_place(factor.as_mut()).is_ok());

            let mut a_reconstructed = Mat::zeros(n, n);
            reconstruct_lower(a_reconstructed.as_mut(), factor.as_ref());

            for j in 0..n {
                fancy_assert!(factor[(j, j)].im == 0.0);
                for i in 0..n {
                    assert_approx_eq!(a_reconstructed[(i, j)], a[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_solve() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [1, 5, 24] {
            let a = random_spd(n, &mut rng);
            let k = 2;
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

            let mut factor = a.clone();
            fancy_assert!(cholesky_in_place(factor.as_mut()).is_ok());

            let mut sol = rhs.clone();
            solve_in_place(factor.as_ref(), sol.as_mut());
            let mut sol_vec = rhs.as_ref().col(1).to_vec();
            solve_in_place_vec(factor.as_ref(), ColMut::from_slice_mut(&mut sol_vec));

            for i in 0..n {
                assert_approx_eq!(sol_vec[i], x[(i, 1)]);
                for j in 0..k {
                    assert_approx_eq!(sol[(i, j)], x[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_not_positive_definite() {
        let mut a = mat![[1.0, 2.0], [2.0, 1.0]];
        fancy_assert!(
            cholesky_in_place(a.as_mut())
                == Err(CholeskyError {
                    non_positive_definite_minor: 2
                })
        );

        let mut a = mat![[-1.0]];
        fancy_assert!(
            cholesky_in_place(a.as_mut())
                == Err(CholeskyError {
                    non_positive_definite_minor: 1
                })
        );
    }

    #[test]
    fn test_complex_pivot() {
        let mut a = mat![[E::new(2.0, 0.0), E::zero()], [E::zero(), E::new(1.0, 1e-6)]];
        fancy_assert!(
            cholesky_in_place(a.as_mut())
                == Err(CholeskyError {
                    non_positive_definite_minor: 2
                })
        );
    }

    #[test]
    fn test_empty() {
        let mut a = Mat::<f64>::zeros(0, 0);
        fancy_assert!(cholesky_in_place(a.as_mut()).is_ok());
    }
}
