//! Both factors are stored in place of the input matrix: $L$ strictly below the diagonal (its
//! unit diagonal is implicit), and $U$ on and above the diagonal.

pub mod compute;
pub mod reconstruct;
pub mod solve;

/// The decomposition met a zero pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuError {
    /// One-based index of the first leading principal minor found to be singular.
    pub singular_minor: usize,
}

impl core::fmt::Display for LuError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LuError {}

#[cfg(test)]
mod tests {
    use super::{compute::*, reconstruct::*, solve::*, LuError};
    use assert2::assert as fancy_assert;
    use assert_approx_eq::assert_approx_eq;
    use dyn_stack::{DynStack, GlobalMemBuffer};
    use h2dense_core::{c64, mat, mul, random, ColMut, ComplexField, Mat, MatRef, Parallelism, Trans};
    use rand::{rngs::StdRng, SeedableRng};

    type E = c64;

    fn reconstruct_matrix(lu_factors: MatRef<'_, E>) -> Mat<E> {
        let n = lu_factors.nrows();
        let mut a_reconstructed = Mat::zeros(n, n);
        reconstruct(
            a_reconstructed.as_mut(),
            lu_factors,
            Parallelism::Rayon(0),
            DynStack::new(&mut GlobalMemBuffer::new(reconstruct_req::<E>(n).unwrap())),
        );
        a_reconstructed
    }

    fn random_invertible(n: usize, rng: &mut StdRng) -> Mat<E> {
        let mut a = Mat::zeros(n, n);
        random::random_invertible(a.as_mut(), 1.0, rng);
        a
    }

    #[test]
    fn test_roundtrip() {
        let mut rng = StdRng::seed_from_u64(0);
        for n in [1, 2, 3, 8, 31, 64] {
            let a = random_invertible(n, &mut rng);
            let mut lu = a.clone();
            fancy_assert!(lu_in_place(lu.as_mut()) == Ok(()));

            let a_reconstructed = reconstruct_matrix(lu.as_ref());
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
        for n in [1, 4, 17, 50] {
            let a = random_invertible(n, &mut rng);
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

            let mut lu = a.clone();
            fancy_assert!(lu_in_place(lu.as_mut()).is_ok());

            let mut sol = rhs.clone();
            solve_in_place(lu.as_ref(), sol.as_mut());

            let mut sol_vec = rhs.as_ref().col(0).to_vec();
            solve_in_place_vec(lu.as_ref(), ColMut::from_slice_mut(&mut sol_vec));

            for i in 0..n {
                assert_approx_eq!(sol_vec[i], x[(i, 0)]);
                for j in 0..k {
                    assert_approx_eq!(sol[(i, j)], x[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_zero_leading_pivot() {
        let mut a = mat![[0.0, 1.0], [0.0, 0.0]];
        fancy_assert!(lu_in_place(a.as_mut()) == Err(LuError { singular_minor: 1 }));
    }

    #[test]
    fn test_zero_trailing_pivot() {
        let mut a = mat![[1.0, 2.0], [2.0, 4.0]];
        fancy_assert!(lu_in_place(a.as_mut()) == Err(LuError { singular_minor: 2 }));
    }

    #[test]
    fn test_known_factors() {
        let mut a = mat![[4.0, 3.0], [6.0, 3.0]];
        fancy_assert!(lu_in_place(a.as_mut()).is_ok());
        fancy_assert!(a == mat![[4.0, 3.0], [1.5, -1.5]]);
    }

    #[test]
    fn test_empty() {
        let mut a = Mat::<f64>::zeros(0, 0);
        fancy_assert!(lu_in_place(a.as_mut()).is_ok());
    }

    #[test]
    #[should_panic]
    fn test_not_square() {
        let mut a = Mat::<f64>::zeros(3, 2);
        let _ = lu_in_place(a.as_mut());
    }

    #[test]
    fn test_error_display() {
        let err = LuError { singular_minor: 3 };
        fancy_assert!(err.to_string() == "LuError { singular_minor: 3 }");
    }
}
