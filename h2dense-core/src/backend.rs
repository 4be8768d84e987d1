//! Matrix product kernels.
//!
//! The native kernel is always available. With the `gemm` feature, products over the builtin
//! scalar types are forwarded to the `gemm` crate instead, every other type still goes through
//! the native kernel.

use crate::{join_raw, parallelism_degree, ComplexField, MatMut, MatRef, Parallelism};

/// Computes `dst += alpha * lhs * rhs`, where `lhs` and `rhs` are read through their conjugates
/// when `conj_lhs` and `conj_rhs` are set.
///
/// Every element of `dst` accumulates its terms directly, in increasing order of the inner
/// index.
pub(crate) fn matmul<E: ComplexField>(
    dst: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    conj_lhs: bool,
    rhs: MatRef<'_, E>,
    conj_rhs: bool,
    alpha: E,
    parallelism: Parallelism,
) {
    if dst.nrows() == 0 || dst.ncols() == 0 || lhs.ncols() == 0 {
        return;
    }

    #[cfg(feature = "gemm")]
    let dst = match gemm_backend::matmul(dst, lhs, conj_lhs, rhs, conj_rhs, alpha, parallelism) {
        Some(dst) => dst,
        None => return,
    };

    native::matmul(dst, lhs, conj_lhs, rhs, conj_rhs, alpha, parallelism);
}

mod native {
    use super::*;

    const PAR_THRESHOLD: usize = 64 * 64 * 64;

    #[inline(always)]
    fn conj_if<E: ComplexField>(value: E, conj: bool) -> E {
        if conj {
            value.conj()
        } else {
            value
        }
    }

    pub fn matmul<E: ComplexField>(
        mut dst: MatMut<'_, E>,
        lhs: MatRef<'_, E>,
        conj_lhs: bool,
        rhs: MatRef<'_, E>,
        conj_rhs: bool,
        alpha: E,
        parallelism: Parallelism,
    ) {
        let m = dst.nrows();
        let n = dst.ncols();
        let k = lhs.ncols();

        if n > 1 && parallelism_degree(parallelism) > 1 && m * n * k > PAR_THRESHOLD {
            let mid = n / 2;
            let (dst_left, dst_right) = dst.split_at_col(mid);
            let (rhs_left, rhs_right) = rhs.split_at_col(mid);
            join_raw(
                |parallelism| {
                    matmul(dst_left, lhs, conj_lhs, rhs_left, conj_rhs, alpha, parallelism)
                },
                |parallelism| {
                    matmul(dst_right, lhs, conj_lhs, rhs_right, conj_rhs, alpha, parallelism)
                },
                parallelism,
            );
            return;
        }

        for col in 0..n {
            for depth in 0..k {
                let b = conj_if(unsafe { rhs.read_unchecked(depth, col) }, conj_rhs);
                for row in 0..m {
                    unsafe {
                        let a = conj_if(lhs.read_unchecked(row, depth), conj_lhs);
                        let c = dst.read_unchecked(row, col);
                        dst.write_unchecked(row, col, c + alpha * a * b);
                    }
                }
            }
        }
    }
}

#[cfg(feature = "gemm")]
mod gemm_backend {
    use super::*;
    use core::{any::TypeId, mem::transmute_copy};

    #[inline]
    fn to_gemm(parallelism: Parallelism) -> gemm::Parallelism {
        match parallelism {
            Parallelism::None => gemm::Parallelism::None,
            Parallelism::Rayon(n_threads) => gemm::Parallelism::Rayon(n_threads),
        }
    }

    /// # Safety
    ///
    /// `T` must have the same layout as `E`.
    unsafe fn gemm_as<E: ComplexField, T: 'static>(
        dst: MatMut<'_, E>,
        lhs: MatRef<'_, E>,
        conj_lhs: bool,
        rhs: MatRef<'_, E>,
        conj_rhs: bool,
        alpha: E,
        parallelism: Parallelism,
    ) {
        gemm::gemm(
            dst.nrows(),
            dst.ncols(),
            lhs.ncols(),
            dst.as_ptr() as *mut T,
            dst.col_stride(),
            dst.row_stride(),
            true,
            lhs.as_ptr() as *const T,
            lhs.col_stride(),
            lhs.row_stride(),
            rhs.as_ptr() as *const T,
            rhs.col_stride(),
            rhs.row_stride(),
            transmute_copy::<E, T>(&E::one()),
            transmute_copy::<E, T>(&alpha),
            false,
            conj_lhs,
            conj_rhs,
            to_gemm(parallelism),
        )
    }

    /// Forwards the product to `gemm` for the builtin scalar types. Hands `dst` back when the
    /// scalar type is not supported.
    pub fn matmul<'a, E: ComplexField>(
        dst: MatMut<'a, E>,
        lhs: MatRef<'_, E>,
        conj_lhs: bool,
        rhs: MatRef<'_, E>,
        conj_rhs: bool,
        alpha: E,
        parallelism: Parallelism,
    ) -> Option<MatMut<'a, E>> {
        let id = TypeId::of::<E>();
        unsafe {
            if id == TypeId::of::<f32>() {
                gemm_as::<E, f32>(dst, lhs, conj_lhs, rhs, conj_rhs, alpha, parallelism);
            } else if id == TypeId::of::<f64>() {
                gemm_as::<E, f64>(dst, lhs, conj_lhs, rhs, conj_rhs, alpha, parallelism);
            } else if id == TypeId::of::<crate::c32>() {
                gemm_as::<E, gemm::c32>(dst, lhs, conj_lhs, rhs, conj_rhs, alpha, parallelism);
            } else if id == TypeId::of::<crate::c64>() {
                gemm_as::<E, gemm::c64>(dst, lhs, conj_lhs, rhs, conj_rhs, alpha, parallelism);
            } else {
                return Some(dst);
            }
        }
        None
    }
}

#[cfg(all(test, feature = "gemm"))]
mod tests {
    use super::*;
    use crate::{c64, random, Mat};
    use assert2::assert as fancy_assert;
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn compare<E: ComplexField>(alpha: E, rng: &mut StdRng, check: impl Fn(E, E)) {
        let (m, n, k) = (13, 9, 7);
        let mut a = Mat::<E>::zeros(m, k);
        let mut a_t = Mat::<E>::zeros(k, m);
        let mut b = Mat::<E>::zeros(k, n);
        let mut b_t = Mat::<E>::zeros(n, k);
        let mut c = Mat::<E>::zeros(m, n);
        random::fill_random(a.as_mut(), rng);
        random::fill_random(a_t.as_mut(), rng);
        random::fill_random(b.as_mut(), rng);
        random::fill_random(b_t.as_mut(), rng);
        random::fill_random(c.as_mut(), rng);

        for (lhs, rhs) in [
            (a.as_ref(), b.as_ref()),
            (a_t.as_ref().transpose(), b.as_ref()),
            (a.as_ref(), b_t.as_ref().transpose()),
            (a_t.as_ref().transpose(), b_t.as_ref().transpose()),
        ] {
            for (conj_lhs, conj_rhs) in [(false, false), (true, false), (false, true), (true, true)] {
                let mut expected = c.clone();
                native::matmul(expected.as_mut(), lhs, conj_lhs, rhs, conj_rhs, alpha, Parallelism::None);

                let mut actual = c.clone();
                fancy_assert!(gemm_backend::matmul(
                    actual.as_mut(),
                    lhs,
                    conj_lhs,
                    rhs,
                    conj_rhs,
                    alpha,
                    Parallelism::None,
                )
                .is_none());

                for j in 0..n {
                    for i in 0..m {
                        check(actual[(i, j)], expected[(i, j)]);
                    }
                }
            }
        }
    }

    #[test]
    fn gemm_matches_native_f64() {
        let mut rng = StdRng::seed_from_u64(0);
        compare(-1.5f64, &mut rng, |actual, expected| assert_approx_eq!(actual, expected, 1e-12));
    }

    #[test]
    fn gemm_matches_native_c64() {
        let mut rng = StdRng::seed_from_u64(1);
        compare(c64::new(0.5, -2.0), &mut rng, |actual, expected| {
            fancy_assert!((actual - expected).norm() < 1e-12)
        });
    }
}
