use h2dense_core::{
    householder::{apply_householder_on_the_left, make_householder_in_place, squared_norm},
    ComplexField, MatMut,
};
use reborrow::*;

/// Computes the reflector that annihilates the entries of column `k` below the diagonal, and
/// applies it to the columns on its right. Returns the reflector coefficient.
pub(crate) fn reflect_column<E: ComplexField>(matrix: MatMut<'_, E>, k: usize) -> E {
    let m = matrix.nrows();
    let n = matrix.ncols();
    let (left, right) = matrix.split_at_col(k + 1);
    let (mut head, mut essential) = left.col(k).split_at(k + 1);

    let tail_squared_norm = squared_norm(essential.rb());
    let (tau, alpha) = make_householder_in_place(essential.rb_mut(), head.read(k), tail_squared_norm);
    head.write(k, alpha);

    apply_householder_on_the_left(right.submatrix(k, 0, m - k, n - k - 1), essential.rb(), tau);
    tau
}

/// Computes the QR decomposition of `matrix` in place.
///
/// On exit, $R$ is stored in the upper triangle of `matrix`, and the essential parts of the
/// Householder vectors below the diagonal. `tau` is extended with zeros to hold at least
/// `min(nrows, ncols)` coefficients, and its first `min(nrows, ncols)` entries are overwritten
/// with the reflector coefficients.
///
/// A column that is already zero below and on the diagonal yields a zero coefficient, which
/// stands for the identity.
pub fn qr_in_place<E: ComplexField>(matrix: MatMut<'_, E>, tau: &mut Vec<E>) {
    #[cfg(feature = "perf-warn")]
    if matrix.row_stride().unsigned_abs() != 1 && h2dense_core::__perf_warn!(QR_WARN) {
        if matrix.col_stride().unsigned_abs() == 1 {
            log::warn!(target: "h2dense_perf", "QR prefers column-major matrix. Found row-major matrix.");
        } else {
            log::warn!(target: "h2dense_perf", "QR prefers column-major matrix. Found matrix with generic strides.");
        }
    }

    let mut a = matrix;
    let refl = a.nrows().min(a.ncols());
    if tau.len() < refl {
        tau.resize(refl, E::zero());
    }

    for k in 0..refl {
        tau[k] = reflect_column(a.rb_mut(), k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::no_pivoting::reconstruct::expand_q;
    use assert2::assert as fancy_assert;
    use assert_approx_eq::assert_approx_eq;
    use h2dense_core::{c64, mat, mul, ops, random, Mat, MatRef, Parallelism, Trans};
    use rand::{rngs::StdRng, SeedableRng};

    fn upper_part(qr_factors: MatRef<'_, c64>) -> Mat<c64> {
        let mut r = Mat::zeros(qr_factors.nrows().min(qr_factors.ncols()), qr_factors.ncols());
        ops::copy_upper(qr_factors, false, r.as_mut());
        r
    }

    #[test]
    fn test_qr_c64() {
        let mut rng = StdRng::seed_from_u64(0);
        for (m, n) in [(2, 2), (2, 4), (4, 2), (4, 4), (17, 9), (9, 17), (40, 40)] {
            let mut mat = Mat::<c64>::zeros(m, n);
            random::fill_random(mat.as_mut(), &mut rng);
            let mat_orig = mat.clone();
            let size = m.min(n);

            let mut tau = Vec::new();
            qr_in_place(mat.as_mut(), &mut tau);
            fancy_assert!(tau.len() == size);

            let mut q = Mat::<c64>::zeros(m, size);
            expand_q(mat.as_ref(), &tau, q.as_mut());
            let r = upper_part(mat.as_ref());

            let mut qr = Mat::<c64>::zeros(m, n);
            mul::addmul(
                c64::new(1.0, 0.0),
                Trans::No,
                q.as_ref(),
                Trans::No,
                r.as_ref(),
                qr.as_mut(),
                Parallelism::None,
            );
            for j in 0..n {
                for i in 0..m {
                    assert_approx_eq!(qr[(i, j)], mat_orig[(i, j)]);
                }
            }
            fancy_assert!(ops::check_ortho(Trans::No, q.as_ref()) < 1e-12);
        }
    }

    #[test]
    fn test_qr_f64_sign() {
        let mut a = mat![[3.0f64, 1.0], [4.0, 2.0]];
        let mut tau = Vec::new();
        qr_in_place(a.as_mut(), &mut tau);

        assert_approx_eq!(a[(0, 0)], -5.0);
        assert_approx_eq!(a[(0, 1)], -2.2);
        assert_approx_eq!(a[(1, 1)].abs(), 0.4);
        assert_approx_eq!(a[(1, 0)], 0.5);
        assert_approx_eq!(tau[0], 1.6);
    }

    #[test]
    fn test_zero_column() {
        let mut a = mat![[0.0f64, 1.0], [0.0, 2.0], [0.0, 3.0]];
        let mut tau = vec![7.0; 5];
        qr_in_place(a.as_mut(), &mut tau);

        fancy_assert!(tau.len() == 5);
        fancy_assert!(tau[0] == 0.0);
        fancy_assert!(&tau[2..] == &[7.0, 7.0, 7.0]);
        fancy_assert!(a[(0, 1)] == 1.0);
        assert_approx_eq!(a[(1, 1)].abs(), 13.0f64.sqrt());
    }

    #[test]
    fn test_empty() {
        let mut a = Mat::<f64>::zeros(0, 3);
        let mut tau = Vec::new();
        qr_in_place(a.as_mut(), &mut tau);
        fancy_assert!(tau.is_empty());
    }
}
