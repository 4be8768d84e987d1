//! Matrix products, matrix-vector products and triangular products.

use crate::{backend, ColMut, ColRef, ComplexField, MatMut, MatRef, OpRef, Parallelism, Trans};
use assert2::assert as fancy_assert;

/// Computes `c += alpha * op(a) * op(b)`, where `op` is the identity or the conjugate transpose,
/// depending on `trans_a` and `trans_b`.
///
/// `c` may be larger than the product, in which case only its top left block of dimensions
/// `(op(a).nrows(), op(b).ncols())` is updated.
///
/// # Panics
///
/// Requires that
/// - `op(a).ncols() == op(b).nrows()`,
/// - `op(a).nrows() <= c.nrows()`,
/// - `op(b).ncols() <= c.ncols()`.
///
/// # Example
///
/// ```
/// use h2dense_core::{mat, mul::addmul, Mat, Parallelism, Trans};
///
/// let a = mat![[1.0, 2.0], [3.0, 4.0]];
/// let b = mat![[1.0], [1.0]];
/// let mut c = Mat::<f64>::zeros(2, 1);
///
/// addmul(2.0, Trans::No, a.as_ref(), Trans::No, b.as_ref(), c.as_mut(), Parallelism::None);
///
/// assert_eq!(c[(0, 0)], 6.0);
/// assert_eq!(c[(1, 0)], 14.0);
/// ```
#[track_caller]
pub fn addmul<E: ComplexField>(
    alpha: E,
    trans_a: Trans,
    a: MatRef<'_, E>,
    trans_b: Trans,
    b: MatRef<'_, E>,
    c: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    let a = OpRef::new(trans_a, a);
    let b = OpRef::new(trans_b, b);
    fancy_assert!(a.ncols() == b.nrows());
    fancy_assert!(a.nrows() <= c.nrows());
    fancy_assert!(b.ncols() <= c.ncols());

    let c = c.submatrix(0, 0, a.nrows(), b.ncols());
    backend::matmul(
        c,
        a.as_mat(),
        a.is_conj(),
        b.as_mat(),
        b.is_conj(),
        alpha,
        parallelism,
    );
}

fn addeval_op<E: ComplexField>(alpha: E, a: OpRef<'_, E>, src: ColRef<'_, E>, mut trg: ColMut<'_, E>) {
    for i in 0..a.nrows() {
        let mut sum = E::zero();
        for j in 0..a.ncols() {
            sum = sum + unsafe { a.read_unchecked(i, j) * src.read_unchecked(j) };
        }
        unsafe {
            let value = trg.read_unchecked(i);
            trg.write_unchecked(i, value + alpha * sum);
        }
    }
}

/// Computes `trg += alpha * a * src`.
///
/// Only the first `a.ncols()` entries of `src` and the first `a.nrows()` entries of `trg` are
/// used.
#[track_caller]
pub fn addeval<E: ComplexField>(
    alpha: E,
    a: MatRef<'_, E>,
    src: ColRef<'_, E>,
    trg: ColMut<'_, E>,
) {
    fancy_assert!(src.nrows() >= a.ncols());
    fancy_assert!(trg.nrows() >= a.nrows());
    addeval_op(alpha, OpRef::new(Trans::No, a), src, trg);
}

/// Computes `trg += alpha * a^H * src`.
///
/// Only the first `a.nrows()` entries of `src` and the first `a.ncols()` entries of `trg` are
/// used.
#[track_caller]
pub fn addevaltrans<E: ComplexField>(
    alpha: E,
    a: MatRef<'_, E>,
    src: ColRef<'_, E>,
    trg: ColMut<'_, E>,
) {
    fancy_assert!(src.nrows() >= a.nrows());
    fancy_assert!(trg.nrows() >= a.ncols());
    addeval_op(alpha, OpRef::new(Trans::Yes, a), src, trg);
}

/// Computes `trg += alpha * op(a) * src`.
#[track_caller]
#[inline]
pub fn mvm<E: ComplexField>(
    alpha: E,
    trans: Trans,
    a: MatRef<'_, E>,
    src: ColRef<'_, E>,
    trg: ColMut<'_, E>,
) {
    match trans {
        Trans::No => addeval(alpha, a, src, trg),
        Trans::Yes => addevaltrans(alpha, a, src, trg),
    }
}

/// Returns `sum(conj(x[i]) * y[i])`.
#[track_caller]
pub fn dot<E: ComplexField>(x: ColRef<'_, E>, y: ColRef<'_, E>) -> E {
    fancy_assert!(x.nrows() == y.nrows());
    let mut sum = E::zero();
    for i in 0..x.nrows() {
        sum = sum + unsafe { x.read_unchecked(i).conj() * y.read_unchecked(i) };
    }
    sum
}

/// Triangular matrix products.
pub mod triangular {
    use super::*;
    use reborrow::*;

    /// Describes the shape of a triangular operand. Entries outside of the triangle are never
    /// read, and unit variants do not read the diagonal either, which is assumed to be made of
    /// ones.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum BlockStructure {
        TriangularLower,
        UnitTriangularLower,
        TriangularUpper,
        UnitTriangularUpper,
    }

    impl BlockStructure {
        #[inline]
        pub fn is_lower(self) -> bool {
            matches!(self, Self::TriangularLower | Self::UnitTriangularLower)
        }

        #[inline]
        pub fn is_upper(self) -> bool {
            !self.is_lower()
        }

        #[inline]
        pub fn is_unit(self) -> bool {
            matches!(self, Self::UnitTriangularLower | Self::UnitTriangularUpper)
        }

        /// Structure of the transposed operand.
        #[inline]
        pub fn transpose(self) -> Self {
            match self {
                Self::TriangularLower => Self::TriangularUpper,
                Self::UnitTriangularLower => Self::UnitTriangularUpper,
                Self::TriangularUpper => Self::TriangularLower,
                Self::UnitTriangularUpper => Self::UnitTriangularLower,
            }
        }

        /// Structure of `op(A)`, for an operand `A` with structure `self`.
        #[inline]
        pub fn apply(self, trans: Trans) -> Self {
            match trans {
                Trans::No => self,
                Trans::Yes => self.transpose(),
            }
        }
    }

    /// Computes `x = t * x` for a triangular `t`, where `x` is long enough to hold both the
    /// input and the output.
    fn eval_op<E: ComplexField>(t: OpRef<'_, E>, lower: bool, unit: bool, mut x: ColMut<'_, E>) {
        let p = t.nrows();
        let q = t.ncols();
        let n = p.min(q);

        let diag = |x: &ColMut<'_, E>, i: usize| unsafe {
            if unit {
                x.read_unchecked(i)
            } else {
                t.read_unchecked(i, i) * x.read_unchecked(i)
            }
        };

        if lower {
            // rows below the square block
            for i in n..p {
                let mut value = E::zero();
                for j in 0..q {
                    value = value + unsafe { t.read_unchecked(i, j) * x.read_unchecked(j) };
                }
                unsafe { x.write_unchecked(i, value) };
            }

            for i in (0..n).rev() {
                let mut value = diag(&x, i);
                for j in 0..i {
                    value = value + unsafe { t.read_unchecked(i, j) * x.read_unchecked(j) };
                }
                unsafe { x.write_unchecked(i, value) };
            }
        } else {
            for i in 0..n {
                let mut value = diag(&x, i);
                for j in i + 1..q {
                    value = value + unsafe { t.read_unchecked(i, j) * x.read_unchecked(j) };
                }
                unsafe { x.write_unchecked(i, value) };
            }

            // rows of the output beyond the triangle are zero
            for i in n..p {
                unsafe { x.write_unchecked(i, E::zero()) };
            }
        }
    }

    /// Computes `x = op(a) * x` for a triangular `a`.
    ///
    /// `a` may be rectangular: the triangle is taken from its leading `min(rows, cols)` square
    /// block, entries of the remaining rows or columns on the nonzero side of the triangle are
    /// used as is, and output entries on the zero side are set to zero.
    ///
    /// # Panics
    ///
    /// Requires `x.nrows() >= a.nrows()` and `x.nrows() >= a.ncols()`.
    #[track_caller]
    pub fn triangular_eval_vec<E: ComplexField>(
        structure: BlockStructure,
        trans: Trans,
        a: MatRef<'_, E>,
        x: ColMut<'_, E>,
    ) {
        fancy_assert!(x.nrows() >= a.nrows());
        fancy_assert!(x.nrows() >= a.ncols());
        let structure = structure.apply(trans);
        eval_op(
            OpRef::new(trans, a),
            structure.is_lower(),
            structure.is_unit(),
            x,
        );
    }

    /// Computes `x = op(a) * x`, or `x = x * op(a)^H` if `xtrans` is [`Trans::Yes`], for a
    /// triangular `a`. See [`triangular_eval_vec`] for the handling of rectangular `a`.
    ///
    /// # Panics
    ///
    /// Requires that the rows of `x` (or its columns, if `xtrans` is set) are at least as
    /// many as both dimensions of `a`.
    #[track_caller]
    pub fn triangular_eval<E: ComplexField>(
        structure: BlockStructure,
        trans: Trans,
        a: MatRef<'_, E>,
        xtrans: Trans,
        x: MatMut<'_, E>,
    ) {
        let structure = structure.apply(trans);
        let mut t = OpRef::new(trans, a);
        let mut x = x;
        if xtrans.is_trans() {
            // each row of `x` is multiplied by conj(op(a))
            fancy_assert!(x.ncols() >= a.nrows());
            fancy_assert!(x.ncols() >= a.ncols());
            x = x.transpose();
            t = t.conjugate();
        } else {
            fancy_assert!(x.nrows() >= a.nrows());
            fancy_assert!(x.nrows() >= a.ncols());
        }

        for k in 0..x.ncols() {
            eval_op(
                t,
                structure.is_lower(),
                structure.is_unit(),
                x.rb_mut().col(k),
            );
        }
    }

    /// Computes `c += alpha * op(a) * op(b)` where `op(a)` and `op(b)` are triangular, as a sum
    /// of rank one updates that only touch the nonzero parts of the factors.
    ///
    /// # Panics
    ///
    /// Requires that `op(a).ncols() == op(b).nrows()`, and that `c` has exactly the
    /// dimensions of the product. Unit structures are not supported.
    #[track_caller]
    pub fn triangular_addmul<E: ComplexField>(
        alpha: E,
        a_structure: BlockStructure,
        trans_a: Trans,
        a: MatRef<'_, E>,
        b_structure: BlockStructure,
        trans_b: Trans,
        b: MatRef<'_, E>,
        mut c: MatMut<'_, E>,
    ) {
        fancy_assert!(!a_structure.is_unit());
        fancy_assert!(!b_structure.is_unit());

        let a_lower = a_structure.apply(trans_a).is_lower();
        let b_lower = b_structure.apply(trans_b).is_lower();
        let a = OpRef::new(trans_a, a);
        let b = OpRef::new(trans_b, b);

        fancy_assert!(c.nrows() == a.nrows());
        fancy_assert!(c.ncols() == b.ncols());
        fancy_assert!(a.ncols() == b.nrows());

        let m = a.nrows();
        let n = b.ncols();

        for depth in 0..a.ncols() {
            let (a_off, a_dim) = if a_lower {
                (depth, m - depth.min(m))
            } else {
                (0, (depth + 1).min(m))
            };
            let (b_off, b_dim) = if b_lower {
                (0, (depth + 1).min(n))
            } else {
                (depth, n - depth.min(n))
            };

            for k in b_off..b_off + b_dim {
                let rhs = unsafe { b.read_unchecked(depth, k) };
                for i in a_off..a_off + a_dim {
                    unsafe {
                        let lhs = a.read_unchecked(i, depth);
                        let value = c.read_unchecked(i, k);
                        c.write_unchecked(i, k, value + alpha * lhs * rhs);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::{mat, ops, random, Mat};
        use assert_approx_eq::assert_approx_eq;
        use rand::{rngs::StdRng, SeedableRng};

        fn dense_of<E: ComplexField>(structure: BlockStructure, a: MatRef<'_, E>) -> Mat<E> {
            let mut out = Mat::<E>::zeros(a.nrows(), a.ncols());
            if structure.is_lower() {
                ops::copy_lower(a, structure.is_unit(), out.as_mut());
            } else {
                ops::copy_upper(a, structure.is_unit(), out.as_mut());
            }
            out
        }

        const ALL: [BlockStructure; 4] = [
            BlockStructure::TriangularLower,
            BlockStructure::UnitTriangularLower,
            BlockStructure::TriangularUpper,
            BlockStructure::UnitTriangularUpper,
        ];

        #[test]
        fn eval_vec_matches_dense_product() {
            let mut rng = StdRng::seed_from_u64(0);
            for (m, n) in [(4, 4), (6, 3), (3, 6)] {
                let mut a = Mat::<f64>::zeros(m, n);
                random::fill_random(a.as_mut(), &mut rng);

                for structure in ALL {
                    for trans in [Trans::No, Trans::Yes] {
                        let dense = dense_of(structure, a.as_ref());
                        let len = m.max(n);
                        let x: Vec<f64> = (0..len).map(|i| i as f64 + 1.0).collect();

                        let (rows, cols) = match trans {
                            Trans::No => (m, n),
                            Trans::Yes => (n, m),
                        };
                        let mut expected = vec![0.0; rows];
                        addeval_op(
                            1.0,
                            OpRef::new(trans, dense.as_ref()),
                            ColRef::from_slice(&x[..cols]),
                            ColMut::from_slice_mut(&mut expected),
                        );

                        let mut actual = x.clone();
                        triangular_eval_vec(
                            structure,
                            trans,
                            a.as_ref(),
                            ColMut::from_slice_mut(&mut actual),
                        );
                        for i in 0..rows {
                            assert_approx_eq!(actual[i], expected[i], 1e-12);
                        }
                    }
                }
            }
        }

        #[test]
        fn eval_matrix_from_the_right() {
            let mut rng = StdRng::seed_from_u64(1);
            let n = 5;
            let mut a = Mat::<crate::c64>::zeros(n, n);
            random::fill_random(a.as_mut(), &mut rng);
            let mut x = Mat::<crate::c64>::zeros(3, n);
            random::fill_random(x.as_mut(), &mut rng);

            for structure in ALL {
                for trans in [Trans::No, Trans::Yes] {
                    let dense = dense_of(structure, a.as_ref());
                    // x * op(a)^H
                    let mut expected = Mat::<crate::c64>::zeros(3, n);
                    let outer = match trans {
                        Trans::No => Trans::Yes,
                        Trans::Yes => Trans::No,
                    };
                    addmul(
                        crate::c64::one(),
                        Trans::No,
                        x.as_ref(),
                        outer,
                        dense.as_ref(),
                        expected.as_mut(),
                        Parallelism::None,
                    );

                    let mut actual = x.clone();
                    triangular_eval(structure, trans, a.as_ref(), Trans::Yes, actual.as_mut());
                    for j in 0..n {
                        for i in 0..3 {
                            fancy_assert!((actual[(i, j)] - expected[(i, j)]).norm() < 1e-12);
                        }
                    }
                }
            }
        }

        #[test]
        fn addmul_of_triangles() {
            let l = mat![[1.0, 0.0, 0.0], [2.0, 3.0, 0.0], [4.0, 5.0, 6.0]];
            let u = mat![[1.0, 2.0, 3.0], [0.0, 4.0, 5.0], [0.0, 0.0, 6.0]];

            for (a, sa) in [
                (&l, BlockStructure::TriangularLower),
                (&u, BlockStructure::TriangularUpper),
            ] {
                for (b, sb) in [
                    (&l, BlockStructure::TriangularLower),
                    (&u, BlockStructure::TriangularUpper),
                ] {
                    for ta in [Trans::No, Trans::Yes] {
                        for tb in [Trans::No, Trans::Yes] {
                            let mut expected = Mat::<f64>::zeros(3, 3);
                            addmul(
                                0.5,
                                ta,
                                a.as_ref(),
                                tb,
                                b.as_ref(),
                                expected.as_mut(),
                                Parallelism::None,
                            );
                            let mut actual = Mat::<f64>::zeros(3, 3);
                            triangular_addmul(
                                0.5,
                                sa,
                                ta,
                                a.as_ref(),
                                sb,
                                tb,
                                b.as_ref(),
                                actual.as_mut(),
                            );
                            fancy_assert!(actual == expected);
                        }
                    }
                }
            }
        }

        #[test]
        fn addmul_ignores_other_triangle() {
            // garbage above the diagonal must not be read
            let a = mat![[2.0, 100.0], [1.0, 3.0]];
            let b = mat![[1.0, 0.0], [1.0, 1.0]];
            let mut c = Mat::<f64>::zeros(2, 2);
            triangular_addmul(
                1.0,
                BlockStructure::TriangularLower,
                Trans::No,
                a.as_ref(),
                BlockStructure::TriangularLower,
                Trans::No,
                b.as_ref(),
                c.as_mut(),
            );
            fancy_assert!(c == mat![[2.0, 0.0], [4.0, 3.0]]);
        }
    }
}
