//! `h2dense` core module.
//!
//! This module contains:
//! - the scalar field traits ([`ComplexField`], [`RealField`]),
//! - definitions of the matrix structures ([`Mat`], [`MatRef`], [`MatMut`], [`ColRef`],
//! [`ColMut`]),
//! - basic algebra on dense matrices ([`ops`], [`mul`], [`diag`]),
//! - triangular matrix solve routines ([`solve`]),
//! - Householder reflectors used by the QR decomposition ([`householder`]),
//! - random test matrix generators ([`random`]).

#![warn(rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]

use assert2::{assert as fancy_assert, debug_assert as fancy_debug_assert};
use core::{
    fmt::Debug,
    marker::PhantomData,
    mem::size_of,
    ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub},
    ptr::NonNull,
    sync::atomic::{AtomicUsize, Ordering},
};
use dyn_stack::{SizeOverflow, StackReq};
use num_complex::Complex;
use reborrow::*;

pub mod diag;
pub mod householder;
pub mod mul;
pub mod ops;
pub mod random;
pub mod solve;

mod backend;

/// Complex floating point number type, where the real and imaginary parts each occupy 32 bits.
#[allow(non_camel_case_types)]
pub type c32 = Complex<f32>;
/// Complex floating point number type, where the real and imaginary parts each occupy 64 bits.
#[allow(non_camel_case_types)]
pub type c64 = Complex<f64>;

/// Indicates whether an operand is used as is, or through its conjugate transpose.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trans {
    /// Use the operand as is.
    No,
    /// Use the conjugate transpose of the operand.
    Yes,
}

impl Trans {
    #[inline]
    pub fn is_trans(self) -> bool {
        self == Trans::Yes
    }
}

impl From<bool> for Trans {
    #[inline]
    fn from(value: bool) -> Self {
        if value {
            Trans::Yes
        } else {
            Trans::No
        }
    }
}

/// Parallelism strategy that can be passed to the matrix multiplication routines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// No parallelism.
    ///
    /// The code is executed sequentially on the same thread that calls a function
    /// and passes this argument.
    None,
    /// Rayon parallelism.
    ///
    /// The code is possibly executed in parallel on the current thread, as well as the currently
    /// active rayon thread pool.
    ///
    /// The contained value represents a hint about the number of threads an implementation should
    /// use. A value of `0` is treated as equivalent to `rayon::current_num_threads()`.
    ///
    /// Without the `rayon` feature this behaves like [`Parallelism::None`].
    Rayon(usize),
}

/// Trait that describes a complex number field.
///
/// Real numbers are seen as complex numbers whose imaginary part is always zero, so that
/// conjugation is the identity for them.
pub trait ComplexField:
    Copy
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + Debug
    + 'static
{
    type Real: RealField;

    /// Returns a number whose real part is equal to `real`, and a zero imaginary part.
    fn from_real(real: Self::Real) -> Self;
    /// Returns a number from its real and imaginary parts. The imaginary part is ignored for
    /// real fields.
    fn from_real_imag(real: Self::Real, imag: Self::Real) -> Self;
    /// Returns the real and imaginary part.
    fn into_real_imag(self) -> (Self::Real, Self::Real);
    /// Returns the real part.
    #[inline(always)]
    fn real(self) -> Self::Real {
        self.into_real_imag().0
    }
    /// Returns the imaginary part.
    #[inline(always)]
    fn imag(self) -> Self::Real {
        self.into_real_imag().1
    }

    /// Returns the value representing `0.0`.
    fn zero() -> Self;
    /// Returns the value representing `1.0`.
    fn one() -> Self;

    /// Returns the inverse of the number.
    fn inv(self) -> Self;
    /// Returns the conjugate of the number.
    fn conj(self) -> Self;
    /// Returns the square root of the number.
    fn sqrt(self) -> Self;
    /// Returns the modulus of the number.
    fn abs(self) -> Self::Real;
    /// Returns the squared modulus of the number.
    fn abs2(self) -> Self::Real;

    /// Returns the input, scaled by `factor`.
    #[inline(always)]
    fn scale_real(self, factor: Self::Real) -> Self {
        self * Self::from_real(factor)
    }

    /// Returns the unit-modulus phase of the number, or `1` if it is zero.
    #[inline(always)]
    fn sign(self) -> Self {
        if self.is_zero() {
            Self::one()
        } else {
            self.scale_real(self.abs().inv())
        }
    }

    #[inline(always)]
    fn is_zero(self) -> bool {
        self == Self::zero()
    }
}

/// Trait that describes a real number field, with a total order on the non-NaN values.
pub trait RealField: ComplexField<Real = Self> + PartialOrd {
    fn from_f64(value: f64) -> Self;
    /// Machine epsilon.
    fn epsilon() -> Self;

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }
}

macro_rules! impl_real_field {
    ($ty: ty) => {
        impl RealField for $ty {
            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn epsilon() -> Self {
                <$ty>::EPSILON
            }
        }

        impl ComplexField for $ty {
            type Real = $ty;

            #[inline(always)]
            fn from_real(real: Self::Real) -> Self {
                real
            }

            #[inline(always)]
            fn from_real_imag(real: Self::Real, _imag: Self::Real) -> Self {
                real
            }

            #[inline(always)]
            fn into_real_imag(self) -> (Self::Real, Self::Real) {
                (self, 0.0)
            }

            #[inline(always)]
            fn zero() -> Self {
                0.0
            }

            #[inline(always)]
            fn one() -> Self {
                1.0
            }

            #[inline(always)]
            fn inv(self) -> Self {
                1.0 / self
            }

            #[inline(always)]
            fn conj(self) -> Self {
                self
            }

            #[inline(always)]
            fn sqrt(self) -> Self {
                <$ty>::sqrt(self)
            }

            #[inline(always)]
            fn abs(self) -> Self::Real {
                <$ty>::abs(self)
            }

            #[inline(always)]
            fn abs2(self) -> Self::Real {
                self * self
            }

            #[inline(always)]
            fn sign(self) -> Self {
                if self < 0.0 {
                    -1.0
                } else {
                    1.0
                }
            }
        }
    };
}

macro_rules! impl_complex_field {
    ($real: ty) => {
        impl ComplexField for Complex<$real> {
            type Real = $real;

            #[inline(always)]
            fn from_real(real: Self::Real) -> Self {
                Complex { re: real, im: 0.0 }
            }

            #[inline(always)]
            fn from_real_imag(real: Self::Real, imag: Self::Real) -> Self {
                Complex { re: real, im: imag }
            }

            #[inline(always)]
            fn into_real_imag(self) -> (Self::Real, Self::Real) {
                (self.re, self.im)
            }

            #[inline(always)]
            fn zero() -> Self {
                Complex { re: 0.0, im: 0.0 }
            }

            #[inline(always)]
            fn one() -> Self {
                Complex { re: 1.0, im: 0.0 }
            }

            #[inline(always)]
            fn inv(self) -> Self {
                Complex::<$real>::inv(&self)
            }

            #[inline(always)]
            fn conj(self) -> Self {
                Complex {
                    re: self.re,
                    im: -self.im,
                }
            }

            #[inline(always)]
            fn sqrt(self) -> Self {
                Complex::<$real>::sqrt(self)
            }

            #[inline(always)]
            fn abs(self) -> Self::Real {
                self.norm()
            }

            #[inline(always)]
            fn abs2(self) -> Self::Real {
                self.re * self.re + self.im * self.im
            }
        }
    };
}

impl_real_field!(f32);
impl_real_field!(f64);
impl_complex_field!(f32);
impl_complex_field!(f64);

/// Runs both operations, possibly in parallel, splitting the thread budget between them.
#[inline]
#[doc(hidden)]
pub fn join_raw(
    op_a: impl Send + FnOnce(Parallelism),
    op_b: impl Send + FnOnce(Parallelism),
    parallelism: Parallelism,
) {
    match parallelism {
        Parallelism::None => {
            op_a(parallelism);
            op_b(parallelism);
        }
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(n_threads) => {
            if n_threads == 1 {
                op_a(Parallelism::None);
                op_b(Parallelism::None);
            } else {
                let n_threads = if n_threads > 0 {
                    n_threads
                } else {
                    rayon::current_num_threads()
                };
                let parallelism = Parallelism::Rayon(n_threads - n_threads / 2);
                rayon::join(|| op_a(parallelism), || op_b(parallelism));
            }
        }
        #[cfg(not(feature = "rayon"))]
        Parallelism::Rayon(_) => {
            op_a(Parallelism::None);
            op_b(Parallelism::None);
        }
    }
}

#[inline]
#[doc(hidden)]
pub fn parallelism_degree(parallelism: Parallelism) -> usize {
    match parallelism {
        Parallelism::None => 1,
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(0) => rayon::current_num_threads(),
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(n_threads) => n_threads,
        #[cfg(not(feature = "rayon"))]
        Parallelism::Rayon(_) => 1,
    }
}

struct MatrixSliceBase<E> {
    ptr: NonNull<E>,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
}
struct VecSliceBase<E> {
    ptr: NonNull<E>,
    len: usize,
    stride: isize,
}
impl<E> Copy for MatrixSliceBase<E> {}
impl<E> Clone for MatrixSliceBase<E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}
impl<E> Copy for VecSliceBase<E> {}
impl<E> Clone for VecSliceBase<E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

/// Matrix view with general row and column strides.
///
/// A view never owns its storage: the lifetime `'a` ties it to the matrix or buffer it
/// was created from.
pub struct MatRef<'a, E> {
    base: MatrixSliceBase<E>,
    _marker: PhantomData<&'a E>,
}

/// Mutable matrix view with general row and column strides.
///
/// For usage examples, see [`MatRef`].
pub struct MatMut<'a, E> {
    base: MatrixSliceBase<E>,
    _marker: PhantomData<&'a mut E>,
}

/// Column vector view with general row stride.
pub struct ColRef<'a, E> {
    base: VecSliceBase<E>,
    _marker: PhantomData<&'a E>,
}

/// Mutable column vector view with general row stride.
pub struct ColMut<'a, E> {
    base: VecSliceBase<E>,
    _marker: PhantomData<&'a mut E>,
}

unsafe impl<'a, E: Sync> Sync for MatRef<'a, E> {}
unsafe impl<'a, E: Sync> Send for MatRef<'a, E> {}
unsafe impl<'a, E: Sync> Sync for MatMut<'a, E> {}
unsafe impl<'a, E: Send> Send for MatMut<'a, E> {}

unsafe impl<'a, E: Sync> Sync for ColRef<'a, E> {}
unsafe impl<'a, E: Sync> Send for ColRef<'a, E> {}
unsafe impl<'a, E: Sync> Sync for ColMut<'a, E> {}
unsafe impl<'a, E: Send> Send for ColMut<'a, E> {}

impl<'a, E> Copy for MatRef<'a, E> {}
impl<'a, E> Copy for ColRef<'a, E> {}

impl<'a, E> Clone for MatRef<'a, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, E> Clone for ColRef<'a, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'b, 'a, E> Reborrow<'b> for MatRef<'a, E> {
    type Target = MatRef<'b, E>;
    #[inline]
    fn rb(&'b self) -> Self::Target {
        *self
    }
}
impl<'b, 'a, E> ReborrowMut<'b> for MatRef<'a, E> {
    type Target = MatRef<'b, E>;
    #[inline]
    fn rb_mut(&'b mut self) -> Self::Target {
        *self
    }
}
impl<'b, 'a, E> Reborrow<'b> for MatMut<'a, E> {
    type Target = MatRef<'b, E>;
    #[inline]
    fn rb(&'b self) -> Self::Target {
        MatRef {
            base: self.base,
            _marker: PhantomData,
        }
    }
}
impl<'b, 'a, E> ReborrowMut<'b> for MatMut<'a, E> {
    type Target = MatMut<'b, E>;
    #[inline]
    fn rb_mut(&'b mut self) -> Self::Target {
        MatMut {
            base: self.base,
            _marker: PhantomData,
        }
    }
}
impl<'b, 'a, E> Reborrow<'b> for ColRef<'a, E> {
    type Target = ColRef<'b, E>;
    #[inline]
    fn rb(&'b self) -> Self::Target {
        *self
    }
}
impl<'b, 'a, E> ReborrowMut<'b> for ColRef<'a, E> {
    type Target = ColRef<'b, E>;
    #[inline]
    fn rb_mut(&'b mut self) -> Self::Target {
        *self
    }
}
impl<'b, 'a, E> Reborrow<'b> for ColMut<'a, E> {
    type Target = ColRef<'b, E>;
    #[inline]
    fn rb(&'b self) -> Self::Target {
        ColRef {
            base: self.base,
            _marker: PhantomData,
        }
    }
}
impl<'b, 'a, E> ReborrowMut<'b> for ColMut<'a, E> {
    type Target = ColMut<'b, E>;
    #[inline]
    fn rb_mut(&'b mut self) -> Self::Target {
        ColMut {
            base: self.base,
            _marker: PhantomData,
        }
    }
}

impl<'a, E> IntoConst for MatRef<'a, E> {
    type Target = MatRef<'a, E>;
    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}
impl<'a, E> IntoConst for MatMut<'a, E> {
    type Target = MatRef<'a, E>;
    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            base: self.base,
            _marker: PhantomData,
        }
    }
}
impl<'a, E> IntoConst for ColRef<'a, E> {
    type Target = ColRef<'a, E>;
    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}
impl<'a, E> IntoConst for ColMut<'a, E> {
    type Target = ColRef<'a, E>;
    #[inline]
    fn into_const(self) -> Self::Target {
        ColRef {
            base: self.base,
            _marker: PhantomData,
        }
    }
}

#[track_caller]
#[inline]
fn check_column_major_slice(len: usize, nrows: usize, ncols: usize, leading_dim: usize) {
    fancy_assert!(leading_dim >= nrows);
    if nrows > 0 && ncols > 0 {
        let required = (ncols - 1)
            .checked_mul(leading_dim)
            .and_then(|n| n.checked_add(nrows));
        fancy_assert!(required.is_some());
        fancy_assert!(required.unwrap_or(usize::MAX) <= len);
    }
}

impl<'a, E> MatRef<'a, E> {
    /// Returns a matrix slice from the given arguments.
    /// `ptr`: pointer to the first element of the matrix.
    /// `nrows`: number of rows of the matrix.
    /// `ncols`: number of columns of the matrix.
    /// `row_stride`: offset between the first elements of two successive rows in the matrix.
    /// `col_stride`: offset between the first elements of two successive columns in the matrix.
    ///
    /// # Safety
    ///
    /// `ptr` must be non null and properly aligned for type `E`.
    /// For each `i < nrows` and `j < ncols`,
    /// `ptr.offset(i as isize * row_stride + j as isize * col_stride)` must point to a valid
    /// initialized object of type `E`, unless memory pointing to that address is never accessed.
    /// The referenced memory must not be mutated during the lifetime `'a`.
    ///
    /// # Example
    ///
    /// ```
    /// use h2dense_core::MatRef;
    ///
    /// let nan = f64::NAN;
    /// let data = vec![0.0, 1.0, nan, 2.0, 3.0, nan, 4.0, 5.0];
    ///
    /// let m = unsafe { MatRef::from_raw_parts(data.as_ptr(), 2, 3, 1, 3) };
    ///
    /// assert_eq!(m[(1, 0)], 1.0);
    /// assert_eq!(m[(0, 1)], 2.0);
    /// assert_eq!(m[(1, 2)], 5.0);
    /// ```
    #[inline]
    pub unsafe fn from_raw_parts(
        ptr: *const E,
        nrows: usize,
        ncols: usize,
        row_stride: isize,
        col_stride: isize,
    ) -> Self {
        Self {
            base: MatrixSliceBase::<E> {
                ptr: NonNull::new_unchecked(ptr as *mut E),
                nrows,
                ncols,
                row_stride,
                col_stride,
            },
            _marker: PhantomData,
        }
    }

    /// Wraps a column-major buffer owned by the caller, with leading dimension `nrows`.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is too short to hold `nrows * ncols` elements.
    #[track_caller]
    #[inline]
    pub fn from_column_major_slice(slice: &'a [E], nrows: usize, ncols: usize) -> Self {
        Self::from_column_major_slice_with_leading_dim(slice, nrows, ncols, nrows)
    }

    /// Wraps a column-major buffer owned by the caller, where column `j` starts at offset
    /// `j * leading_dim`.
    ///
    /// # Panics
    ///
    /// Panics if `leading_dim < nrows`, or if the buffer is too short.
    #[track_caller]
    #[inline]
    pub fn from_column_major_slice_with_leading_dim(
        slice: &'a [E],
        nrows: usize,
        ncols: usize,
        leading_dim: usize,
    ) -> Self {
        check_column_major_slice(slice.len(), nrows, ncols, leading_dim);
        unsafe { Self::from_raw_parts(slice.as_ptr(), nrows, ncols, 1, leading_dim as isize) }
    }

    #[inline]
    pub fn as_ptr(self) -> *const E {
        self.base.ptr.as_ptr()
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.base.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.base.ncols
    }

    #[inline]
    pub fn row_stride(&self) -> isize {
        self.base.row_stride
    }

    #[inline]
    pub fn col_stride(&self) -> isize {
        self.base.col_stride
    }

    /// Returns a pointer to the element at position `(i, j)`, without bound checks.
    #[inline]
    pub fn ptr_at(self, i: usize, j: usize) -> *const E {
        self.as_ptr()
            .wrapping_offset(i as isize * self.row_stride())
            .wrapping_offset(j as isize * self.col_stride())
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()` and `j < self.ncols()`.
    #[track_caller]
    #[inline]
    pub unsafe fn get_unchecked(self, i: usize, j: usize) -> &'a E {
        fancy_debug_assert!(i < self.nrows());
        fancy_debug_assert!(j < self.ncols());
        &*self.ptr_at(i, j)
    }

    /// Returns a reference to the element at position `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.nrows()` or `j >= self.ncols()`.
    #[track_caller]
    #[inline]
    pub fn get(self, i: usize, j: usize) -> &'a E {
        fancy_assert!(i < self.nrows());
        fancy_assert!(j < self.ncols());
        unsafe { self.get_unchecked(i, j) }
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()` and `j < self.ncols()`.
    #[track_caller]
    #[inline(always)]
    pub unsafe fn read_unchecked(&self, i: usize, j: usize) -> E
    where
        E: Copy,
    {
        *self.get_unchecked(i, j)
    }

    /// Returns a copy of the element at position `(i, j)`.
    #[track_caller]
    #[inline(always)]
    pub fn read(&self, i: usize, j: usize) -> E
    where
        E: Copy,
    {
        *(*self).get(i, j)
    }

    /// # Safety
    ///
    /// Requires `i <= self.nrows()` and `j <= self.ncols()`.
    #[track_caller]
    #[inline]
    pub unsafe fn split_at_unchecked(self, i: usize, j: usize) -> (Self, Self, Self, Self) {
        fancy_debug_assert!(i <= self.nrows());
        fancy_debug_assert!(j <= self.ncols());
        let ptr = self.as_ptr();
        let cs = self.col_stride();
        let rs = self.row_stride();
        (
            Self::from_raw_parts(ptr, i, j, rs, cs),
            Self::from_raw_parts(
                ptr.wrapping_offset(j as isize * cs),
                i,
                self.ncols() - j,
                rs,
                cs,
            ),
            Self::from_raw_parts(
                ptr.wrapping_offset(i as isize * rs),
                self.nrows() - i,
                j,
                rs,
                cs,
            ),
            Self::from_raw_parts(
                ptr.wrapping_offset(i as isize * rs)
                    .wrapping_offset(j as isize * cs),
                self.nrows() - i,
                self.ncols() - j,
                rs,
                cs,
            ),
        )
    }

    /// Splits the matrix into four corner parts in the following order: top left, top right,
    /// bottom left, bottom right.
    ///
    /// # Panics
    ///
    /// Requires that `i <= self.nrows()` and `j <= self.ncols()`.
    ///
    /// # Example
    ///
    /// ```
    /// use h2dense_core::mat;
    ///
    /// let m = mat![[0.0, 2.0, 4.0], [1.0, 3.0, 5.0]];
    /// let (top_left, top_right, bot_left, bot_right) = m.as_ref().split_at(1, 1);
    ///
    /// assert_eq!(top_left[(0, 0)], 0.0);
    /// assert_eq!(top_right[(0, 1)], 4.0);
    /// assert_eq!(bot_left[(0, 0)], 1.0);
    /// assert_eq!(bot_right[(0, 0)], 3.0);
    /// ```
    #[track_caller]
    #[inline]
    pub fn split_at(self, i: usize, j: usize) -> (Self, Self, Self, Self) {
        fancy_assert!(i <= self.nrows());
        fancy_assert!(j <= self.ncols());
        unsafe { self.split_at_unchecked(i, j) }
    }

    /// Splits the matrix horizontally into two parts in the following order: top, bottom.
    #[track_caller]
    #[inline]
    pub fn split_at_row(self, i: usize) -> (Self, Self) {
        fancy_assert!(i <= self.nrows());
        let ncols = self.ncols();
        (
            self.submatrix(0, 0, i, ncols),
            self.submatrix(i, 0, self.nrows() - i, ncols),
        )
    }

    /// Splits the matrix vertically into two parts in the following order: left, right.
    #[track_caller]
    #[inline]
    pub fn split_at_col(self, j: usize) -> (Self, Self) {
        fancy_assert!(j <= self.ncols());
        let nrows = self.nrows();
        (
            self.submatrix(0, 0, nrows, j),
            self.submatrix(0, j, nrows, self.ncols() - j),
        )
    }

    /// Returns a view over a submatrix of `self`, starting at position `(i, j)`
    /// with dimensions `(nrows, ncols)`.
    ///
    /// # Panics
    ///
    /// Requires that the submatrix lies within `self`.
    ///
    /// # Example
    ///
    /// ```
    /// use h2dense_core::mat;
    ///
    /// let m = mat![
    ///     [0.0, 3.0, 6.0, 9.0],
    ///     [1.0, 4.0, 7.0, 10.0],
    ///     [2.0, 5.0, 8.0, 11.0],
    /// ];
    ///
    /// let sub = m.as_ref().submatrix(1, 2, 2, 2);
    ///
    /// assert_eq!(sub[(0, 0)], 7.0);
    /// assert_eq!(sub[(1, 1)], 11.0);
    /// ```
    #[track_caller]
    #[inline]
    pub fn submatrix(self, i: usize, j: usize, nrows: usize, ncols: usize) -> Self {
        fancy_assert!(i <= self.nrows());
        fancy_assert!(j <= self.ncols());
        fancy_assert!(nrows <= self.nrows() - i);
        fancy_assert!(ncols <= self.ncols() - j);
        unsafe {
            Self::from_raw_parts(
                self.ptr_at(i, j),
                nrows,
                ncols,
                self.row_stride(),
                self.col_stride(),
            )
        }
    }

    /// Returns the `j`-th column.
    #[track_caller]
    #[inline]
    pub fn col(self, j: usize) -> ColRef<'a, E> {
        fancy_assert!(j < self.ncols());
        unsafe { ColRef::from_raw_parts(self.ptr_at(0, j), self.nrows(), self.row_stride()) }
    }

    /// Returns the leading diagonal, of length `min(nrows, ncols)`.
    #[inline]
    pub fn diagonal(self) -> ColRef<'a, E> {
        let len = self.nrows().min(self.ncols());
        unsafe {
            ColRef::from_raw_parts(self.as_ptr(), len, self.row_stride() + self.col_stride())
        }
    }

    /// Returns the transpose of `self`. No conjugation is applied.
    #[inline]
    pub fn transpose(self) -> Self {
        unsafe {
            Self::from_raw_parts(
                self.as_ptr(),
                self.ncols(),
                self.nrows(),
                self.col_stride(),
                self.row_stride(),
            )
        }
    }

    /// Returns an owning deep copy of the viewed elements.
    #[inline]
    pub fn to_owned(&self) -> Mat<E>
    where
        E: ComplexField,
    {
        let this = *self;
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| unsafe {
            this.read_unchecked(i, j)
        })
    }

    /// # Safety
    ///
    /// The caller must make sure no other view reads or writes the same elements while the
    /// returned view is alive.
    #[inline]
    pub unsafe fn const_cast(self) -> MatMut<'a, E> {
        MatMut {
            base: self.base,
            _marker: PhantomData,
        }
    }
}

impl<'a, E> MatMut<'a, E> {
    /// Mutable version of [`MatRef::from_raw_parts`].
    ///
    /// # Safety
    ///
    /// Same as [`MatRef::from_raw_parts`], and additionally the referenced memory must not be
    /// accessed by any other pointer during the lifetime `'a`.
    #[inline]
    pub unsafe fn from_raw_parts(
        ptr: *mut E,
        nrows: usize,
        ncols: usize,
        row_stride: isize,
        col_stride: isize,
    ) -> Self {
        MatRef::from_raw_parts(ptr, nrows, ncols, row_stride, col_stride).const_cast()
    }

    /// Wraps a mutable column-major buffer owned by the caller.
    #[track_caller]
    #[inline]
    pub fn from_column_major_slice_mut(slice: &'a mut [E], nrows: usize, ncols: usize) -> Self {
        Self::from_column_major_slice_with_leading_dim_mut(slice, nrows, ncols, nrows)
    }

    /// Wraps a mutable column-major buffer owned by the caller, where column `j` starts at
    /// offset `j * leading_dim`.
    #[track_caller]
    #[inline]
    pub fn from_column_major_slice_with_leading_dim_mut(
        slice: &'a mut [E],
        nrows: usize,
        ncols: usize,
        leading_dim: usize,
    ) -> Self {
        check_column_major_slice(slice.len(), nrows, ncols, leading_dim);
        unsafe { Self::from_raw_parts(slice.as_mut_ptr(), nrows, ncols, 1, leading_dim as isize) }
    }

    #[inline]
    pub fn as_ptr(self) -> *mut E {
        self.base.ptr.as_ptr()
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.base.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.base.ncols
    }

    #[inline]
    pub fn row_stride(&self) -> isize {
        self.base.row_stride
    }

    #[inline]
    pub fn col_stride(&self) -> isize {
        self.base.col_stride
    }

    #[inline]
    pub fn ptr_at(self, i: usize, j: usize) -> *mut E {
        self.into_const().ptr_at(i, j) as *mut E
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()` and `j < self.ncols()`.
    #[track_caller]
    #[inline]
    pub unsafe fn get_unchecked(self, i: usize, j: usize) -> &'a mut E {
        fancy_debug_assert!(i < self.nrows());
        fancy_debug_assert!(j < self.ncols());
        &mut *self.ptr_at(i, j)
    }

    #[track_caller]
    #[inline]
    pub fn get(self, i: usize, j: usize) -> &'a mut E {
        fancy_assert!(i < self.nrows());
        fancy_assert!(j < self.ncols());
        unsafe { self.get_unchecked(i, j) }
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()` and `j < self.ncols()`.
    #[track_caller]
    #[inline(always)]
    pub unsafe fn read_unchecked(&self, i: usize, j: usize) -> E
    where
        E: Copy,
    {
        self.rb().read_unchecked(i, j)
    }

    #[track_caller]
    #[inline(always)]
    pub fn read(&self, i: usize, j: usize) -> E
    where
        E: Copy,
    {
        self.rb().read(i, j)
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()` and `j < self.ncols()`.
    #[track_caller]
    #[inline(always)]
    pub unsafe fn write_unchecked(&mut self, i: usize, j: usize, value: E) {
        *self.rb_mut().get_unchecked(i, j) = value;
    }

    /// Overwrites the element at position `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.nrows()` or `j >= self.ncols()`.
    #[track_caller]
    #[inline(always)]
    pub fn write(&mut self, i: usize, j: usize, value: E) {
        *self.rb_mut().get(i, j) = value;
    }

    /// # Safety
    ///
    /// Requires `i <= self.nrows()` and `j <= self.ncols()`.
    #[track_caller]
    #[inline]
    pub unsafe fn split_at_unchecked(self, i: usize, j: usize) -> (Self, Self, Self, Self) {
        let (top_left, top_right, bot_left, bot_right) =
            self.into_const().split_at_unchecked(i, j);
        (
            top_left.const_cast(),
            top_right.const_cast(),
            bot_left.const_cast(),
            bot_right.const_cast(),
        )
    }

    /// Splits the matrix into four corner parts in the following order: top left, top right,
    /// bottom left, bottom right.
    #[track_caller]
    #[inline]
    pub fn split_at(self, i: usize, j: usize) -> (Self, Self, Self, Self) {
        fancy_assert!(i <= self.nrows());
        fancy_assert!(j <= self.ncols());
        unsafe { self.split_at_unchecked(i, j) }
    }

    #[track_caller]
    #[inline]
    pub fn split_at_row(self, i: usize) -> (Self, Self) {
        let (top, bot) = self.into_const().split_at_row(i);
        unsafe { (top.const_cast(), bot.const_cast()) }
    }

    #[track_caller]
    #[inline]
    pub fn split_at_col(self, j: usize) -> (Self, Self) {
        let (left, right) = self.into_const().split_at_col(j);
        unsafe { (left.const_cast(), right.const_cast()) }
    }

    #[track_caller]
    #[inline]
    pub fn submatrix(self, i: usize, j: usize, nrows: usize, ncols: usize) -> Self {
        unsafe {
            self.into_const()
                .submatrix(i, j, nrows, ncols)
                .const_cast()
        }
    }

    #[track_caller]
    #[inline]
    pub fn col(self, j: usize) -> ColMut<'a, E> {
        unsafe { self.into_const().col(j).const_cast() }
    }

    #[inline]
    pub fn diagonal(self) -> ColMut<'a, E> {
        unsafe { self.into_const().diagonal().const_cast() }
    }

    #[inline]
    pub fn transpose(self) -> Self {
        unsafe { self.into_const().transpose().const_cast() }
    }
}

impl<'a, E> ColRef<'a, E> {
    /// Returns a column vector slice from the given arguments.
    ///
    /// # Safety
    ///
    /// `ptr` must be non null and properly aligned for type `E`, and for each `i < nrows`,
    /// `ptr.offset(i as isize * row_stride)` must point to a valid initialized object of type
    /// `E`. The referenced memory must not be mutated during the lifetime `'a`.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *const E, nrows: usize, row_stride: isize) -> Self {
        Self {
            base: VecSliceBase::<E> {
                ptr: NonNull::new_unchecked(ptr as *mut E),
                len: nrows,
                stride: row_stride,
            },
            _marker: PhantomData,
        }
    }

    /// Wraps a contiguous slice.
    #[inline]
    pub fn from_slice(slice: &'a [E]) -> Self {
        unsafe { Self::from_raw_parts(slice.as_ptr(), slice.len(), 1) }
    }

    #[inline]
    pub fn as_ptr(self) -> *const E {
        self.base.ptr.as_ptr()
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.base.len
    }

    #[inline]
    pub fn row_stride(&self) -> isize {
        self.base.stride
    }

    #[inline]
    pub fn ptr_at(self, i: usize) -> *const E {
        self.as_ptr().wrapping_offset(i as isize * self.row_stride())
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()`.
    #[track_caller]
    #[inline]
    pub unsafe fn get_unchecked(self, i: usize) -> &'a E {
        fancy_debug_assert!(i < self.nrows());
        &*self.ptr_at(i)
    }

    #[track_caller]
    #[inline]
    pub fn get(self, i: usize) -> &'a E {
        fancy_assert!(i < self.nrows());
        unsafe { self.get_unchecked(i) }
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()`.
    #[track_caller]
    #[inline(always)]
    pub unsafe fn read_unchecked(&self, i: usize) -> E
    where
        E: Copy,
    {
        *(*self).get_unchecked(i)
    }

    #[track_caller]
    #[inline(always)]
    pub fn read(&self, i: usize) -> E
    where
        E: Copy,
    {
        *(*self).get(i)
    }

    /// Splits the column into two parts in the following order: top, bottom.
    #[track_caller]
    #[inline]
    pub fn split_at(self, i: usize) -> (Self, Self) {
        fancy_assert!(i <= self.nrows());
        let rs = self.row_stride();
        unsafe {
            (
                Self::from_raw_parts(self.as_ptr(), i, rs),
                Self::from_raw_parts(self.ptr_at(i), self.nrows() - i, rs),
            )
        }
    }

    /// Returns the `nrows` elements starting at row `i`.
    #[track_caller]
    #[inline]
    pub fn subrows(self, i: usize, nrows: usize) -> Self {
        fancy_assert!(i <= self.nrows());
        fancy_assert!(nrows <= self.nrows() - i);
        unsafe { Self::from_raw_parts(self.ptr_at(i), nrows, self.row_stride()) }
    }

    /// Returns a view over the column as an `nrows × 1` matrix.
    #[inline]
    pub fn as_2d(self) -> MatRef<'a, E> {
        unsafe { MatRef::from_raw_parts(self.as_ptr(), self.nrows(), 1, self.row_stride(), 0) }
    }

    /// Reinterprets a contiguous column as a column-major `nrows × ncols` matrix.
    ///
    /// # Panics
    ///
    /// Panics if the column is not contiguous, or if `nrows * ncols` exceeds its length.
    #[track_caller]
    #[inline]
    pub fn as_mat(self, nrows: usize, ncols: usize) -> MatRef<'a, E> {
        fancy_assert!(self.row_stride() == 1);
        fancy_assert!(nrows.checked_mul(ncols).unwrap_or(usize::MAX) <= self.nrows());
        unsafe { MatRef::from_raw_parts(self.as_ptr(), nrows, ncols, 1, nrows as isize) }
    }

    /// Copies the elements into a new vector.
    #[inline]
    pub fn to_vec(&self) -> Vec<E>
    where
        E: Copy,
    {
        (0..self.nrows())
            .map(|i| unsafe { self.read_unchecked(i) })
            .collect()
    }

    /// # Safety
    ///
    /// See [`MatRef::const_cast`].
    #[inline]
    pub unsafe fn const_cast(self) -> ColMut<'a, E> {
        ColMut {
            base: self.base,
            _marker: PhantomData,
        }
    }
}

impl<'a, E> ColMut<'a, E> {
    /// Mutable version of [`ColRef::from_raw_parts`].
    ///
    /// # Safety
    ///
    /// Same as [`ColRef::from_raw_parts`], and additionally the referenced memory must not be
    /// accessed by any other pointer during the lifetime `'a`.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *mut E, nrows: usize, row_stride: isize) -> Self {
        ColRef::from_raw_parts(ptr, nrows, row_stride).const_cast()
    }

    /// Wraps a contiguous mutable slice.
    #[inline]
    pub fn from_slice_mut(slice: &'a mut [E]) -> Self {
        unsafe { Self::from_raw_parts(slice.as_mut_ptr(), slice.len(), 1) }
    }

    #[inline]
    pub fn as_ptr(self) -> *mut E {
        self.base.ptr.as_ptr()
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.base.len
    }

    #[inline]
    pub fn row_stride(&self) -> isize {
        self.base.stride
    }

    #[inline]
    pub fn ptr_at(self, i: usize) -> *mut E {
        self.into_const().ptr_at(i) as *mut E
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()`.
    #[track_caller]
    #[inline]
    pub unsafe fn get_unchecked(self, i: usize) -> &'a mut E {
        fancy_debug_assert!(i < self.nrows());
        &mut *self.ptr_at(i)
    }

    #[track_caller]
    #[inline]
    pub fn get(self, i: usize) -> &'a mut E {
        fancy_assert!(i < self.nrows());
        unsafe { self.get_unchecked(i) }
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()`.
    #[track_caller]
    #[inline(always)]
    pub unsafe fn read_unchecked(&self, i: usize) -> E
    where
        E: Copy,
    {
        self.rb().read_unchecked(i)
    }

    #[track_caller]
    #[inline(always)]
    pub fn read(&self, i: usize) -> E
    where
        E: Copy,
    {
        self.rb().read(i)
    }

    /// # Safety
    ///
    /// Requires `i < self.nrows()`.
    #[track_caller]
    #[inline(always)]
    pub unsafe fn write_unchecked(&mut self, i: usize, value: E) {
        *self.rb_mut().get_unchecked(i) = value;
    }

    #[track_caller]
    #[inline(always)]
    pub fn write(&mut self, i: usize, value: E) {
        *self.rb_mut().get(i) = value;
    }

    #[track_caller]
    #[inline]
    pub fn split_at(self, i: usize) -> (Self, Self) {
        let (top, bot) = self.into_const().split_at(i);
        unsafe { (top.const_cast(), bot.const_cast()) }
    }

    #[track_caller]
    #[inline]
    pub fn subrows(self, i: usize, nrows: usize) -> Self {
        unsafe { self.into_const().subrows(i, nrows).const_cast() }
    }

    #[inline]
    pub fn as_2d(self) -> MatMut<'a, E> {
        unsafe { self.into_const().as_2d().const_cast() }
    }

    /// Reinterprets a contiguous column as a mutable column-major `nrows × ncols` matrix.
    #[track_caller]
    #[inline]
    pub fn as_mat_mut(self, nrows: usize, ncols: usize) -> MatMut<'a, E> {
        unsafe { self.into_const().as_mat(nrows, ncols).const_cast() }
    }
}

impl<'a, E> Index<(usize, usize)> for MatRef<'a, E> {
    type Output = E;

    #[track_caller]
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        (*self).get(i, j)
    }
}
impl<'a, E> Index<(usize, usize)> for MatMut<'a, E> {
    type Output = E;

    #[track_caller]
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        self.rb().get(i, j)
    }
}
impl<'a, E> IndexMut<(usize, usize)> for MatMut<'a, E> {
    #[track_caller]
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        self.rb_mut().get(i, j)
    }
}
impl<'a, E> Index<usize> for ColRef<'a, E> {
    type Output = E;

    #[track_caller]
    #[inline]
    fn index(&self, i: usize) -> &Self::Output {
        (*self).get(i)
    }
}
impl<'a, E> Index<usize> for ColMut<'a, E> {
    type Output = E;

    #[track_caller]
    #[inline]
    fn index(&self, i: usize) -> &Self::Output {
        self.rb().get(i)
    }
}
impl<'a, E> IndexMut<usize> for ColMut<'a, E> {
    #[track_caller]
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        self.rb_mut().get(i)
    }
}

impl<'a, E: PartialEq> PartialEq for MatRef<'a, E> {
    fn eq(&self, other: &Self) -> bool {
        if self.nrows() != other.nrows() || self.ncols() != other.ncols() {
            return false;
        }
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                if self[(i, j)] != other[(i, j)] {
                    return false;
                }
            }
        }
        true
    }
}

struct DebugRow<'a, E>(MatRef<'a, E>, usize);

impl<'a, E: Debug> Debug for DebugRow<'a, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let row = self.1;
        f.debug_list()
            .entries((0..self.0.ncols()).map(|j| &self.0[(row, j)]))
            .finish()
    }
}

impl<'a, E: Debug> Debug for MatRef<'a, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let this = *self;
        f.debug_list()
            .entries((0..self.nrows()).map(|i| DebugRow(this, i)))
            .finish()
    }
}
impl<'a, E: Debug> Debug for MatMut<'a, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.rb().fmt(f)
    }
}
impl<'a, E: Debug> Debug for ColRef<'a, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_2d().fmt(f)
    }
}
impl<'a, E: Debug> Debug for ColMut<'a, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.rb().fmt(f)
    }
}

/// Matrix view read through an optional conjugation. Built from a [`Trans`] flag, so that
/// `op(A)` can be indexed directly.
#[derive(Copy, Clone)]
pub(crate) struct OpRef<'a, E> {
    mat: MatRef<'a, E>,
    conj: bool,
}

impl<'a, E: ComplexField> OpRef<'a, E> {
    #[inline]
    pub(crate) fn new(trans: Trans, mat: MatRef<'a, E>) -> Self {
        match trans {
            Trans::No => Self { mat, conj: false },
            Trans::Yes => Self {
                mat: mat.transpose(),
                conj: true,
            },
        }
    }

    #[inline]
    pub(crate) fn nrows(&self) -> usize {
        self.mat.nrows()
    }

    #[inline]
    pub(crate) fn ncols(&self) -> usize {
        self.mat.ncols()
    }

    #[inline]
    pub(crate) fn is_conj(&self) -> bool {
        self.conj
    }

    #[inline]
    pub(crate) fn as_mat(&self) -> MatRef<'a, E> {
        self.mat
    }

    /// Same view, with the conjugation flag flipped.
    #[inline]
    pub(crate) fn conjugate(self) -> Self {
        Self {
            mat: self.mat,
            conj: !self.conj,
        }
    }

    #[inline(always)]
    pub(crate) unsafe fn read_unchecked(&self, i: usize, j: usize) -> E {
        let value = self.mat.read_unchecked(i, j);
        if self.conj {
            value.conj()
        } else {
            value
        }
    }
}

static ACTIVE_MATRICES: AtomicUsize = AtomicUsize::new(0);

/// Returns the number of owning matrices currently alive in the process.
///
/// Views are not counted. The value is a diagnostic and may be observed concurrently with
/// other threads creating or dropping matrices.
#[inline]
pub fn active_matrices() -> usize {
    ACTIVE_MATRICES.load(Ordering::Relaxed)
}

/// Heap allocated resizable matrix, similar to a 2D [`Vec`].
///
/// # Note
///
/// The memory layout of `Mat` is guaranteed to be column-major, with a column stride equal to
/// [`Mat::row_capacity`]. This may be larger than [`Mat::nrows`] after a call to
/// [`Mat::reserve_exact`]. Entries outside of the current dimensions are always initialized.
pub struct Mat<E: ComplexField> {
    data: Vec<E>,
    nrows: usize,
    ncols: usize,
    row_capacity: usize,
    col_capacity: usize,
}

impl<E: ComplexField> Drop for Mat<E> {
    #[inline]
    fn drop(&mut self) {
        ACTIVE_MATRICES.fetch_sub(1, Ordering::Relaxed);
    }
}

impl<E: ComplexField> Default for Mat<E> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ComplexField> Clone for Mat<E> {
    fn clone(&self) -> Self {
        self.as_ref().to_owned()
    }
}

impl<E: ComplexField> Mat<E> {
    #[inline]
    fn from_storage(data: Vec<E>, row_capacity: usize, col_capacity: usize) -> Self {
        ACTIVE_MATRICES.fetch_add(1, Ordering::Relaxed);
        Self {
            data,
            nrows: 0,
            ncols: 0,
            row_capacity,
            col_capacity,
        }
    }

    /// Returns a new matrix with dimensions `(0, 0)`. This does not allocate.
    #[inline]
    pub fn new() -> Self {
        Self::from_storage(Vec::new(), 0, 0)
    }

    /// Returns a new matrix with dimensions `(0, 0)`, with enough capacity to hold a maximum of
    /// `row_capacity` rows and `col_capacity` columns without reallocating.
    ///
    /// # Panics
    ///
    /// Panics if the total capacity overflows `usize`.
    #[track_caller]
    #[inline]
    pub fn with_capacity(row_capacity: usize, col_capacity: usize) -> Self {
        let len = row_capacity.checked_mul(col_capacity);
        fancy_assert!(len.is_some());
        let len = len.unwrap_or(0);
        Self::from_storage(vec![E::zero(); len], row_capacity, col_capacity)
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with the provided function.
    #[inline]
    pub fn from_fn(nrows: usize, ncols: usize, f: impl FnMut(usize, usize) -> E) -> Self {
        let mut this = Self::with_capacity(nrows, ncols);
        this.resize_with(f, nrows, ncols);
        this
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with zeros.
    #[inline]
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        let mut this = Self::with_capacity(nrows, ncols);
        this.nrows = nrows;
        this.ncols = ncols;
        this
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, with ones on the leading diagonal
    /// and zeros elsewhere.
    #[inline]
    pub fn identity(nrows: usize, ncols: usize) -> Self {
        let mut this = Self::zeros(nrows, ncols);
        for i in 0..nrows.min(ncols) {
            this.write(i, i, E::one());
        }
        this
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn row_capacity(&self) -> usize {
        self.row_capacity
    }

    #[inline]
    pub fn col_capacity(&self) -> usize {
        self.col_capacity
    }

    /// Offset between the first elements of two successive columns.
    #[inline]
    pub fn col_stride(&self) -> isize {
        self.row_capacity as isize
    }

    /// Number of bytes owned by the matrix storage.
    #[inline]
    pub fn heap_size(&self) -> usize {
        self.data.len() * size_of::<E>()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const E {
        self.data.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut E {
        self.data.as_mut_ptr()
    }

    #[inline]
    pub fn as_ref(&self) -> MatRef<'_, E> {
        unsafe {
            MatRef::from_raw_parts(self.as_ptr(), self.nrows, self.ncols, 1, self.col_stride())
        }
    }

    #[inline]
    pub fn as_mut(&mut self) -> MatMut<'_, E> {
        let (nrows, ncols, col_stride) = (self.nrows, self.ncols, self.col_stride());
        unsafe { MatMut::from_raw_parts(self.as_mut_ptr(), nrows, ncols, 1, col_stride) }
    }

    #[track_caller]
    #[inline(always)]
    pub fn read(&self, i: usize, j: usize) -> E {
        self.as_ref().read(i, j)
    }

    #[track_caller]
    #[inline(always)]
    pub fn write(&mut self, i: usize, j: usize, value: E) {
        self.as_mut().write(i, j, value)
    }

    /// Reserves the minimum capacity for `row_capacity` rows and `col_capacity`
    /// columns without reallocating, preserving the current contents. Does nothing if the
    /// capacity is already sufficient.
    #[track_caller]
    pub fn reserve_exact(&mut self, row_capacity: usize, col_capacity: usize) {
        if self.row_capacity >= row_capacity && self.col_capacity >= col_capacity {
            return;
        }
        let new_row_capacity = self.row_capacity.max(row_capacity);
        let new_col_capacity = self.col_capacity.max(col_capacity);

        let len = new_row_capacity.checked_mul(new_col_capacity);
        fancy_assert!(len.is_some());
        let mut data = vec![E::zero(); len.unwrap_or(0)];

        if new_row_capacity == self.row_capacity {
            data[..self.data.len()].copy_from_slice(&self.data);
        } else {
            for j in 0..self.col_capacity {
                let src = &self.data[j * self.row_capacity..(j + 1) * self.row_capacity];
                let dst = j * new_row_capacity;
                data[dst..dst + self.row_capacity].copy_from_slice(src);
            }
        }

        self.data = data;
        self.row_capacity = new_row_capacity;
        self.col_capacity = new_col_capacity;
    }

    /// Resizes the matrix in-place so that the new dimensions are `(new_nrows, new_ncols)`.
    /// Elements that are now out of bounds are left untouched in the storage, while new
    /// elements are filled with `f(i, j)`. The top left overlap is preserved.
    pub fn resize_with(
        &mut self,
        mut f: impl FnMut(usize, usize) -> E,
        new_nrows: usize,
        new_ncols: usize,
    ) {
        let old_nrows = self.nrows;
        let old_ncols = self.ncols;
        self.reserve_exact(new_nrows, new_ncols);
        self.nrows = new_nrows;
        self.ncols = new_ncols;

        let mut this = self.as_mut();
        for j in 0..new_ncols {
            let start = if j < old_ncols { old_nrows } else { 0 };
            for i in start..new_nrows {
                unsafe { this.write_unchecked(i, j, f(i, j)) };
            }
        }
    }

    /// Resizes the matrix, preserving the top left overlap and zero padding new rows and
    /// columns.
    #[inline]
    pub fn resize_copy(&mut self, new_nrows: usize, new_ncols: usize) {
        self.resize_with(|_, _| E::zero(), new_nrows, new_ncols)
    }

    /// Reallocates the matrix with dimensions `(new_nrows, new_ncols)`. The previous contents
    /// are discarded and every element is set to zero.
    #[inline]
    pub fn resize(&mut self, new_nrows: usize, new_ncols: usize) {
        let len = new_nrows.checked_mul(new_ncols);
        fancy_assert!(len.is_some());
        self.data = vec![E::zero(); len.unwrap_or(0)];
        self.row_capacity = new_nrows;
        self.col_capacity = new_ncols;
        self.nrows = new_nrows;
        self.ncols = new_ncols;
    }
}

impl<E: ComplexField> Index<(usize, usize)> for Mat<E> {
    type Output = E;

    #[track_caller]
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        self.as_ref().get(i, j)
    }
}
impl<E: ComplexField> IndexMut<(usize, usize)> for Mat<E> {
    #[track_caller]
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        self.as_mut().get(i, j)
    }
}

impl<E: ComplexField> PartialEq for Mat<E> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl<E: ComplexField> Debug for Mat<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_ref().fmt(f)
    }
}

/// Returns the stack requirements for a temporary `nrows × ncols` matrix created with
/// [`temp_mat_zeroed`].
#[inline]
pub fn temp_mat_req<E: ComplexField>(nrows: usize, ncols: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<E>(nrows.checked_mul(ncols).ok_or(SizeOverflow)?)
}

/// Creates a temporary zero-filled column-major matrix in the given [`dyn_stack::DynStack`].
#[macro_export]
macro_rules! temp_mat_zeroed {
    {
        $(
            let ($id: pat, $stack_id: pat) = temp_mat_zeroed::<$ty: ty>(
                $nrows: expr,
                $ncols: expr,
                $stack: expr$(,)?
            );
        )*
    } => {
        $(
            let nrows: usize = $nrows;
            let ncols: usize = $ncols;
            let (mut temp_data, $stack_id) = $stack.make_with(
                nrows * ncols,
                |_| <$ty as $crate::ComplexField>::zero(),
            );
            let $id = $crate::MatMut::<$ty>::from_column_major_slice_mut(
                &mut *temp_data,
                nrows,
                ncols,
            );
        )*
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __perf_warn {
    ($name: ident) => {{
        #[inline(always)]
        #[allow(non_snake_case)]
        fn $name() -> &'static ::core::sync::atomic::AtomicBool {
            static $name: ::core::sync::atomic::AtomicBool =
                ::core::sync::atomic::AtomicBool::new(false);
            &$name
        }
        ::core::matches!(
            $name().compare_exchange(
                false,
                true,
                ::core::sync::atomic::Ordering::Relaxed,
                ::core::sync::atomic::Ordering::Relaxed,
            ),
            Ok(_)
        )
    }};
}

/// Creates a [`Mat`] containing the arguments, given in row-major order.
///
/// ```
/// use h2dense_core::mat;
///
/// let m = mat![
///     [0.0, 3.0, 6.0, 9.0],
///     [1.0, 4.0, 7.0, 10.0],
///     [2.0, 5.0, 8.0, 11.0],
/// ];
///
/// assert_eq!(m[(0, 0)], 0.0);
/// assert_eq!(m[(1, 0)], 1.0);
/// assert_eq!(m[(2, 3)], 11.0);
/// ```
#[macro_export]
macro_rules! mat {
    () => {
        {
            compile_error!("number of columns in the matrix is ambiguous");
        }
    };

    ($([$($v:expr),* $(,)?] ),* $(,)?) => {
        {
            let rows = [$([$($v),*]),*];
            let nrows = rows.len();
            let ncols = rows[0].len();
            $crate::Mat::from_fn(nrows, ncols, |i, j| rows[i][j])
        }
    };
}
