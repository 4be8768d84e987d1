//! The LU decomposition of a square matrix $A$ is such that:
//! $$A = LU,$$
//! where $L$ is a unit lower triangular matrix, and $U$ is an upper triangular matrix.
//!
//! This crate provides the decomposition without pivoting, which succeeds whenever every
//! leading principal minor of $A$ is nonsingular.

#![warn(rust_2018_idioms)]

pub mod no_pivoting;
