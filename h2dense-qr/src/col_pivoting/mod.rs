//! The column pivoted QR decomposition decomposes a matrix $A$ into the product
//! $$AP = QR,$$
//! where $P$ is a permutation matrix, $Q$ is a unitary matrix (represented as a sequence of
//! Householder reflectors), and $R$ is an upper trapezoidal matrix whose diagonal has
//! non-increasing magnitude.
//!
//! The factors share the layout of [`crate::no_pivoting`], so the routines there apply $Q$,
//! expand it, or solve with the permuted matrix $AP$.

pub mod compute;
