#![warn(missing_docs)]
//! Dense linear-algebra primitives for the ttsle tensor-train solvers
//!
//! This crate provides the small set of dense operations the sweep algorithms
//! orchestrate:
//! - [`solve`]: one-shot dense solve
//! - [`lu_factor`] / [`lu_solve`]: explicit LU factorization followed by substitution
//! - [`qr_reduced`]: orthonormal factor of a reduced QR decomposition
//! - [`rq_reduced`]: orthonormal factor of a reduced RQ decomposition
//! - [`svd`]: thin singular value decomposition
//!
//! Matrices are mdarray [`DTensor`]s and vectors are plain `Vec<f64>`. The faer
//! backend is confined to a private module.
//!
//! # Example
//!
//! ```
//! use ttsle_linalg::{matrix2_from_data, solve};
//!
//! let a = matrix2_from_data(vec![4.0, 1.0, 1.0, 3.0], 2, 2);
//! let x = solve(&a, &[1.0, 2.0]).unwrap();
//! assert!((4.0 * x[0] + x[1] - 1.0).abs() < 1e-12);
//! ```

mod backend;
pub mod error;
pub mod qr;
pub mod solve;
pub mod svd;

use mdarray::DTensor;

pub use error::{LinalgError, Result};
pub use qr::{qr_reduced, rq_reduced};
pub use solve::{lu_factor, lu_solve, solve, LuFactors};
pub use svd::{svd, SvdResult};

/// A dense matrix represented using mdarray
pub type Matrix2<T> = DTensor<T, 2>;

/// Create a zero-filled matrix
#[inline]
pub fn matrix2_zeros<T: Clone + Default>(rows: usize, cols: usize) -> Matrix2<T> {
    DTensor::<T, 2>::from_elem([rows, cols], T::default())
}

/// Create a matrix from flat data (row-major order)
pub fn matrix2_from_data<T: Clone>(data: Vec<T>, rows: usize, cols: usize) -> Matrix2<T> {
    assert_eq!(data.len(), rows * cols);
    DTensor::<T, 2>::from_fn([rows, cols], |idx| data[idx[0] * cols + idx[1]].clone())
}
