//! Core types for tensor-train cores and stack entries
//!
//! Chain cores are 4D tensors with shape (left_bond, row_dim, col_dim, right_bond).
//! - `left_bond`: Bond dimension connecting to the left neighbor
//! - `row_dim`: Row (output) mode of the site
//! - `col_dim`: Column (input) mode of the site; 1 for vectors
//! - `right_bond`: Bond dimension connecting to the right neighbor

use mdarray::DTensor;

pub use ttsle_linalg::{matrix2_from_data, matrix2_zeros, Matrix2};

/// A 4D tensor represented using mdarray
/// Shape is (left_dim, row_dim, col_dim, right_dim)
pub type Tensor4<T> = DTensor<T, 4>;

/// A 3D tensor represented using mdarray
pub type Tensor3<T> = DTensor<T, 3>;

/// Helper functions for Tensor4 operations
pub trait Tensor4Ops<T: Clone + Default> {
    /// Get the left (bond) dimension
    fn left_dim(&self) -> usize;

    /// Get the row (output) mode dimension
    fn row_dim(&self) -> usize;

    /// Get the column (input) mode dimension
    fn col_dim(&self) -> usize;

    /// Get the right (bond) dimension
    fn right_dim(&self) -> usize;

    /// Get element at (left, row, col, right)
    fn get4(&self, l: usize, s1: usize, s2: usize, r: usize) -> &T;

    /// Set element at (left, row, col, right)
    fn set4(&mut self, l: usize, s1: usize, s2: usize, r: usize, value: T);

    /// Total number of elements
    fn num_elements(&self) -> usize {
        self.left_dim() * self.row_dim() * self.col_dim() * self.right_dim()
    }
}

impl<T: Clone + Default> Tensor4Ops<T> for Tensor4<T> {
    fn left_dim(&self) -> usize {
        self.dim(0)
    }

    fn row_dim(&self) -> usize {
        self.dim(1)
    }

    fn col_dim(&self) -> usize {
        self.dim(2)
    }

    fn right_dim(&self) -> usize {
        self.dim(3)
    }

    fn get4(&self, l: usize, s1: usize, s2: usize, r: usize) -> &T {
        &self[[l, s1, s2, r]]
    }

    fn set4(&mut self, l: usize, s1: usize, s2: usize, r: usize, value: T) {
        self[[l, s1, s2, r]] = value;
    }
}

/// Create a zero-filled Tensor4
pub fn tensor4_zeros<T: Clone + Default>(
    left_dim: usize,
    row_dim: usize,
    col_dim: usize,
    right_dim: usize,
) -> Tensor4<T> {
    Tensor4::from_elem([left_dim, row_dim, col_dim, right_dim], T::default())
}

/// Create a Tensor4 from flat data (row-major order)
pub fn tensor4_from_data<T: Clone>(
    data: Vec<T>,
    left_dim: usize,
    row_dim: usize,
    col_dim: usize,
    right_dim: usize,
) -> Tensor4<T> {
    assert_eq!(data.len(), left_dim * row_dim * col_dim * right_dim);
    Tensor4::from_fn([left_dim, row_dim, col_dim, right_dim], |idx| {
        data[((idx[0] * row_dim + idx[1]) * col_dim + idx[2]) * right_dim + idx[3]].clone()
    })
}

/// Create a zero-filled Tensor3
pub fn tensor3_zeros<T: Clone + Default>(d0: usize, d1: usize, d2: usize) -> Tensor3<T> {
    Tensor3::from_elem([d0, d1, d2], T::default())
}

/// Reshape a matrix (left_dim * row_dim, right_dim) or (left_dim, row_dim * right_dim)
/// stored row-major into a vector core (left_dim, row_dim, 1, right_dim)
pub(crate) fn vector_core_from_matrix(
    matrix: &Matrix2<f64>,
    left_dim: usize,
    row_dim: usize,
    right_dim: usize,
) -> Tensor4<f64> {
    let cols = matrix.dim(1);
    Tensor4::from_fn([left_dim, row_dim, 1, right_dim], |idx| {
        let flat = (idx[0] * row_dim + idx[1]) * right_dim + idx[3];
        matrix[[flat / cols, flat % cols]]
    })
}
