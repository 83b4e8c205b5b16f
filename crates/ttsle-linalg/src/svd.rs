//! Thin singular value decomposition

use crate::backend::svd_backend;
use crate::error::{LinalgError, Result};
use crate::Matrix2;

/// Result of a thin SVD.
///
/// For an m×n matrix A with k = min(m, n):
/// - `u`: m×k, orthonormal columns
/// - `s`: k singular values in non-increasing order
/// - `vt`: k×n, orthonormal rows
///
/// The decomposition satisfies A = U × diag(s) × Vt.
#[derive(Debug, Clone)]
pub struct SvdResult {
    /// Left singular vectors
    pub u: Matrix2<f64>,
    /// Singular values, largest first
    pub s: Vec<f64>,
    /// Right singular vectors (transposed)
    pub vt: Matrix2<f64>,
}

impl SvdResult {
    /// Number of singular values
    pub fn len(&self) -> usize {
        self.s.len()
    }

    /// Whether the decomposition holds no singular values
    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }
}

/// Compute the thin SVD of a matrix.
pub fn svd(m: &Matrix2<f64>) -> Result<SvdResult> {
    let rows = m.dim(0);
    let cols = m.dim(1);
    if rows == 0 || cols == 0 {
        return Err(LinalgError::EmptyMatrix { rows, cols });
    }

    let result = svd_backend(m)?;
    Ok(SvdResult {
        u: result.u,
        s: result.s,
        vt: result.vt,
    })
}
