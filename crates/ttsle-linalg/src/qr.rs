//! Reduced QR and RQ decompositions
//!
//! Only the orthonormal factors are returned; the triangular factors are not
//! needed by the sweep algorithms.

use crate::backend::thin_q_backend;
use crate::error::{LinalgError, Result};
use crate::Matrix2;

fn check_nonempty(m: &Matrix2<f64>) -> Result<(usize, usize)> {
    let rows = m.dim(0);
    let cols = m.dim(1);
    if rows == 0 || cols == 0 {
        return Err(LinalgError::EmptyMatrix { rows, cols });
    }
    Ok((rows, cols))
}

/// Orthonormal factor of the reduced QR decomposition `M = Q R`.
///
/// For an m×n matrix the result has shape m×min(m, n) and orthonormal columns.
pub fn qr_reduced(m: &Matrix2<f64>) -> Result<Matrix2<f64>> {
    check_nonempty(m)?;
    Ok(thin_q_backend(m))
}

/// Orthonormal factor of the reduced RQ decomposition `M = R Q`.
///
/// For an m×n matrix the result has shape min(m, n)×n and orthonormal rows.
/// Computed from the QR decomposition of the row-reversed transpose of `M`,
/// so that `R` is upper triangular.
pub fn rq_reduced(m: &Matrix2<f64>) -> Result<Matrix2<f64>> {
    let (rows, cols) = check_nonempty(m)?;

    // T[c, r] = M[rows - 1 - r, c]
    let flipped = Matrix2::<f64>::from_fn([cols, rows], |idx| m[[rows - 1 - idx[1], idx[0]]]);
    let q1 = thin_q_backend(&flipped);
    let p = q1.dim(1);

    // Q[r, c] = Q1[c, p - 1 - r]
    Ok(Matrix2::<f64>::from_fn([p, cols], |idx| {
        q1[[idx[1], p - 1 - idx[0]]]
    }))
}
