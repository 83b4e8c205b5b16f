//! Orthogonalization and rank control after a local solve
//!
//! ALS keeps the chain orthogonal with reduced QR (forward) and RQ (backward)
//! decompositions. MALS splits the two-site solution with a truncated SVD,
//! which is where solution ranks can grow or shrink.

use ttsle_linalg::{qr_reduced, rq_reduced, svd, LinalgError};

use crate::chain::ChainTensor;
use crate::error::Result;
use crate::options::TruncationOptions;
use crate::types::{matrix2_from_data, vector_core_from_matrix, Matrix2};

/// Direction of a half-sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Left to right
    Forward,
    /// Right to left
    Backward,
}

fn check_len(values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(LinalgError::LengthMismatch {
            expected,
            got: values.len(),
        }
        .into());
    }
    Ok(())
}

/// Commit the solution of the single-site micro-system at site `i`
///
/// Forward: core `i` becomes left-orthogonal and `rank(i+1)` is updated.
/// Backward: core `i` becomes right-orthogonal and `rank(i)` is updated,
/// except at site 0 where the raw values are stored.
pub fn update_core_als(
    i: usize,
    values: &[f64],
    solution: &mut ChainTensor,
    direction: Direction,
) -> Result<()> {
    let left = solution.rank(i);
    let site_dim = solution.row_dim(i);
    let right = solution.rank(i + 1);
    check_len(values, left * site_dim * right)?;

    match direction {
        Direction::Forward => {
            let m = matrix2_from_data(values.to_vec(), left * site_dim, right);
            let q = qr_reduced(&m)?;
            let rank = q.dim(1);
            solution.set_rank(i + 1, rank);
            solution.set_core(i, vector_core_from_matrix(&q, left, site_dim, rank));
        }
        Direction::Backward if i > 0 => {
            let m = matrix2_from_data(values.to_vec(), left, site_dim * right);
            let q = rq_reduced(&m)?;
            let rank = q.dim(0);
            solution.set_rank(i, rank);
            solution.set_core(i, vector_core_from_matrix(&q, rank, site_dim, right));
        }
        Direction::Backward => {
            let m = matrix2_from_data(values.to_vec(), left, site_dim * right);
            solution.set_core(i, vector_core_from_matrix(&m, left, site_dim, right));
        }
    }
    Ok(())
}

/// Commit the solution of the two-site micro-system at sites `(i, i+1)`
///
/// The solution is split by a thin SVD truncated with `truncation`; the number
/// of kept singular values becomes `rank(i+1)` and is returned.
/// Forward: core `i` receives the left singular vectors.
/// Backward: core `i+1` receives the right singular vectors; at `i = 0`
/// core 0 additionally receives the left singular vectors scaled by the
/// singular values.
pub fn update_core_mals(
    i: usize,
    values: &[f64],
    solution: &mut ChainTensor,
    direction: Direction,
    truncation: &TruncationOptions,
) -> Result<usize> {
    let left = solution.rank(i);
    let dim1 = solution.row_dim(i);
    let dim2 = solution.row_dim(i + 1);
    let right = solution.rank(i + 2);
    check_len(values, left * dim1 * dim2 * right)?;

    let m = matrix2_from_data(values.to_vec(), left * dim1, dim2 * right);
    let decomp = svd(&m)?;
    let kept = truncation.retained(&decomp.s);
    solution.set_rank(i + 1, kept);

    match direction {
        Direction::Forward => {
            let u = leading_columns(&decomp.u, kept, None);
            solution.set_core(i, vector_core_from_matrix(&u, left, dim1, kept));
        }
        Direction::Backward => {
            let vt = Matrix2::<f64>::from_fn([kept, dim2 * right], |idx| decomp.vt[[idx[0], idx[1]]]);
            solution.set_core(i + 1, vector_core_from_matrix(&vt, kept, dim2, right));
            if i == 0 {
                let us = leading_columns(&decomp.u, kept, Some(&decomp.s));
                solution.set_core(i, vector_core_from_matrix(&us, left, dim1, kept));
            }
        }
    }
    Ok(kept)
}

/// First `k` columns of `u`, optionally scaled column-wise by `s`
fn leading_columns(u: &Matrix2<f64>, k: usize, s: Option<&[f64]>) -> Matrix2<f64> {
    Matrix2::<f64>::from_fn([u.dim(0), k], |idx| {
        let scale = s.map_or(1.0, |s| s[idx[1]]);
        u[[idx[0], idx[1]]] * scale
    })
}
