//! Dense linear solves
//!
//! Two numerical paths are provided for square systems: a one-shot solve
//! ([`solve`]) and an explicit factorization that can be applied to several
//! right-hand sides ([`lu_factor`] followed by [`lu_solve`]).
//!
//! Neither path checks the conditioning of the matrix. A singular matrix
//! yields non-finite entries in the result, which callers are expected to
//! inspect.

use std::fmt;

use crate::backend::{self, LuBackend};
use crate::error::{LinalgError, Result};
use crate::Matrix2;

fn check_square(a: &Matrix2<f64>) -> Result<usize> {
    let rows = a.dim(0);
    let cols = a.dim(1);
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    if rows == 0 {
        return Err(LinalgError::EmptyMatrix { rows, cols });
    }
    Ok(rows)
}

fn check_rhs(dim: usize, b: &[f64]) -> Result<()> {
    if b.len() != dim {
        return Err(LinalgError::LengthMismatch {
            expected: dim,
            got: b.len(),
        });
    }
    Ok(())
}

/// Solve the square system `A x = b` in one shot.
///
/// Uses a Householder QR decomposition internally.
pub fn solve(a: &Matrix2<f64>, b: &[f64]) -> Result<Vec<f64>> {
    let dim = check_square(a)?;
    check_rhs(dim, b)?;
    Ok(backend::qr_solve(a, b))
}

/// LU factorization (with partial pivoting) of a square matrix
pub struct LuFactors {
    inner: LuBackend,
    dim: usize,
}

impl LuFactors {
    /// Dimension of the factorized matrix
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Solve `A x = b` using the stored factors
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>> {
        check_rhs(self.dim, b)?;
        Ok(self.inner.solve(b))
    }
}

impl fmt::Debug for LuFactors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuFactors").field("dim", &self.dim).finish()
    }
}

/// Compute the LU factorization of a square matrix.
pub fn lu_factor(a: &Matrix2<f64>) -> Result<LuFactors> {
    let dim = check_square(a)?;
    Ok(LuFactors {
        inner: LuBackend::factor(a),
        dim,
    })
}

/// Solve `A x = b` from a previously computed factorization.
pub fn lu_solve(factors: &LuFactors, b: &[f64]) -> Result<Vec<f64>> {
    factors.solve(b)
}
