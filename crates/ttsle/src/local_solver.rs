//! Dense solvers for micro-systems

use std::fmt;
use std::str::FromStr;

use ttsle_linalg::{lu_factor, lu_solve, solve};

use crate::error::{Result, SleError};
use crate::micro::MicroSystem;

/// Algorithm for solving a micro-system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalSolver {
    /// One-shot dense solve
    #[default]
    DirectSolve,
    /// Explicit LU factorization followed by substitution
    FactorSolve,
}

impl LocalSolver {
    /// Solve the micro-system assembled for `site`
    ///
    /// The result is rejected if any entry is not finite.
    pub fn solve(self, site: usize, system: &MicroSystem) -> Result<Vec<f64>> {
        let values = match self {
            LocalSolver::DirectSolve => solve(&system.matrix, &system.rhs)?,
            LocalSolver::FactorSolve => {
                let factors = lu_factor(&system.matrix)?;
                lu_solve(&factors, &system.rhs)?
            }
        };

        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(SleError::NumericalFailure {
                site,
                message: format!(
                    "{} produced a non-finite entry at position {} of a {}x{} system",
                    self,
                    pos,
                    system.rows(),
                    system.cols()
                ),
            });
        }
        Ok(values)
    }
}

impl fmt::Display for LocalSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalSolver::DirectSolve => write!(f, "solve"),
            LocalSolver::FactorSolve => write!(f, "lu"),
        }
    }
}

impl FromStr for LocalSolver {
    type Err = SleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "solve" => Ok(LocalSolver::DirectSolve),
            "lu" => Ok(LocalSolver::FactorSolve),
            other => Err(SleError::InvalidConfig {
                message: format!("unknown local solver '{}', expected 'solve' or 'lu'", other),
            }),
        }
    }
}
