//! Options for the ALS and MALS sweeps.

use crate::error::{Result, SleError};
use crate::local_solver::LocalSolver;

/// Rank truncation applied after each two-site update.
///
/// # Builder Pattern
///
/// ```
/// use ttsle::TruncationOptions;
///
/// let options = TruncationOptions::default()
///     .with_threshold(1e-10)
///     .with_max_rank(20);
/// assert_eq!(options.max_rank, Some(20));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncationOptions {
    /// Singular values with `s / s_max <= threshold` are discarded.
    /// Zero disables the relative cut.
    pub threshold: f64,
    /// Upper bound on the number of kept singular values. `None` means no cap.
    pub max_rank: Option<usize>,
}

impl Default for TruncationOptions {
    fn default() -> Self {
        Self {
            threshold: 1e-12,
            max_rank: None,
        }
    }
}

impl TruncationOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relative threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the maximum rank.
    pub fn with_max_rank(mut self, max_rank: usize) -> Self {
        self.max_rank = Some(max_rank);
        self
    }

    /// Remove the rank cap.
    pub fn without_max_rank(mut self) -> Self {
        self.max_rank = None;
        self
    }

    /// Check that the threshold is finite and non-negative and that the cap is positive.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(SleError::InvalidConfig {
                message: format!(
                    "threshold must be finite and >= 0, got {}",
                    self.threshold
                ),
            });
        }
        if self.max_rank == Some(0) {
            return Err(SleError::InvalidConfig {
                message: "max_rank must be >= 1".to_string(),
            });
        }
        Ok(())
    }

    /// Number of singular values to keep.
    ///
    /// `singular_values` must be sorted in non-increasing order. At least one
    /// value is always kept, even for a zero block.
    pub fn retained(&self, singular_values: &[f64]) -> usize {
        let mut kept = singular_values.len();
        if self.threshold != 0.0 {
            let s_max = singular_values.first().copied().unwrap_or(0.0);
            kept = singular_values
                .iter()
                .take_while(|&&s| s / s_max > self.threshold)
                .count();
        }
        if let Some(max_rank) = self.max_rank {
            kept = kept.min(max_rank);
        }
        kept.max(1).min(singular_values.len().max(1))
    }
}

/// Options for [`als`](crate::als).
#[derive(Debug, Clone)]
pub struct AlsOptions {
    /// Number of sweeps (forward and backward half-sweep each).
    pub repeats: usize,
    /// Micro-system solver.
    pub solver: LocalSolver,
}

impl Default for AlsOptions {
    fn default() -> Self {
        Self {
            repeats: 1,
            solver: LocalSolver::default(),
        }
    }
}

impl AlsOptions {
    /// Create new options with the given number of sweeps.
    pub fn new(repeats: usize) -> Self {
        Self {
            repeats,
            ..Default::default()
        }
    }

    /// Set number of sweeps.
    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    /// Set the micro-system solver.
    pub fn with_solver(mut self, solver: LocalSolver) -> Self {
        self.solver = solver;
        self
    }
}

/// Options for [`mals`](crate::mals).
#[derive(Debug, Clone)]
pub struct MalsOptions {
    /// Number of sweeps (forward and backward half-sweep each).
    pub repeats: usize,
    /// Micro-system solver.
    pub solver: LocalSolver,
    /// Truncation of the two-site updates.
    pub truncation: TruncationOptions,
}

impl Default for MalsOptions {
    fn default() -> Self {
        Self {
            repeats: 1,
            solver: LocalSolver::default(),
            truncation: TruncationOptions::default(),
        }
    }
}

impl MalsOptions {
    /// Create new options with the given number of sweeps.
    pub fn new(repeats: usize) -> Self {
        Self {
            repeats,
            ..Default::default()
        }
    }

    /// Set number of sweeps.
    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    /// Set the micro-system solver.
    pub fn with_solver(mut self, solver: LocalSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Set truncation options.
    pub fn with_truncation(mut self, truncation: TruncationOptions) -> Self {
        self.truncation = truncation;
        self
    }

    /// Set the relative truncation threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.truncation = self.truncation.with_threshold(threshold);
        self
    }

    /// Set maximum rank.
    pub fn with_max_rank(mut self, max_rank: usize) -> Self {
        self.truncation = self.truncation.with_max_rank(max_rank);
        self
    }

    /// Check the truncation settings.
    pub fn validate(&self) -> Result<()> {
        self.truncation.validate()
    }
}
