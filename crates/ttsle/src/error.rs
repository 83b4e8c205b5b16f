//! Error types for tensor-train linear solvers

use thiserror::Error;
use ttsle_linalg::LinalgError;

/// Result type for tensor-train linear solvers
pub type Result<T> = std::result::Result<T, SleError>;

/// Errors that can occur while setting up or running a sweep
#[derive(Error, Debug)]
pub enum SleError {
    /// Invalid solver configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the invalid setting
        message: String,
    },

    /// The three tensors of the system do not have the same number of sites
    #[error("Order mismatch: operator has {operator} sites, initial guess has {initial_guess}, right-hand side has {right_hand_side}")]
    OrderMismatch {
        /// Order of the operator
        operator: usize,
        /// Order of the initial guess
        initial_guess: usize,
        /// Order of the right-hand side
        right_hand_side: usize,
    },

    /// A per-site mode dimension is incompatible with the operator
    #[error("Mode mismatch at site {site}: {tensor} has dimension {got}, operator requires {expected}")]
    ModeMismatch {
        /// The site index where the mismatch occurred
        site: usize,
        /// Which tensor is incompatible
        tensor: &'static str,
        /// Dimension required by the operator
        expected: usize,
        /// Dimension found
        got: usize,
    },

    /// A tensor that must represent a vector has a column mode larger than 1
    #[error("{tensor} is not a vector: column dimension {col_dim} at site {site}")]
    NotAVector {
        /// Which tensor is affected
        tensor: &'static str,
        /// The site index
        site: usize,
        /// The offending column dimension
        col_dim: usize,
    },

    /// An operator core has different row and column dimensions
    #[error("Operator is not square at site {site}: row dimension {row_dim}, column dimension {col_dim}")]
    NonSquareOperator {
        /// The site index
        site: usize,
        /// Row dimension of the operator core
        row_dim: usize,
        /// Column dimension of the operator core
        col_dim: usize,
    },

    /// Bond dimension mismatch between adjacent cores
    #[error("Bond dimension mismatch at site {site}: left core has right_dim={left_right}, right core has left_dim={right_left}")]
    BondDimensionMismatch {
        /// The site index where the mismatch occurred
        site: usize,
        /// Right dimension of the left core
        left_right: usize,
        /// Left dimension of the right core
        right_left: usize,
    },

    /// Recorded rank disagrees with the stored cores
    #[error("Rank bookkeeping mismatch at bond {bond}: recorded {recorded}, cores have {actual}")]
    RankMismatch {
        /// Bond index (0..=order)
        bond: usize,
        /// Rank stored in the rank vector
        recorded: usize,
        /// Rank implied by the cores
        actual: usize,
    },

    /// Chain with no sites
    #[error("Chain tensor is empty")]
    Empty,

    /// Invalid boundary conditions
    #[error("Invalid boundary conditions: first core must have left_dim=1, last core must have right_dim=1")]
    InvalidBoundary,

    /// Stack entry read before it was built
    #[error("{side} stack at site {site} has not been built")]
    StackNotBuilt {
        /// Stack identifier
        side: &'static str,
        /// The site index
        site: usize,
    },

    /// Local solve produced unusable values
    #[error("Numerical failure at site {site}: {message}")]
    NumericalFailure {
        /// The site index of the micro-system
        site: usize,
        /// Description of the failure
        message: String,
    },

    /// Invalid operation on chain tensors
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of the invalid operation
        message: String,
    },

    /// Dense linear-algebra error
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
}
