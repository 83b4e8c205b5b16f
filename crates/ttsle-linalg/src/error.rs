//! Error types for dense linear-algebra operations

use thiserror::Error;

/// Result type for dense linear-algebra operations
pub type Result<T> = std::result::Result<T, LinalgError>;

/// Errors that can occur in the dense primitives
#[derive(Debug, Error)]
pub enum LinalgError {
    /// A square matrix was required
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Right-hand side length does not match the matrix
    #[error("Right-hand side length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// The expected length
        expected: usize,
        /// The actual length provided
        got: usize,
    },

    /// Empty matrix
    #[error("Cannot decompose an empty {rows}x{cols} matrix")]
    EmptyMatrix {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Backend failure
    #[error("Backend computation failed: {0}")]
    Backend(#[from] anyhow::Error),
}
