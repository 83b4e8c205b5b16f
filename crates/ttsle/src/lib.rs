#![warn(missing_docs)]
//! Linear systems in the tensor-train format
//!
//! This crate approximates the solution of `A x = b` where the operator `A`,
//! the right-hand side `b` and the unknown `x` are chain (tensor-train)
//! decompositions:
//! - [`als`]: alternating linear scheme, one site at a time, fixed ranks
//! - [`mals`]: modified alternating linear scheme, two sites at a time,
//!   ranks adapted by truncated SVD
//! - [`ChainTensor`]: the shared representation of operators and vectors
//! - [`contraction`]: exact products, inner products and residuals
//!
//! # Example
//!
//! ```
//! use ttsle::{als, AlsOptions, ChainTensor};
//!
//! let op = ChainTensor::identity(&[2, 2, 2])?;
//! let b = ChainTensor::rank_one(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![0.5, 1.0]])?;
//! let guess = ChainTensor::ones(&[2, 2, 2], &[1, 1, 1])?;
//!
//! let x = als(&op, &guess, &b, &AlsOptions::new(2))?;
//!
//! let (xv, _) = x.full();
//! let (bv, _) = b.full();
//! assert!(xv.iter().zip(&bv).all(|(p, q)| (p - q).abs() < 1e-10));
//! # Ok::<(), ttsle::SleError>(())
//! ```

pub mod chain;
pub mod contraction;
pub mod error;
pub mod local_solver;
pub mod micro;
pub mod options;
pub mod orthogonalize;
pub mod stack;
pub mod sweep;
pub mod types;

// Re-export main types
pub use chain::ChainTensor;
pub use contraction::{apply, inner, norm, relative_residual};
pub use error::{Result, SleError};
pub use local_solver::LocalSolver;
pub use micro::{assemble_als, assemble_mals, MicroSystem};
pub use options::{AlsOptions, MalsOptions, TruncationOptions};
pub use orthogonalize::{update_core_als, update_core_mals, Direction};
pub use stack::StackContext;
pub use sweep::{als, mals, validate_system};
pub use types::{tensor4_from_data, tensor4_zeros, Tensor3, Tensor4, Tensor4Ops};
