//! ALS and MALS sweep controllers
//!
//! Both algorithms follow the same schedule. Right stacks are built once from
//! the initial guess. Every sweep then runs a forward half-sweep that extends
//! the left stacks and updates all sites (pairs) except the last, followed by
//! a backward half-sweep that rebuilds the right stacks and updates every
//! site (pair) down to the first. The number of sweeps is fixed.

use tracing::{debug, trace, warn, Level};

use crate::chain::ChainTensor;
use crate::contraction::relative_residual;
use crate::error::{Result, SleError};
use crate::micro::{assemble_als, assemble_mals};
use crate::options::{AlsOptions, MalsOptions};
use crate::orthogonalize::{update_core_als, update_core_mals, Direction};
use crate::stack::StackContext;

/// Approximate the solution of `operator * x = right_hand_side` with the
/// alternating linear scheme.
///
/// The solution keeps the ranks of `initial_guess`, except where a QR or RQ
/// decomposition caps a rank at the size of the reshaped core.
///
/// # Arguments
/// * `operator` - The operator `A`
/// * `initial_guess` - Starting point for `x`; copied, never modified
/// * `right_hand_side` - The right-hand side `b`
/// * `options` - Number of sweeps and micro-system solver
///
/// # Errors
/// Returns an error if the three chains are incompatible, if a micro-system
/// cannot be solved, or if a local solution is not finite.
#[tracing::instrument(skip_all, fields(order = operator.order(), repeats = options.repeats))]
pub fn als(
    operator: &ChainTensor,
    initial_guess: &ChainTensor,
    right_hand_side: &ChainTensor,
    options: &AlsOptions,
) -> Result<ChainTensor> {
    validate_system(operator, initial_guess, right_hand_side)?;

    let order = operator.order();
    let mut solution = initial_guess.copy();
    let mut stacks = StackContext::new(order);

    for i in (0..order).rev() {
        stacks.build_right_op(i, operator, &solution)?;
        stacks.build_right_rhs(i, right_hand_side, &solution)?;
    }

    for sweep in 0..options.repeats {
        for i in 0..order {
            stacks.build_left_op(i, operator, &solution)?;
            stacks.build_left_rhs(i, right_hand_side, &solution)?;

            if i + 1 < order {
                let micro = assemble_als(i, &stacks, operator, right_hand_side)?;
                let values = options.solver.solve(i, &micro)?;
                update_core_als(i, &values, &mut solution, Direction::Forward)?;
                trace!(site = i, rank = solution.rank(i + 1), "forward update");
            }
        }

        for i in (0..order).rev() {
            stacks.build_right_op(i, operator, &solution)?;
            stacks.build_right_rhs(i, right_hand_side, &solution)?;

            let micro = assemble_als(i, &stacks, operator, right_hand_side)?;
            let values = options.solver.solve(i, &micro)?;
            update_core_als(i, &values, &mut solution, Direction::Backward)?;
            trace!(site = i, rank = solution.rank(i), "backward update");
        }

        log_sweep(sweep, operator, &solution, right_hand_side);
    }

    Ok(solution)
}

/// Approximate the solution of `operator * x = right_hand_side` with the
/// modified alternating linear scheme.
///
/// Pairs of neighboring sites are solved together and split by a truncated
/// SVD, so the solution ranks adapt to the problem within the limits set by
/// `options.truncation`. A one-site chain has no pair to update; the copy of
/// `initial_guess` is returned unchanged.
///
/// # Errors
/// Returns an error if the options are invalid, if the three chains are
/// incompatible, if a micro-system cannot be solved, or if a local solution
/// is not finite.
#[tracing::instrument(skip_all, fields(order = operator.order(), repeats = options.repeats))]
pub fn mals(
    operator: &ChainTensor,
    initial_guess: &ChainTensor,
    right_hand_side: &ChainTensor,
    options: &MalsOptions,
) -> Result<ChainTensor> {
    options.validate()?;
    validate_system(operator, initial_guess, right_hand_side)?;

    let order = operator.order();
    let mut solution = initial_guess.copy();
    if order < 2 {
        warn!(order, "MALS needs at least two sites, returning the initial guess");
        return Ok(solution);
    }

    let mut stacks = StackContext::new(order);
    for i in (1..order).rev() {
        stacks.build_right_op(i, operator, &solution)?;
        stacks.build_right_rhs(i, right_hand_side, &solution)?;
    }

    for sweep in 0..options.repeats {
        for i in 0..order - 1 {
            stacks.build_left_op(i, operator, &solution)?;
            stacks.build_left_rhs(i, right_hand_side, &solution)?;

            if i + 2 < order {
                let micro = assemble_mals(i, &stacks, operator, right_hand_side)?;
                let values = options.solver.solve(i, &micro)?;
                let rank = update_core_mals(
                    i,
                    &values,
                    &mut solution,
                    Direction::Forward,
                    &options.truncation,
                )?;
                trace!(site = i, rank, "forward update");
            }
        }

        for i in (0..order - 1).rev() {
            stacks.build_right_op(i + 1, operator, &solution)?;
            stacks.build_right_rhs(i + 1, right_hand_side, &solution)?;

            let micro = assemble_mals(i, &stacks, operator, right_hand_side)?;
            let values = options.solver.solve(i, &micro)?;
            let rank = update_core_mals(
                i,
                &values,
                &mut solution,
                Direction::Backward,
                &options.truncation,
            )?;
            trace!(site = i, rank, "backward update");
        }

        log_sweep(sweep, operator, &solution, right_hand_side);
    }

    Ok(solution)
}

/// Check that operator, initial guess and right-hand side describe one system
///
/// The three chains must have the same order, the initial guess and the
/// right-hand side must be vectors, the operator rows must match the
/// right-hand side and the operator columns must match the initial guess.
/// Every operator core must map a site onto itself (row dim == col dim).
pub fn validate_system(
    operator: &ChainTensor,
    initial_guess: &ChainTensor,
    right_hand_side: &ChainTensor,
) -> Result<()> {
    let order = operator.order();
    if initial_guess.order() != order || right_hand_side.order() != order {
        return Err(SleError::OrderMismatch {
            operator: order,
            initial_guess: initial_guess.order(),
            right_hand_side: right_hand_side.order(),
        });
    }

    for site in 0..order {
        for (tensor, chain) in [
            ("initial guess", initial_guess),
            ("right-hand side", right_hand_side),
        ] {
            if chain.col_dim(site) != 1 {
                return Err(SleError::NotAVector {
                    tensor,
                    site,
                    col_dim: chain.col_dim(site),
                });
            }
        }
        if right_hand_side.row_dim(site) != operator.row_dim(site) {
            return Err(SleError::ModeMismatch {
                site,
                tensor: "right-hand side",
                expected: operator.row_dim(site),
                got: right_hand_side.row_dim(site),
            });
        }
        if initial_guess.row_dim(site) != operator.col_dim(site) {
            return Err(SleError::ModeMismatch {
                site,
                tensor: "initial guess",
                expected: operator.col_dim(site),
                got: initial_guess.row_dim(site),
            });
        }
        if operator.row_dim(site) != operator.col_dim(site) {
            return Err(SleError::NonSquareOperator {
                site,
                row_dim: operator.row_dim(site),
                col_dim: operator.col_dim(site),
            });
        }
    }
    Ok(())
}

fn log_sweep(
    sweep: usize,
    operator: &ChainTensor,
    solution: &ChainTensor,
    right_hand_side: &ChainTensor,
) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    match relative_residual(operator, solution, right_hand_side) {
        Ok(residual) => debug!(sweep, ranks = ?solution.ranks(), residual, "sweep finished"),
        Err(err) => debug!(sweep, ranks = ?solution.ranks(), %err, "sweep finished"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_system_accepts_matching_chains() {
        let op = ChainTensor::identity(&[2, 3]).unwrap();
        let x = ChainTensor::ones(&[2, 3], &[1, 1]).unwrap();
        assert!(validate_system(&op, &x, &x).is_ok());
    }

    #[test]
    fn test_validate_system_order_mismatch() {
        let op = ChainTensor::identity(&[2, 2, 2, 2]).unwrap();
        let x = ChainTensor::ones(&[2, 2, 2, 2], &[1, 1, 1, 1]).unwrap();
        let b = ChainTensor::ones(&[2, 2, 2], &[1, 1, 1]).unwrap();
        assert!(matches!(
            validate_system(&op, &x, &b),
            Err(SleError::OrderMismatch {
                operator: 4,
                initial_guess: 4,
                right_hand_side: 3
            })
        ));
    }

    #[test]
    fn test_validate_system_not_a_vector() {
        let op = ChainTensor::identity(&[2, 2]).unwrap();
        let x = ChainTensor::ones(&[2, 2], &[1, 1]).unwrap();
        let b = ChainTensor::ones(&[2, 2], &[1, 2]).unwrap();
        assert!(matches!(
            validate_system(&op, &x, &b),
            Err(SleError::NotAVector {
                tensor: "right-hand side",
                site: 1,
                col_dim: 2
            })
        ));
    }

    #[test]
    fn test_validate_system_mode_mismatch() {
        let op = ChainTensor::identity(&[2, 3]).unwrap();
        let x = ChainTensor::ones(&[2, 3], &[1, 1]).unwrap();
        let b = ChainTensor::ones(&[2, 4], &[1, 1]).unwrap();
        assert!(matches!(
            validate_system(&op, &x, &b),
            Err(SleError::ModeMismatch {
                site: 1,
                tensor: "right-hand side",
                expected: 3,
                got: 4
            })
        ));

        let x = ChainTensor::ones(&[3, 3], &[1, 1]).unwrap();
        assert!(matches!(
            validate_system(&op, &x, &b),
            Err(SleError::ModeMismatch {
                site: 0,
                tensor: "initial guess",
                ..
            })
        ));
    }
}
