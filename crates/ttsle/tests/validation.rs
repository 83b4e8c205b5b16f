//! Tests for argument validation of the sweep entry points
//!
//! Every failure here must be reported before any micro-system is solved,
//! and the caller's tensors must be left as they were.

use std::str::FromStr;

use ttsle::{
    als, mals, tensor4_zeros, AlsOptions, ChainTensor, LocalSolver, MalsOptions, SleError, Tensor4,
    Tensor4Ops,
};

fn snapshot(chains: &[&ChainTensor]) -> Vec<(Vec<f64>, Vec<usize>)> {
    chains
        .iter()
        .map(|c| (c.full().0, c.ranks().to_vec()))
        .collect()
}

#[test]
fn test_order_mismatch_is_rejected() {
    let op = ChainTensor::identity(&[2, 2, 2, 2]).unwrap();
    let guess = ChainTensor::ones(&[2, 2, 2, 2], &[1, 1, 1, 1]).unwrap();
    let b = ChainTensor::rank_one(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
    let before = snapshot(&[&op, &guess, &b]);

    let err = als(&op, &guess, &b, &AlsOptions::new(1)).unwrap_err();
    assert!(matches!(
        err,
        SleError::OrderMismatch {
            operator: 4,
            initial_guess: 4,
            right_hand_side: 3
        }
    ));

    let err = mals(&op, &guess, &b, &MalsOptions::new(1)).unwrap_err();
    assert!(matches!(err, SleError::OrderMismatch { .. }));

    assert_eq!(snapshot(&[&op, &guess, &b]), before);
}

#[test]
fn test_mode_mismatch_is_rejected() {
    let op = ChainTensor::identity(&[2, 3]).unwrap();
    let guess = ChainTensor::ones(&[2, 3], &[1, 1]).unwrap();
    let b = ChainTensor::ones(&[2, 2], &[1, 1]).unwrap();

    let err = als(&op, &guess, &b, &AlsOptions::new(1)).unwrap_err();
    assert!(matches!(
        err,
        SleError::ModeMismatch {
            site: 1,
            tensor: "right-hand side",
            expected: 3,
            got: 2
        }
    ));

    let bad_guess = ChainTensor::ones(&[2, 2], &[1, 1]).unwrap();
    let err = mals(&op, &bad_guess, &guess, &MalsOptions::new(1)).unwrap_err();
    assert!(matches!(
        err,
        SleError::ModeMismatch {
            site: 1,
            tensor: "initial guess",
            ..
        }
    ));
}

#[test]
fn test_operator_as_right_hand_side_is_rejected() {
    let op = ChainTensor::identity(&[2, 2]).unwrap();
    let guess = ChainTensor::ones(&[2, 2], &[1, 1]).unwrap();

    let err = als(&op, &guess, &op, &AlsOptions::new(1)).unwrap_err();
    assert!(matches!(
        err,
        SleError::NotAVector {
            tensor: "right-hand side",
            site: 0,
            col_dim: 2
        }
    ));

    let err = als(&op, &op, &guess, &AlsOptions::new(1)).unwrap_err();
    assert!(matches!(
        err,
        SleError::NotAVector {
            tensor: "initial guess",
            ..
        }
    ));
}

#[test]
fn test_invalid_truncation_is_rejected() {
    let op = ChainTensor::identity(&[2, 2]).unwrap();
    let x = ChainTensor::ones(&[2, 2], &[1, 1]).unwrap();

    for options in [
        MalsOptions::new(1).with_threshold(-1.0),
        MalsOptions::new(1).with_threshold(f64::NAN),
        MalsOptions::new(1).with_max_rank(0),
    ] {
        let err = mals(&op, &x, &x, &options).unwrap_err();
        assert!(matches!(err, SleError::InvalidConfig { .. }));
    }
}

#[test]
fn test_unknown_solver_name_is_rejected() {
    let err = LocalSolver::from_str("qr").unwrap_err();
    assert!(matches!(err, SleError::InvalidConfig { .. }));
    assert!(err.to_string().contains("qr"));
}

/// Operator mapping 3 columns onto 2 rows at every site
fn non_square_operator(order: usize) -> ChainTensor {
    let cores = (0..order)
        .map(|_| {
            let mut core: Tensor4<f64> = tensor4_zeros(1, 2, 3, 1);
            for s in 0..2 {
                core.set4(0, s, s, 0, 1.0);
            }
            core
        })
        .collect();
    ChainTensor::new(cores).unwrap()
}

#[test]
fn test_non_square_operator_is_rejected() {
    for order in [1, 2, 3] {
        let op = non_square_operator(order);
        let guess = ChainTensor::ones(&vec![3; order], &vec![1; order]).unwrap();
        let b = ChainTensor::ones(&vec![2; order], &vec![1; order]).unwrap();

        let expected = |err: SleError| {
            matches!(
                err,
                SleError::NonSquareOperator {
                    site: 0,
                    row_dim: 2,
                    col_dim: 3
                }
            )
        };
        assert!(expected(als(&op, &guess, &b, &AlsOptions::new(1)).unwrap_err()));
        assert!(expected(mals(&op, &guess, &b, &MalsOptions::new(1)).unwrap_err()));
    }
}
