//! Micro-system assembly
//!
//! Projects the global system onto the site (ALS) or site pair (MALS) being
//! updated. Row indices are ordered (bra_left, row, bra_right) and column
//! indices (ket_left, col, ket_right), both row-major, so the solution of the
//! micro-system is the flattened core in its natural layout.

use mdarray::DTensor;

use crate::chain::ChainTensor;
use crate::error::{Result, SleError};
use crate::stack::StackContext;
use crate::types::{matrix2_zeros, tensor3_zeros, tensor4_zeros, Matrix2, Tensor3, Tensor4, Tensor4Ops};

/// Dense local system `matrix * core = rhs`
#[derive(Debug, Clone)]
pub struct MicroSystem {
    /// Projected operator
    pub matrix: Matrix2<f64>,
    /// Projected right-hand side
    pub rhs: Vec<f64>,
}

impl MicroSystem {
    /// Number of rows of the projected operator
    pub fn rows(&self) -> usize {
        self.matrix.dim(0)
    }

    /// Number of columns of the projected operator
    pub fn cols(&self) -> usize {
        self.matrix.dim(1)
    }
}

/// Assemble the micro-system for the single site `i`
pub fn assemble_als(
    i: usize,
    stacks: &StackContext,
    operator: &ChainTensor,
    right_hand_side: &ChainTensor,
) -> Result<MicroSystem> {
    let matrix = project_operator(
        i,
        stacks.left_op(i)?,
        operator.core(i),
        stacks.right_op(i)?,
    )?;
    let rhs = project_rhs(
        i,
        stacks.left_rhs(i)?,
        right_hand_side.core(i),
        stacks.right_rhs(i)?,
    )?;
    Ok(MicroSystem { matrix, rhs })
}

/// Assemble the micro-system for the site pair `(i, i+1)`
pub fn assemble_mals(
    i: usize,
    stacks: &StackContext,
    operator: &ChainTensor,
    right_hand_side: &ChainTensor,
) -> Result<MicroSystem> {
    let op_pair = fuse_pair(i, operator.core(i), operator.core(i + 1))?;
    let rhs_pair = fuse_pair(i, right_hand_side.core(i), right_hand_side.core(i + 1))?;
    let matrix = project_operator(i, stacks.left_op(i)?, &op_pair, stacks.right_op(i + 1)?)?;
    let rhs = project_rhs(
        i,
        stacks.left_rhs(i)?,
        &rhs_pair,
        stacks.right_rhs(i + 1)?,
    )?;
    Ok(MicroSystem { matrix, rhs })
}

/// Contract two neighboring cores over their shared bond
///
/// The result has shape (left1, row1 * row2, col1 * col2, right2) with the
/// fused modes in row-major order.
pub fn fuse_pair(site: usize, first: &Tensor4<f64>, second: &Tensor4<f64>) -> Result<Tensor4<f64>> {
    if first.right_dim() != second.left_dim() {
        return Err(SleError::BondDimensionMismatch {
            site,
            left_right: first.right_dim(),
            right_left: second.left_dim(),
        });
    }
    let (r1, c1) = (first.row_dim(), first.col_dim());
    let (r2, c2) = (second.row_dim(), second.col_dim());
    let mut fused: Tensor4<f64> = tensor4_zeros(first.left_dim(), r1 * r2, c1 * c2, second.right_dim());

    for l in 0..first.left_dim() {
        for s1 in 0..r1 {
            for t1 in 0..c1 {
                for m in 0..first.right_dim() {
                    let v = *first.get4(l, s1, t1, m);
                    if v == 0.0 {
                        continue;
                    }
                    for s2 in 0..r2 {
                        for t2 in 0..c2 {
                            for r in 0..second.right_dim() {
                                let old = *fused.get4(l, s1 * r2 + s2, t1 * c2 + t2, r);
                                fused.set4(
                                    l,
                                    s1 * r2 + s2,
                                    t1 * c2 + t2,
                                    r,
                                    old + v * *second.get4(m, s2, t2, r),
                                );
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(fused)
}

fn check_bond(site: usize, stack_dim: usize, core_dim: usize) -> Result<()> {
    if stack_dim != core_dim {
        return Err(SleError::BondDimensionMismatch {
            site,
            left_right: stack_dim,
            right_left: core_dim,
        });
    }
    Ok(())
}

/// M\[(b,row,b'),(k,col,k')\] = sum L\[k,a,b\] A\[a,row,col,a'\] R\[k',a',b'\]
fn project_operator(
    site: usize,
    left: &Tensor3<f64>,
    a: &Tensor4<f64>,
    right: &Tensor3<f64>,
) -> Result<Matrix2<f64>> {
    check_bond(site, left.dim(1), a.left_dim())?;
    check_bond(site, a.right_dim(), right.dim(1))?;

    let (rk_l, ra_l, rb_l) = (left.dim(0), left.dim(1), left.dim(2));
    let (rk_r, ra_r, rb_r) = (right.dim(0), right.dim(1), right.dim(2));
    let (nrow, ncol) = (a.row_dim(), a.col_dim());

    // t1[k, b, row, col, a']
    let mut t1 = DTensor::<f64, 5>::from_elem([rk_l, rb_l, nrow, ncol, ra_r], 0.0);
    for k in 0..rk_l {
        for ia in 0..ra_l {
            for b in 0..rb_l {
                let lv = left[[k, ia, b]];
                if lv == 0.0 {
                    continue;
                }
                for row in 0..nrow {
                    for col in 0..ncol {
                        for an in 0..ra_r {
                            t1[[k, b, row, col, an]] += lv * *a.get4(ia, row, col, an);
                        }
                    }
                }
            }
        }
    }

    let rows = rb_l * nrow * rb_r;
    let cols = rk_l * ncol * rk_r;
    let mut matrix: Matrix2<f64> = matrix2_zeros(rows, cols);
    for k in 0..rk_l {
        for b in 0..rb_l {
            for row in 0..nrow {
                for col in 0..ncol {
                    for an in 0..ra_r {
                        let tv = t1[[k, b, row, col, an]];
                        if tv == 0.0 {
                            continue;
                        }
                        for kn in 0..rk_r {
                            for bn in 0..rb_r {
                                let r = (b * nrow + row) * rb_r + bn;
                                let c = (k * ncol + col) * rk_r + kn;
                                matrix[[r, c]] += tv * right[[kn, an, bn]];
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(matrix)
}

/// v\[(b,row,b')\] = sum Lb\[beta,b\] B\[beta,row,beta'\] Rb\[beta',b'\]
fn project_rhs(
    site: usize,
    left: &Matrix2<f64>,
    bcore: &Tensor4<f64>,
    right: &Matrix2<f64>,
) -> Result<Vec<f64>> {
    check_bond(site, left.dim(0), bcore.left_dim())?;
    check_bond(site, bcore.right_dim(), right.dim(0))?;

    let (rbeta_l, rb_l) = (left.dim(0), left.dim(1));
    let (rbeta_r, rb_r) = (right.dim(0), right.dim(1));
    let nrow = bcore.row_dim();

    // t[b, row, beta']
    let mut t: Tensor3<f64> = tensor3_zeros(rb_l, nrow, rbeta_r);
    for beta in 0..rbeta_l {
        for b in 0..rb_l {
            let lv = left[[beta, b]];
            for row in 0..nrow {
                for betan in 0..rbeta_r {
                    t[[b, row, betan]] += lv * *bcore.get4(beta, row, 0, betan);
                }
            }
        }
    }

    let mut rhs = vec![0.0; rb_l * nrow * rb_r];
    for b in 0..rb_l {
        for row in 0..nrow {
            for betan in 0..rbeta_r {
                let tv = t[[b, row, betan]];
                for bn in 0..rb_r {
                    rhs[(b * nrow + row) * rb_r + bn] += tv * right[[betan, bn]];
                }
            }
        }
    }
    Ok(rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contraction::apply;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn build_all(
        stacks: &mut StackContext,
        op: &ChainTensor,
        x: &ChainTensor,
        b: &ChainTensor,
    ) {
        let order = op.order();
        for i in 0..order {
            stacks.build_left_op(i, op, x).unwrap();
            stacks.build_left_rhs(i, b, x).unwrap();
        }
        for i in (0..order).rev() {
            stacks.build_right_op(i, op, x).unwrap();
            stacks.build_right_rhs(i, b, x).unwrap();
        }
    }

    fn matvec(m: &Matrix2<f64>, v: &[f64]) -> Vec<f64> {
        (0..m.dim(0))
            .map(|r| (0..m.dim(1)).map(|c| m[[r, c]] * v[c]).sum())
            .collect()
    }

    fn flatten(core: &Tensor4<f64>) -> Vec<f64> {
        let mut out = Vec::new();
        for l in 0..core.left_dim() {
            for s in 0..core.row_dim() {
                for r in 0..core.right_dim() {
                    out.push(*core.get4(l, s, 0, r));
                }
            }
        }
        out
    }

    fn random_operator_and_vector(seed: u64) -> (ChainTensor, ChainTensor) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let op = ChainTensor::random(&[2, 2, 3], &[2, 2, 3], &[1, 2, 2, 1], &mut rng).unwrap();
        let x = ChainTensor::random(&[2, 2, 3], &[1, 1, 1], &[1, 2, 3, 1], &mut rng).unwrap();
        (op, x)
    }

    #[test]
    fn test_single_site_matches_dense() {
        let mut a: Tensor4<f64> = tensor4_zeros(1, 2, 2, 1);
        a.set4(0, 0, 0, 0, 2.0);
        a.set4(0, 0, 1, 0, -1.0);
        a.set4(0, 1, 0, 0, 0.5);
        a.set4(0, 1, 1, 0, 3.0);
        let op = ChainTensor::new(vec![a]).unwrap();
        let b = ChainTensor::rank_one(&[vec![4.0, 5.0]]).unwrap();
        let x = ChainTensor::ones(&[2], &[1]).unwrap();

        let mut stacks = StackContext::new(1);
        build_all(&mut stacks, &op, &x, &b);
        let micro = assemble_als(0, &stacks, &op, &b).unwrap();

        assert_eq!((micro.rows(), micro.cols()), (2, 2));
        assert_eq!(micro.matrix[[0, 1]], -1.0);
        assert_eq!(micro.matrix[[1, 0]], 0.5);
        assert_eq!(micro.rhs, vec![4.0, 5.0]);
    }

    #[test]
    fn test_als_projection_is_consistent_with_apply() {
        // M * vec(x_i) equals the projected right-hand side of A x.
        let (op, x) = random_operator_and_vector(11);
        let ax = apply(&op, &x).unwrap();
        let mut stacks = StackContext::new(op.order());
        build_all(&mut stacks, &op, &x, &ax);

        for i in 0..op.order() {
            let micro = assemble_als(i, &stacks, &op, &ax).unwrap();
            assert_eq!(micro.rows(), micro.cols());
            let lhs = matvec(&micro.matrix, &flatten(x.core(i)));
            for (p, q) in lhs.iter().zip(&micro.rhs) {
                assert_abs_diff_eq!(*p, *q, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_mals_projection_is_consistent_with_apply() {
        let (op, x) = random_operator_and_vector(12);
        let ax = apply(&op, &x).unwrap();
        let mut stacks = StackContext::new(op.order());
        build_all(&mut stacks, &op, &x, &ax);

        for i in 0..op.order() - 1 {
            let micro = assemble_mals(i, &stacks, &op, &ax).unwrap();
            let pair = fuse_pair(i, x.core(i), x.core(i + 1)).unwrap();
            let expected_dim = x.rank(i) * x.row_dim(i) * x.row_dim(i + 1) * x.rank(i + 2);
            assert_eq!(micro.rows(), expected_dim);
            assert_eq!(micro.cols(), expected_dim);
            let lhs = matvec(&micro.matrix, &flatten(&pair));
            for (p, q) in lhs.iter().zip(&micro.rhs) {
                assert_abs_diff_eq!(*p, *q, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_fuse_pair_layout() {
        let op = ChainTensor::identity(&[2, 3]).unwrap();
        let fused = fuse_pair(0, op.core(0), op.core(1)).unwrap();
        assert_eq!(fused.row_dim(), 6);
        assert_eq!(fused.col_dim(), 6);
        for r in 0..6 {
            for c in 0..6 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_eq!(*fused.get4(0, r, c, 0), expected);
            }
        }
    }

    #[test]
    fn test_fuse_pair_rejects_bond_mismatch() {
        let a: Tensor4<f64> = tensor4_zeros(1, 2, 2, 2);
        let b: Tensor4<f64> = tensor4_zeros(3, 2, 2, 1);
        assert!(matches!(
            fuse_pair(4, &a, &b),
            Err(SleError::BondDimensionMismatch { site: 4, .. })
        ));
    }

    #[test]
    fn test_missing_stack_is_reported() {
        let (op, x) = random_operator_and_vector(13);
        let stacks = StackContext::new(op.order());
        assert!(matches!(
            assemble_als(1, &stacks, &op, &x),
            Err(SleError::StackNotBuilt { site: 1, .. })
        ));
    }
}
