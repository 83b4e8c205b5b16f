//! Cached partial contractions (stacks) from either end of the chain
//!
//! For a system `A x = b` the sweep keeps four stacks, one slot per site:
//!
//! - `left_op[i]`: contraction of `x^T A x` over sites `0..i`, shape (ket, op, bra)
//! - `right_op[i]`: contraction of `x^T A x` over sites `i+1..order`, shape (ket, op, bra)
//! - `left_rhs[i]`: contraction of `b^T x` over sites `0..i`, shape (rhs, bra)
//! - `right_rhs[i]`: contraction of `b^T x` over sites `i+1..order`, shape (rhs, bra)
//!
//! Slots at the open ends hold the unit scalar. Each build step extends the
//! neighboring slot by one site, so slots must be built in sweep order.

use mdarray::DTensor;

use crate::chain::ChainTensor;
use crate::error::{Result, SleError};
use crate::types::{matrix2_zeros, tensor3_zeros, Matrix2, Tensor3, Tensor4, Tensor4Ops};

const LEFT_OP: &str = "left operator";
const RIGHT_OP: &str = "right operator";
const LEFT_RHS: &str = "left right-hand side";
const RIGHT_RHS: &str = "right right-hand side";

/// Stack slots for one solve
#[derive(Debug, Clone)]
pub struct StackContext {
    left_op: Vec<Option<Tensor3<f64>>>,
    right_op: Vec<Option<Tensor3<f64>>>,
    left_rhs: Vec<Option<Matrix2<f64>>>,
    right_rhs: Vec<Option<Matrix2<f64>>>,
}

impl StackContext {
    /// Create empty stacks for a chain with `order` sites
    pub fn new(order: usize) -> Self {
        Self {
            left_op: vec![None; order],
            right_op: vec![None; order],
            left_rhs: vec![None; order],
            right_rhs: vec![None; order],
        }
    }

    /// Number of slots per stack
    pub fn order(&self) -> usize {
        self.left_op.len()
    }

    /// Left operator stack at site `i`
    pub fn left_op(&self, i: usize) -> Result<&Tensor3<f64>> {
        slot(&self.left_op, i, LEFT_OP)
    }

    /// Right operator stack at site `i`
    pub fn right_op(&self, i: usize) -> Result<&Tensor3<f64>> {
        slot(&self.right_op, i, RIGHT_OP)
    }

    /// Left right-hand side stack at site `i`
    pub fn left_rhs(&self, i: usize) -> Result<&Matrix2<f64>> {
        slot(&self.left_rhs, i, LEFT_RHS)
    }

    /// Right right-hand side stack at site `i`
    pub fn right_rhs(&self, i: usize) -> Result<&Matrix2<f64>> {
        slot(&self.right_rhs, i, RIGHT_RHS)
    }

    /// Build `left_op[i]` from `left_op[i-1]` and the cores at site `i-1`
    pub fn build_left_op(
        &mut self,
        i: usize,
        operator: &ChainTensor,
        solution: &ChainTensor,
    ) -> Result<()> {
        let entry = if i == 0 {
            unit_tensor3()
        } else {
            let j = i - 1;
            let prev = self.left_op(j)?;
            let x = solution.core(j);
            let a = operator.core(j);
            check_op_site(j, prev, [x.left_dim(), a.left_dim(), x.left_dim()], a, x)?;
            contract_left_op(prev, a, x)
        };
        self.left_op[i] = Some(entry);
        Ok(())
    }

    /// Build `right_op[i]` from `right_op[i+1]` and the cores at site `i+1`
    pub fn build_right_op(
        &mut self,
        i: usize,
        operator: &ChainTensor,
        solution: &ChainTensor,
    ) -> Result<()> {
        let entry = if i + 1 == self.order() {
            unit_tensor3()
        } else {
            let j = i + 1;
            let next = self.right_op(j)?;
            let x = solution.core(j);
            let a = operator.core(j);
            check_op_site(j, next, [x.right_dim(), a.right_dim(), x.right_dim()], a, x)?;
            contract_right_op(next, a, x)
        };
        self.right_op[i] = Some(entry);
        Ok(())
    }

    /// Build `left_rhs[i]` from `left_rhs[i-1]` and the cores at site `i-1`
    pub fn build_left_rhs(
        &mut self,
        i: usize,
        right_hand_side: &ChainTensor,
        solution: &ChainTensor,
    ) -> Result<()> {
        let entry = if i == 0 {
            unit_matrix2()
        } else {
            let j = i - 1;
            let prev = self.left_rhs(j)?;
            let b = right_hand_side.core(j);
            let x = solution.core(j);
            check_rhs_site(j, prev, [b.left_dim(), x.left_dim()], b, x)?;
            contract_left_rhs(prev, b, x)
        };
        self.left_rhs[i] = Some(entry);
        Ok(())
    }

    /// Build `right_rhs[i]` from `right_rhs[i+1]` and the cores at site `i+1`
    pub fn build_right_rhs(
        &mut self,
        i: usize,
        right_hand_side: &ChainTensor,
        solution: &ChainTensor,
    ) -> Result<()> {
        let entry = if i + 1 == self.order() {
            unit_matrix2()
        } else {
            let j = i + 1;
            let next = self.right_rhs(j)?;
            let b = right_hand_side.core(j);
            let x = solution.core(j);
            check_rhs_site(j, next, [b.right_dim(), x.right_dim()], b, x)?;
            contract_right_rhs(next, b, x)
        };
        self.right_rhs[i] = Some(entry);
        Ok(())
    }
}

fn slot<'a, T>(stack: &'a [Option<T>], site: usize, side: &'static str) -> Result<&'a T> {
    stack
        .get(site)
        .and_then(Option::as_ref)
        .ok_or(SleError::StackNotBuilt { side, site })
}

fn unit_tensor3() -> Tensor3<f64> {
    Tensor3::from_elem([1, 1, 1], 1.0)
}

fn unit_matrix2() -> Matrix2<f64> {
    Matrix2::from_elem([1, 1], 1.0)
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

fn check_mode(site: usize, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(SleError::ModeMismatch {
            site,
            tensor: "solution",
            expected,
            got,
        });
    }
    Ok(())
}

fn check_op_site(
    site: usize,
    stack: &Tensor3<f64>,
    bonds: [usize; 3],
    a: &Tensor4<f64>,
    x: &Tensor4<f64>,
) -> Result<()> {
    for (axis, &bond) in bonds.iter().enumerate() {
        check_bond(site, stack.dim(axis), bond)?;
    }
    check_mode(site, a.col_dim(), x.row_dim())?;
    check_mode(site, a.row_dim(), x.row_dim())
}

fn check_rhs_site(
    site: usize,
    stack: &Matrix2<f64>,
    bonds: [usize; 2],
    b: &Tensor4<f64>,
    x: &Tensor4<f64>,
) -> Result<()> {
    for (axis, &bond) in bonds.iter().enumerate() {
        check_bond(site, stack.dim(axis), bond)?;
    }
    check_mode(site, b.row_dim(), x.row_dim())
}

/// new\[k',a',b'\] = sum prev\[k,a,b\] X\[k,col,k'\] A\[a,row,col,a'\] X\[b,row,b'\]
fn contract_left_op(prev: &Tensor3<f64>, a: &Tensor4<f64>, x: &Tensor4<f64>) -> Tensor3<f64> {
    let (rk, ra, rb) = (prev.dim(0), prev.dim(1), prev.dim(2));
    let (nrow, ncol) = (a.row_dim(), a.col_dim());
    let rk_new = x.right_dim();
    let ra_new = a.right_dim();

    // t1[a, b, col, k']
    let mut t1 = DTensor::<f64, 4>::from_elem([ra, rb, ncol, rk_new], 0.0);
    for k in 0..rk {
        for ia in 0..ra {
            for b in 0..rb {
                let p = prev[[k, ia, b]];
                if p == 0.0 {
                    continue;
                }
                for col in 0..ncol {
                    for kn in 0..rk_new {
                        t1[[ia, b, col, kn]] += p * *x.get4(k, col, 0, kn);
                    }
                }
            }
        }
    }

    // t2[b, row, k', a']
    let mut t2 = DTensor::<f64, 4>::from_elem([rb, nrow, rk_new, ra_new], 0.0);
    for ia in 0..ra {
        for row in 0..nrow {
            for col in 0..ncol {
                for an in 0..ra_new {
                    let av = *a.get4(ia, row, col, an);
                    if av == 0.0 {
                        continue;
                    }
                    for b in 0..rb {
                        for kn in 0..rk_new {
                            t2[[b, row, kn, an]] += t1[[ia, b, col, kn]] * av;
                        }
                    }
                }
            }
        }
    }

    let rb_new = x.right_dim();
    let mut result: Tensor3<f64> = tensor3_zeros(rk_new, ra_new, rb_new);
    for b in 0..rb {
        for row in 0..nrow {
            for bn in 0..rb_new {
                let xv = *x.get4(b, row, 0, bn);
                for kn in 0..rk_new {
                    for an in 0..ra_new {
                        result[[kn, an, bn]] += t2[[b, row, kn, an]] * xv;
                    }
                }
            }
        }
    }
    result
}

/// new\[k,a,b\] = sum X\[k,col,k'\] A\[a,row,col,a'\] X\[b,row,b'\] next\[k',a',b'\]
fn contract_right_op(next: &Tensor3<f64>, a: &Tensor4<f64>, x: &Tensor4<f64>) -> Tensor3<f64> {
    let (rk_next, ra_next, rb_next) = (next.dim(0), next.dim(1), next.dim(2));
    let (nrow, ncol) = (a.row_dim(), a.col_dim());
    let rk = x.left_dim();
    let ra = a.left_dim();

    // t1[k, col, a', b']
    let mut t1 = DTensor::<f64, 4>::from_elem([rk, ncol, ra_next, rb_next], 0.0);
    for k in 0..rk {
        for col in 0..ncol {
            for kn in 0..rk_next {
                let xv = *x.get4(k, col, 0, kn);
                if xv == 0.0 {
                    continue;
                }
                for an in 0..ra_next {
                    for bn in 0..rb_next {
                        t1[[k, col, an, bn]] += xv * next[[kn, an, bn]];
                    }
                }
            }
        }
    }

    // t2[k, a, row, b']
    let mut t2 = DTensor::<f64, 4>::from_elem([rk, ra, nrow, rb_next], 0.0);
    for ia in 0..ra {
        for row in 0..nrow {
            for col in 0..ncol {
                for an in 0..ra_next {
                    let av = *a.get4(ia, row, col, an);
                    if av == 0.0 {
                        continue;
                    }
                    for k in 0..rk {
                        for bn in 0..rb_next {
                            t2[[k, ia, row, bn]] += av * t1[[k, col, an, bn]];
                        }
                    }
                }
            }
        }
    }

    let rb = x.left_dim();
    let mut result: Tensor3<f64> = tensor3_zeros(rk, ra, rb);
    for b in 0..rb {
        for row in 0..nrow {
            for bn in 0..rb_next {
                let xv = *x.get4(b, row, 0, bn);
                for k in 0..rk {
                    for ia in 0..ra {
                        result[[k, ia, b]] += xv * t2[[k, ia, row, bn]];
                    }
                }
            }
        }
    }
    result
}

/// new\[beta',b'\] = sum prev\[beta,b\] B\[beta,row,beta'\] X\[b,row,b'\]
fn contract_left_rhs(prev: &Matrix2<f64>, bcore: &Tensor4<f64>, x: &Tensor4<f64>) -> Matrix2<f64> {
    let (rbeta, rb) = (prev.dim(0), prev.dim(1));
    let nrow = bcore.row_dim();
    let rbeta_new = bcore.right_dim();
    let rb_new = x.right_dim();

    // t1[b, row, beta']
    let mut t1: Tensor3<f64> = tensor3_zeros(rb, nrow, rbeta_new);
    for beta in 0..rbeta {
        for b in 0..rb {
            let p = prev[[beta, b]];
            for row in 0..nrow {
                for betan in 0..rbeta_new {
                    t1[[b, row, betan]] += p * *bcore.get4(beta, row, 0, betan);
                }
            }
        }
    }

    let mut result: Matrix2<f64> = matrix2_zeros(rbeta_new, rb_new);
    for b in 0..rb {
        for row in 0..nrow {
            for bn in 0..rb_new {
                let xv = *x.get4(b, row, 0, bn);
                for betan in 0..rbeta_new {
                    result[[betan, bn]] += t1[[b, row, betan]] * xv;
                }
            }
        }
    }
    result
}

/// new\[beta,b\] = sum B\[beta,row,beta'\] X\[b,row,b'\] next\[beta',b'\]
fn contract_right_rhs(next: &Matrix2<f64>, bcore: &Tensor4<f64>, x: &Tensor4<f64>) -> Matrix2<f64> {
    let (rbeta_next, rb_next) = (next.dim(0), next.dim(1));
    let nrow = bcore.row_dim();
    let rbeta = bcore.left_dim();
    let rb = x.left_dim();

    // t1[b, row, beta']
    let mut t1: Tensor3<f64> = tensor3_zeros(rb, nrow, rbeta_next);
    for b in 0..rb {
        for row in 0..nrow {
            for bn in 0..rb_next {
                let xv = *x.get4(b, row, 0, bn);
                for betan in 0..rbeta_next {
                    t1[[b, row, betan]] += xv * next[[betan, bn]];
                }
            }
        }
    }

    let mut result: Matrix2<f64> = matrix2_zeros(rbeta, rb);
    for beta in 0..rbeta {
        for row in 0..nrow {
            for betan in 0..rbeta_next {
                let bv = *bcore.get4(beta, row, 0, betan);
                for b in 0..rb {
                    result[[beta, b]] += bv * t1[[b, row, betan]];
                }
            }
        }
    }
    result
}
