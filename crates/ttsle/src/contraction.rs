//! Contractions of chain tensors
//!
//! - [`apply`]: exact operator-times-tensor product, bond dimensions multiply
//! - [`inner`]: inner product (returns scalar)
//! - [`norm`], [`relative_residual`]: diagnostics built on [`inner`]

use crate::chain::ChainTensor;
use crate::error::{Result, SleError};
use crate::types::{matrix2_zeros, tensor3_zeros, tensor4_zeros, Matrix2, Tensor3, Tensor4, Tensor4Ops};

fn check_orders(left: &ChainTensor, right: &ChainTensor, what: &str) -> Result<()> {
    if left.order() != right.order() {
        return Err(SleError::InvalidOperation {
            message: format!(
                "Cannot compute {} of chains with different lengths: {} vs {}",
                what,
                left.order(),
                right.order()
            ),
        });
    }
    Ok(())
}

/// Exact product `operator * x` in the chain format
///
/// `x` may be a vector or another operator. At every site the column mode of
/// `operator` is contracted with the row mode of `x`; the new bond at bond
/// `i` has dimension `operator.rank(i) * x.rank(i)`.
pub fn apply(operator: &ChainTensor, x: &ChainTensor) -> Result<ChainTensor> {
    check_orders(operator, x, "product")?;

    let mut cores = Vec::with_capacity(operator.order());
    for (site, (a, b)) in operator.cores().iter().zip(x.cores()).enumerate() {
        if a.col_dim() != b.row_dim() {
            return Err(SleError::ModeMismatch {
                site,
                tensor: "x",
                expected: a.col_dim(),
                got: b.row_dim(),
            });
        }

        let (la, lb) = (a.left_dim(), b.left_dim());
        let (ra, rb) = (a.right_dim(), b.right_dim());
        let (nrow, nshared, ncol) = (a.row_dim(), a.col_dim(), b.col_dim());
        let mut core: Tensor4<f64> = tensor4_zeros(la * lb, nrow, ncol, ra * rb);

        for ia in 0..la {
            for ib in 0..lb {
                for s1 in 0..nrow {
                    for s2 in 0..ncol {
                        for ja in 0..ra {
                            for jb in 0..rb {
                                let mut sum = 0.0;
                                for k in 0..nshared {
                                    sum += *a.get4(ia, s1, k, ja) * *b.get4(ib, k, s2, jb);
                                }
                                core.set4(ia * lb + ib, s1, s2, ja * rb + jb, sum);
                            }
                        }
                    }
                }
            }
        }
        cores.push(core);
    }

    ChainTensor::new(cores)
}

/// Inner product of two chains with identical mode dimensions
///
/// Returns: sum over all indices of x\[i\] * y\[i\]
pub fn inner(x: &ChainTensor, y: &ChainTensor) -> Result<f64> {
    check_orders(x, y, "inner product")?;

    // env[a, b] after absorbing sites 0..=i
    let mut env: Matrix2<f64> = matrix2_zeros(1, 1);
    env[[0, 0]] = 1.0;

    for (site, (xc, yc)) in x.cores().iter().zip(y.cores()).enumerate() {
        if xc.row_dim() != yc.row_dim() || xc.col_dim() != yc.col_dim() {
            return Err(SleError::InvalidOperation {
                message: format!(
                    "Site dimensions mismatch at site {}: ({}, {}) vs ({}, {})",
                    site,
                    xc.row_dim(),
                    xc.col_dim(),
                    yc.row_dim(),
                    yc.col_dim()
                ),
            });
        }

        let (lx, ly) = (xc.left_dim(), yc.left_dim());
        let (rx, ry) = (xc.right_dim(), yc.right_dim());
        let modes = xc.row_dim() * xc.col_dim();
        let ncol = xc.col_dim();

        // t[b, (s, t), a']
        let mut t: Tensor3<f64> = tensor3_zeros(ly, modes, rx);
        for a in 0..lx {
            for b in 0..ly {
                let e = env[[a, b]];
                if e == 0.0 {
                    continue;
                }
                for m in 0..modes {
                    for an in 0..rx {
                        t[[b, m, an]] += e * *xc.get4(a, m / ncol, m % ncol, an);
                    }
                }
            }
        }

        let mut next: Matrix2<f64> = matrix2_zeros(rx, ry);
        for b in 0..ly {
            for m in 0..modes {
                for bn in 0..ry {
                    let yv = *yc.get4(b, m / ncol, m % ncol, bn);
                    if yv == 0.0 {
                        continue;
                    }
                    for an in 0..rx {
                        next[[an, bn]] += t[[b, m, an]] * yv;
                    }
                }
            }
        }
        env = next;
    }

    Ok(env[[0, 0]])
}

/// Frobenius norm of a chain
pub fn norm(x: &ChainTensor) -> Result<f64> {
    Ok(inner(x, x)?.max(0.0).sqrt())
}

/// Relative residual `||A x - b|| / ||b||`
///
/// Computed from inner products as `<Ax, Ax> - 2 <Ax, b> + <b, b>`, clamped
/// at zero, so the result is accurate only down to about the square root of
/// machine precision. If `b` is zero the absolute residual is returned.
pub fn relative_residual(
    operator: &ChainTensor,
    x: &ChainTensor,
    right_hand_side: &ChainTensor,
) -> Result<f64> {
    let ax = apply(operator, x)?;
    let ax_ax = inner(&ax, &ax)?;
    let ax_b = inner(&ax, right_hand_side)?;
    let b_b = inner(right_hand_side, right_hand_side)?;

    let residual = (ax_ax - 2.0 * ax_b + b_b).max(0.0).sqrt();
    if b_b > 0.0 {
        Ok(residual / b_b.sqrt())
    } else {
        Ok(residual)
    }
}
