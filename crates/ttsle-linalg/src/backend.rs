//! Backend dispatch helpers for dense linear algebra.
//!
//! QR and SVD go through mdarray-linalg with the faer backend. The LU and
//! one-shot solves are not covered by mdarray-linalg and call faer directly.
//!
//! All upstream types are wrapped here so that the rest of the workspace only
//! sees mdarray matrices and plain vectors.

use anyhow::Result;
use faer::linalg::solvers::PartialPivLu;
use faer::prelude::Solve;
use faer::Mat;
use mdarray::DSlice;
use mdarray_linalg::qr::QR;
use mdarray_linalg::svd::{SVDDecomp, SVD};
use mdarray_linalg_faer::Faer;

use crate::Matrix2;

fn to_faer(a: &Matrix2<f64>) -> Mat<f64> {
    Mat::from_fn(a.dim(0), a.dim(1), |i, j| a[[i, j]])
}

fn column_to_faer(b: &[f64]) -> Mat<f64> {
    Mat::from_fn(b.len(), 1, |i, _| b[i])
}

fn column_from_faer(x: &Mat<f64>) -> Vec<f64> {
    (0..x.nrows()).map(|i| x[(i, 0)]).collect()
}

/// Solve `A x = b` in one shot using a Householder QR decomposition.
pub(crate) fn qr_solve(a: &Matrix2<f64>, b: &[f64]) -> Vec<f64> {
    let qr = to_faer(a).qr();
    let x = qr.solve(&column_to_faer(b));
    column_from_faer(&x)
}

/// Partial-pivoting LU factorization kept for later substitution.
pub(crate) struct LuBackend {
    lu: PartialPivLu<f64>,
}

impl LuBackend {
    pub(crate) fn factor(a: &Matrix2<f64>) -> Self {
        Self {
            lu: to_faer(a).partial_piv_lu(),
        }
    }

    pub(crate) fn solve(&self, b: &[f64]) -> Vec<f64> {
        let x = self.lu.solve(&column_to_faer(b));
        column_from_faer(&x)
    }
}

/// Thin orthonormal factor Q (m x min(m, n)) of the QR decomposition.
///
/// The backend returns the full m x m factor; only the leading columns are kept.
pub(crate) fn thin_q_backend(a: &Matrix2<f64>) -> Matrix2<f64> {
    let rows = a.dim(0);
    let k = rows.min(a.dim(1));

    // The backend may overwrite its input
    let mut work = a.clone();
    let slice: &mut DSlice<f64, 2> = work.as_mut();
    let (q, _r) = Faer.qr(slice);
    Matrix2::<f64>::from_fn([rows, k], |idx| q[[idx[0], idx[1]]])
}

/// Result of a thin SVD with singular values sorted in non-increasing order.
pub(crate) struct SvdBackendResult {
    /// Left singular vectors (m x k)
    pub u: Matrix2<f64>,
    /// Singular values (length k)
    pub s: Vec<f64>,
    /// Right singular vectors, transposed (k x n)
    pub vt: Matrix2<f64>,
}

/// Compute the thin SVD `A = U diag(s) Vt` with k = min(m, n).
pub(crate) fn svd_backend(a: &Matrix2<f64>) -> Result<SvdBackendResult> {
    let rows = a.dim(0);
    let cols = a.dim(1);
    let k = rows.min(cols);

    let mut work = a.clone();
    let slice: &mut DSlice<f64, 2> = work.as_mut();
    let SVDDecomp { s, u, vt } = Faer
        .svd(slice)
        .map_err(|e| anyhow::anyhow!("SVD computation failed: {}", e))?;

    // Singular values live in the first row of `s` (LAPACK convention)
    let values: Vec<f64> = (0..k).map(|j| s[[0, j]]).collect();
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&x, &y| values[y].total_cmp(&values[x]));

    let s_sorted: Vec<f64> = order.iter().map(|&j| values[j]).collect();
    let u_sorted = Matrix2::<f64>::from_fn([rows, k], |idx| u[[idx[0], order[idx[1]]]]);
    let vt_sorted = Matrix2::<f64>::from_fn([k, cols], |idx| vt[[order[idx[0]], idx[1]]]);

    Ok(SvdBackendResult {
        u: u_sorted,
        s: s_sorted,
        vt: vt_sorted,
    })
}
