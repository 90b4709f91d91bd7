//! Least squares solver.
//!
//! We repeatedly solve small ordinary least squares problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! once per (degree, fold) pair plus once for the final surface.
//!
//! Implementation choices:
//! - SVD rather than normal equations, so a tall design matrix is fine and the
//!   singular values double as a rank check.
//! - A degenerate system is reported, never patched up: a minimum-norm solution
//!   of a rank-deficient design would silently bias the cross-validated error.

use nalgebra::{DMatrix, DVector};

use crate::error::FitFailure;

/// Singular values below `RANK_RTOL * σ_max` count as zero.
const RANK_RTOL: f64 = 1e-10;

/// Solve a least squares problem using SVD.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, FitFailure> {
    let (n, p) = x.shape();
    if n < p {
        return Err(FitFailure::InsufficientData {
            observations: n,
            parameters: p,
        });
    }

    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    let tol = RANK_RTOL * sigma_max;
    let rank = svd.rank(tol);
    if sigma_max <= 0.0 || rank < p {
        return Err(FitFailure::RankDeficient { rank, parameters: p });
    }

    let beta = svd.solve(y, tol).map_err(|_| FitFailure::NonFinite)?;
    if beta.iter().all(|v| v.is_finite()) {
        Ok(beta)
    } else {
        Err(FitFailure::NonFinite)
    }
}
