//! Error metrics for cross-validation.
//!
//! Missing values are represented as `NaN`. A pair where either side is
//! missing is left out of both the sum and the count; the number of such
//! pairs is reported so callers can tell when the metric rests on a thin
//! sample.

use crate::error::ModelError;

/// RMSE together with how many pairs went into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmseSummary {
    pub rmse: f64,
    pub used: usize,
    pub ignored: usize,
}

/// Root-mean-square error of `predicted` against `observed`, ignoring missing pairs.
pub fn rmse(observed: &[f64], predicted: &[f64]) -> Result<f64, ModelError> {
    rmse_summary(observed, predicted).map(|s| s.rmse)
}

/// Like [`rmse`], but also reports used/ignored pair counts.
pub fn rmse_summary(observed: &[f64], predicted: &[f64]) -> Result<RmseSummary, ModelError> {
    if observed.len() != predicted.len() {
        return Err(ModelError::invalid(format!(
            "rmse: observed has {} values but predicted has {}",
            observed.len(),
            predicted.len()
        )));
    }

    let mut sum_sq = 0.0;
    let mut used = 0usize;
    for (&o, &p) in observed.iter().zip(predicted) {
        if o.is_nan() || p.is_nan() {
            continue;
        }
        let d = o - p;
        sum_sq += d * d;
        used += 1;
    }

    if used == 0 {
        return Err(ModelError::invalid("rmse: no pairs without missing values"));
    }

    Ok(RmseSummary {
        rmse: (sum_sq / used as f64).sqrt(),
        used,
        ignored: observed.len() - used,
    })
}

/// RMSE of the null model: predict the mean of `values` everywhere.
pub fn null_rmse(values: &[f64]) -> Result<f64, ModelError> {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return Err(ModelError::invalid("null model needs at least one value"));
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    rmse(&present, &vec![mean; present.len()])
}
