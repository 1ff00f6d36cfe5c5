//! Fit objectives comparing simulated to observed DO.
//!
//! All objectives take observed and simulated slices of equal length and
//! return a scalar score; [`crate::metab::MetabolismOutput::score_do`] applies them to a
//! model run. Pairs whose observation is NaN (sensor gaps) are
//! skipped; with no valid pairs the score is NaN.

use crate::error::{MetabError, MetabResult};

fn valid_pairs<'a>(
    observed: &'a [f64],
    simulated: &'a [f64],
) -> MetabResult<impl Iterator<Item = (f64, f64)> + Clone + 'a> {
    if observed.len() != simulated.len() {
        return Err(MetabError::length_mismatch(
            "simulated",
            simulated.len(),
            "observed",
            observed.len(),
        ));
    }
    Ok(observed
        .iter()
        .zip(simulated)
        .filter(|(o, _)| !o.is_nan())
        .map(|(&o, &s)| (o, s)))
}

/// Sum of squared errors. Range: [0, inf), 0 = perfect.
fn sse(observed: &[f64], simulated: &[f64]) -> MetabResult<f64> {
    let pairs = valid_pairs(observed, simulated)?;
    let mut n = 0usize;
    let total = pairs
        .inspect(|_| n += 1)
        .map(|(o, s)| (o - s).powi(2))
        .sum::<f64>();
    Ok(if n == 0 { f64::NAN } else { total })
}

/// Root Mean Square Error. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> MetabResult<f64> {
    let n = valid_pairs(observed, simulated)?.count();
    Ok((sse(observed, simulated)? / n as f64).sqrt())
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect.
pub fn nse(observed: &[f64], simulated: &[f64]) -> MetabResult<f64> {
    let pairs = valid_pairs(observed, simulated)?;
    let n = pairs.clone().count();
    if n == 0 {
        return Ok(f64::NAN);
    }
    let mean_obs = pairs.clone().map(|(o, _)| o).sum::<f64>() / n as f64;
    let numerator: f64 = pairs.clone().map(|(o, s)| (o - s).powi(2)).sum();
    let denominator: f64 = pairs.map(|(o, _)| (o - mean_obs).powi(2)).sum();
    if denominator == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(1.0 - numerator / denominator)
}

/// Negative log-likelihood under independent Gaussian errors with standard
/// deviation `sigma`. Lower is better.
pub fn gaussian_nll(observed: &[f64], simulated: &[f64], sigma: f64) -> MetabResult<f64> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(MetabError::invalid(format!("sigma must be positive, got {sigma}")));
    }
    let n = valid_pairs(observed, simulated)?.count();
    if n == 0 {
        return Ok(f64::NAN);
    }
    let sse = sse(observed, simulated)?;
    let n = n as f64;
    Ok(0.5 * n * (2.0 * std::f64::consts::PI).ln() + n * sigma.ln() + sse / (2.0 * sigma * sigma))
}
