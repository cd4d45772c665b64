//! Alpha, volatility, Sharpe ratio and beta classification.
//!
//! All functions take percentage returns and an explicit `periods_per_year`
//! (12 monthly, 52 weekly, 252 daily). Mixing conventions silently changes the
//! magnitude of alpha, so there is no default.

use super::regression::compute_beta;
use crate::types::{AlignedReturnPair, RiskClass, RiskMetrics};
use crate::{Error, Result};

/// Annualized alpha.
///
/// ```text
/// alpha = mean(asset) * ppy - beta * mean(benchmark) * ppy
/// ```
///
/// Returns 0.0 for empty input.
pub fn compute_alpha(asset: &[f64], benchmark: &[f64], beta: f64, periods_per_year: f64) -> f64 {
    if asset.is_empty() || benchmark.is_empty() {
        return 0.0;
    }

    let annualized_asset = mean(asset) * periods_per_year;
    let annualized_benchmark = mean(benchmark) * periods_per_year;
    annualized_asset - beta * annualized_benchmark
}

/// Annualized volatility: sample standard deviation (`n - 1`) times `sqrt(ppy)`.
///
/// Returns 0.0 with fewer than two observations.
pub fn compute_volatility(asset: &[f64], periods_per_year: f64) -> f64 {
    if asset.len() < 2 {
        return 0.0;
    }

    let m = mean(asset);
    let variance = asset.iter().map(|r| (r - m).powi(2)).sum::<f64>() / (asset.len() - 1) as f64;
    variance.sqrt() * periods_per_year.sqrt()
}

/// Sharpe ratio: `(annualized_return - risk_free_rate) / volatility`.
///
/// A flat return stream has zero volatility; that yields 0.0 rather than an
/// error, unlike the zero-variance benchmark case in beta.
pub fn compute_sharpe_ratio(annualized_return: f64, volatility: f64, risk_free_rate: f64) -> f64 {
    if volatility <= 0.0 {
        return 0.0;
    }
    (annualized_return - risk_free_rate) / volatility
}

/// Bucket a beta into a risk class.
///
/// Boundaries are half-open: `[.., 0.8)`, `[0.8, 1.2)`, `[1.2, ..]`.
pub fn classify(beta: f64) -> RiskClass {
    if beta < 0.8 {
        RiskClass::Defensive
    } else if beta < 1.2 {
        RiskClass::Moderate
    } else {
        RiskClass::Aggressive
    }
}

/// Calculate the full metrics record for an aligned pair.
///
/// # Arguments
///
/// * `pair` - Aligned asset/benchmark percentage returns
/// * `periods_per_year` - Sampling frequency used to annualize
/// * `risk_free_rate` - Annual risk-free rate in percent (e.g. 5.0)
///
/// # Errors
///
/// `Error::DegenerateInput` when the benchmark is flat, `Error::InvalidInput`
/// for a non-positive `periods_per_year` or non-finite risk-free rate.
pub fn calculate_risk_metrics(
    pair: &AlignedReturnPair,
    periods_per_year: f64,
    risk_free_rate: f64,
) -> Result<RiskMetrics> {
    if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "periods_per_year must be positive, got {periods_per_year}"
        )));
    }
    if !risk_free_rate.is_finite() {
        return Err(Error::InvalidInput(format!(
            "risk_free_rate must be finite, got {risk_free_rate}"
        )));
    }

    let fit = compute_beta(pair)?;
    let alpha = compute_alpha(pair.asset(), pair.benchmark(), fit.beta, periods_per_year);
    let volatility = compute_volatility(pair.asset(), periods_per_year);
    let annualized_return = mean(pair.asset()) * periods_per_year;
    let sharpe_ratio = compute_sharpe_ratio(annualized_return, volatility, risk_free_rate);

    Ok(RiskMetrics {
        beta: fit.beta,
        alpha,
        r_squared: fit.r_squared,
        correlation: fit.correlation,
        volatility,
        sharpe_ratio,
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
