//! Keyed alignment and OLS beta regression.

use crate::series::ReturnSeries;
use crate::types::{AlignedReturnPair, BetaFit};
use crate::{Error, Result};
use std::cmp::Ordering;

/// Minimum overlapping observations before a regression is attempted.
pub const MIN_SAMPLES: usize = 10;

/// Pair two return series by date using [`MIN_SAMPLES`] as the floor.
pub fn align(asset: &ReturnSeries, benchmark: &ReturnSeries) -> Result<AlignedReturnPair> {
    align_with_min(asset, benchmark, MIN_SAMPLES)
}

/// Pair two return series by date.
///
/// Only dates present in both series survive (inner join). Nothing is filled
/// or interpolated, and values are matched by date rather than by position.
///
/// # Errors
///
/// `Error::InsufficientData` when fewer than `min_samples` dates are shared.
pub fn align_with_min(
    asset: &ReturnSeries,
    benchmark: &ReturnSeries,
    min_samples: usize,
) -> Result<AlignedReturnPair> {
    let a = asset.points();
    let b = benchmark.points();

    let capacity = a.len().min(b.len());
    let mut dates = Vec::with_capacity(capacity);
    let mut asset_values = Vec::with_capacity(capacity);
    let mut benchmark_values = Vec::with_capacity(capacity);

    // Both sides are strictly ascending, so a merge walk finds the intersection
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dates.push(a[i].date);
                asset_values.push(a[i].value);
                benchmark_values.push(b[j].value);
                i += 1;
                j += 1;
            }
        }
    }

    if dates.len() < min_samples {
        return Err(Error::InsufficientData {
            required: min_samples,
            actual: dates.len(),
        });
    }

    Ok(AlignedReturnPair::from_parts(
        dates,
        asset_values,
        benchmark_values,
    ))
}

/// Regress the pair's asset returns on its benchmark returns.
///
/// See [`regress`] for the estimator.
pub fn compute_beta(pair: &AlignedReturnPair) -> Result<BetaFit> {
    regress(pair.asset(), pair.benchmark())
}

/// Ordinary least squares of `asset` (dependent) on `benchmark` (independent).
///
/// ```text
/// beta        = Cov(a, b) / Var(b)
/// intercept   = mean(a) - beta * mean(b)
/// correlation = Cov(a, b) / (sd(a) * sd(b))
/// r_squared   = correlation^2
/// ```
///
/// Population divisors (`n`) are used throughout. The divisor cancels in both
/// ratios, so beta and correlation match their sample-divisor counterparts.
///
/// When the asset itself is constant, beta is 0 and correlation is reported
/// as 0.
///
/// # Errors
///
/// - `Error::InvalidInput` if the slices differ in length
/// - `Error::InsufficientData` with fewer than two observations
/// - `Error::DegenerateInput` if the benchmark has zero variance
pub fn regress(asset: &[f64], benchmark: &[f64]) -> Result<BetaFit> {
    if asset.len() != benchmark.len() {
        return Err(Error::InvalidInput(format!(
            "Asset has {} returns but benchmark has {}",
            asset.len(),
            benchmark.len()
        )));
    }
    if asset.len() < 2 {
        return Err(Error::InsufficientData {
            required: 2,
            actual: asset.len(),
        });
    }

    let n = asset.len() as f64;
    let mean_a = asset.iter().sum::<f64>() / n;
    let mean_b = benchmark.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&a, &b) in asset.iter().zip(benchmark) {
        let da = a - mean_a;
        let db = b - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    cov /= n;
    var_a /= n;
    var_b /= n;

    if is_zero_variance(var_b, benchmark) {
        return Err(Error::DegenerateInput(
            "Benchmark returns have zero variance; beta is undefined".to_string(),
        ));
    }

    let beta = cov / var_b;
    let intercept = mean_a - beta * mean_b;

    let correlation = if is_zero_variance(var_a, asset) {
        0.0
    } else {
        (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
    };

    Ok(BetaFit {
        beta,
        intercept,
        r_squared: correlation * correlation,
        correlation,
    })
}

/// Variance indistinguishable from rounding noise on a constant series.
fn is_zero_variance(variance: f64, values: &[f64]) -> bool {
    let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    variance <= (4.0 * f64::EPSILON * scale).powi(2)
}
