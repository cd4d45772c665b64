//! Per-holding betas and the combined portfolio return series.

use super::allocation::normalized_weights;
use crate::risk::{align_with_min, compute_beta};
use crate::series::ReturnSeries;
use crate::types::{Holding, ReturnPoint, StockBeta};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Allocation-weighted portfolio returns.
///
/// Only dates on which every holding has a return are kept; weights come from
/// [`normalized_weights`].
///
/// # Errors
///
/// `Error::UnknownSymbol` when a holding has no return series, plus the
/// allocation errors from [`normalized_weights`].
pub fn portfolio_returns(
    holdings: &[Holding],
    returns: &HashMap<String, ReturnSeries>,
) -> Result<ReturnSeries> {
    let weights = normalized_weights(holdings)?;

    // date -> (holdings seen, weighted sum)
    let mut combined: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for (symbol, weight) in &weights {
        let series = returns
            .get(symbol)
            .ok_or_else(|| Error::UnknownSymbol(symbol.clone()))?;
        for p in series.points() {
            let entry = combined.entry(p.date).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += weight * p.value;
        }
    }

    let points = combined
        .into_iter()
        .filter(|(_, (seen, _))| *seen == weights.len())
        .map(|(date, (_, value))| ReturnPoint::new(date, value))
        .collect();

    ReturnSeries::new(points)
}

/// Beta of every holding against the benchmark, with its contribution
/// `beta * weight`.
///
/// Weights are the same normalized weights [`portfolio_returns`] uses, so the
/// contributions sum to the beta of the combined series even when the
/// allocations do not add up to 100. Each holding is aligned with the
/// benchmark on its own, so a short history in one stock does not truncate
/// the others.
pub fn stock_betas(
    holdings: &[Holding],
    returns: &HashMap<String, ReturnSeries>,
    benchmark: &ReturnSeries,
    min_samples: usize,
) -> Result<Vec<StockBeta>> {
    let weights = normalized_weights(holdings)?;

    holdings
        .iter()
        .zip(weights)
        .map(|(h, (_, weight))| {
            let series = returns
                .get(&h.symbol)
                .ok_or_else(|| Error::UnknownSymbol(h.symbol.clone()))?;
            let pair = align_with_min(series, benchmark, min_samples)?;
            let fit = compute_beta(&pair)?;
            Ok(StockBeta {
                symbol: h.symbol.clone(),
                allocation: h.allocation,
                beta: fit.beta,
                contribution: fit.beta * weight,
            })
        })
        .collect()
}
