//! Holding allocations and holdings-weighted beta.

use crate::types::{FundHolding, Holding, StockBeta};
use crate::{Error, Result};

/// Validate allocations and return each holding's weight as a fraction of the total.
///
/// Allocations do not have to sum to 100; they are normalized so a partially
/// filled portfolio still produces weights that sum to 1.
///
/// # Errors
///
/// `Error::InvalidInput` for an empty list, negative or non-finite
/// allocations, duplicate symbols, or a zero total.
pub fn normalized_weights(holdings: &[Holding]) -> Result<Vec<(String, f64)>> {
    if holdings.is_empty() {
        return Err(Error::InvalidInput("Portfolio has no holdings".to_string()));
    }

    for (i, h) in holdings.iter().enumerate() {
        if h.symbol.is_empty() {
            return Err(Error::InvalidInput(format!("Holding {} has no symbol", i + 1)));
        }
        if !h.allocation.is_finite() || h.allocation < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Allocation for {} must be a non-negative number, got {}",
                h.symbol, h.allocation
            )));
        }
        if holdings[..i].iter().any(|other| other.symbol == h.symbol) {
            return Err(Error::InvalidInput(format!(
                "Duplicate holding: {}",
                h.symbol
            )));
        }
    }

    let total: f64 = holdings.iter().map(|h| h.allocation).sum();
    if total <= 0.0 {
        return Err(Error::InvalidInput(
            "Total allocation must be greater than zero".to_string(),
        ));
    }

    Ok(holdings
        .iter()
        .map(|h| (h.symbol.clone(), h.allocation / total))
        .collect())
}

/// Sum of allocations in percent.
pub fn total_allocation(holdings: &[Holding]) -> f64 {
    holdings.iter().map(|h| h.allocation).sum()
}

/// Portfolio beta as the sum of per-holding contributions.
pub fn weighted_beta(stocks: &[StockBeta]) -> f64 {
    stocks.iter().map(|s| s.contribution).sum()
}

/// Beta implied by a fund's disclosed holdings: `sum(allocation * beta / 100)`.
///
/// Disclosures usually cover only the top holdings, so the result reflects
/// that slice of the fund rather than the whole.
pub fn fund_weighted_beta(holdings: &[FundHolding]) -> f64 {
    holdings.iter().map(|h| h.allocation * h.beta / 100.0).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalized_weights() {
        let holdings = vec![Holding::new("TCS", 30.0), Holding::new("INFY", 10.0)];
        let weights = normalized_weights(&holdings).unwrap();

        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0].0, "TCS");
        assert_relative_eq!(weights[0].1, 0.75);
        assert_relative_eq!(weights[1].1, 0.25);
        assert_relative_eq!(total_allocation(&holdings), 40.0);
    }

    #[test]
    fn test_normalized_weights_rejects_bad_input() {
        assert!(normalized_weights(&[]).is_err());
        assert!(normalized_weights(&[Holding::new("TCS", -5.0)]).is_err());
        assert!(normalized_weights(&[Holding::new("TCS", f64::NAN)]).is_err());
        assert!(normalized_weights(&[Holding::new("TCS", 0.0)]).is_err());
        assert!(normalized_weights(&[Holding::new("", 10.0)]).is_err());
        assert!(
            normalized_weights(&[Holding::new("tcs", 10.0), Holding::new("TCS", 5.0)]).is_err()
        );
    }

    #[test]
    fn test_weighted_beta() {
        let stocks = vec![
            StockBeta {
                symbol: "A".into(),
                allocation: 60.0,
                beta: 1.5,
                contribution: 0.9,
            },
            StockBeta {
                symbol: "B".into(),
                allocation: 40.0,
                beta: 0.5,
                contribution: 0.2,
            },
        ];
        assert_relative_eq!(weighted_beta(&stocks), 1.1);
    }

    #[test]
    fn test_fund_weighted_beta() {
        let holdings = vec![
            FundHolding {
                name: "RELIANCE".into(),
                sector: "Energy".into(),
                allocation: 8.5,
                beta: 1.12,
            },
            FundHolding {
                name: "TCS".into(),
                sector: "IT".into(),
                allocation: 7.2,
                beta: 0.85,
            },
        ];
        // 0.0952 + 0.0612
        assert_relative_eq!(fund_weighted_beta(&holdings), 0.1564, epsilon = 1e-12);
        assert_eq!(fund_weighted_beta(&[]), 0.0);
    }
}
