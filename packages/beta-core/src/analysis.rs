//! End-to-end beta analysis from price series.
//!
//! Glues the pieces together the way the dashboard uses them: resample prices
//! to the analysis frequency, convert to returns, align on dates, then compute
//! metrics. The result is a plain serializable report for the presentation
//! layer.

use crate::config::Config;
use crate::portfolio::{portfolio_returns, stock_betas, weighted_beta};
use crate::risk::{align_with_min, calculate_risk_metrics, classify, MIN_SAMPLES};
use crate::series::{PriceSeries, ReturnSeries};
use crate::timeframe::{DateRange, Frequency};
use crate::types::{Holding, RiskClass, RiskMetrics, StockBeta};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters shared by every analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnalysisParams {
    /// Frequency prices are resampled to before computing returns
    pub frequency: Frequency,
    /// Annual risk-free rate in percent
    pub risk_free_rate: f64,
    /// Minimum overlapping return observations
    pub min_samples: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            frequency: Frequency::Monthly,
            risk_free_rate: 5.0,
            min_samples: MIN_SAMPLES,
        }
    }
}

impl AnalysisParams {
    /// Switch to a finer frequency when `range` is too short to give
    /// `min_samples` returns at the current one.
    pub fn fitted_to(mut self, range: &DateRange) -> Self {
        let frequency = self.frequency.fit_window(range, self.min_samples.max(2));
        if frequency != self.frequency {
            tracing::info!(
                "{} months is too short for {:?} returns, using {:?}",
                range.months(),
                self.frequency,
                frequency
            );
            self.frequency = frequency;
        }
        self
    }
}

impl From<&Config> for AnalysisParams {
    fn from(config: &Config) -> Self {
        Self {
            frequency: config.frequency,
            risk_free_rate: config.risk_free_rate,
            min_samples: config.min_samples,
        }
    }
}

/// One point of the regression scatter plot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScatterPoint {
    pub date: NaiveDate,
    /// Benchmark return (x axis)
    pub benchmark: f64,
    /// Asset return (y axis)
    pub asset: f64,
}

/// Beta analysis of one asset against one benchmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BetaReport {
    pub metrics: RiskMetrics,
    pub classification: RiskClass,
    /// Plain-language reading of the beta
    pub commentary: String,
    pub frequency: Frequency,
    /// Number of aligned return observations
    pub samples: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub scatter: Vec<ScatterPoint>,
}

/// Portfolio analysis: the combined series plus per-holding detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioReport {
    /// Regression of the allocation-weighted portfolio on the benchmark
    pub portfolio: BetaReport,
    /// Per-holding betas
    pub stocks: Vec<StockBeta>,
    /// Sum of per-holding contributions
    pub weighted_beta: f64,
}

/// Analyze an asset's prices against a benchmark's prices.
///
/// # Example
///
/// ```rust
/// use beta_core::{analyze, AnalysisParams, PricePoint, PriceSeries};
/// use chrono::NaiveDate;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let bench: Vec<f64> = (0..15).map(|i| 100.0 + ((i * 7) % 5) as f64).collect();
/// let asset: Vec<f64> = bench.iter().map(|p| p * 2.0).collect();
///
/// let to_series = |prices: &[f64]| {
///     PriceSeries::new(
///         prices.iter().enumerate().map(|(i, &p)| PricePoint::new(day(i as u32 + 1), p)).collect(),
///     )
///     .unwrap()
/// };
///
/// let params = AnalysisParams { frequency: beta_core::Frequency::Daily, ..Default::default() };
/// let report = analyze(&to_series(&asset), &to_series(&bench), &params).unwrap();
/// assert!((report.metrics.beta - 1.0).abs() < 1e-9);
/// ```
pub fn analyze(
    asset: &PriceSeries,
    benchmark: &PriceSeries,
    params: &AnalysisParams,
) -> Result<BetaReport> {
    let asset_returns = asset.resample(params.frequency).to_returns()?;
    let benchmark_returns = benchmark.resample(params.frequency).to_returns()?;
    analyze_returns(&asset_returns, &benchmark_returns, params)
}

/// Analyze return series that are already at `params.frequency`.
pub fn analyze_returns(
    asset: &ReturnSeries,
    benchmark: &ReturnSeries,
    params: &AnalysisParams,
) -> Result<BetaReport> {
    let pair = align_with_min(asset, benchmark, params.min_samples.max(2))?;
    let metrics = calculate_risk_metrics(
        &pair,
        params.frequency.periods_per_year(),
        params.risk_free_rate,
    )?;

    let scatter: Vec<ScatterPoint> = pair
        .iter()
        .map(|(date, a, b)| ScatterPoint {
            date,
            benchmark: b,
            asset: a,
        })
        .collect();

    // align_with_min guarantees at least two points
    let (start, end) = match (pair.dates().first(), pair.dates().last()) {
        (Some(&s), Some(&e)) => (s, e),
        _ => {
            return Err(Error::InsufficientData {
                required: params.min_samples,
                actual: 0,
            })
        }
    };

    Ok(BetaReport {
        classification: classify(metrics.beta),
        commentary: commentary(metrics.beta).to_string(),
        metrics,
        frequency: params.frequency,
        samples: pair.len(),
        start,
        end,
        scatter,
    })
}

/// Analyze a portfolio of holdings against a benchmark.
///
/// `prices` maps each holding's symbol to its price history.
pub fn analyze_portfolio(
    holdings: &[Holding],
    prices: &HashMap<String, PriceSeries>,
    benchmark: &PriceSeries,
    params: &AnalysisParams,
) -> Result<PortfolioReport> {
    let returns = prices
        .iter()
        .map(|(symbol, series)| {
            let returns = series.resample(params.frequency).to_returns()?;
            Ok((symbol.to_uppercase(), returns))
        })
        .collect::<Result<HashMap<String, ReturnSeries>>>()?;
    let benchmark_returns = benchmark.resample(params.frequency).to_returns()?;

    let stocks = stock_betas(holdings, &returns, &benchmark_returns, params.min_samples)?;
    let combined = portfolio_returns(holdings, &returns)?;
    let portfolio = analyze_returns(&combined, &benchmark_returns, params)?;

    Ok(PortfolioReport {
        weighted_beta: weighted_beta(&stocks),
        stocks,
        portfolio,
    })
}

/// Plain-language reading of a beta value.
pub fn commentary(beta: f64) -> &'static str {
    // Same rounding the dashboard displays (three decimals)
    if (beta - 1.0).abs() < 0.0005 {
        "Moves in line with the market, with volatility similar to the benchmark index."
    } else if beta < 1.0 {
        "Less volatile than the market. It tends to move less than the benchmark, \
         which suits conservative investors."
    } else {
        "More volatile than the market. It tends to amplify benchmark moves, \
         which suits aggressive investors seeking higher returns."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;
    use approx::assert_relative_eq;
    use chrono::Datelike;

    /// Month-end prices compounding the given percentage returns from 100.
    fn monthly_prices(returns: &[f64]) -> PriceSeries {
        let mut price = 100.0;
        let mut points = vec![PricePoint::new(month_end(0), price)];
        for (i, r) in returns.iter().enumerate() {
            price *= 1.0 + r / 100.0;
            points.push(PricePoint::new(month_end(i as u32 + 1), price));
        }
        PriceSeries::new(points).unwrap()
    }

    fn month_end(offset: u32) -> NaiveDate {
        let first = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        first
            .checked_add_months(chrono::Months::new(offset + 1))
            .and_then(|d| d.pred_opt())
            .unwrap()
    }

    const BENCH: [f64; 12] = [
        1.5, -0.8, 2.2, 1.0, -0.3, 0.7, -1.4, 2.0, 0.4, -0.6, 1.3, 0.9,
    ];

    #[test]
    fn test_analyze_monthly() {
        let asset: Vec<f64> = BENCH.iter().map(|b| 1.3 * b).collect();
        let report = analyze(
            &monthly_prices(&asset),
            &monthly_prices(&BENCH),
            &AnalysisParams::default(),
        )
        .unwrap();

        assert_eq!(report.samples, 12);
        assert_eq!(report.scatter.len(), 12);
        assert_relative_eq!(report.metrics.beta, 1.3, epsilon = 1e-9);
        assert_relative_eq!(report.metrics.correlation, 1.0, epsilon = 1e-9);
        assert_eq!(report.classification, RiskClass::Aggressive);
        assert!(report.commentary.starts_with("More volatile"));
        assert_eq!(report.start, month_end(1));
        assert_eq!(report.end, month_end(12));
        assert_relative_eq!(report.scatter[0].benchmark, 1.5, epsilon = 1e-9);
        assert_relative_eq!(report.scatter[0].asset, 1.95, epsilon = 1e-9);
    }

    /// Daily prices for 2022 from `price(day_index)`, skipping dates `skip` rejects.
    fn daily_prices(price: impl Fn(f64) -> f64, skip: impl Fn(NaiveDate) -> bool) -> PriceSeries {
        let first = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let points = first
            .iter_days()
            .take_while(|d| d.year() == 2022)
            .enumerate()
            .filter(|(_, d)| !skip(*d))
            .map(|(i, d)| PricePoint::new(d, price(i as f64)))
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn test_analyze_monthly_with_different_month_end_trading_days() {
        // The benchmark has no print on the last day of every other month
        let last_day_of_even_month = |d: NaiveDate| {
            d.month() % 2 == 0 && d.succ_opt().map_or(true, |next| next.month() != d.month())
        };
        let benchmark = daily_prices(
            |i| 100.0 + 8.0 * (i * 0.37).sin() + 0.05 * i,
            last_day_of_even_month,
        );
        let asset = daily_prices(|i| 50.0 + 5.0 * (i * 0.21).cos() + 0.02 * i, |_| false);

        let report = analyze(&asset, &benchmark, &AnalysisParams::default()).unwrap();

        assert_eq!(report.samples, 11);
        assert_eq!(report.start, month_end(1));
        assert_eq!(report.end, month_end(11));
        assert!(report.metrics.beta.is_finite());
    }

    #[test]
    fn test_analyze_rejects_overflowing_returns() {
        let asset = monthly_prices(&BENCH);
        let mut points = monthly_prices(&BENCH).points().to_vec();
        points[0].price = 1e-300;
        points[1].price = 1e10;
        let benchmark = PriceSeries::new(points).unwrap();

        let result = analyze(&asset, &benchmark, &AnalysisParams::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_params_fitted_to_short_window() {
        let six_months = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
        )
        .unwrap();
        let params = AnalysisParams::default().fitted_to(&six_months);
        assert_eq!(params.frequency, Frequency::Weekly);

        let five_years = DateRange::new(
            NaiveDate::from_ymd_opt(2019, 7, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
        )
        .unwrap();
        let params = AnalysisParams::default().fitted_to(&five_years);
        assert_eq!(params.frequency, Frequency::Monthly);
    }

    #[test]
    fn test_analyze_insufficient_window() {
        let short = &BENCH[..5];
        let result = analyze(
            &monthly_prices(short),
            &monthly_prices(short),
            &AnalysisParams::default(),
        );
        let err = result.unwrap_err();
        assert!(matches!(err, Error::InsufficientData { actual: 5, .. }));
        assert!(err.user_message().contains("longer time window"));
    }

    #[test]
    fn test_analyze_portfolio() {
        let high: Vec<f64> = BENCH.iter().map(|b| 1.5 * b).collect();
        let low: Vec<f64> = BENCH.iter().map(|b| 0.5 * b).collect();

        let mut prices = HashMap::new();
        prices.insert("high".to_string(), monthly_prices(&high));
        prices.insert("LOW".to_string(), monthly_prices(&low));

        let holdings = vec![Holding::new("HIGH", 50.0), Holding::new("LOW", 50.0)];
        let report = analyze_portfolio(
            &holdings,
            &prices,
            &monthly_prices(&BENCH),
            &AnalysisParams::default(),
        )
        .unwrap();

        assert_eq!(report.stocks.len(), 2);
        assert_relative_eq!(report.weighted_beta, 1.0, epsilon = 1e-9);
        assert_relative_eq!(report.portfolio.metrics.beta, 1.0, epsilon = 1e-9);
        assert_eq!(report.portfolio.classification, RiskClass::Moderate);
        assert!(report.portfolio.commentary.starts_with("Moves in line"));
    }

    #[test]
    fn test_params_from_config() {
        let config = Config {
            risk_free_rate: 6.5,
            min_samples: 24,
            frequency: Frequency::Daily,
            ..Config::default()
        };
        let params = AnalysisParams::from(&config);
        assert_eq!(params.risk_free_rate, 6.5);
        assert_eq!(params.min_samples, 24);
        assert_eq!(params.frequency, Frequency::Daily);
    }

    #[test]
    fn test_commentary() {
        assert!(commentary(0.6).starts_with("Less volatile"));
        assert!(commentary(1.0002).starts_with("Moves in line"));
        assert!(commentary(1.4).starts_with("More volatile"));
    }
}
