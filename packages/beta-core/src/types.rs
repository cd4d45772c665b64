//! Core data types for beta analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single price or NAV observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    /// Observation date
    pub date: NaiveDate,
    /// Closing price or NAV
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Daily close and traded volume.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

/// A single percentage return, dated at the end of its period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReturnPoint {
    /// Date the period closed
    pub date: NaiveDate,
    /// Percentage return (1.5 means +1.5%)
    pub value: f64,
}

impl ReturnPoint {
    /// Create a new return point.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Two return series restricted to the dates they share.
///
/// Only produced by [`crate::risk::align`], so both sides always have the same
/// length and at least the requested number of samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedReturnPair {
    dates: Vec<NaiveDate>,
    asset: Vec<f64>,
    benchmark: Vec<f64>,
}

impl AlignedReturnPair {
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, asset: Vec<f64>, benchmark: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), asset.len());
        debug_assert_eq!(dates.len(), benchmark.len());
        Self {
            dates,
            asset,
            benchmark,
        }
    }

    /// Common dates in chronological order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset returns (dependent variable).
    pub fn asset(&self) -> &[f64] {
        &self.asset
    }

    /// Benchmark returns (independent variable).
    pub fn benchmark(&self) -> &[f64] {
        &self.benchmark
    }

    /// Number of paired observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the pair holds no observations.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Iterate over `(date, asset, benchmark)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64, f64)> + '_ {
        self.dates
            .iter()
            .zip(self.asset.iter().zip(self.benchmark.iter()))
            .map(|(&d, (&a, &b))| (d, a, b))
    }
}

/// Result of regressing asset returns on benchmark returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BetaFit {
    /// Regression slope
    pub beta: f64,
    /// Regression intercept, per period
    pub intercept: f64,
    /// Coefficient of determination (0..1)
    pub r_squared: f64,
    /// Pearson correlation (-1..1)
    pub correlation: f64,
}

/// Risk metrics for an asset measured against a benchmark.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskMetrics {
    /// Sensitivity to benchmark moves
    pub beta: f64,
    /// Annualized excess return not explained by beta, in percent
    pub alpha: f64,
    /// Share of asset variance explained by the benchmark (0..1)
    pub r_squared: f64,
    /// Pearson correlation with the benchmark (-1..1)
    pub correlation: f64,
    /// Annualized volatility in percent
    pub volatility: f64,
    /// Annualized Sharpe ratio
    pub sharpe_ratio: f64,
}

/// Risk bucket derived from beta.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskClass {
    /// beta < 0.8
    Defensive,
    /// 0.8 <= beta < 1.2
    Moderate,
    /// beta >= 1.2
    Aggressive,
}

impl RiskClass {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskClass::Defensive => "Defensive / Low Risk",
            RiskClass::Moderate => "Market-aligned / Moderate Risk",
            RiskClass::Aggressive => "Aggressive / High Risk",
        }
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A portfolio holding with its allocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Ticker symbol (uppercase)
    pub symbol: String,
    /// Allocation in percent of the portfolio
    pub allocation: f64,
}

impl Holding {
    /// Create a new holding.
    pub fn new(symbol: &str, allocation: f64) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            allocation,
        }
    }
}

/// Beta of one portfolio holding and its share of the portfolio beta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockBeta {
    /// Ticker symbol
    pub symbol: String,
    /// Allocation in percent
    pub allocation: f64,
    /// Beta against the benchmark
    pub beta: f64,
    /// `beta * allocation / total allocation`
    pub contribution: f64,
}

/// A disclosed holding of a mutual fund.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundHolding {
    /// Company name or ticker
    pub name: String,
    /// Sector classification
    #[serde(default)]
    pub sector: String,
    /// Weight in the fund, in percent
    pub allocation: f64,
    /// Beta of the holding
    pub beta: f64,
}

/// JSON envelope printed by the CLI: `{"ok": true, "data": ..}` or
/// `{"ok": false, "error": ".."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// User-facing message, see [`crate::Error::user_message`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether changing the inputs could make the request succeed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recoverable: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
            recoverable: false,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
            recoverable: false,
        }
    }
}

impl<T> From<crate::Result<T>> for ApiResponse<T> {
    fn from(result: crate::Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self {
                recoverable: e.is_recoverable(),
                ..Self::err(e.user_message())
            },
        }
    }
}
