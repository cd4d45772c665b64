//! Beta Core - Systematic risk analytics for portfolios and mutual funds.
//!
//! This crate provides the pieces behind a beta dashboard:
//!
//! - **Return series**: Price/NAV series, percentage returns, resampling, keyed alignment
//! - **Risk metrics**: Beta, alpha, R², correlation, volatility, Sharpe ratio
//! - **Portfolio beta**: Per-holding betas, contributions, weighted beta
//! - **Screener**: Technical indicators and additive point scoring
//! - **Data sources**: Yahoo chart and AMFI NAV fetchers with a TTL cache (feature `fetch`)
//!
//! # Example
//!
//! ```rust
//! use beta_core::risk::{classify, regress};
//!
//! let asset = [2.0, -1.0, 3.0, 1.5, -0.5];
//! let benchmark = [1.5, -0.8, 2.2, 1.0, -0.3];
//!
//! let fit = regress(&asset, &benchmark).unwrap();
//! println!("beta = {:.3} ({})", fit.beta, classify(fit.beta));
//! ```

pub mod analysis;
pub mod cache;
pub mod config;
pub mod indicators;
pub mod portfolio;
pub mod risk;
pub mod screener;
pub mod series;
#[cfg(feature = "fetch")]
pub mod source;
pub mod timeframe;
pub mod types;

// Re-export commonly used types
pub use types::{
    AlignedReturnPair, ApiResponse, Bar, BetaFit, FundHolding, Holding, PricePoint, ReturnPoint,
    RiskClass, RiskMetrics, StockBeta,
};

// Re-export main functionality
pub use analysis::{analyze, AnalysisParams, BetaReport};
pub use cache::TtlCache;
pub use config::Config;
pub use risk::{
    align, align_with_min, calculate_risk_metrics, classify, compute_alpha, compute_beta,
    compute_sharpe_ratio, compute_volatility, regress, MIN_SAMPLES,
};
pub use series::{PriceSeries, ReturnSeries};
pub use timeframe::{Benchmark, DateRange, Frequency, Timeframe};

/// Error types for beta-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Insufficient data: need at least {required} overlapping points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Data source error: {0}")]
    Source(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[cfg(feature = "fetch")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Explanation suitable for showing to an end user.
    ///
    /// Recoverable analysis errors get a hint about what to change; everything
    /// else falls back to the `Display` text.
    pub fn user_message(&self) -> String {
        match self {
            Error::InsufficientData { required, actual } => format!(
                "Not enough overlapping data points ({actual} of {required} needed). \
                 Try a longer time window or a different benchmark."
            ),
            Error::DegenerateInput(_) => {
                "The benchmark did not move over this window, so beta is undefined. \
                 Try a different period or benchmark."
                    .to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether the caller can recover by changing its inputs.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InsufficientData { .. } | Error::DegenerateInput(_) | Error::InvalidInput(_)
        )
    }
}

/// Result type for beta-core operations.
pub type Result<T> = std::result::Result<T, Error>;
