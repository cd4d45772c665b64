//! Price, NAV and holdings data sources.
//!
//! Everything that touches the network lives here, behind traits, so the
//! calculator never depends on a particular provider. Sources fail with
//! `Error::Source`/`Error::Http`; nothing is retried.

mod cached;
mod fetch;
mod holdings;
mod mfapi;
mod yahoo;

pub use cached::CachedSource;
pub use fetch::{fetch_all, fetch_all_bars, DEFAULT_MAX_CONCURRENT};
pub use holdings::{HoldingsProvider, JsonFileHoldings, StaticHoldings};
pub use mfapi::{MfApiSource, SchemeMeta};
pub use yahoo::{nse_ticker, YahooChartSource};

use crate::config::Config;
use crate::series::PriceSeries;
use crate::timeframe::DateRange;
use crate::types::{Bar, PricePoint};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A provider of historical prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Daily closing prices (or NAVs) for `symbol` inside `range`.
    async fn fetch_prices(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries>;

    /// Daily closes with volume. Sources without volume data keep the default.
    async fn fetch_bars(&self, symbol: &str, _range: &DateRange) -> Result<Vec<Bar>> {
        Err(Error::Source(format!(
            "{} does not provide volume data for {symbol}",
            self.name()
        )))
    }
}

#[async_trait]
impl<T: PriceSource + ?Sized> PriceSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_prices(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries> {
        (**self).fetch_prices(symbol, range).await
    }

    async fn fetch_bars(&self, symbol: &str, range: &DateRange) -> Result<Vec<Bar>> {
        (**self).fetch_bars(symbol, range).await
    }
}

/// Build an HTTP client with the configured timeout.
pub fn http_client(config: &Config) -> Result<Client> {
    Ok(Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("Mozilla/5.0 (compatible; betacalc/", env!("CARGO_PKG_VERSION"), ")"))
        .build()?)
}

/// GET a URL and decode the JSON body, turning non-2xx statuses into errors.
async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    tracing::debug!("GET {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Source(format!("Request failed: {} {}", status, body)));
    }

    Ok(response.json().await?)
}

/// Build a series from provider points that may be unsorted or contain gaps.
fn series_in_range(points: Vec<PricePoint>, range: &DateRange) -> Result<PriceSeries> {
    let points = points
        .into_iter()
        .filter(|p| range.contains(p.date) && p.price.is_finite() && p.price > 0.0)
        .collect();
    PriceSeries::from_unsorted(points)
}
