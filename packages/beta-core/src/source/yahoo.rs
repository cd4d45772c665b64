//! Stock and index prices from the Yahoo Finance chart API.

use super::{get_json, series_in_range, PriceSource};
use crate::config::Config;
use crate::series::PriceSeries;
use crate::timeframe::DateRange;
use crate::types::{Bar, PricePoint};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;

/// Map a bare NSE symbol to its Yahoo ticker.
///
/// Symbols that already carry an exchange suffix and index tickers (`^NSEI`)
/// pass through unchanged.
pub fn nse_ticker(symbol: &str) -> String {
    let symbol = symbol.trim().to_uppercase();
    if symbol.contains('.') || symbol.starts_with('^') {
        symbol
    } else {
        format!("{symbol}.NS")
    }
}

/// Daily prices from `/v8/finance/chart`.
#[derive(Debug, Clone)]
pub struct YahooChartSource {
    client: Client,
    base_url: String,
}

impl YahooChartSource {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, config.yahoo_base_url.clone())
    }

    fn chart_url(&self, ticker: &str, range: &DateRange) -> String {
        // period2 is exclusive
        let period1 = unix_seconds(range.start);
        let period2 = unix_seconds(range.end + Days::new(1));
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url, ticker, period1, period2
        )
    }

    async fn fetch_chart(&self, symbol: &str, range: &DateRange) -> Result<ChartData> {
        let ticker = nse_ticker(symbol);
        let url = self.chart_url(&ticker, range);
        let body: ChartResponse = get_json(&self.client, &url).await?;
        let data = body.into_data(&ticker)?;
        tracing::debug!("Fetched {} rows for {}", data.timestamp.len(), ticker);
        Ok(data)
    }
}

#[async_trait]
impl PriceSource for YahooChartSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_prices(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries> {
        let data = self.fetch_chart(symbol, range).await?;
        let closes = data.adjusted_closes();
        let points = data
            .dates()
            .zip(closes)
            .filter_map(|(date, close)| Some(PricePoint::new(date?, close?)))
            .collect();

        let series = series_in_range(points, range)?;
        if series.is_empty() {
            return Err(Error::Source(format!("No price data for {symbol}")));
        }
        Ok(series)
    }

    async fn fetch_bars(&self, symbol: &str, range: &DateRange) -> Result<Vec<Bar>> {
        let data = self.fetch_chart(symbol, range).await?;
        let quote = data.indicators.quote.first();
        let closes = quote.map(|q| q.close.clone()).unwrap_or_default();
        let volumes = quote.map(|q| q.volume.clone()).unwrap_or_default();

        let mut bars: Vec<Bar> = data
            .dates()
            .zip(closes)
            .zip(volumes)
            .filter_map(|((date, close), volume)| {
                Some(Bar {
                    date: date?,
                    close: close?,
                    volume: volume.unwrap_or(0.0),
                })
            })
            .filter(|bar| range.contains(bar.date) && bar.close.is_finite() && bar.close > 0.0)
            .collect();
        bars.sort_by_key(|bar| bar.date);
        bars.dedup_by_key(|bar| bar.date);

        if bars.is_empty() {
            return Err(Error::Source(format!("No price data for {symbol}")));
        }
        Ok(bars)
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartData>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

impl ChartResponse {
    fn into_data(self, ticker: &str) -> Result<ChartData> {
        if let Some(err) = self.chart.error {
            return Err(Error::Source(format!(
                "{ticker}: {} {}",
                err.code, err.description
            )));
        }
        self.chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| Error::Source(format!("{ticker}: empty chart response")))
    }
}

impl ChartData {
    fn dates(&self) -> impl Iterator<Item = Option<NaiveDate>> + '_ {
        self.timestamp
            .iter()
            .map(|&ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()))
    }

    /// Adjusted closes when present, raw closes otherwise.
    fn adjusted_closes(&self) -> Vec<Option<f64>> {
        match self.indicators.adjclose.first() {
            Some(adj) if !adj.adjclose.is_empty() => adj.adjclose.clone(),
            _ => self
                .indicators
                .quote
                .first()
                .map(|q| q.close.clone())
                .unwrap_or_default(),
        }
    }
}
