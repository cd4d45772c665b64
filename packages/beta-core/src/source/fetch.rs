use super::PriceSource;
use crate::series::PriceSeries;
use crate::timeframe::DateRange;
use crate::types::Bar;
use crate::Result;
use futures::stream::{self, StreamExt};

/// Concurrency used when the configuration does not set one.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Fetch prices for many symbols with at most `max_concurrent` requests in
/// flight.
///
/// Results come back in input order. One failing symbol does not abort the
/// others.
pub async fn fetch_all<S>(
    source: &S,
    symbols: &[String],
    range: &DateRange,
    max_concurrent: usize,
) -> Vec<(String, Result<PriceSeries>)>
where
    S: PriceSource + ?Sized,
{
    stream::iter(symbols.iter().cloned())
        .map(|symbol| async move {
            let result = source.fetch_prices(&symbol, range).await;
            if let Err(e) = &result {
                tracing::warn!("Failed to fetch {} from {}: {}", symbol, source.name(), e);
            }
            (symbol, result)
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}

/// Same as [`fetch_all`] for daily bars.
pub async fn fetch_all_bars<S>(
    source: &S,
    symbols: &[String],
    range: &DateRange,
    max_concurrent: usize,
) -> Vec<(String, Result<Vec<Bar>>)>
where
    S: PriceSource + ?Sized,
{
    stream::iter(symbols.iter().cloned())
        .map(|symbol| async move {
            let result = source.fetch_bars(&symbol, range).await;
            if let Err(e) = &result {
                tracing::warn!("Failed to fetch bars for {}: {}", symbol, e);
            }
            (symbol, result)
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}
