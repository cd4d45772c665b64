use super::PriceSource;
use crate::cache::TtlCache;
use crate::series::PriceSeries;
use crate::timeframe::DateRange;
use crate::types::Bar;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

type CacheKey = (String, DateRange);

/// Wraps a source and memoizes successful responses for a TTL.
///
/// Errors are never cached.
pub struct CachedSource<S> {
    inner: S,
    prices: TtlCache<CacheKey, PriceSeries>,
    bars: TtlCache<CacheKey, Vec<Bar>>,
}

impl<S: PriceSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            prices: TtlCache::new(ttl),
            bars: TtlCache::new(ttl),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached response.
    pub fn clear(&self) {
        self.prices.invalidate_all();
        self.bars.invalidate_all();
    }

    fn key(symbol: &str, range: &DateRange) -> CacheKey {
        (symbol.trim().to_uppercase(), *range)
    }
}

#[async_trait]
impl<S: PriceSource> PriceSource for CachedSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_prices(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries> {
        let key = Self::key(symbol, range);
        if let Some(series) = self.prices.get(&key) {
            tracing::debug!("Cache hit: {} prices for {}", self.name(), key.0);
            return Ok(series);
        }

        tracing::debug!("Cache miss: {} prices for {}", self.name(), key.0);
        let series = self.inner.fetch_prices(symbol, range).await?;
        self.prices.insert(key, series.clone());
        Ok(series)
    }

    async fn fetch_bars(&self, symbol: &str, range: &DateRange) -> Result<Vec<Bar>> {
        let key = Self::key(symbol, range);
        if let Some(bars) = self.bars.get(&key) {
            tracing::debug!("Cache hit: {} bars for {}", self.name(), key.0);
            return Ok(bars);
        }

        let bars = self.inner.fetch_bars(symbol, range).await?;
        self.bars.insert(key, bars.clone());
        Ok(bars)
    }
}
