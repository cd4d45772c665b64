//! Latest indicator readings for one stock.

use super::ScreenerSettings;
use crate::indicators::{bollinger_bands, macd, rsi, trailing_mean, volume_ratio};
use crate::types::Bar;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Indicator values at the most recent bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub histogram: f64,
    /// Histogram one bar earlier
    pub prev_histogram: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    /// `None` when volume history is missing or all zero
    pub volume_ratio: Option<f64>,
}

impl IndicatorSnapshot {
    /// Bars needed before every indicator is past its warm-up.
    pub fn required_bars(settings: &ScreenerSettings) -> usize {
        [
            settings.rsi_period + 1,
            settings.sma_long,
            settings.bb_period,
            settings.macd_slow + settings.macd_signal,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
        .max(2)
    }

    /// Compute the snapshot from bars in chronological order.
    ///
    /// # Errors
    ///
    /// `Error::InsufficientData` with fewer than [`Self::required_bars`] bars,
    /// `Error::InvalidInput` for non-positive or non-finite closes.
    pub fn from_bars(bars: &[Bar], settings: &ScreenerSettings) -> Result<Self> {
        let required = Self::required_bars(settings);
        if bars.len() < required {
            return Err(Error::InsufficientData {
                required,
                actual: bars.len(),
            });
        }
        if let Some(bad) = bars.iter().find(|b| !b.close.is_finite() || b.close <= 0.0) {
            return Err(Error::InvalidInput(format!(
                "Close on {} must be positive and finite, got {}",
                bad.date, bad.close
            )));
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars
            .iter()
            .map(|b| if b.volume.is_finite() { b.volume.max(0.0) } else { 0.0 })
            .collect();
        let last = closes.len() - 1;

        let rsi_values = rsi(&closes, settings.rsi_period);
        let m = macd(
            &closes,
            settings.macd_fast,
            settings.macd_slow,
            settings.macd_signal,
        );
        let bands = bollinger_bands(&closes, settings.bb_period, settings.bb_std);

        // Lengths were checked against required_bars above
        let sma_short = trailing_mean(&closes, settings.sma_short).unwrap_or(closes[last]);
        let sma_long = trailing_mean(&closes, settings.sma_long).unwrap_or(closes[last]);

        Ok(Self {
            close: closes[last],
            rsi: rsi_values[last],
            macd: m.line[last],
            macd_signal: m.signal[last],
            histogram: m.histogram[last],
            prev_histogram: m.histogram[last - 1],
            sma_short,
            sma_long,
            bb_upper: bands.upper[last],
            bb_lower: bands.lower[last],
            volume_ratio: volume_ratio(&volumes, settings.volume_period),
        })
    }

    /// Position of the close inside the Bollinger band: 0 at the lower band, 1 at the upper.
    ///
    /// `None` when the band has collapsed to a line.
    pub fn band_position(&self) -> Option<f64> {
        let width = self.bb_upper - self.bb_lower;
        if width <= 0.0 {
            return None;
        }
        Some((self.close - self.bb_lower) / width)
    }
}
