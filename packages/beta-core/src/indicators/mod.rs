//! Technical indicators for the screener.
//!
//! Series functions return one value per input point. Entries inside the
//! warm-up window hold 0.0 (50.0 for RSI).

mod average;
mod bands;
mod macd;
mod rsi;

pub use average::{ema, sma, trailing_mean};
pub use bands::{bollinger_bands, Bands};
pub use macd::{macd, Macd};
pub use rsi::rsi;

/// Latest volume divided by the average of the `period` volumes before it.
///
/// Returns `None` without enough history or when the average is zero.
pub fn volume_ratio(volumes: &[f64], period: usize) -> Option<f64> {
    let (&latest, prior) = volumes.split_last()?;
    let average = trailing_mean(prior, period)?;
    if average <= 0.0 {
        return None;
    }
    Some(latest / average)
}
