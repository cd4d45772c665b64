//! Technical stock screener.
//!
//! Each stock's latest indicator readings are scored with simple additive
//! rules (see [`score`]), the total is mapped to a [`Rating`], and results are
//! ranked best first.

mod scoring;
mod snapshot;

pub use scoring::{score, Signal};
pub use snapshot::IndicatorSnapshot;

use crate::types::Bar;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Indicator periods and rule thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScreenerSettings {
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub rsi_healthy_low: f64,
    pub rsi_healthy_high: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std: f64,
    pub sma_short: usize,
    pub sma_long: usize,
    pub volume_period: usize,
    pub volume_surge: f64,
    pub strong_volume_surge: f64,
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            rsi_healthy_low: 40.0,
            rsi_healthy_high: 60.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_std: 2.0,
            sma_short: 20,
            sma_long: 50,
            volume_period: 20,
            volume_surge: 1.2,
            strong_volume_surge: 1.5,
        }
    }
}

/// Rating bucket for a score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Avoid,
    Hold,
    Buy,
    StrongBuy,
}

impl Rating {
    /// Map a score to a rating: `>= 6` strong buy, `>= 4` buy, `>= 2` hold.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 6 => Rating::StrongBuy,
            s if s >= 4 => Rating::Buy,
            s if s >= 2 => Rating::Hold,
            _ => Rating::Avoid,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rating::StrongBuy => "Strong Buy",
            Rating::Buy => "Buy",
            Rating::Hold => "Hold",
            Rating::Avoid => "Avoid",
        })
    }
}

/// Screening outcome for one stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenResult {
    pub symbol: String,
    pub score: i32,
    pub rating: Rating,
    pub signals: Vec<Signal>,
    pub snapshot: IndicatorSnapshot,
}

/// Screen one stock from its daily bars.
pub fn screen(symbol: &str, bars: &[Bar], settings: &ScreenerSettings) -> Result<ScreenResult> {
    let snapshot = IndicatorSnapshot::from_bars(bars, settings)?;
    let (score, signals) = score(&snapshot, settings);
    Ok(ScreenResult {
        symbol: symbol.to_uppercase(),
        score,
        rating: Rating::from_score(score),
        signals,
        snapshot,
    })
}

/// Sort results by score (highest first), then by symbol.
pub fn rank(mut results: Vec<ScreenResult>) -> Vec<ScreenResult> {
    results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.symbol.cmp(&b.symbol)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn bars(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Bar {
                date: start + Days::new(i as u64),
                close,
                volume,
            })
            .collect()
    }

    fn result(symbol: &str, score: i32) -> ScreenResult {
        ScreenResult {
            symbol: symbol.to_string(),
            score,
            rating: Rating::from_score(score),
            signals: Vec::new(),
            snapshot: IndicatorSnapshot {
                close: 1.0,
                rsi: 50.0,
                macd: 0.0,
                macd_signal: 0.0,
                histogram: 0.0,
                prev_histogram: 0.0,
                sma_short: 1.0,
                sma_long: 1.0,
                bb_upper: 1.0,
                bb_lower: 1.0,
                volume_ratio: None,
            },
        }
    }

    #[test]
    fn test_rating_from_score() {
        assert_eq!(Rating::from_score(10), Rating::StrongBuy);
        assert_eq!(Rating::from_score(6), Rating::StrongBuy);
        assert_eq!(Rating::from_score(5), Rating::Buy);
        assert_eq!(Rating::from_score(4), Rating::Buy);
        assert_eq!(Rating::from_score(2), Rating::Hold);
        assert_eq!(Rating::from_score(1), Rating::Avoid);
        assert_eq!(Rating::from_score(-2), Rating::Avoid);
        assert_eq!(Rating::StrongBuy.to_string(), "Strong Buy");
    }

    #[test]
    fn test_rank_orders_by_score_then_symbol() {
        let ranked = rank(vec![
            result("TCS", 3),
            result("INFY", 7),
            result("HDFCBANK", 3),
        ]);
        let order: Vec<_> = ranked.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["INFY", "HDFCBANK", "TCS"]);
    }

    #[test]
    fn test_screen_uptrend_with_volume_surge() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let mut volumes = vec![1000.0; 60];
        volumes[59] = 2000.0;

        let res = screen("reliance", &bars(&closes, &volumes), &ScreenerSettings::default())
            .unwrap();

        assert_eq!(res.symbol, "RELIANCE");
        assert!(res.signals.iter().any(|s| s.rule.starts_with("Strong volume surge")));
        assert!(res.signals.iter().any(|s| s.rule == "MACD above signal"));
        assert_eq!(res.score, res.signals.iter().map(|s| s.points).sum::<i32>());
        assert_eq!(res.rating, Rating::from_score(res.score));
    }

    #[test]
    fn test_settings_partial_deserialize() {
        let settings: ScreenerSettings = serde_json::from_str(r#"{"rsi_period": 7}"#).unwrap();
        assert_eq!(settings.rsi_period, 7);
        assert_eq!(settings.sma_long, 50);
    }
}
