//! Additive point scoring over an indicator snapshot.

use super::snapshot::IndicatorSnapshot;
use super::ScreenerSettings;
use serde::{Deserialize, Serialize};

/// One rule that fired, with the points it added (negative points subtract).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signal {
    pub rule: String,
    pub points: i32,
}

impl Signal {
    fn new(rule: impl Into<String>, points: i32) -> Self {
        Self {
            rule: rule.into(),
            points,
        }
    }
}

/// Score a snapshot. Returns the total and the rules that contributed.
///
/// | Rule                                   | Points |
/// |----------------------------------------|--------|
/// | RSI below oversold                     | +2     |
/// | RSI inside the healthy band            | +1     |
/// | RSI above overbought                   | -1     |
/// | MACD above signal                      | +2     |
/// | MACD histogram rising                  | +1     |
/// | Close above short SMA                  | +1     |
/// | Close above long SMA                   | +1     |
/// | Close in lowest tenth of the band      | +1     |
/// | Close above upper band                 | -1     |
/// | Volume ratio at or above strong surge  | +2     |
/// | Volume ratio at or above surge         | +1     |
pub fn score(snapshot: &IndicatorSnapshot, settings: &ScreenerSettings) -> (i32, Vec<Signal>) {
    let mut signals = Vec::new();

    let rsi = snapshot.rsi;
    if rsi < settings.rsi_oversold {
        signals.push(Signal::new(format!("RSI oversold ({rsi:.1})"), 2));
    } else if rsi > settings.rsi_overbought {
        signals.push(Signal::new(format!("RSI overbought ({rsi:.1})"), -1));
    } else if (settings.rsi_healthy_low..=settings.rsi_healthy_high).contains(&rsi) {
        signals.push(Signal::new(format!("RSI healthy ({rsi:.1})"), 1));
    }

    if snapshot.macd > snapshot.macd_signal {
        signals.push(Signal::new("MACD above signal", 2));
    }
    if snapshot.histogram > snapshot.prev_histogram {
        signals.push(Signal::new("MACD histogram rising", 1));
    }

    if snapshot.close > snapshot.sma_short {
        signals.push(Signal::new(
            format!("Close above {}-period SMA", settings.sma_short),
            1,
        ));
    }
    if snapshot.close > snapshot.sma_long {
        signals.push(Signal::new(
            format!("Close above {}-period SMA", settings.sma_long),
            1,
        ));
    }

    if snapshot.close > snapshot.bb_upper {
        signals.push(Signal::new("Close above upper Bollinger band", -1));
    } else if let Some(pos) = snapshot.band_position() {
        if pos <= 0.1 {
            signals.push(Signal::new("Close near lower Bollinger band", 1));
        }
    }

    match snapshot.volume_ratio {
        Some(ratio) if ratio >= settings.strong_volume_surge => {
            signals.push(Signal::new(format!("Strong volume surge ({ratio:.2}x)"), 2));
        }
        Some(ratio) if ratio >= settings.volume_surge => {
            signals.push(Signal::new(format!("Volume surge ({ratio:.2}x)"), 1));
        }
        _ => {}
    }

    let total = signals.iter().map(|s| s.points).sum();
    (total, signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: 100.0,
            rsi: 65.0,
            macd: -0.5,
            macd_signal: 0.0,
            histogram: -0.5,
            prev_histogram: -0.4,
            sma_short: 101.0,
            sma_long: 102.0,
            bb_upper: 110.0,
            bb_lower: 90.0,
            volume_ratio: Some(1.0),
        }
    }

    #[test]
    fn test_neutral_scores_zero() {
        let (total, signals) = score(&neutral(), &ScreenerSettings::default());
        assert_eq!(total, 0);
        assert!(signals.is_empty());
    }

    #[test]
    fn test_bullish_setup() {
        let snap = IndicatorSnapshot {
            close: 108.0,
            rsi: 55.0,
            macd: 1.2,
            macd_signal: 0.8,
            histogram: 0.4,
            prev_histogram: 0.2,
            sma_short: 104.0,
            sma_long: 100.0,
            volume_ratio: Some(1.6),
            ..neutral()
        };
        let (total, signals) = score(&snap, &ScreenerSettings::default());

        // rsi 1 + macd 2 + hist 1 + sma 1 + sma 1 + volume 2
        assert_eq!(total, 8);
        assert_eq!(signals.len(), 6);
    }

    #[test]
    fn test_rsi_bands() {
        let settings = ScreenerSettings::default();

        let oversold = IndicatorSnapshot { rsi: 25.0, ..neutral() };
        assert_eq!(score(&oversold, &settings).0, 2);

        let overbought = IndicatorSnapshot { rsi: 75.0, ..neutral() };
        assert_eq!(score(&overbought, &settings).0, -1);

        let healthy_edge = IndicatorSnapshot { rsi: 60.0, ..neutral() };
        assert_eq!(score(&healthy_edge, &settings).0, 1);
    }

    #[test]
    fn test_bollinger_rules() {
        let settings = ScreenerSettings::default();

        let near_lower = IndicatorSnapshot { close: 91.0, ..neutral() };
        let (total, signals) = score(&near_lower, &settings);
        assert_eq!(total, 1);
        assert_eq!(signals[0].rule, "Close near lower Bollinger band");

        let above_upper = IndicatorSnapshot {
            close: 111.0,
            sma_short: 120.0,
            sma_long: 120.0,
            ..neutral()
        };
        assert_eq!(score(&above_upper, &settings).0, -1);
    }

    #[test]
    fn test_volume_thresholds() {
        let settings = ScreenerSettings::default();

        let surge = IndicatorSnapshot { volume_ratio: Some(1.2), ..neutral() };
        assert_eq!(score(&surge, &settings).0, 1);

        let strong = IndicatorSnapshot { volume_ratio: Some(1.5), ..neutral() };
        assert_eq!(score(&strong, &settings).0, 2);

        let missing = IndicatorSnapshot { volume_ratio: None, ..neutral() };
        assert_eq!(score(&missing, &settings).0, 0);
    }
}
