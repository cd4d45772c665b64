//! Relative Strength Index.

/// Running Wilder averages of gains and losses.
#[derive(Debug, Clone, Copy)]
struct Wilder {
    gain: f64,
    loss: f64,
}

impl Wilder {
    /// Seed from the simple average of the first `period` changes.
    fn seed(changes: &[f64]) -> Self {
        let n = changes.len() as f64;
        Self {
            gain: changes.iter().map(|c| c.max(0.0)).sum::<f64>() / n,
            loss: changes.iter().map(|c| (-c).max(0.0)).sum::<f64>() / n,
        }
    }

    /// `avg = (prev * (period - 1) + x) / period`
    fn update(&mut self, change: f64, period: f64) {
        self.gain = (self.gain * (period - 1.0) + change.max(0.0)) / period;
        self.loss = (self.loss * (period - 1.0) + (-change).max(0.0)) / period;
    }

    fn value(&self) -> f64 {
        match (self.gain > 0.0, self.loss > 0.0) {
            (false, false) => 50.0,
            (true, false) => 100.0,
            (false, true) => 0.0,
            (true, true) => 100.0 - 100.0 / (1.0 + self.gain / self.loss),
        }
    }
}

/// RSI with Wilder's smoothing, one value per price.
///
/// Entries before index `period` hold the neutral 50.0.
///
/// ```rust
/// use beta_core::indicators::rsi;
///
/// let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
/// assert_eq!(rsi(&closes, 14)[19], 100.0);
/// ```
pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![50.0; prices.len()];
    if period == 0 || prices.len() <= period {
        return result;
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let mut avg = Wilder::seed(&changes[..period]);
    result[period] = avg.value();

    for (i, &change) in changes.iter().enumerate().skip(period) {
        avg.update(change, period as f64);
        result[i + 1] = avg.value();
    }

    result
}
