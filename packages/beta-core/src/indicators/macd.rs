//! Moving Average Convergence Divergence.

use super::average::ema;

/// MACD, signal and histogram lines, one entry per input point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Macd {
    /// Fast EMA minus slow EMA
    pub line: Vec<f64>,
    /// EMA of `line`
    pub signal: Vec<f64>,
    /// `line - signal`
    pub histogram: Vec<f64>,
}

/// MACD with the usual 12/26/9 style parameters.
pub fn macd(data: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let line: Vec<f64> = ema(data, fast)
        .into_iter()
        .zip(ema(data, slow))
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&line, signal);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    Macd {
        line,
        signal,
        histogram,
    }
}
