//! Moving averages.

/// Simple moving average over a window ending at each point.
///
/// Output has the same length as the input; the first `period - 1` entries
/// are 0.0.
///
/// ```rust
/// use beta_core::indicators::sma;
///
/// let closes = [10.0, 11.0, 12.0, 13.0];
/// assert_eq!(sma(&closes, 3), vec![0.0, 0.0, 11.0, 12.0]);
/// ```
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || period > data.len() {
        return vec![0.0; data.len()];
    }

    let warmup = std::iter::repeat(0.0).take(period - 1);
    let means = data
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64);
    warmup.chain(means).collect()
}

/// Exponential moving average seeded with the first value,
/// `alpha = 2 / (period + 1)`.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![0.0; data.len()];
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev: Option<f64> = None;
    data.iter()
        .map(|&x| {
            let next = match prev {
                Some(p) => alpha * x + (1.0 - alpha) * p,
                None => x,
            };
            prev = Some(next);
            next
        })
        .collect()
}

/// Mean of the last `period` values, or `None` if there are not enough.
pub fn trailing_mean(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period {
        return None;
    }
    Some(data[data.len() - period..].iter().sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sma_window() {
        let result = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(result.len(), 5);
        assert_eq!(result[1], 0.0);
        assert_relative_eq!(result[2], 2.0);
        assert_relative_eq!(result[4], 4.0);
    }

    #[test]
    fn test_sma_short_input() {
        assert_eq!(sma(&[1.0, 2.0, 3.0], 10), vec![0.0; 3]);
        assert_eq!(sma(&[1.0, 2.0], 0), vec![0.0; 2]);
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        // alpha = 0.5 for period 3
        let result = ema(&[10.0, 11.0, 12.0], 3);
        assert_relative_eq!(result[0], 10.0);
        assert_relative_eq!(result[1], 10.5);
        assert_relative_eq!(result[2], 11.25);
    }

    #[test]
    fn test_ema_leads_sma_after_jump() {
        let data: Vec<f64> = (0..20).map(|i| if i < 10 { 100.0 } else { 150.0 }).collect();
        assert!(ema(&data, 5)[11] > sma(&data, 5)[11]);
    }

    #[test]
    fn test_trailing_mean() {
        assert_eq!(trailing_mean(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
        assert_eq!(trailing_mean(&[1.0], 2), None);
        assert_eq!(trailing_mean(&[1.0], 0), None);
    }

    #[test]
    fn test_empty() {
        assert!(sma(&[], 3).is_empty());
        assert!(ema(&[], 3).is_empty());
    }
}
