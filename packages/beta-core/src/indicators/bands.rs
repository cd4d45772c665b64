//! Bollinger Bands.

/// Bands around a moving average, one entry per input point.
///
/// Warm-up entries (the first `period - 1`) are 0.0 on all three lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bands {
    pub lower: Vec<f64>,
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Bollinger Bands: window mean plus and minus `width` population standard
/// deviations.
pub fn bollinger_bands(data: &[f64], period: usize, width: f64) -> Bands {
    let n = data.len();
    if period == 0 || period > n {
        return Bands {
            lower: vec![0.0; n],
            middle: vec![0.0; n],
            upper: vec![0.0; n],
        };
    }

    let mut bands = Bands {
        lower: vec![0.0; period - 1],
        middle: vec![0.0; period - 1],
        upper: vec![0.0; period - 1],
    };
    for window in data.windows(period) {
        let len = window.len() as f64;
        let mid = window.iter().sum::<f64>() / len;
        let sd = (window.iter().map(|x| (x - mid) * (x - mid)).sum::<f64>() / len).sqrt();
        bands.lower.push(mid - width * sd);
        bands.middle.push(mid);
        bands.upper.push(mid + width * sd);
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bands_warmup_and_order() {
        let data: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.5).collect();
        let bands = bollinger_bands(&data, 20, 2.0);

        assert_eq!(bands.middle.len(), 30);
        assert_eq!(bands.middle[18], 0.0);
        assert!(bands.lower[25] < bands.middle[25] && bands.middle[25] < bands.upper[25]);
        // last window is 10..=29
        assert_relative_eq!(bands.middle[29], 109.75, epsilon = 1e-9);
    }

    #[test]
    fn test_bands_collapse_on_flat_prices() {
        let bands = bollinger_bands(&[50.0; 25], 20, 2.0);
        assert_eq!(bands.upper[24], 50.0);
        assert_eq!(bands.lower[24], 50.0);
    }

    #[test]
    fn test_bands_short_input() {
        let bands = bollinger_bands(&[1.0, 2.0], 5, 2.0);
        assert_eq!(bands.upper, vec![0.0, 0.0]);
    }
}
