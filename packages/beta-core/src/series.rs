//! Price and return series.
//!
//! Both series types validate on construction: dates strictly increasing, all
//! values finite, prices positive. Anything reaching the risk calculator has
//! already passed through here.

use crate::timeframe::{DateRange, Frequency};
use crate::types::{PricePoint, ReturnPoint};
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A validated, chronologically ordered price or NAV series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series from points already in ascending date order.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for p in &points {
            if !p.price.is_finite() || p.price <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "Price on {} must be positive and finite, got {}",
                    p.date, p.price
                )));
            }
        }
        check_ascending(points.iter().map(|p| p.date))?;
        Ok(Self { points })
    }

    /// Create a series from points in any order.
    ///
    /// Points are sorted by date; when a date repeats, the later point in the
    /// input wins.
    pub fn from_unsorted(mut points: Vec<PricePoint>) -> Result<Self> {
        // Stable sort keeps input order within a date, so the last one is the latest
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => deduped.push(p),
            }
        }
        Self::new(deduped)
    }

    /// All points.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First observation date.
    pub fn start(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Last observation date.
    pub fn end(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Raw prices in order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Restrict to observations inside `range`.
    pub fn within(&self, range: &DateRange) -> PriceSeries {
        PriceSeries {
            points: self
                .points
                .iter()
                .filter(|p| range.contains(p.date))
                .copied()
                .collect(),
        }
    }

    /// Downsample to one observation per period, keeping the last price seen.
    ///
    /// Each kept price is dated at the end of its period (ISO-week Sunday or
    /// month end), so two series resampled to the same frequency share dates
    /// even when their last trading days differ. Daily returns the series
    /// unchanged.
    pub fn resample(&self, frequency: Frequency) -> PriceSeries {
        let mut points: Vec<PricePoint> = Vec::new();
        for p in &self.points {
            let stamped = PricePoint::new(frequency.period_end(p.date), p.price);
            match points.last_mut() {
                Some(last) if last.date == stamped.date => *last = stamped,
                _ => points.push(stamped),
            }
        }
        PriceSeries { points }
    }

    /// Percentage returns between consecutive observations.
    ///
    /// `return[i] = (price[i] - price[i-1]) / price[i-1] * 100`, dated at `i`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` when a return overflows, e.g. a jump from a
    /// near-zero price.
    pub fn to_returns(&self) -> Result<ReturnSeries> {
        ReturnSeries::new(
            self.points
                .windows(2)
                .map(|w| {
                    ReturnPoint::new(w[1].date, (w[1].price - w[0].price) / w[0].price * 100.0)
                })
                .collect(),
        )
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = Error;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// A validated series of percentage returns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ReturnPoint>", into = "Vec<ReturnPoint>")]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Create a series from points in ascending date order.
    pub fn new(points: Vec<ReturnPoint>) -> Result<Self> {
        if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "Return on {} is not finite: {}",
                p.date, p.value
            )));
        }
        check_ascending(points.iter().map(|p| p.date))?;
        Ok(Self { points })
    }

    /// Build from parallel date and value vectors.
    pub fn from_parts(dates: &[NaiveDate], values: &[f64]) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "Got {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        Self::new(
            dates
                .iter()
                .zip(values)
                .map(|(&d, &v)| ReturnPoint::new(d, v))
                .collect(),
        )
    }

    /// All points.
    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    /// Return values in order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<Vec<ReturnPoint>> for ReturnSeries {
    type Error = Error;

    fn try_from(points: Vec<ReturnPoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<ReturnSeries> for Vec<ReturnPoint> {
    fn from(series: ReturnSeries) -> Self {
        series.points
    }
}

fn check_ascending(dates: impl Iterator<Item = NaiveDate>) -> Result<()> {
    let mut prev: Option<NaiveDate> = None;
    for date in dates {
        if let Some(p) = prev {
            if date <= p {
                return Err(Error::InvalidInput(format!(
                    "Dates must be strictly increasing: {date} follows {p}"
                )));
            }
        }
        prev = Some(date);
    }
    Ok(())
}
