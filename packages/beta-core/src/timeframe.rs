//! Sampling frequency, analysis windows and benchmark indices.

use crate::{Error, Result};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sampling frequency of a return series.
///
/// Annualization depends on it, so it is always passed explicitly rather than
/// assumed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One observation per trading day
    Daily,
    /// One observation per week
    Weekly,
    /// One observation per calendar month
    #[default]
    Monthly,
}

impl Frequency {
    /// Number of periods in a year: 252 trading days, 52 weeks or 12 months.
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Frequency::Daily => 252.0,
            Frequency::Weekly => 52.0,
            Frequency::Monthly => 12.0,
        }
    }

    /// Last calendar day of the period containing `date`.
    ///
    /// Weeks end on the ISO-week Sunday, months on their last day. Daily
    /// periods are the date itself.
    pub fn period_end(&self, date: NaiveDate) -> NaiveDate {
        let end = match self {
            Frequency::Daily => Some(date),
            Frequency::Weekly => {
                let to_sunday = 6 - date.weekday().num_days_from_monday();
                date.checked_add_days(Days::new(u64::from(to_sunday)))
            }
            Frequency::Monthly => date
                .with_day(1)
                .and_then(|first| first.checked_add_months(Months::new(1)))
                .and_then(|next| next.pred_opt()),
        };
        // Only fails at the edge of chrono's date range
        end.unwrap_or(date)
    }

    /// Roughly how many returns this frequency yields over `range`.
    pub fn expected_returns(&self, range: &DateRange) -> usize {
        let days = (range.end - range.start).num_days().max(0) as usize;
        match self {
            Frequency::Daily => days * 5 / 7,
            Frequency::Weekly => days / 7,
            Frequency::Monthly => range.months() as usize,
        }
    }

    /// This frequency, or the next finer one that still yields `min_samples`
    /// returns over `range`.
    ///
    /// A six-month window only has six monthly returns, so with the default
    /// floor of 10 it falls back to weekly. Daily is the last resort.
    pub fn fit_window(self, range: &DateRange, min_samples: usize) -> Frequency {
        let mut frequency = self;
        loop {
            if frequency.expected_returns(range) >= min_samples {
                return frequency;
            }
            frequency = match frequency {
                Frequency::Monthly => Frequency::Weekly,
                Frequency::Weekly | Frequency::Daily => return Frequency::Daily,
            };
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(Frequency::Daily),
            "weekly" | "w" => Ok(Frequency::Weekly),
            "monthly" | "m" => Ok(Frequency::Monthly),
            other => Err(Error::InvalidInput(format!("Unknown frequency: {other}"))),
        }
    }
}

/// An inclusive date window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "Start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whole calendar months between start and end, never less than 1.
    pub fn months(&self) -> u32 {
        let diff = (self.end.year() - self.start.year()) * 12 + self.end.month() as i32
            - self.start.month() as i32;
        diff.max(1) as u32
    }
}

/// Lookback window for an analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    SixMonths,
    #[default]
    OneYear,
    ThreeYears,
    FiveYears,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Timeframe {
    /// Resolve to a concrete range ending on `today` (custom ranges ignore it).
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange> {
        let months = match self {
            Timeframe::SixMonths => 6,
            Timeframe::OneYear => 12,
            Timeframe::ThreeYears => 36,
            Timeframe::FiveYears => 60,
            Timeframe::Custom { start, end } => return DateRange::new(*start, *end),
        };

        let start = today
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| Error::InvalidInput(format!("Date out of range: {today}")))?;
        DateRange::new(start, today)
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "6M" => Ok(Timeframe::SixMonths),
            "1Y" => Ok(Timeframe::OneYear),
            "3Y" => Ok(Timeframe::ThreeYears),
            "5Y" => Ok(Timeframe::FiveYears),
            other => {
                // START..END, e.g. 2022-01-01..2023-06-30
                let (start, end) = other.split_once("..").ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "Unknown timeframe: {s} (expected 6M, 1Y, 3Y, 5Y or START..END)"
                    ))
                })?;
                let start = parse_date(start)?;
                let end = parse_date(end)?;
                DateRange::new(start, end)?;
                Ok(Timeframe::Custom { start, end })
            }
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidInput(format!("Invalid date '{s}': {e}")))
}

/// Benchmark index a portfolio is measured against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Benchmark {
    #[default]
    Nifty50,
    Sensex,
    Nifty500,
    #[serde(rename = "NIFTYMIDCAP")]
    NiftyMidcap100,
}

impl Benchmark {
    /// All supported benchmarks.
    pub const ALL: [Benchmark; 4] = [
        Benchmark::Nifty50,
        Benchmark::Sensex,
        Benchmark::Nifty500,
        Benchmark::NiftyMidcap100,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Benchmark::Nifty50 => "NIFTY 50",
            Benchmark::Sensex => "SENSEX",
            Benchmark::Nifty500 => "NIFTY 500",
            Benchmark::NiftyMidcap100 => "NIFTY Midcap 100",
        }
    }

    /// Ticker used by the Yahoo chart API.
    pub fn ticker(&self) -> &'static str {
        match self {
            Benchmark::Nifty50 => "^NSEI",
            Benchmark::Sensex => "^BSESN",
            Benchmark::Nifty500 => "^CRSLDX",
            Benchmark::NiftyMidcap100 => "NIFTY_MIDCAP_100.NS",
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Benchmark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        match key.as_str() {
            "NIFTY50" | "NIFTY" | "NSEI" => Ok(Benchmark::Nifty50),
            "SENSEX" | "BSESN" => Ok(Benchmark::Sensex),
            "NIFTY500" => Ok(Benchmark::Nifty500),
            "NIFTYMIDCAP" | "NIFTYMIDCAP100" => Ok(Benchmark::NiftyMidcap100),
            _ => Err(Error::UnknownSymbol(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_periods_per_year() {
        assert_eq!(Frequency::Daily.periods_per_year(), 252.0);
        assert_eq!(Frequency::Weekly.periods_per_year(), 52.0);
        assert_eq!(Frequency::Monthly.periods_per_year(), 12.0);
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("Daily".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!("m".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!("hourly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_period_end() {
        // 2024-03-13 is a Wednesday
        let mid_week = date(2024, 3, 13);
        assert_eq!(Frequency::Daily.period_end(mid_week), mid_week);
        assert_eq!(Frequency::Weekly.period_end(mid_week), date(2024, 3, 17));
        assert_eq!(Frequency::Weekly.period_end(date(2024, 3, 17)), date(2024, 3, 17));
        assert_eq!(Frequency::Monthly.period_end(mid_week), date(2024, 3, 31));
        assert_eq!(Frequency::Monthly.period_end(date(2024, 2, 1)), date(2024, 2, 29));
        assert_eq!(Frequency::Monthly.period_end(date(2023, 12, 5)), date(2023, 12, 31));
        // ISO week 1 of 2025 starts on Monday 2024-12-30
        assert_eq!(Frequency::Weekly.period_end(date(2024, 12, 30)), date(2025, 1, 5));
    }

    #[test]
    fn test_fit_window() {
        let today = date(2024, 6, 15);
        let six_months = Timeframe::SixMonths.resolve(today).unwrap();
        let one_year = Timeframe::OneYear.resolve(today).unwrap();

        assert_eq!(Frequency::Monthly.fit_window(&six_months, 10), Frequency::Weekly);
        assert_eq!(Frequency::Monthly.fit_window(&one_year, 10), Frequency::Monthly);
        assert_eq!(Frequency::Monthly.fit_window(&one_year, 24), Frequency::Weekly);
        // Never coarser than requested
        assert_eq!(Frequency::Daily.fit_window(&one_year, 10), Frequency::Daily);

        let three_weeks = DateRange::new(date(2024, 6, 1), date(2024, 6, 22)).unwrap();
        assert_eq!(Frequency::Monthly.fit_window(&three_weeks, 10), Frequency::Daily);
    }

    #[test]
    fn test_timeframe_default() {
        assert_eq!(Timeframe::default(), Timeframe::OneYear);
    }

    #[test]
    fn test_timeframe_resolve() {
        let today = date(2024, 6, 15);
        let range = Timeframe::OneYear.resolve(today).unwrap();
        assert_eq!(range.start, date(2023, 6, 15));
        assert_eq!(range.end, today);
        assert_eq!(range.months(), 12);

        let range = Timeframe::SixMonths.resolve(today).unwrap();
        assert_eq!(range.start, date(2023, 12, 15));
    }

    #[test]
    fn test_timeframe_resolve_month_end_clamps() {
        // 31 Aug minus 6 months has no 31 Feb
        let range = Timeframe::SixMonths.resolve(date(2024, 8, 31)).unwrap();
        assert_eq!(range.start, date(2024, 2, 29));
    }

    #[test]
    fn test_timeframe_from_str() {
        assert_eq!("3y".parse::<Timeframe>().unwrap(), Timeframe::ThreeYears);
        let custom = "2022-01-10..2022-03-05".parse::<Timeframe>().unwrap();
        assert_eq!(
            custom,
            Timeframe::Custom {
                start: date(2022, 1, 10),
                end: date(2022, 3, 5)
            }
        );
        assert!("2023-01-01..2022-01-01".parse::<Timeframe>().is_err());
        assert!("10Y".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_custom_range_months_floor() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 20)).unwrap();
        assert_eq!(range.months(), 1);

        let range = DateRange::new(date(2022, 11, 1), date(2024, 2, 1)).unwrap();
        assert_eq!(range.months(), 15);
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 2, 1)));
    }

    #[test]
    fn test_benchmark_parse() {
        assert_eq!("NIFTY 50".parse::<Benchmark>().unwrap(), Benchmark::Nifty50);
        assert_eq!("sensex".parse::<Benchmark>().unwrap(), Benchmark::Sensex);
        assert_eq!(
            "NIFTYMIDCAP".parse::<Benchmark>().unwrap(),
            Benchmark::NiftyMidcap100
        );
        assert!("DOW".parse::<Benchmark>().is_err());
        assert_eq!(Benchmark::Nifty50.ticker(), "^NSEI");
    }

    #[test]
    fn test_benchmark_serde() {
        let json = serde_json::to_string(&Benchmark::NiftyMidcap100).unwrap();
        assert_eq!(json, "\"NIFTYMIDCAP\"");
        let b: Benchmark = serde_json::from_str("\"SENSEX\"").unwrap();
        assert_eq!(b, Benchmark::Sensex);
    }
}
