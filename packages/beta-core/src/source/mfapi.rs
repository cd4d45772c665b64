//! Mutual fund NAV history from mfapi.in.

use super::{get_json, series_in_range, PriceSource};
use crate::config::Config;
use crate::series::PriceSeries;
use crate::timeframe::DateRange;
use crate::types::PricePoint;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Scheme details returned alongside the NAV history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemeMeta {
    #[serde(default)]
    pub fund_house: String,
    #[serde(default)]
    pub scheme_type: String,
    #[serde(default)]
    pub scheme_category: String,
    #[serde(default)]
    pub scheme_code: u64,
    #[serde(default)]
    pub scheme_name: String,
}

/// NAV source keyed by AMFI scheme code.
#[derive(Debug, Clone)]
pub struct MfApiSource {
    client: Client,
    base_url: String,
}

impl MfApiSource {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, config.mfapi_base_url.clone())
    }

    /// Scheme metadata and the NAV history inside `range`, from one request.
    pub async fn fetch_history(
        &self,
        scheme_code: &str,
        range: &DateRange,
    ) -> Result<(SchemeMeta, PriceSeries)> {
        let response = self.fetch_scheme(scheme_code).await?;
        tracing::debug!(
            "Fetched {} NAVs for {} ({})",
            response.data.len(),
            scheme_code,
            response.meta.scheme_name
        );

        let series = response.series(scheme_code, range)?;
        Ok((response.meta, series))
    }

    async fn fetch_scheme(&self, scheme_code: &str) -> Result<SchemeResponse> {
        let code = scheme_code.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidInput(format!(
                "Scheme code must be numeric: {scheme_code}"
            )));
        }

        let url = format!("{}/mf/{}", self.base_url, code);
        let response: SchemeResponse = get_json(&self.client, &url).await?;
        if response.data.is_empty() {
            return Err(Error::UnknownSymbol(code.to_string()));
        }
        Ok(response)
    }
}

#[async_trait]
impl PriceSource for MfApiSource {
    fn name(&self) -> &str {
        "mfapi"
    }

    async fn fetch_prices(&self, scheme_code: &str, range: &DateRange) -> Result<PriceSeries> {
        Ok(self.fetch_history(scheme_code, range).await?.1)
    }
}

#[derive(Debug, Deserialize)]
struct SchemeResponse {
    #[serde(default)]
    meta: SchemeMeta,
    #[serde(default)]
    data: Vec<NavRow>,
}

#[derive(Debug, Deserialize)]
struct NavRow {
    date: String,
    nav: String,
}

impl SchemeResponse {
    /// Parse NAV rows, skipping any with an unreadable date or value.
    fn points(&self) -> Vec<PricePoint> {
        self.data
            .iter()
            .filter_map(|row| {
                let date = NaiveDate::parse_from_str(&row.date, "%d-%m-%Y").ok()?;
                let nav = row.nav.trim().parse::<f64>().ok()?;
                Some(PricePoint::new(date, nav))
            })
            .collect()
    }

    /// NAVs inside `range`; an empty window is an error.
    fn series(&self, scheme_code: &str, range: &DateRange) -> Result<PriceSeries> {
        let series = series_in_range(self.points(), range)?;
        if series.is_empty() {
            return Err(Error::Source(format!(
                "No NAV data for {scheme_code} between {} and {}",
                range.start, range.end
            )));
        }
        Ok(series)
    }
}
