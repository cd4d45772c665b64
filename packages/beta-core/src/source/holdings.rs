//! Disclosed mutual fund holdings.

use crate::types::FundHolding;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Looks up the disclosed holdings of a fund by scheme code.
#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    async fn holdings(&self, scheme_code: &str) -> Result<Vec<FundHolding>>;
}

/// Holdings kept in memory, keyed by scheme code.
#[derive(Debug, Clone, Default)]
pub struct StaticHoldings {
    funds: HashMap<String, Vec<FundHolding>>,
}

impl StaticHoldings {
    pub fn new(funds: HashMap<String, Vec<FundHolding>>) -> Self {
        Self { funds }
    }

    pub fn insert(&mut self, scheme_code: impl Into<String>, holdings: Vec<FundHolding>) {
        self.funds.insert(scheme_code.into(), holdings);
    }
}

#[async_trait]
impl HoldingsProvider for StaticHoldings {
    async fn holdings(&self, scheme_code: &str) -> Result<Vec<FundHolding>> {
        self.funds
            .get(scheme_code.trim())
            .cloned()
            .ok_or_else(|| Error::Source(format!("No holdings disclosed for {scheme_code}")))
    }
}

/// Holdings read from a JSON file of the form
/// `{"120465": [{"name": "...", "sector": "...", "allocation": 9.5, "beta": 1.1}]}`.
///
/// The file is read on every lookup so edits are picked up without a restart.
#[derive(Debug, Clone)]
pub struct JsonFileHoldings {
    path: PathBuf,
}

impl JsonFileHoldings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, Vec<FundHolding>>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Source(format!(
                "Cannot read holdings file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Source(format!(
                "Invalid holdings file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl HoldingsProvider for JsonFileHoldings {
    async fn holdings(&self, scheme_code: &str) -> Result<Vec<FundHolding>> {
        let funds = self.load()?;
        tracing::debug!(
            "Loaded holdings for {} funds from {}",
            funds.len(),
            self.path.display()
        );
        StaticHoldings::new(funds).holdings(scheme_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::fund_weighted_beta;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn holding(name: &str, allocation: f64, beta: f64) -> FundHolding {
        FundHolding {
            name: name.to_string(),
            sector: String::new(),
            allocation,
            beta,
        }
    }

    #[tokio::test]
    async fn test_static_holdings() {
        let mut provider = StaticHoldings::default();
        provider.insert("120465", vec![holding("HDFC Bank", 60.0, 1.0)]);

        let holdings = provider.holdings(" 120465 ").await.unwrap();
        assert_eq!(holdings.len(), 1);

        let err = provider.holdings("999999").await.unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }

    #[tokio::test]
    async fn test_json_file_holdings() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"120465": [
                {{"name": "HDFC Bank", "sector": "Financials", "allocation": 60.0, "beta": 1.0}},
                {{"name": "TCS", "allocation": 40.0, "beta": 0.5}}
            ]}}"#
        )
        .unwrap();

        let provider = JsonFileHoldings::new(file.path());
        let holdings = provider.holdings("120465").await.unwrap();

        assert_eq!(holdings[0].sector, "Financials");
        assert_eq!(holdings[1].sector, "");
        assert_relative_eq!(fund_weighted_beta(&holdings), 0.8, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_json_file_errors_are_source_errors() {
        let provider = JsonFileHoldings::new("/nonexistent/holdings.json");
        assert!(matches!(
            provider.holdings("1").await.unwrap_err(),
            Error::Source(_)
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let provider = JsonFileHoldings::new(file.path());
        assert!(matches!(
            provider.holdings("1").await.unwrap_err(),
            Error::Source(_)
        ));
    }
}
