//! Approved integrations, taken from the published integration catalog

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default location of the integration catalog
pub const DEFAULT_CATALOG_URL: &str = "https://www.home-assistant.io/integrations.json";

/// Integrations whose device data is never accepted
///
/// - `wled`: manufacturer/model are a hardcoded placeholder upstream
/// - `fritz`: manufacturer is chosen by the user
pub const EXCLUDED_INTEGRATIONS: &[&str] = &["wled", "fritz"];

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Set of integration identifiers whose rows may be merged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovedIntegrations {
    domains: BTreeSet<String>,
}

impl ApprovedIntegrations {
    /// Build the set, dropping [`EXCLUDED_INTEGRATIONS`]
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domains = domains
            .into_iter()
            .map(Into::into)
            .filter(|domain| !is_excluded(domain))
            .collect();
        Self { domains }
    }

    /// Parse a catalog document: a JSON object keyed by integration domain
    pub fn from_catalog_json(content: &str) -> Result<Self> {
        let catalog: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)?;
        Ok(Self::from_domains(catalog.into_keys()))
    }

    /// Load a catalog document saved on disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        Self::from_catalog_json(&content)
    }

    /// Download the catalog
    pub fn fetch(url: &str) -> Result<Self> {
        let catalog_error = |source| Error::Catalog {
            url: url.to_string(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(catalog_error)?;

        let catalog: BTreeMap<String, serde_json::Value> = client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(catalog_error)?;

        let approved = Self::from_domains(catalog.into_keys());
        tracing::info!(url, count = approved.len(), "fetched integration catalog");
        Ok(approved)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }
}

/// Whether `domain` is permanently excluded
pub fn is_excluded(domain: &str) -> bool {
    EXCLUDED_INTEGRATIONS.contains(&domain)
}
