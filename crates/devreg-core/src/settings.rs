//! Run configuration: where the tree, template, inputs and catalog live

use crate::catalog::{ApprovedIntegrations, DEFAULT_CATALOG_URL};
use crate::error::{Error, Result};
use crate::merger::DeviceMerger;
use crate::store::DeviceStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the approved-integration set comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogSource {
    /// Download the catalog JSON
    Remote { url: String },
    /// Read a saved copy of the catalog JSON
    File { path: PathBuf },
    /// Use these domains directly
    Inline { domains: Vec<String> },
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource::Remote {
            url: DEFAULT_CATALOG_URL.to_string(),
        }
    }
}

impl CatalogSource {
    /// Resolve the approved set; exclusions apply to every source
    pub fn resolve(&self) -> Result<ApprovedIntegrations> {
        match self {
            CatalogSource::Remote { url } => ApprovedIntegrations::fetch(url),
            CatalogSource::File { path } => ApprovedIntegrations::load(path),
            CatalogSource::Inline { domains } => {
                Ok(ApprovedIntegrations::from_domains(domains.iter().cloned()))
            }
        }
    }
}

/// Settings for one batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the device tree
    pub devices_dir: PathBuf,
    /// Directory holding pending `*.csv` files
    pub process_dir: PathBuf,
    /// Directory copied for every new device
    pub template_dir: PathBuf,
    #[serde(default)]
    pub catalog: CatalogSource,
}

impl Settings {
    /// Conventional layout below a repository root
    pub fn from_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            devices_dir: root.join("devices"),
            process_dir: root.join("to_process"),
            template_dir: root.join("template"),
            catalog: CatalogSource::default(),
        }
    }

    /// Load settings from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save settings to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).map_err(|e| Error::FileWrite {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    pub fn store(&self) -> DeviceStore {
        DeviceStore::new(&self.devices_dir, &self.template_dir)
    }

    /// Resolve the catalog once and build the merger for this run
    pub fn merger(&self) -> Result<DeviceMerger> {
        let approved = self.catalog.resolve()?;
        tracing::info!(count = approved.len(), "approved integrations loaded");
        Ok(DeviceMerger::new(self.store(), approved))
    }
}
