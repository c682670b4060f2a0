//! On-disk device tree: `<integration>/<manufacturer>/<model>/info.yaml`

use crate::error::{Error, Result};
use crate::record::DeviceInfo;
use crate::row::DeviceRow;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name of the device document inside each device directory
pub const INFO_FILE: &str = "info.yaml";

/// Device tree rooted at `devices_dir`, seeded from `template_dir`
#[derive(Debug, Clone)]
pub struct DeviceStore {
    devices_dir: PathBuf,
    template_dir: PathBuf,
}

impl DeviceStore {
    pub fn new(devices_dir: impl Into<PathBuf>, template_dir: impl Into<PathBuf>) -> Self {
        Self {
            devices_dir: devices_dir.into(),
            template_dir: template_dir.into(),
        }
    }

    pub fn devices_dir(&self) -> &Path {
        &self.devices_dir
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Directory that identifies the device described by `row`
    pub fn device_dir(&self, row: &DeviceRow) -> PathBuf {
        self.devices_dir
            .join(&row.integration)
            .join(row.manufacturer_segment())
            .join(row.model_segment())
    }

    /// Path of the document inside a device directory
    pub fn info_path(device_dir: &Path) -> PathBuf {
        device_dir.join(INFO_FILE)
    }

    /// Copy the whole template tree into `device_dir`
    ///
    /// `device_dir` must not exist yet; parents are created as needed. The
    /// copy is staged in a hidden sibling directory and renamed into place,
    /// so a failed copy never leaves a half-built device directory behind.
    pub fn scaffold(&self, device_dir: &Path) -> Result<()> {
        if !self.template_dir.is_dir() {
            return Err(Error::Scaffold {
                path: device_dir.to_path_buf(),
                message: format!(
                    "template directory '{}' does not exist",
                    self.template_dir.display()
                ),
            });
        }
        if device_dir.exists() {
            return Err(Error::Scaffold {
                path: device_dir.to_path_buf(),
                message: "device directory already exists".to_string(),
            });
        }

        let parent = device_dir.parent().ok_or_else(|| Error::Scaffold {
            path: device_dir.to_path_buf(),
            message: "device directory has no parent".to_string(),
        })?;
        fs::create_dir_all(parent).map_err(|e| Error::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;

        // Removed on drop unless the rename below succeeds
        let staging = tempfile::Builder::new()
            .prefix(".scaffold-")
            .tempdir_in(parent)
            .map_err(|e| Error::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;

        self.copy_template(staging.path(), device_dir)?;

        // The staging dir is created private; give it the template's mode
        let permissions = fs::metadata(&self.template_dir)?.permissions();
        fs::set_permissions(staging.path(), permissions)?;

        fs::rename(staging.path(), device_dir).map_err(|e| Error::FileWrite {
            path: device_dir.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %device_dir.display(), "scaffolded device directory");
        Ok(())
    }

    fn copy_template(&self, staging: &Path, device_dir: &Path) -> Result<()> {
        for entry in WalkDir::new(&self.template_dir).follow_links(true) {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(&self.template_dir)
                .map_err(|e| Error::Scaffold {
                    path: device_dir.to_path_buf(),
                    message: e.to_string(),
                })?;
            let target = staging.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| Error::FileWrite {
                    path: target.clone(),
                    source: e,
                })?;
            } else {
                fs::copy(entry.path(), &target).map_err(|e| Error::FileWrite {
                    path: target.clone(),
                    source: e,
                })?;
            }
        }
        Ok(())
    }

    /// Read the document from a device directory
    pub fn load(&self, device_dir: &Path) -> Result<DeviceInfo> {
        let path = Self::info_path(device_dir);
        let content = fs::read_to_string(&path).map_err(|e| Error::FileRead {
            path: path.clone(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| Error::Yaml { path, source: e })
    }

    /// Write the document into a device directory
    pub fn save(&self, device_dir: &Path, info: &DeviceInfo) -> Result<()> {
        let path = Self::info_path(device_dir);
        let content = serde_yaml::to_string(info).map_err(|e| Error::Yaml {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, content).map_err(|e| Error::FileWrite {
            path: path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), "wrote device document");
        Ok(())
    }
}
