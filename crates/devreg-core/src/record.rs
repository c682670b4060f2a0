//! Persistent device document and merge bookkeeping types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Contents of one `info.yaml` in the device tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    /// Manufacturer text exactly as first reported
    pub manufacturer_raw: Option<String>,
    /// Model text exactly as first reported
    pub model_raw: Option<String>,
    /// Display name for the manufacturer
    pub manufacturer_name: Option<String>,
    /// Display name for the model
    pub model_name: Option<String>,
    pub has_via_device: Option<bool>,
    pub has_suggested_area: Option<bool>,
    pub has_configuration_url: Option<bool>,
    pub entry_type: Option<String>,
    /// Every distinct version combination seen, oldest first
    pub versions: Vec<Version>,
    /// Keys from the template this tool does not manage, written back untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl DeviceInfo {
    /// Whether `version` is already recorded (structural equality)
    pub fn has_version(&self, version: &Version) -> bool {
        self.versions.contains(version)
    }
}

/// One observed software/hardware combination
///
/// A version with neither field set is a valid entry and serializes as `{}`.
/// Equality covers every key, including ones kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<String>,
    /// Other keys found in a stored entry
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Version {
    /// Build a version, dropping empty strings
    pub fn new(software: Option<&str>, hardware: Option<&str>) -> Self {
        let keep = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);
        Self {
            software: keep(software),
            hardware: keep(hardware),
            extra: BTreeMap::new(),
        }
    }
}

/// What merging one row did to the device tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new device directory was scaffolded
    Created,
    /// An existing document gained at least one value
    Updated,
    /// Nothing new; no write happened
    Unchanged,
    /// Integration not approved; the tree was not touched
    Ignored,
}

impl Outcome {
    /// Whether the document must be written back
    pub fn needs_write(self) -> bool {
        matches!(self, Outcome::Created | Outcome::Updated)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Unchanged => "unchanged",
            Outcome::Ignored => "ignored",
        };
        f.write_str(name)
    }
}

/// Outcome counts for a file or a whole batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateRecord {
    pub created: usize,
    pub updated: usize,
    pub ignored: usize,
}

impl UpdateRecord {
    pub fn new(created: usize, updated: usize, ignored: usize) -> Self {
        Self {
            created,
            updated,
            ignored,
        }
    }

    /// Total rows that were counted
    pub fn total(&self) -> usize {
        self.created + self.updated + self.ignored
    }
}

impl From<Outcome> for UpdateRecord {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Created => Self::new(1, 0, 0),
            Outcome::Updated => Self::new(0, 1, 0),
            Outcome::Ignored => Self::new(0, 0, 1),
            Outcome::Unchanged => Self::default(),
        }
    }
}

impl Add for UpdateRecord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            created: self.created + other.created,
            updated: self.updated + other.updated,
            ignored: self.ignored + other.ignored,
        }
    }
}

impl AddAssign for UpdateRecord {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for UpdateRecord {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for UpdateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={}, updated={}, ignored={}",
            self.created, self.updated, self.ignored
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_record_addition() {
        let mut total = UpdateRecord::new(1, 2, 3);
        total += UpdateRecord::new(4, 5, 6);
        assert_eq!(total, UpdateRecord::new(5, 7, 9));
        assert_eq!(total.total(), 21);
    }

    #[test]
    fn test_update_record_from_outcomes() {
        let total: UpdateRecord = [
            Outcome::Created,
            Outcome::Updated,
            Outcome::Unchanged,
            Outcome::Ignored,
            Outcome::Ignored,
        ]
        .into_iter()
        .map(UpdateRecord::from)
        .sum();

        assert_eq!(total, UpdateRecord::new(1, 1, 2));
        assert_eq!(total.to_string(), "created=1, updated=1, ignored=2");
    }

    #[test]
    fn test_version_drops_empty_values() {
        let version = Version::new(Some(""), Some("rev2"));
        assert_eq!(version.software, None);
        assert_eq!(version.hardware, Some("rev2".to_string()));
        assert_eq!(Version::new(None, None), Version::default());
    }

    #[test]
    fn test_device_info_yaml_keeps_unknown_keys() {
        let yaml = "manufacturer_raw: null\nmodel_raw: null\nnotes: keep me\nversions: []\n";
        let info: DeviceInfo = serde_yaml::from_str(yaml).unwrap();

        assert!(info.manufacturer_name.is_none());
        assert!(info.versions.is_empty());
        assert_eq!(
            info.extra.get("notes"),
            Some(&serde_yaml::Value::String("keep me".to_string()))
        );

        let written = serde_yaml::to_string(&info).unwrap();
        assert!(written.contains("notes: keep me"));
    }

    #[test]
    fn test_version_keeps_unknown_keys() {
        let yaml = "versions:\n- software: '1.0'\n  channel: beta\n";
        let info: DeviceInfo = serde_yaml::from_str(yaml).unwrap();

        let stored = &info.versions[0];
        assert_eq!(stored.software.as_deref(), Some("1.0"));
        assert_eq!(
            stored.extra.get("channel"),
            Some(&serde_yaml::Value::String("beta".to_string()))
        );
        // Structural equality: the extra key makes it a different entry
        assert!(!info.has_version(&Version::new(Some("1.0"), None)));

        let written = serde_yaml::to_string(&info).unwrap();
        assert!(written.contains("channel: beta"));
    }

    #[test]
    fn test_empty_version_serializes_as_empty_map() {
        let info = DeviceInfo {
            versions: vec![Version::default()],
            ..DeviceInfo::default()
        };
        let written = serde_yaml::to_string(&info).unwrap();
        let reread: DeviceInfo = serde_yaml::from_str(&written).unwrap();
        assert_eq!(reread.versions, vec![Version::default()]);
    }
}
