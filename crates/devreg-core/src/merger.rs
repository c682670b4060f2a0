//! Merge engine for folding validated rows into device documents
//!
//! Every field follows first-write-wins: a value is only written when the
//! document has nothing truthy there yet (absent, empty string or `false`)
//! and the row has something truthy to offer. Later rows enrich a document
//! but never overwrite it. Version combinations are appended once each.

use crate::catalog::ApprovedIntegrations;
use crate::error::Result;
use crate::record::{DeviceInfo, Outcome, Version};
use crate::row::DeviceRow;
use crate::store::DeviceStore;

/// Fold `row` into `info`, returning whether anything changed
pub fn merge_into(row: &DeviceRow, info: &mut DeviceInfo) -> bool {
    let mut changed = false;

    changed |= fill_text(&mut info.manufacturer_raw, &row.manufacturer);
    changed |= fill_text(&mut info.model_raw, &row.model);
    changed |= fill_text(&mut info.manufacturer_name, &row.manufacturer);
    changed |= fill_text(&mut info.model_name, &row.model);
    changed |= fill_flag(&mut info.has_via_device, row.has_via_device);
    changed |= fill_flag(&mut info.has_suggested_area, row.has_suggested_area);
    changed |= fill_flag(&mut info.has_configuration_url, row.has_configuration_url);
    changed |= fill_text(&mut info.entry_type, row.effective_entry_type());

    let version = Version::new(row.sw_version.as_deref(), row.hw_version.as_deref());
    if !info.has_version(&version) {
        info.versions.push(version);
        changed = true;
    }

    changed
}

/// Merge `row` into a document, given whether it was just scaffolded
///
/// A freshly scaffolded document is always `Created`, even if the row had
/// nothing to contribute.
pub fn merge(row: &DeviceRow, mut info: DeviceInfo, was_created: bool) -> (DeviceInfo, Outcome) {
    let changed = merge_into(row, &mut info);

    let outcome = if was_created {
        Outcome::Created
    } else if changed {
        Outcome::Updated
    } else {
        Outcome::Unchanged
    };

    (info, outcome)
}

fn fill_text(slot: &mut Option<String>, value: &str) -> bool {
    let empty = slot.as_deref().map_or(true, str::is_empty);
    if empty && !value.is_empty() {
        *slot = Some(value.to_string());
        true
    } else {
        false
    }
}

fn fill_flag(slot: &mut Option<bool>, value: bool) -> bool {
    if *slot != Some(true) && value {
        *slot = Some(true);
        true
    } else {
        false
    }
}

/// Applies rows to the device tree for a fixed set of approved integrations
#[derive(Debug, Clone)]
pub struct DeviceMerger {
    store: DeviceStore,
    approved: ApprovedIntegrations,
}

impl DeviceMerger {
    pub fn new(store: DeviceStore, approved: ApprovedIntegrations) -> Self {
        Self { store, approved }
    }

    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    pub fn approved(&self) -> &ApprovedIntegrations {
        &self.approved
    }

    /// Merge one row into the tree, scaffolding and saving as needed
    ///
    /// Rows from integrations that are not approved return `Ignored` before
    /// any path is touched.
    pub fn apply(&self, row: &DeviceRow) -> Result<Outcome> {
        if !self.approved.contains(&row.integration) {
            tracing::debug!(integration = %row.integration, "integration not approved, ignoring row");
            return Ok(Outcome::Ignored);
        }

        let device_dir = self.store.device_dir(row);
        let was_created = !device_dir.exists();
        if was_created {
            self.store.scaffold(&device_dir)?;
        }

        let info = self.store.load(&device_dir)?;
        let (info, outcome) = merge(row, info, was_created);

        if outcome.needs_write() {
            self.store.save(&device_dir, &info)?;
        }

        tracing::debug!(
            path = %device_dir.display(),
            %outcome,
            "merged row"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> DeviceRow {
        DeviceRow {
            integration: "hue".to_string(),
            manufacturer: "Signify".to_string(),
            model: "LCT001".to_string(),
            sw_version: None,
            hw_version: Some("1".to_string()),
            has_via_device: true,
            has_suggested_area: false,
            has_configuration_url: false,
            entry_type: None,
        }
    }

    #[test]
    fn test_merge_into_empty_document() {
        let (info, outcome) = merge(&row(), DeviceInfo::default(), true);

        assert_eq!(outcome, Outcome::Created);
        assert_eq!(info.manufacturer_raw.as_deref(), Some("Signify"));
        assert_eq!(info.manufacturer_name.as_deref(), Some("Signify"));
        assert_eq!(info.model_raw.as_deref(), Some("LCT001"));
        assert_eq!(info.model_name.as_deref(), Some("LCT001"));
        assert_eq!(info.has_via_device, Some(true));
        assert_eq!(info.has_suggested_area, None);
        assert_eq!(info.has_configuration_url, None);
        assert_eq!(info.entry_type.as_deref(), Some("device"));
        assert_eq!(info.versions, vec![Version::new(None, Some("1"))]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let (once, _) = merge(&row(), DeviceInfo::default(), false);
        let (twice, outcome) = merge(&row(), once.clone(), false);

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_first_write_wins() {
        let existing = DeviceInfo {
            manufacturer_name: Some("Acme".to_string()),
            ..DeviceInfo::default()
        };
        let mut other = row();
        other.manufacturer = "Other".to_string();

        let (info, outcome) = merge(&other, existing, false);

        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(info.manufacturer_name.as_deref(), Some("Acme"));
        // Independent field, still empty before this row
        assert_eq!(info.manufacturer_raw.as_deref(), Some("Other"));
    }

    #[test]
    fn test_falsy_values_are_filled() {
        let existing = DeviceInfo {
            model_name: Some(String::new()),
            has_via_device: Some(false),
            ..DeviceInfo::default()
        };

        let (info, _) = merge(&row(), existing, false);

        assert_eq!(info.model_name.as_deref(), Some("LCT001"));
        assert_eq!(info.has_via_device, Some(true));
    }

    #[test]
    fn test_false_flag_never_written() {
        let mut info = DeviceInfo::default();
        let mut flagless = row();
        flagless.has_via_device = false;

        merge_into(&flagless, &mut info);

        assert_eq!(info.has_via_device, None);
    }

    #[test]
    fn test_true_flag_not_cleared() {
        let mut info = DeviceInfo {
            has_via_device: Some(true),
            ..DeviceInfo::default()
        };
        let mut flagless = row();
        flagless.has_via_device = false;

        merge_into(&flagless, &mut info);

        assert_eq!(info.has_via_device, Some(true));
    }

    #[test]
    fn test_entry_type_default_applies() {
        let mut blank = row();
        blank.entry_type = Some(String::new());
        let (info, _) = merge(&blank, DeviceInfo::default(), false);
        assert_eq!(info.entry_type.as_deref(), Some("device"));

        let mut service = row();
        service.entry_type = Some("service".to_string());
        let (info, _) = merge(&service, DeviceInfo::default(), false);
        assert_eq!(info.entry_type.as_deref(), Some("service"));
    }

    #[test]
    fn test_version_dedup() {
        let mut software_only = row();
        software_only.sw_version = Some("1.0".to_string());
        software_only.hw_version = None;

        let mut hardware_only = row();
        hardware_only.sw_version = None;
        hardware_only.hw_version = Some("rev2".to_string());

        let mut info = DeviceInfo::default();
        assert!(merge_into(&software_only, &mut info));
        assert!(!merge_into(&software_only, &mut info));
        assert!(merge_into(&hardware_only, &mut info));

        assert_eq!(
            info.versions,
            vec![
                Version::new(Some("1.0"), None),
                Version::new(None, Some("rev2")),
            ]
        );
    }

    #[test]
    fn test_empty_version_is_recorded_once() {
        let mut bare = row();
        bare.hw_version = None;

        let mut info = DeviceInfo::default();
        merge_into(&bare, &mut info);
        merge_into(&bare, &mut info);

        assert_eq!(info.versions, vec![Version::default()]);
    }

    #[test]
    fn test_created_even_without_changes() {
        let (filled, _) = merge(&row(), DeviceInfo::default(), false);
        let (_, outcome) = merge(&row(), filled, true);

        assert_eq!(outcome, Outcome::Created);
    }
}
