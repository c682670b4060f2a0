//! Typed device row produced by schema validation

/// Value used for `entry_type` when a row leaves it blank
pub const DEFAULT_ENTRY_TYPE: &str = "device";

/// One validated line of an input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRow {
    /// Integration (platform) that reported the device
    pub integration: String,
    pub manufacturer: String,
    pub model: String,
    /// Software version, `None` when the input said `"None"`
    pub sw_version: Option<String>,
    /// Hardware version, `None` when the input said `"None"`
    pub hw_version: Option<String>,
    pub has_via_device: bool,
    pub has_suggested_area: bool,
    pub has_configuration_url: bool,
    /// Left as-is here; the merger applies [`DEFAULT_ENTRY_TYPE`]
    pub entry_type: Option<String>,
}

impl DeviceRow {
    /// Entry type with the default applied for blank or absent values
    pub fn effective_entry_type(&self) -> &str {
        match self.entry_type.as_deref() {
            Some(entry_type) if !entry_type.is_empty() => entry_type,
            _ => DEFAULT_ENTRY_TYPE,
        }
    }

    /// Manufacturer with `/` made safe for use as a directory name
    pub fn manufacturer_segment(&self) -> String {
        path_segment(&self.manufacturer)
    }

    /// Model with `/` made safe for use as a directory name
    pub fn model_segment(&self) -> String {
        path_segment(&self.model)
    }
}

/// Replace every `/` with `_`
pub fn path_segment(value: &str) -> String {
    value.replace('/', "_")
}
