//! Schema validation for raw input rows
//!
//! Each column of an input file is described by a [`FieldSpec`] in
//! [`DEVICE_FIELDS`]. [`validate`] walks that table, checks presence,
//! rejects columns it does not know, and converts every cell before the row
//! is allowed anywhere near the device tree.

use crate::row::DeviceRow;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A row as read from the file: column name -> cell text
pub type RawRecord = BTreeMap<String, String>;

/// Marker used by the exporter for an absent optional value
pub const NONE_LITERAL: &str = "None";

/// The only text that parses as `true`
pub const TRUE_LITERAL: &str = "True";

/// How a cell is turned into a typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Passed through unchanged
    Text,
    /// `"None"` becomes absent, anything else passes through
    OptionalText,
    /// Exactly `"True"` is true; everything else, including `"true"`, is false
    Flag,
}

impl Converter {
    pub fn convert(self, raw: &str) -> FieldValue {
        match self {
            Converter::Text => FieldValue::Text(raw.to_string()),
            Converter::OptionalText => FieldValue::OptionalText(str_or_none(raw)),
            Converter::Flag => FieldValue::Flag(raw == TRUE_LITERAL),
        }
    }
}

/// One column of the input schema
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub converter: Converter,
    pub required: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, converter: Converter) -> Self {
        Self {
            name,
            converter,
            required: true,
        }
    }
}

/// Columns of a device input file, in file order
pub const DEVICE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("integration", Converter::Text),
    FieldSpec::required("manufacturer", Converter::Text),
    FieldSpec::required("model", Converter::Text),
    FieldSpec::required("sw_version", Converter::OptionalText),
    FieldSpec::required("hw_version", Converter::OptionalText),
    FieldSpec::required("has_via_device", Converter::Flag),
    FieldSpec::required("has_suggested_area", Converter::Flag),
    FieldSpec::required("has_configuration_url", Converter::Flag),
    FieldSpec::required("entry_type", Converter::OptionalText),
];

/// A converted cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    OptionalText(Option<String>),
    Flag(bool),
}

/// What is wrong with one field of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing(String),
    Unexpected(String),
}

impl FieldProblem {
    pub fn field(&self) -> &str {
        match self {
            FieldProblem::Missing(name) | FieldProblem::Unexpected(name) => name,
        }
    }
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Missing(name) => write!(f, "required field '{}' is missing", name),
            FieldProblem::Unexpected(name) => write!(f, "unexpected field '{}'", name),
        }
    }
}

/// A row that does not match the schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.problems))]
pub struct SchemaError {
    /// Every offending field, in table order then unknown columns
    pub problems: Vec<FieldProblem>,
    /// The row as it was read, for manual correction
    pub record: RawRecord,
}

impl SchemaError {
    /// Names of the offending fields
    pub fn fields(&self) -> Vec<&str> {
        self.problems.iter().map(FieldProblem::field).collect()
    }
}

fn describe(problems: &[FieldProblem]) -> String {
    problems
        .iter()
        .map(FieldProblem::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn str_or_none(raw: &str) -> Option<String> {
    if raw == NONE_LITERAL {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Check `record` against `fields` and convert every known cell
pub fn validate_fields(
    record: &RawRecord,
    fields: &[FieldSpec],
) -> Result<BTreeMap<&'static str, FieldValue>, SchemaError> {
    let mut problems = Vec::new();
    let mut values = BTreeMap::new();

    for spec in fields {
        match record.get(spec.name) {
            Some(raw) => {
                values.insert(spec.name, spec.converter.convert(raw));
            }
            None if spec.required => problems.push(FieldProblem::Missing(spec.name.to_string())),
            None => {}
        }
    }

    for key in record.keys() {
        if !fields.iter().any(|spec| spec.name == key) {
            problems.push(FieldProblem::Unexpected(key.clone()));
        }
    }

    if problems.is_empty() {
        Ok(values)
    } else {
        Err(SchemaError {
            problems,
            record: record.clone(),
        })
    }
}

/// Validate one raw record into a [`DeviceRow`]
pub fn validate(record: &RawRecord) -> Result<DeviceRow, SchemaError> {
    let mut values = validate_fields(record, DEVICE_FIELDS)?;

    Ok(DeviceRow {
        integration: take_text(&mut values, "integration"),
        manufacturer: take_text(&mut values, "manufacturer"),
        model: take_text(&mut values, "model"),
        sw_version: take_optional(&mut values, "sw_version"),
        hw_version: take_optional(&mut values, "hw_version"),
        has_via_device: take_flag(&mut values, "has_via_device"),
        has_suggested_area: take_flag(&mut values, "has_suggested_area"),
        has_configuration_url: take_flag(&mut values, "has_configuration_url"),
        entry_type: take_optional(&mut values, "entry_type"),
    })
}

// The accessors below only see values produced by DEVICE_FIELDS, so the
// fallback arms are unreachable for a validated record.

fn take_text(values: &mut BTreeMap<&'static str, FieldValue>, name: &str) -> String {
    match values.remove(name) {
        Some(FieldValue::Text(value)) => value,
        _ => String::new(),
    }
}

fn take_optional(values: &mut BTreeMap<&'static str, FieldValue>, name: &str) -> Option<String> {
    match values.remove(name) {
        Some(FieldValue::OptionalText(value)) => value,
        _ => None,
    }
}

fn take_flag(values: &mut BTreeMap<&'static str, FieldValue>, name: &str) -> bool {
    matches!(values.remove(name), Some(FieldValue::Flag(true)))
}
