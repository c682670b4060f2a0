//! devreg-core: Core library for the device registry
//!
//! This library provides functionality to:
//! - Read contributed device CSV files and validate each row
//! - Merge rows into per-device `info.yaml` documents, first write wins
//! - Scaffold new device directories from a template
//! - Run a whole directory of input files, isolating per-file failures

pub mod batch;
pub mod catalog;
pub mod error;
pub mod merger;
pub mod parser;
pub mod processor;
pub mod record;
pub mod row;
pub mod scanner;
pub mod schema;
pub mod settings;
pub mod store;

pub use batch::{run, run_with, BatchSummary, FileReport};
pub use catalog::{ApprovedIntegrations, EXCLUDED_INTEGRATIONS};
pub use error::{Error, Result};
pub use merger::{merge, DeviceMerger};
pub use processor::process_file;
pub use record::{DeviceInfo, Outcome, UpdateRecord, Version};
pub use row::DeviceRow;
pub use schema::{validate, RawRecord, SchemaError};
pub use settings::{CatalogSource, Settings};
pub use store::DeviceStore;
