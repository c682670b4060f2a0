//! Error types for devreg-core

use crate::schema::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in devreg-core
///
/// Anything returned from [`crate::processor::process_file`] aborts that one
/// file; the batch runner records it and moves on.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row failed schema validation
    #[error("invalid row {line} in '{path}': {source}")]
    InvalidRow {
        path: PathBuf,
        line: u64,
        #[source]
        source: SchemaError,
    },

    /// Device document could not be parsed or serialized
    #[error("YAML error in '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Template could not be copied into a new device directory
    #[error("failed to scaffold '{path}': {message}")]
    Scaffold { path: PathBuf, message: String },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Integration catalog could not be fetched
    #[error("failed to fetch integration catalog from '{url}': {source}")]
    Catalog {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
