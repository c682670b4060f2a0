//! Discovery of pending input files

use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of input files
pub const INPUT_EXTENSION: &str = "csv";

/// List the `*.csv` files directly inside `dir`, sorted by file name
///
/// Subdirectories are not searched. A missing directory has no pending files.
pub fn pending_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "input directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type().is_file() && is_input_file(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn is_input_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == INPUT_EXTENSION)
}
