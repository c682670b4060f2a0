//! Per-file processing: read, validate and merge every row of one input file

use crate::error::{Error, Result};
use crate::merger::DeviceMerger;
use crate::parser::RecordReader;
use crate::record::UpdateRecord;
use crate::schema::validate;
use std::io::Read;
use std::path::Path;

/// Merge every row of the CSV file at `path`
///
/// Stops at the first invalid row. Rows merged before it stay merged.
pub fn process_file<P: AsRef<Path>>(merger: &DeviceMerger, path: P) -> Result<UpdateRecord> {
    let reader = RecordReader::open(path)?;
    process_records(merger, reader)
}

/// Merge every row yielded by `reader`
pub fn process_records<R: Read>(
    merger: &DeviceMerger,
    reader: RecordReader<R>,
) -> Result<UpdateRecord> {
    let path = reader.path().to_path_buf();
    let mut total = UpdateRecord::default();

    for source in reader {
        let source = source?;

        let row = validate(&source.record).map_err(|err| {
            tracing::warn!(
                path = %path.display(),
                line = source.line,
                fields = ?err.fields(),
                record = ?err.record,
                "invalid row: {}",
                err
            );
            Error::InvalidRow {
                path: path.clone(),
                line: source.line,
                source: err,
            }
        })?;

        total += UpdateRecord::from(merger.apply(&row)?);
    }

    tracing::info!(path = %path.display(), %total, "processed file");
    Ok(total)
}
