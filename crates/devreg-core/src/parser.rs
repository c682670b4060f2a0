//! CSV reader for device input files

use crate::error::{Error, Result};
use crate::schema::RawRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Column name given to cells beyond the header, numbered from 1
pub const SURPLUS_COLUMN_PREFIX: &str = "__surplus_";

/// One data line of an input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// 1-based line number in the source file
    pub line: u64,
    pub record: RawRecord,
}

/// Streams data lines of a CSV file as column-name keyed records
///
/// Records are yielded one at a time so that a malformed line only stops
/// processing from that point on. Lines with fewer cells than the header
/// simply lack those columns; extra cells are keyed
/// `__surplus_1`, `__surplus_2`, ... so that schema validation reports them.
pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    path: PathBuf,
}

impl RecordReader<BufReader<File>> {
    /// Open a CSV file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(BufReader::new(file), path)
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap any reader; `source` is only used for error messages
    pub fn from_reader(reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        let path = source.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // Short/long lines are left to schema validation
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::Csv {
                path: path.clone(),
                source: e,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        Ok(Self {
            reader,
            headers,
            path,
        })
    }

    /// Column names from the header line
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn column_name(&self, index: usize) -> String {
        match self.headers.get(index) {
            Some(name) => name.clone(),
            None => format!("{}{}", SURPLUS_COLUMN_PREFIX, index + 1 - self.headers.len()),
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = csv::StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => {
                let line = record.position().map_or(0, |p| p.line());
                let record = record
                    .iter()
                    .enumerate()
                    .map(|(index, cell)| (self.column_name(index), cell.to_string()))
                    .collect();
                Some(Ok(SourceRecord { line, record }))
            }
            Err(e) => Some(Err(Error::Csv {
                path: self.path.clone(),
                source: e,
            })),
        }
    }
}
