//! Batch runner: process every pending input file, isolating failures

use crate::error::{Error, Result};
use crate::merger::DeviceMerger;
use crate::processor::process_file;
use crate::record::UpdateRecord;
use crate::scanner::pending_files;
use std::path::{Path, PathBuf};

/// Result of processing one input file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: std::result::Result<UpdateRecord, Error>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of a whole batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// One report per input file, in processing order
    pub files: Vec<FileReport>,
    /// Sum over the files that succeeded
    pub total: UpdateRecord,
}

impl BatchSummary {
    pub fn failed(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|report| !report.is_ok())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}

/// Process every pending file in `input_dir`
pub fn run<P: AsRef<Path>>(merger: &DeviceMerger, input_dir: P) -> Result<BatchSummary> {
    run_with(merger, input_dir, |_| {})
}

/// Like [`run`], calling `on_file` as soon as each file is done
///
/// A failing file is logged and contributes nothing to the total; it never
/// stops the batch. Only a failure to list `input_dir` is returned as an error.
pub fn run_with<P, F>(merger: &DeviceMerger, input_dir: P, mut on_file: F) -> Result<BatchSummary>
where
    P: AsRef<Path>,
    F: FnMut(&FileReport),
{
    let files = pending_files(input_dir.as_ref())?;
    tracing::info!(
        path = %input_dir.as_ref().display(),
        count = files.len(),
        "found pending files"
    );

    let mut summary = BatchSummary::default();

    for path in files {
        let result = process_file(merger, &path);

        match &result {
            Ok(record) => summary.total += *record,
            Err(err) => tracing::error!(path = %path.display(), "failed to process file: {}", err),
        }

        let report = FileReport { path, result };
        on_file(&report);
        summary.files.push(report);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ApprovedIntegrations;
    use crate::store::{DeviceStore, INFO_FILE};
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "integration,manufacturer,model,sw_version,hw_version,has_via_device,has_suggested_area,has_configuration_url,entry_type\n";

    fn setup() -> (TempDir, DeviceMerger, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let template = temp_dir.path().join("template");
        fs::create_dir_all(&template).unwrap();
        fs::write(template.join(INFO_FILE), "versions: []\n").unwrap();

        let input = temp_dir.path().join("to_process");
        fs::create_dir_all(&input).unwrap();

        let store = DeviceStore::new(temp_dir.path().join("devices"), template);
        let merger = DeviceMerger::new(store, ApprovedIntegrations::from_domains(["hue"]));
        (temp_dir, merger, input)
    }

    #[test]
    fn test_failing_file_does_not_stop_batch() {
        let (_temp, merger, input) = setup();
        fs::write(
            input.join("a.csv"),
            format!("{}hue,Signify,LCT001,None,1,True,False,False,None\n", HEADER),
        )
        .unwrap();
        fs::write(input.join("b.csv"), "integration,model\nhue,LCT002\n").unwrap();
        fs::write(
            input.join("c.csv"),
            format!("{}mqtt,Acme,X1,None,None,False,False,False,None\n", HEADER),
        )
        .unwrap();

        let mut seen = Vec::new();
        let summary = run_with(&merger, &input, |report| seen.push(report.path.clone())).unwrap();

        assert_eq!(summary.files.len(), 3);
        assert_eq!(seen, vec![input.join("a.csv"), input.join("b.csv"), input.join("c.csv")]);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.failed().next().unwrap().path, input.join("b.csv"));
        assert_eq!(summary.total, UpdateRecord::new(1, 0, 1));
    }

    #[test]
    fn test_failed_file_contributes_nothing() {
        let (_temp, merger, input) = setup();
        // First row merges, second is short
        fs::write(
            input.join("partial.csv"),
            format!(
                "{}hue,Signify,LCT001,None,1,True,False,False,None\nhue,Signify\n",
                HEADER
            ),
        )
        .unwrap();

        let summary = run(&merger, &input).unwrap();

        assert_eq!(summary.total, UpdateRecord::default());
        match &summary.files[0].result {
            Err(Error::InvalidRow { line, source, .. }) => {
                assert_eq!(*line, 3);
                assert_eq!(source.fields()[0], "model");
                assert_eq!(source.fields().len(), 7);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // No rollback of the row merged before the failure
        assert!(merger
            .store()
            .devices_dir()
            .join("hue/Signify/LCT001")
            .join(INFO_FILE)
            .is_file());
    }

    #[test]
    fn test_empty_input_dir() {
        let (_temp, merger, input) = setup();
        let summary = run(&merger, &input).unwrap();

        assert!(summary.files.is_empty());
        assert_eq!(summary.total, UpdateRecord::default());
    }
}
