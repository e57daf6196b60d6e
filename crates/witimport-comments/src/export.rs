//! Failure export: failed records back to a re-importable CSV

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexSet;

use crate::error::ExportError;
use crate::record::{TITLE_COLUMN, WORK_ITEM_ID_COLUMN};
use crate::runner::FailureSet;

/// Name the failure file is always offered under
pub const FAILED_FILENAME: &str = "import-failed.csv";

/// Receives the failure file for the user to pick up.
pub trait DownloadSink {
    fn offer(&self, filename: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// Writes offered files into a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

impl DownloadSink for FileSink {
    fn offer(&self, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(filename);
        std::fs::write(&path, bytes)?;
        log::info!("Failed records written to {}", path.display());
        Ok(())
    }
}

/// Encoded failure file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureExport {
    pub filename: &'static str,
    pub bytes: Vec<u8>,
    /// Data rows, header excluded
    pub rows: usize,
}

impl FailureExport {
    /// The file as a `data:` URI, the form a browser download link takes.
    pub fn data_uri(&self) -> String {
        format!("data:text/csv;base64,{}", STANDARD.encode(&self.bytes))
    }
}

/// Encode the failure set as CSV, or `None` when nothing failed.
///
/// Columns: `Title`, `WorkItemId`, then every other column seen on any
/// failed record, in first-seen order. Missing cells are left empty.
pub fn export_failures(failures: &FailureSet) -> Result<Option<FailureExport>, ExportError> {
    if failures.is_empty() {
        return Ok(None);
    }

    let columns: IndexSet<&str> = failures
        .iter()
        .flat_map(|rec| rec.fields.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(
        [TITLE_COLUMN, WORK_ITEM_ID_COLUMN]
            .into_iter()
            .chain(columns.iter().copied()),
    )?;
    for rec in failures {
        let id = rec.work_item_id.to_string();
        let cells = [rec.title.as_str(), id.as_str()].into_iter().chain(
            columns
                .iter()
                .map(|col| rec.fields.get(*col).map_or("", String::as_str)),
        );
        writer.write_record(cells)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;

    Ok(Some(FailureExport {
        filename: FAILED_FILENAME,
        bytes,
        rows: failures.len(),
    }))
}

/// Export and offer the failure file; problems are logged, never raised.
///
/// Returns the export when the sink accepted it.
pub fn deliver_failures(failures: &FailureSet, sink: &dyn DownloadSink) -> Option<FailureExport> {
    let export = match export_failures(failures) {
        Ok(Some(export)) => export,
        Ok(None) => return None,
        Err(e) => {
            log::error!("Could not encode {} failed records: {e}", failures.len());
            return None;
        }
    };
    if let Err(e) = sink.offer(export.filename, &export.bytes) {
        log::error!("Could not save {}: {}", export.filename, ExportError::Io(e));
        return None;
    }
    Some(export)
}
