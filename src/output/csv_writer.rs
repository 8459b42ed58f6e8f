//! CSV record writer
//!
//! Writes the full record set to a delimited file whose header row is the
//! fixed column list of [`COLUMNS`](crate::model::COLUMNS).

use crate::model::BookRecord;
use crate::output::traits::{OutputResult, RecordWriter};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes records to a CSV file, overwriting it on every run
#[derive(Debug, Clone)]
pub struct CsvRecordWriter {
    path: PathBuf,
}

impl CsvRecordWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordWriter for CsvRecordWriter {
    fn write_records(&self, records: &[BookRecord]) -> OutputResult<usize> {
        if records.is_empty() {
            tracing::warn!(
                "No records to write, leaving {} untouched",
                self.path.display()
            );
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::debug!("Serialized {} rows to {}", records.len(), self.path.display());
        Ok(records.len())
    }

    fn target(&self) -> &Path {
        &self.path
    }
}
