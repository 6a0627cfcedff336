use serde::{Deserialize, Serialize};

use super::clean::{self, CleanOptions};
use super::error::SweepError;
use super::export::{self, ConversionResult, ExportFormat};
use super::loader;
use super::model::FileDescriptor;
use super::select;

// ---------------------------------------------------------------------------
// Per-file requests and reports
// ---------------------------------------------------------------------------

/// What to do with one file after it is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOperations {
    pub clean: CleanOptions,
    /// Columns to keep, in output order. `None` keeps every column.
    pub columns: Option<Vec<String>>,
    pub format: ExportFormat,
}

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub file: FileDescriptor,
    pub operations: FileOperations,
}

/// Outcome for one file of a batch.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file_name: String,
    pub outcome: Result<ConversionResult, SweepError>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Load → clean → select → export for a single file.
pub fn convert(
    file: &FileDescriptor,
    operations: &FileOperations,
) -> Result<ConversionResult, SweepError> {
    let table = loader::load_file(file)?;
    let table = clean::apply(&table, operations.clean);
    let table = match &operations.columns {
        Some(columns) => select::select(&table, columns.as_slice()),
        None => table,
    };
    export::export(&table, operations.format, &file.name)
}

/// Convert every file on its own; one file failing never stops the others.
///
/// Reports come back in request order, one per request.
pub fn process_batch(requests: &[ConversionRequest]) -> Vec<FileReport> {
    requests
        .iter()
        .map(|req| {
            let outcome = convert(&req.file, &req.operations);
            if let Err(e) = &outcome {
                log::warn!("Skipping '{}': {e}", req.file.name);
            }
            FileReport {
                file_name: req.file.name.clone(),
                outcome,
            }
        })
        .collect()
}
