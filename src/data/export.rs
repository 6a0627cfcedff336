use std::fmt;

use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};

use super::error::SweepError;
use super::model::{extension_of, Cell, Table};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Excel];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => ".csv",
            ExportFormat::Excel => ".xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Excel => XLSX_MIME,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Excel => "EXCEL",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serialized output ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Serialize `table` into `format`, naming the output after `source_name`.
///
/// Nothing is written to disk; on failure no partial buffer is returned.
pub fn export(
    table: &Table,
    format: ExportFormat,
    source_name: &str,
) -> Result<ConversionResult, SweepError> {
    if table.n_cols() == 0 {
        return Err(SweepError::serialization("no columns selected"));
    }

    let bytes = match format {
        ExportFormat::Csv => write_csv(table)?,
        ExportFormat::Excel => write_xlsx(table)?,
    };

    let file_name = output_file_name(source_name, format);
    log::info!(
        "Exported {} rows × {} columns as {format} ({} bytes) → {file_name}",
        table.n_rows(),
        table.n_cols(),
        bytes.len()
    );

    Ok(ConversionResult {
        bytes,
        file_name,
        mime_type: format.mime_type(),
    })
}

/// Swap the extension of `source_name` for the one of `format`.
///
/// Only the final extension is replaced (`a.csv.csv` → `a.csv.xlsx`); a name
/// without one gets the new extension appended.
pub fn output_file_name(source_name: &str, format: ExportFormat) -> String {
    let ext = extension_of(source_name);
    let stem = &source_name[..source_name.len() - ext.len()];
    format!("{stem}{}", format.extension())
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

fn csv_field(cell: &Cell) -> String {
    match cell {
        Cell::Missing => String::new(),
        other => other.to_string(),
    }
}

/// Header row first, no index column, `\n` line endings.
fn write_csv(table: &Table) -> Result<Vec<u8>, SweepError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(table.columns().iter().map(|c| c.name.as_str()))
        .map_err(|e| SweepError::serialization(format!("writing CSV header: {e}")))?;

    for i in 0..table.n_rows() {
        writer
            .write_record(table.row(i).into_iter().map(csv_field))
            .map_err(|e| SweepError::serialization(format!("writing CSV row {}: {e}", i + 1)))?;
    }

    writer
        .into_inner()
        .map_err(|e| SweepError::serialization(format!("flushing CSV: {}", e.error())))
}

// ---------------------------------------------------------------------------
// XLSX writer
// ---------------------------------------------------------------------------

/// One sheet, bold header row, no index column. Missing cells stay blank.
///
/// Blank cells leave no trace in the sheet data, so the print area is set
/// to the whole table; trailing rows with nothing but missing cells would
/// otherwise be lost when the workbook is read back.
fn write_xlsx(table: &Table) -> Result<Vec<u8>, SweepError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    let last_row = u32::try_from(table.n_rows())
        .map_err(|_| SweepError::serialization(format!("too many rows ({})", table.n_rows())))?;
    let last_col = u16::try_from(table.n_cols() - 1)
        .map_err(|_| SweepError::serialization(format!("too many columns ({})", table.n_cols())))?;
    sheet
        .set_print_area(0, 0, last_row, last_col)
        .map_err(SweepError::serialization)?;

    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(col_idx).map_err(|_| {
            SweepError::serialization(format!("too many columns ({})", table.n_cols()))
        })?;

        sheet
            .write_string_with_format(0, col, column.name.as_str(), &header_format)
            .map_err(SweepError::serialization)?;

        for (row_idx, cell) in column.cells.iter().enumerate() {
            let row = u32::try_from(row_idx + 1).map_err(|_| {
                SweepError::serialization(format!("too many rows ({})", table.n_rows()))
            })?;

            match cell {
                Cell::Number(v) if !v.is_finite() => {
                    return Err(SweepError::serialization(format!(
                        "column '{}' row {}: {v} cannot be stored in a spreadsheet",
                        column.name,
                        row_idx + 1
                    )));
                }
                Cell::Number(v) => {
                    sheet.write_number(row, col, *v).map_err(SweepError::serialization)?;
                }
                Cell::Text(s) => {
                    sheet.write_string(row, col, s.as_str()).map_err(SweepError::serialization)?;
                }
                Cell::Boolean(b) => {
                    sheet.write_boolean(row, col, *b).map_err(SweepError::serialization)?;
                }
                Cell::Missing => {}
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| SweepError::serialization(format!("writing workbook: {e}")))
}
