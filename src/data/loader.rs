use std::collections::HashSet;
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, ExcelDateTime, Reader, Xlsx};
use chrono::Timelike;

use super::error::SweepError;
use super::model::{Cell, Column, FileDescriptor, Table};

/// Strings read back as missing values.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_SPELLINGS: &[&str] = &["True", "TRUE", "true"];
const FALSE_SPELLINGS: &[&str] = &["False", "FALSE", "false"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse raw file bytes into a [`Table`].  Dispatch by extension.
///
/// Supported formats (case-insensitive, leading dot optional):
/// * `.csv`  – comma-separated text, first row is the header
/// * `.xlsx` – Office Open XML workbook, first sheet, first row is the header
pub fn load(bytes: &[u8], extension: &str) -> Result<Table, SweepError> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(bytes),
        "xlsx" => load_xlsx(bytes),
        _ => Err(SweepError::UnsupportedFormat(format!(".{ext}"))),
    }
}

/// Load an uploaded file using the extension in its name.
pub fn load_file(file: &FileDescriptor) -> Result<Table, SweepError> {
    let table = load(&file.bytes, &file.extension())?;
    log::info!(
        "Loaded '{}': {} rows × {} columns",
        file.name,
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Rows shorter than the header are padded with missing cells; longer rows
/// are rejected. Cell types are inferred per column once all rows are read.
fn load_csv(bytes: &[u8]) -> Result<Table, SweepError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SweepError::parse(format!("reading CSV header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(SweepError::parse("no columns to parse from file"));
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| SweepError::parse(format!("CSV row {}: {e}", row_no + 1)))?;

        if record.len() > headers.len() {
            return Err(SweepError::parse(format!(
                "CSV row {}: expected {} fields, saw {}",
                row_no + 1,
                headers.len(),
                record.len()
            )));
        }

        for (col_idx, values) in raw.iter_mut().enumerate() {
            values.push(record.get(col_idx).unwrap_or("").to_string());
        }
    }

    let columns = normalize_headers(headers)
        .into_iter()
        .zip(raw)
        .map(|(name, values)| infer_column(name, values))
        .collect();

    Table::new(columns)
}

fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s)
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if TRUE_SPELLINGS.contains(&s) {
        Some(true)
    } else if FALSE_SPELLINGS.contains(&s) {
        Some(false)
    } else {
        None
    }
}

/// Pick one type for the whole column: number, then boolean, then text.
fn infer_column(name: String, values: Vec<String>) -> Column {
    let present = || values.iter().filter(|v| !is_missing_marker(v));

    let cells = if present().all(|v| parse_number(v).is_some()) {
        values
            .iter()
            .map(|v| match parse_number(v) {
                Some(n) if !is_missing_marker(v) => Cell::Number(n),
                _ => Cell::Missing,
            })
            .collect()
    } else if present().all(|v| parse_bool(v).is_some()) {
        values
            .iter()
            .map(|v| match parse_bool(v) {
                Some(b) if !is_missing_marker(v) => Cell::Boolean(b),
                _ => Cell::Missing,
            })
            .collect()
    } else {
        values
            .into_iter()
            .map(|v| {
                if is_missing_marker(&v) {
                    Cell::Missing
                } else {
                    Cell::Text(v)
                }
            })
            .collect()
    };

    Column::new(name, cells)
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

/// Only the first worksheet is read. An empty sheet gives an empty table.
///
/// Leading blank rows are skipped but leading blank columns are kept, so a
/// sheet starting at `B2` gets an `Unnamed: 0` column. Rows inside the
/// sheet's print area count even when every cell in them is blank.
fn load_xlsx(bytes: &[u8]) -> Result<Table, SweepError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| SweepError::parse(format!("opening workbook: {e}")))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SweepError::parse("workbook has no worksheets"))?;
    let print_area = print_area_end(workbook.defined_names(), &sheet);

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SweepError::parse(format!("reading worksheet '{sheet}': {e}")))?;

    let (Some((first_row, _)), Some((mut last_row, last_col))) = (range.start(), range.end())
    else {
        return Ok(Table::default());
    };
    if let Some((area_row, _)) = print_area {
        last_row = last_row.max(area_row);
    }
    let range = range.range((first_row, 0), (last_row, last_col));

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| match spreadsheet_cell(cell) {
            Cell::Missing => String::new(),
            other => other.to_string(),
        })
        .collect();

    let mut cells: Vec<Vec<Cell>> = vec![Vec::with_capacity(range.height()); headers.len()];
    for row in rows {
        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(col_idx).map_or(Cell::Missing, spreadsheet_cell));
        }
    }

    let columns = normalize_headers(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();

    Table::new(columns)
}

fn spreadsheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) if f.is_nan() => Cell::Missing,
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Boolean(*b),
        Data::String(s) if s.is_empty() => Cell::Missing,
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => Cell::Text(datetime_text(dt).unwrap_or_else(|| dt.to_string())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Empty | Data::Error(_) => Cell::Missing,
    }
}

/// Dates have no cell type of their own and load as ISO text: `2024-01-15`,
/// `2024-01-15 13:30:00`, or `13:30:00` for a time of day. Durations load
/// as `[h]:mm:ss`.
fn datetime_text(value: &ExcelDateTime) -> Option<String> {
    if value.is_duration() {
        let secs = value.as_duration()?.num_seconds();
        let sign = if secs < 0 { "-" } else { "" };
        let secs = secs.abs();
        return Some(format!(
            "{sign}{}:{:02}:{:02}",
            secs / 3600,
            secs % 3600 / 60,
            secs % 60
        ));
    }

    let dt = value.as_datetime()?;
    let serial = value.as_f64();
    let text = if (0.0..1.0).contains(&serial) {
        dt.format("%H:%M:%S").to_string()
    } else if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    };
    Some(text)
}

// ---------------------------------------------------------------------------
// Print area
// ---------------------------------------------------------------------------

/// Bottom-right `(row, col)` of the print area defined for `sheet`.
///
/// Only a single rectangular area is understood; row-only (`$1:$3`),
/// column-only and multi-area print ranges are ignored.
fn print_area_end(names: &[(String, String)], sheet: &str) -> Option<(u32, u32)> {
    names
        .iter()
        .filter(|(name, _)| name == "_xlnm.Print_Area")
        .find_map(|(_, formula)| {
            let (owner, area) = formula.rsplit_once('!')?;
            let owner = owner
                .strip_prefix('\'')
                .and_then(|o| o.strip_suffix('\''))
                .map_or_else(|| owner.to_string(), |o| o.replace("''", "'"));
            if owner != sheet || area.contains(',') {
                return None;
            }
            cell_position(area.rsplit(':').next()?)
        })
}

/// Zero-based `(row, col)` of an A1 reference such as `$B$3`.
fn cell_position(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let row: u32 = digits.parse().ok()?;
    let col = letters.chars().try_fold(0u32, |acc, c| {
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })?;
    Some((row.checked_sub(1)?, col - 1))
}

// ---------------------------------------------------------------------------
// Header normalization
// ---------------------------------------------------------------------------

/// Blank names become `Unnamed: <index>`; repeats get `.1`, `.2`, … so every
/// column name is unique.
fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());

    for (idx, raw) in headers.into_iter().enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            raw
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime as WrittenDate, Format, Workbook};

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn csv_infers_types_per_column() {
        let csv = b"id,name,score,active\n1,alice,3.5,true\n2,bob,,False\n3,NA,4,TRUE\n";
        let table = load(csv, ".csv").unwrap();

        assert_eq!(table.column_names(), vec!["id", "name", "score", "active"]);
        assert_eq!(table.n_rows(), 3);
        assert_eq!(
            table.column("score").unwrap().cells,
            vec![Cell::Number(3.5), Cell::Missing, Cell::Number(4.0)]
        );
        assert_eq!(
            table.column("name").unwrap().cells,
            vec![text("alice"), text("bob"), Cell::Missing]
        );
        assert_eq!(
            table.column("active").unwrap().cells,
            vec![Cell::Boolean(true), Cell::Boolean(false), Cell::Boolean(true)]
        );
    }

    #[test]
    fn csv_mixed_column_stays_text() {
        let table = load(b"code\n007\nabc\n", "csv").unwrap();
        assert_eq!(
            table.column("code").unwrap().cells,
            vec![text("007"), text("abc")]
        );
    }

    #[test]
    fn extension_is_case_insensitive() {
        let table = load(b"a\n1\n", ".CSV").unwrap();
        assert_eq!(table.n_rows(), 1);
    }

    #[test]
    fn unsupported_extension_is_reported() {
        let err = load(b"%PDF-1.4", ".pdf").unwrap_err();
        assert_eq!(err, SweepError::UnsupportedFormat(".pdf".into()));
    }

    #[test]
    fn short_rows_are_padded() {
        let table = load(b"a,b,c\n1,2\n", ".csv").unwrap();
        assert_eq!(table.row(0), vec![&Cell::Number(1.0), &Cell::Number(2.0), &Cell::Missing]);
    }

    #[test]
    fn long_rows_are_parse_errors() {
        let err = load(b"a,b\n1,2,3\n", ".csv").unwrap_err();
        assert!(matches!(err, SweepError::Parse(_)), "{err:?}");
    }

    #[test]
    fn empty_csv_is_parse_error() {
        let err = load(b"", ".csv").unwrap_err();
        assert!(matches!(err, SweepError::Parse(_)));
    }

    #[test]
    fn invalid_utf8_is_parse_error() {
        let err = load(b"a\n\xff\xfe\n", ".csv").unwrap_err();
        assert!(matches!(err, SweepError::Parse(_)));
    }

    #[test]
    fn headers_are_made_unique() {
        let table = load(b"a,a,,a.1\n1,2,3,4\n", ".csv").unwrap();
        assert_eq!(table.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.1.1"]);
    }

    #[test]
    fn header_only_csv_gives_empty_table() {
        let table = load(b"x,y\n", ".csv").unwrap();
        assert_eq!(table.n_cols(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn xlsx_reads_first_sheet() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "city").unwrap();
        sheet.write_string(0, 1, "population").unwrap();
        sheet.write_string(1, 0, "Oslo").unwrap();
        sheet.write_number(1, 1, 709_000).unwrap();
        sheet.write_string(2, 0, "Bergen").unwrap();
        let other = workbook.add_worksheet();
        other.write_string(0, 0, "ignored").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load(&bytes, ".xlsx").unwrap();
        assert_eq!(table.column_names(), vec!["city", "population"]);
        assert_eq!(
            table.column("population").unwrap().cells,
            vec![Cell::Number(709_000.0), Cell::Missing]
        );
        assert_eq!(table.row(1), vec![&text("Bergen"), &Cell::Missing]);
    }

    #[test]
    fn xlsx_dates_load_as_iso_text() {
        let date = Format::new().set_num_format("yyyy-mm-dd");
        let stamp = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        let clock = Format::new().set_num_format("hh:mm:ss");
        let elapsed = Format::new().set_num_format("[h]:mm:ss");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "when").unwrap();
        let day = WrittenDate::from_ymd(2024, 1, 15).unwrap();
        sheet.write_datetime_with_format(1, 0, &day, &date).unwrap();
        let afternoon = day.and_hms(13, 30, 0).unwrap();
        sheet.write_datetime_with_format(2, 0, &afternoon, &stamp).unwrap();
        let time = WrittenDate::from_hms(13, 30, 0).unwrap();
        sheet.write_datetime_with_format(3, 0, &time, &clock).unwrap();
        sheet.write_number_with_format(4, 0, 1.5, &elapsed).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load(&bytes, ".xlsx").unwrap();
        assert_eq!(
            table.column("when").unwrap().cells,
            vec![
                text("2024-01-15"),
                text("2024-01-15 13:30:00"),
                text("13:30:00"),
                text("36:00:00"),
            ]
        );
    }

    #[test]
    fn xlsx_blank_leading_column_is_kept() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(1, 1, "city").unwrap();
        sheet.write_string(2, 1, "Oslo").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load(&bytes, ".xlsx").unwrap();
        assert_eq!(table.column_names(), vec!["Unnamed: 0", "city"]);
        assert_eq!(table.row(0), vec![&Cell::Missing, &text("Oslo")]);
    }

    #[test]
    fn xlsx_print_area_extends_the_table() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "n").unwrap();
        sheet.write_number(1, 0, 1).unwrap();
        sheet.set_print_area(0, 0, 3, 0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load(&bytes, ".xlsx").unwrap();
        assert_eq!(
            table.column("n").unwrap().cells,
            vec![Cell::Number(1.0), Cell::Missing, Cell::Missing]
        );
    }

    #[test]
    fn print_area_belongs_to_its_sheet() {
        let names = vec![
            ("_xlnm.Print_Area".to_string(), "Other!$A$1:$C$9".to_string()),
            ("_xlnm.Print_Area".to_string(), "'Q1 ''24'!$A$1:$B$3".to_string()),
        ];
        assert_eq!(print_area_end(&names, "Q1 '24"), Some((2, 1)));
        assert_eq!(print_area_end(&names, "Sheet1"), None);

        let multi = vec![("_xlnm.Print_Area".to_string(), "S!$A$1:$A$2,S!$C$1:$C$2".to_string())];
        assert_eq!(print_area_end(&multi, "S"), None);
    }

    #[test]
    fn cell_positions_are_zero_based() {
        assert_eq!(cell_position("$B$3"), Some((2, 1)));
        assert_eq!(cell_position("AA10"), Some((9, 26)));
        assert_eq!(cell_position("A1"), Some((0, 0)));
        assert_eq!(cell_position("$A"), None);
        assert_eq!(cell_position("$3"), None);
    }

    #[test]
    fn garbage_xlsx_is_parse_error() {
        let err = load(b"definitely not a zip archive", ".xlsx").unwrap_err();
        assert!(matches!(err, SweepError::Parse(_)));
    }
}
