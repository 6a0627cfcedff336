use std::collections::HashSet;
use std::fmt;

use super::error::SweepError;

// ---------------------------------------------------------------------------
// Cell – a single value in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, inferred when the file is loaded.
#[derive(Debug, Clone)]
pub enum Cell {
    Number(f64),
    Text(String),
    Boolean(bool),
    Missing,
}

// -- Manual Eq/Hash so rows can be keyed in a HashSet --
//
// Numbers compare by value with `0.0 == -0.0`. NaN never reaches a cell:
// the loader maps it to `Missing`.

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Boolean(a), Cell::Boolean(b)) => a == b,
            (Cell::Missing, Cell::Missing) => true,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Number(v) => {
                let canonical = if *v == 0.0 {
                    0.0f64
                } else if v.is_nan() {
                    f64::NAN
                } else {
                    *v
                };
                canonical.to_bits().hash(state)
            }
            Cell::Text(s) => s.hash(state),
            Cell::Boolean(b) => b.hash(state),
            Cell::Missing => {}
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Boolean(true) => write!(f, "True"),
            Cell::Boolean(false) => write!(f, "False"),
            Cell::Missing => write!(f, "<NA>"),
        }
    }
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// What a column holds once missing cells are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    Text,
    Boolean,
    /// More than one non-missing cell type.
    Mixed,
    /// Only missing cells (or no cells at all).
    Empty,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnKind::Number => "number",
            ColumnKind::Text => "text",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Mixed => "mixed",
            ColumnKind::Empty => "empty",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Column {
            name: name.into(),
            cells,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        let mut kind = ColumnKind::Empty;
        for cell in &self.cells {
            let this = match cell {
                Cell::Number(_) => ColumnKind::Number,
                Cell::Text(_) => ColumnKind::Text,
                Cell::Boolean(_) => ColumnKind::Boolean,
                Cell::Missing => continue,
            };
            if kind == ColumnKind::Empty {
                kind = this;
            } else if kind != this {
                return ColumnKind::Mixed;
            }
        }
        kind
    }

    /// Numeric means every non-missing cell is a number. A column with no
    /// values at all counts as numeric too, like an all-NaN float column.
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind(), ColumnKind::Number | ColumnKind::Empty)
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }
}

// ---------------------------------------------------------------------------
// Table – the in-memory tabular value
// ---------------------------------------------------------------------------

/// Ordered, uniquely named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, SweepError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(SweepError::InvalidTable(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.cells.len();
            if let Some(bad) = columns.iter().find(|c| c.cells.len() != expected) {
                return Err(SweepError::InvalidTable(format!(
                    "column '{}' has {} rows, expected {expected}",
                    bad.name,
                    bad.cells.len()
                )));
            }
        }
        Ok(Table { columns })
    }

    /// Wrap columns derived from an existing table without re-checking them.
    pub(crate) fn from_checked(columns: Vec<Column>) -> Self {
        Table { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Borrow row `i` across all columns.
    pub fn row(&self, i: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[i]).collect()
    }

    /// Keep only the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                cells: indices.iter().map(|&i| c.cells[i].clone()).collect(),
            })
            .collect();
        Table { columns }
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..self.n_rows().min(n)).collect();
        self.take_rows(&indices)
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Number)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FileDescriptor – an uploaded file
// ---------------------------------------------------------------------------

/// An uploaded file: name (with extension), size and raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        FileDescriptor {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Lower-cased extension including the dot (`".csv"`), or `""`.
    pub fn extension(&self) -> String {
        extension_of(&self.name).to_ascii_lowercase()
    }

    pub fn size_kib(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

/// Extension of the last path component, dot included. A leading dot
/// (`.hidden`) is part of the stem, not an extension.
pub fn extension_of(name: &str) -> &str {
    let base_start = name.rfind(|c: char| c == '/' || c == '\\').map_or(0, |i| i + 1);
    let base = &name[base_start..];
    match base.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &base[dot..],
    }
}
