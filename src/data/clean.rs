use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::model::{Cell, Column, Table};

// ---------------------------------------------------------------------------
// Cleaning options: which transforms to run for a file
// ---------------------------------------------------------------------------

/// Both transforms are opt-in and independent of each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanOptions {
    pub deduplicate: bool,
    pub impute_missing: bool,
}

/// Run the requested transforms: deduplication first, then imputation.
pub fn apply(table: &Table, options: CleanOptions) -> Table {
    let mut out = table.clone();
    if options.deduplicate {
        out = deduplicate(&out);
    }
    if options.impute_missing {
        out = impute_missing(&out);
    }
    out
}

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

/// Drop rows that repeat an earlier row across every column.
///
/// The first occurrence is kept and row order is preserved, so applying this
/// twice gives the same table as applying it once.
pub fn deduplicate(table: &Table) -> Table {
    let mut seen: HashSet<Vec<&Cell>> = HashSet::with_capacity(table.n_rows());
    let keep: Vec<usize> = (0..table.n_rows())
        .filter(|&i| seen.insert(table.row(i)))
        .collect();

    let removed = table.n_rows() - keep.len();
    log::info!("Removed {removed} duplicate row(s), {} remain", keep.len());
    table.take_rows(&keep)
}

// ---------------------------------------------------------------------------
// Missing-value imputation
// ---------------------------------------------------------------------------

/// Replace missing cells of numeric columns with the column mean.
///
/// Non-numeric columns are left alone. A column with no values has no mean
/// and keeps its missing cells.
pub fn impute_missing(table: &Table) -> Table {
    let mut filled = 0usize;

    let columns: Vec<Column> = table
        .columns()
        .iter()
        .map(|col| {
            if !col.is_numeric() {
                return col.clone();
            }
            let Some(fill) = column_mean(col) else {
                log::debug!("Column '{}' has no values to average", col.name);
                return col.clone();
            };
            let cells = col
                .cells
                .iter()
                .map(|cell| match cell {
                    Cell::Missing => {
                        filled += 1;
                        Cell::Number(fill)
                    }
                    other => other.clone(),
                })
                .collect();
            Column::new(col.name.clone(), cells)
        })
        .collect();

    log::info!("Filled {filled} missing value(s) with column means");
    Table::from_checked(columns)
}

/// Arithmetic mean over the non-missing numbers, `None` when there are none.
pub fn column_mean(col: &Column) -> Option<f64> {
    let (sum, count) = col
        .cells
        .iter()
        .filter_map(Cell::as_f64)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn table(columns: Vec<(&str, Vec<Cell>)>) -> Table {
        Table::new(
            columns
                .into_iter()
                .map(|(name, cells)| Column::new(name, cells))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn deduplicate_keeps_first_occurrence_in_order() {
        let t = table(vec![
            ("n", vec![num(1.0), num(2.0), num(1.0)]),
            ("s", vec![text("a"), text("b"), text("a")]),
        ]);
        let out = deduplicate(&t);
        assert_eq!(out.n_rows(), 2);
        assert_eq!(out.row(0), vec![&num(1.0), &text("a")]);
        assert_eq!(out.row(1), vec![&num(2.0), &text("b")]);
    }

    #[test]
    fn deduplicate_is_idempotent() {
        let t = table(vec![
            ("n", vec![num(1.0), Cell::Missing, num(1.0), Cell::Missing, num(3.0)]),
            ("s", vec![text("a"), text("b"), text("a"), text("b"), text("a")]),
        ]);
        let once = deduplicate(&t);
        assert_eq!(once.n_rows(), 3);
        assert_eq!(deduplicate(&once), once);
    }

    #[test]
    fn deduplicate_compares_all_columns() {
        let t = table(vec![
            ("n", vec![num(1.0), num(1.0)]),
            ("s", vec![text("a"), text("b")]),
        ]);
        assert_eq!(deduplicate(&t).n_rows(), 2);
    }

    #[test]
    fn impute_fills_numeric_columns_only() {
        let t = table(vec![
            ("n", vec![num(1.0), Cell::Missing, num(3.0)]),
            ("s", vec![text("x"), Cell::Missing, text("z")]),
        ]);
        let out = impute_missing(&t);
        assert_eq!(
            out.column("n").unwrap().cells,
            vec![num(1.0), num(2.0), num(3.0)]
        );
        assert_eq!(out.column("s").unwrap().cells, t.column("s").unwrap().cells);
    }

    #[test]
    fn impute_leaves_all_missing_column_alone() {
        let t = table(vec![("n", vec![Cell::Missing, Cell::Missing])]);
        let out = impute_missing(&t);
        assert_eq!(out, t);
    }

    #[test]
    fn impute_skips_mixed_columns() {
        let t = table(vec![("m", vec![num(1.0), text("x"), Cell::Missing])]);
        assert_eq!(impute_missing(&t), t);
    }

    #[test]
    fn apply_runs_requested_steps() {
        let t = table(vec![("n", vec![num(4.0), num(4.0), Cell::Missing])]);
        let neither = apply(&t, CleanOptions::default());
        assert_eq!(neither, t);

        let both = apply(
            &t,
            CleanOptions {
                deduplicate: true,
                impute_missing: true,
            },
        );
        assert_eq!(both.column("n").unwrap().cells, vec![num(4.0), num(4.0)]);
    }
}
