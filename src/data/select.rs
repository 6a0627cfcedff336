use std::collections::HashSet;

use super::model::Table;

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

/// The selection used when the caller has not narrowed anything: every
/// column, in table order.
pub fn default_selection(table: &Table) -> Vec<String> {
    table.column_names()
}

/// Project `table` onto the requested columns, in request order.
///
/// * A name that is not a column of the table is skipped.
/// * A name requested twice is only kept the first time.
pub fn select<S: AsRef<str>>(table: &Table, requested: &[S]) -> Table {
    let mut taken: HashSet<&str> = HashSet::with_capacity(requested.len());
    let mut columns = Vec::with_capacity(requested.len());

    for name in requested {
        let name: &str = name.as_ref();
        if !taken.insert(name) {
            continue;
        }
        match table.column(name) {
            Some(col) => columns.push(col.clone()),
            None => log::debug!("Ignoring unknown column '{name}' in selection"),
        }
    }

    Table::from_checked(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Cell, Column};

    fn abc() -> Table {
        Table::new(vec![
            Column::new("a", vec![Cell::Number(1.0)]),
            Column::new("b", vec![Cell::Text("x".into())]),
            Column::new("c", vec![Cell::Boolean(true)]),
        ])
        .unwrap()
    }

    #[test]
    fn selection_follows_request_order() {
        let out = select(&abc(), &["b", "a"]);
        assert_eq!(out.column_names(), vec!["b", "a"]);
        assert_eq!(out.row(0), vec![&Cell::Text("x".into()), &Cell::Number(1.0)]);
    }

    #[test]
    fn unknown_and_repeated_names_are_dropped() {
        let out = select(&abc(), &["c", "zzz", "c", "a"]);
        assert_eq!(out.column_names(), vec!["c", "a"]);
    }

    #[test]
    fn default_selection_is_identity() {
        let table = abc();
        let out = select(&table, default_selection(&table).as_slice());
        assert_eq!(out, table);
    }

    #[test]
    fn empty_selection_gives_no_columns() {
        let out = select::<&str>(&abc(), &[]);
        assert_eq!(out.n_cols(), 0);
    }
}
