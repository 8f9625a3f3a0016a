use crate::data::{Cell, Table};

/// Headers partitioned by the kinds of values they carry.
///
/// A column lands in `numeric` if any row holds a number there and in
/// `categorical` if any row holds a string there; mixed columns appear in both.
/// Both lists keep header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnCensus {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnCensus {
    pub fn of(table: &Table) -> Self {
        Self {
            numeric: columns_where(table, Cell::is_number),
            categorical: columns_where(table, Cell::is_string),
        }
    }
}

pub fn numeric_columns(table: &Table) -> Vec<String> {
    columns_where(table, Cell::is_number)
}

pub fn categorical_columns(table: &Table) -> Vec<String> {
    columns_where(table, Cell::is_string)
}

fn columns_where(table: &Table, pred: fn(&Cell) -> bool) -> Vec<String> {
    table
        .headers()
        .iter()
        .enumerate()
        .filter(|(idx, _)| table.rows().iter().any(|row| pred(row.get(*idx))))
        .map(|(_, h)| h.clone())
        .collect()
}
