use serde::Serialize;
use std::fmt;

/// A single typed value in the canonical table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    String(String),
    Null,
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Cell::String(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text used when the cell is shown as a label. `None` for nulls.
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Number(n) => Some(n.to_string()),
            Cell::String(s) => Some(s.clone()),
            Cell::Null => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::String(s) => f.write_str(s),
            Cell::Null => Ok(()),
        }
    }
}

/// One record of the table, positionally aligned with `Table::headers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> &Cell {
        self.cells.get(index).unwrap_or(&Cell::Null)
    }
}

/// The canonical table every downstream component consumes.
///
/// Headers are unique and every row holds exactly one cell per header.
/// Both are fixed at construction; a re-upload builds a new `Table`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, padding short rows with `Null` and truncating long ones
    /// so the row/header invariant holds.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, Cell::Null);
                Row { cells }
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at `(row, header)`; `Null` when either is out of range.
    pub fn cell(&self, row: usize, header: &str) -> &Cell {
        match (self.rows.get(row), self.column_index(header)) {
            (Some(r), Some(col)) => r.get(col),
            _ => &Cell::Null,
        }
    }

    /// Iterate the cells of one column in row order.
    pub fn column<'a>(&'a self, header: &str) -> impl Iterator<Item = &'a Cell> + 'a {
        let idx = self.column_index(header);
        self.rows.iter().map(move |row| match idx {
            Some(i) => row.get(i),
            None => &Cell::Null,
        })
    }
}
