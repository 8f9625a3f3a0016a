use crate::classify::ColumnCensus;
use crate::data::Table;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Explicit column choices made by the user. Unset slots get defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSelection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub y2: Option<String>,
}

/// Field selection after defaulting against a concrete table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    /// Label column. `None` only for a table without headers.
    pub x: Option<String>,
    /// Primary value column.
    pub y: Option<String>,
    /// Secondary value column (combo line series).
    pub y2: Option<String>,
}

/// Resolve the field selection against the table.
///
/// - `x`: explicit, else first categorical column, else first header
/// - `y`: explicit, else first numeric column, else second header
/// - `y2`: explicit, else second numeric column
///
/// An explicit name that is not a header of the table is ignored and the
/// default applies.
pub fn resolve_fields(
    table: &Table,
    census: &ColumnCensus,
    selection: &FieldSelection,
) -> ResolvedFields {
    let headers = table.headers();

    let x = explicit(table, "x", &selection.x)
        .or_else(|| census.categorical.first().cloned())
        .or_else(|| headers.first().cloned());

    let y = explicit(table, "y", &selection.y)
        .or_else(|| census.numeric.first().cloned())
        .or_else(|| headers.get(1).cloned());

    let y2 = explicit(table, "y2", &selection.y2).or_else(|| census.numeric.get(1).cloned());

    ResolvedFields { x, y, y2 }
}

fn explicit(table: &Table, slot: &str, value: &Option<String>) -> Option<String> {
    let name = value.as_ref()?;
    if table.column_index(name).is_some() {
        Some(name.clone())
    } else {
        warn!(slot, column = %name, "selected column not in table, using default");
        None
    }
}
