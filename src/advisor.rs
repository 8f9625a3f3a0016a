use crate::classify::ColumnCensus;
use crate::data::Table;
use crate::ir::ChartKind;

/// Largest table (rows) still considered a pie candidate.
const PIE_MAX_ROWS: usize = 8;
/// Largest table (headers) still considered a pie candidate.
const PIE_MAX_HEADERS: usize = 2;
/// Row count above which a trend line is suggested.
const LINE_MIN_ROWS: usize = 50;

/// Recommend a default chart kind for an unseen table.
///
/// Only ever returns scatter, column, pie, line or table. Rules are checked in
/// order and the first match wins:
/// 1. two or more numeric columns: scatter
/// 2. exactly one numeric and at least one categorical column: column
/// 3. at most two headers and at most eight rows: pie
/// 4. more than fifty rows: line
/// 5. otherwise table, meaning there is no confident recommendation
pub fn suggest(table: &Table) -> ChartKind {
    let census = ColumnCensus::of(table);
    let rows = table.row_count();

    if census.numeric.len() >= 2 {
        ChartKind::Scatter
    } else if census.numeric.len() == 1 && !census.categorical.is_empty() {
        ChartKind::Column
    } else if table.headers().len() <= PIE_MAX_HEADERS && rows <= PIE_MAX_ROWS {
        ChartKind::Pie
    } else if rows > LINE_MIN_ROWS {
        ChartKind::Line
    } else {
        ChartKind::Table
    }
}
