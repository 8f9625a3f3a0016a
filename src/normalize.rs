//! Table normalization.
//!
//! Turns delimited text, spreadsheet workbooks and JSON record arrays into the
//! canonical [`Table`]. Every source funnels its raw values through
//! [`coerce_cell`], so a value such as `"1,234"` becomes the number 1234 no
//! matter where it came from.

use crate::data::{Cell, Table};
use crate::error::NormalizeError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Raw input handed to [`normalize`].
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Delimited text read from a local file or stdin.
    Delimited { text: &'a str, delimiter: u8 },
    /// Spreadsheet workbook bytes (xlsx, xlsm, xlsb, xls, ods). First sheet only.
    Spreadsheet(&'a [u8]),
    /// CSV text returned by a published-sheet export endpoint.
    Fetched(&'a str),
    /// JSON array of objects keyed by header.
    Records(&'a str),
}

/// File formats the normalizer understands, keyed off the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited(u8),
    Spreadsheet,
    Records,
}

impl SourceFormat {
    pub fn from_extension(extension: &str) -> Result<Self, NormalizeError> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Ok(SourceFormat::Delimited(b',')),
            "tsv" | "tab" => Ok(SourceFormat::Delimited(b'\t')),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            "json" => Ok(SourceFormat::Records),
            other => Err(NormalizeError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, NormalizeError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }
}

/// The single coercion rule shared by every source.
///
/// Trim; empty becomes `Null`; otherwise strip thousands separators and keep
/// the value as a number only when the whole remaining text parses.
pub fn coerce_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    let stripped = trimmed.replace(',', "");
    match stripped.parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::String(trimmed.to_string()),
    }
}

/// Normalize any supported source into a [`Table`].
pub fn normalize(source: Source<'_>) -> Result<Table, NormalizeError> {
    match source {
        Source::Delimited { text, delimiter } => from_csv(text, delimiter),
        Source::Fetched(text) => from_csv(text, b','),
        Source::Spreadsheet(bytes) => from_spreadsheet(bytes),
        Source::Records(text) => {
            let value: Value = serde_json::from_str(text)
                .map_err(|e| NormalizeError::parse(format!("invalid JSON: {e}")))?;
            from_records(&value)
        }
    }
}

/// Read a file from disk, choosing the parser from its extension.
pub fn from_path(path: &Path) -> Result<Table, NormalizeError> {
    let format = SourceFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "reading table source");
    match format {
        SourceFormat::Delimited(delimiter) => {
            let text = read_text(path)?;
            normalize(Source::Delimited {
                text: &text,
                delimiter,
            })
        }
        SourceFormat::Spreadsheet => {
            let bytes = std::fs::read(path)?;
            normalize(Source::Spreadsheet(&bytes))
        }
        SourceFormat::Records => {
            let text = read_text(path)?;
            normalize(Source::Records(&text))
        }
    }
}

/// Read a text source. Bytes that are not UTF-8 are malformed input, not an I/O failure.
fn read_text(path: &Path) -> Result<String, NormalizeError> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| {
        NormalizeError::parse(format!(
            "{} is not valid UTF-8 (byte {})",
            path.display(),
            e.utf8_error().valid_up_to()
        ))
    })
}

/// Parse delimited text. The first record is the header row.
pub fn from_csv(text: &str, delimiter: u8) -> Result<Table, NormalizeError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header_record = match records.next() {
        Some(record) => record?,
        None => return Ok(Table::default()),
    };
    let headers = build_headers(header_record.iter().map(|h| Some(h.to_string())));

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            warn!(
                row = idx + 1,
                fields = record.len(),
                headers = headers.len(),
                "dropping extra fields beyond the header row"
            );
        }
        rows.push(record.iter().take(headers.len()).map(coerce_cell).collect());
    }

    Ok(Table::new(headers, rows))
}

/// Parse the first sheet of a spreadsheet workbook.
pub fn from_spreadsheet(bytes: &[u8]) -> Result<Table, NormalizeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| NormalizeError::parse("workbook has no readable first sheet"))??;

    let mut sheet_rows = range.rows();
    let header_row = match sheet_rows.next() {
        Some(row) => row,
        None => return Ok(Table::default()),
    };
    let headers = build_headers(header_row.iter().map(|c| match c {
        Data::Empty => None,
        other => Some(other.to_string()),
    }));

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let cells: Vec<Cell> = sheet_row
            .iter()
            .take(headers.len())
            .map(spreadsheet_cell)
            .collect();
        rows.push(cells);
    }
    trim_trailing_blank_rows(&mut rows);

    Ok(Table::new(headers, rows))
}

/// Build a table from a JSON array of objects.
///
/// Headers are the union of keys in first-seen order.
pub fn from_records(value: &Value) -> Result<Table, NormalizeError> {
    let array = value
        .as_array()
        .ok_or_else(|| NormalizeError::parse("input data must be a JSON array of objects"))?;

    let mut keys: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for item in array {
        let obj = item
            .as_object()
            .ok_or_else(|| NormalizeError::parse("items in array must be objects"))?;
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                keys.push(key.clone());
            }
        }
    }

    let headers = build_headers(keys.iter().map(|k| Some(k.clone())));
    let mut rows = Vec::with_capacity(array.len());
    for item in array {
        // Checked above.
        let Some(obj) = item.as_object() else { continue };
        let mut cells = Vec::with_capacity(keys.len());
        for key in &keys {
            let cell = match obj.get(key) {
                Some(Value::String(s)) => coerce_cell(s),
                Some(Value::Number(n)) => n.as_f64().map_or(Cell::Null, Cell::Number),
                Some(Value::Bool(b)) => coerce_cell(&b.to_string()),
                Some(Value::Null) | None => Cell::Null,
                Some(_) => {
                    return Err(NormalizeError::parse(format!(
                        "unsupported value type for field '{key}'"
                    )))
                }
            };
            cells.push(cell);
        }
        rows.push(cells);
    }

    Ok(Table::new(headers, rows))
}

fn spreadsheet_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) if f.is_finite() => Cell::Number(*f),
        Data::Empty | Data::Error(_) => Cell::Null,
        other => coerce_cell(&other.to_string()),
    }
}

/// Drop the formatted-but-empty rows a used range often ends with.
/// Blank rows between data rows stay.
fn trim_trailing_blank_rows(rows: &mut Vec<Vec<Cell>>) {
    while rows
        .last()
        .is_some_and(|row| row.iter().all(Cell::is_null))
    {
        rows.pop();
    }
}

/// Fill in missing header names and make every name unique.
fn build_headers(raw: impl Iterator<Item = Option<String>>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    let mut used: HashSet<String> = HashSet::new();

    for (index, name) in raw.enumerate() {
        let name = match name.map(|n| n.trim().to_string()) {
            Some(n) if !n.is_empty() => n,
            _ => {
                debug!(index, "substituting synthetic header");
                format!("col_{index}")
            }
        };
        let mut unique = name.clone();
        let mut suffix = 1;
        while used.contains(&unique) {
            unique = format!("{name}_{suffix}");
            suffix += 1;
        }
        used.insert(unique.clone());
        headers.push(unique);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_thousands_separator() {
        assert_eq!(coerce_cell("1,234"), Cell::Number(1234.0));
        assert_eq!(coerce_cell(" 1,234.5 "), Cell::Number(1234.5));
    }

    #[test]
    fn test_coerce_empty_and_whitespace() {
        assert_eq!(coerce_cell(""), Cell::Null);
        assert_eq!(coerce_cell("   "), Cell::Null);
    }

    #[test]
    fn test_coerce_partial_number_stays_string() {
        assert_eq!(coerce_cell("12abc"), Cell::String("12abc".to_string()));
        assert_eq!(coerce_cell(" North "), Cell::String("North".to_string()));
        assert_eq!(coerce_cell("NaN"), Cell::String("NaN".to_string()));
        assert_eq!(coerce_cell(","), Cell::String(",".to_string()));
    }

    #[test]
    fn test_coerce_is_idempotent() {
        for raw in ["1,234.5", "abc", "", "  -3 ", "1e3"] {
            let once = coerce_cell(raw);
            let again = match &once {
                Cell::Number(n) => coerce_cell(&n.to_string()),
                Cell::String(s) => coerce_cell(s),
                Cell::Null => coerce_cell(""),
            };
            assert_eq!(once, again, "coercion of {raw:?} not idempotent");
        }
    }

    #[test]
    fn test_csv_basic() {
        let table = from_csv("Region,Sales\nNorth,\"1,200\"\nSouth,800\n", b',').unwrap();
        assert_eq!(table.headers(), &["Region", "Sales"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, "Sales"), &Cell::Number(1200.0));
        assert_eq!(table.cell(1, "Region"), &Cell::String("South".to_string()));
    }

    #[test]
    fn test_csv_synthetic_and_duplicate_headers() {
        let table = from_csv("a,,a,a\n1,2,3,4\n", b',').unwrap();
        assert_eq!(table.headers(), &["a", "col_1", "a_1", "a_2"]);
    }

    #[test]
    fn test_csv_ragged_rows() {
        let table = from_csv("a,b,c\n1\n1,2,3,4\n", b',').unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, "c"), &Cell::Null);
        assert_eq!(table.rows()[1].cells().len(), 3);
    }

    #[test]
    fn test_csv_strips_bom() {
        let table = from_csv("\u{feff}x,y\n1,2\n", b',').unwrap();
        assert_eq!(table.headers()[0], "x");
    }

    #[test]
    fn test_csv_keeps_all_null_rows() {
        let table = from_csv("Month,Sales\nJan,10\n,\nMar,30\n", b',').unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(1, "Month"), &Cell::Null);
        assert_eq!(table.cell(2, "Sales"), &Cell::Number(30.0));
    }

    #[test]
    fn test_trailing_blank_rows_trimmed() {
        let mut rows = vec![
            vec![Cell::Number(1.0)],
            vec![Cell::Null],
            vec![Cell::Number(2.0)],
            vec![Cell::Null],
            vec![Cell::Null],
        ];
        trim_trailing_blank_rows(&mut rows);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![Cell::Null]);
    }

    #[test]
    fn test_csv_empty_input() {
        let table = from_csv("", b',').unwrap();
        assert!(table.headers().is_empty());
        assert!(table.is_empty());

        let headers_only = from_csv("a,b\n", b',').unwrap();
        assert_eq!(headers_only.headers().len(), 2);
        assert!(headers_only.is_empty());
    }

    #[test]
    fn test_tsv_delimiter() {
        let table = normalize(Source::Delimited {
            text: "name\tscore\nann\t9\n",
            delimiter: b'\t',
        })
        .unwrap();
        assert_eq!(table.cell(0, "score"), &Cell::Number(9.0));
    }

    #[test]
    fn test_latin1_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["latin1.csv", "latin1.tsv", "latin1.json"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"R\xe9gion,Sales\nNor\xf0,10\n").unwrap();
            let err = from_path(&path).unwrap_err();
            assert!(matches!(err, NormalizeError::Parse { .. }), "{name}: {err:?}");
        }
    }

    #[test]
    fn test_records_preserve_first_seen_order() {
        let value = json!([
            {"Month": "Jan", "Sales": "1,500"},
            {"Month": "Feb", "Sales": 900, "Notes": "promo"}
        ]);
        let table = from_records(&value).unwrap();
        assert_eq!(table.headers(), &["Month", "Sales", "Notes"]);
        assert_eq!(table.cell(0, "Sales"), &Cell::Number(1500.0));
        assert_eq!(table.cell(0, "Notes"), &Cell::Null);
        assert_eq!(table.cell(1, "Notes"), &Cell::String("promo".to_string()));
    }

    #[test]
    fn test_records_reject_nested_values() {
        let value = json!([{"a": [1, 2]}]);
        assert!(matches!(
            from_records(&value),
            Err(NormalizeError::Parse { .. })
        ));
        assert!(from_records(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(
            SourceFormat::from_extension("CSV").unwrap(),
            SourceFormat::Delimited(b',')
        );
        assert_eq!(
            SourceFormat::from_extension("xlsx").unwrap(),
            SourceFormat::Spreadsheet
        );
        assert!(matches!(
            SourceFormat::from_extension("sql"),
            Err(NormalizeError::UnsupportedFormat { extension }) if extension == "sql"
        ));
    }

    #[test]
    fn test_spreadsheet_garbage_is_parse_error() {
        let result = from_spreadsheet(b"definitely not a workbook");
        assert!(matches!(result, Err(NormalizeError::Parse { .. })));
    }

    #[test]
    fn test_spreadsheet_cell_coercion_matches_text_rule() {
        assert_eq!(spreadsheet_cell(&Data::Float(1234.5)), coerce_cell("1,234.5"));
        assert_eq!(
            spreadsheet_cell(&Data::String("1,234.5".to_string())),
            Cell::Number(1234.5)
        );
        assert_eq!(spreadsheet_cell(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(spreadsheet_cell(&Data::Empty), Cell::Null);
        assert_eq!(
            spreadsheet_cell(&Data::Bool(true)),
            Cell::String("true".to_string())
        );
    }
}
