use serde_json::Value;
use sheetchart::ir::{ChartKind, MappedDataset, Orientation};
use sheetchart::normalize::{self, Source};
use sheetchart::{map_dataset, suggest, Cell, ColorConfig, FieldSelection, NormalizeError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Run the sheetchart binary, feeding `stdin` when given.
fn run_sheetchart(args: &[&str], stdin: Option<&str>) -> Result<String, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sheetchart"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if let Some(mut handle) = child.stdin.take() {
        if let Some(text) = stdin {
            handle
                .write_all(text.as_bytes())
                .map_err(|e| format!("Failed to write to stdin: {}", e))?;
        }
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

fn run_json(args: &[&str], stdin: Option<&str>) -> Value {
    let out = run_sheetchart(args, stdin).unwrap_or_else(|e| panic!("sheetchart failed: {e}"));
    serde_json::from_str(&out).unwrap()
}

// =============================================================================
// Ingestion
// =============================================================================

#[test]
fn test_same_table_from_every_source() {
    let csv = normalize::from_path(&fixture("sales.csv")).unwrap();
    let tsv = normalize::from_path(&fixture("sales.tsv")).unwrap();
    let xlsx = normalize::from_path(&fixture("sales.xlsx")).unwrap();

    assert_eq!(csv.headers(), &["Region", "Manager", "Sales"]);
    assert_eq!(csv, tsv);
    assert_eq!(csv, xlsx);

    // "1,234.5" is a number regardless of where it came from.
    assert_eq!(xlsx.cell(0, "Sales"), &Cell::Number(1234.5));
    assert_eq!(csv.cell(3, "Sales"), &Cell::Null);
}

#[test]
fn test_record_array_fixture() {
    let table = normalize::from_path(&fixture("funnel.json")).unwrap();
    assert_eq!(table.headers(), &["Stage", "Count"]);
    assert_eq!(table.cell(1, "Count"), &Cell::Number(95.0));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.parquet");
    std::fs::write(&path, b"PAR1").unwrap();

    let err = normalize::from_path(&path).unwrap_err();
    assert!(
        matches!(err, NormalizeError::UnsupportedFormat { ref extension } if extension == "parquet")
    );
    assert!(err.hint().is_none());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = normalize::from_path(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, NormalizeError::Io(_)));
}

#[test]
fn test_corrupt_workbook_is_parse_error() {
    let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    file.write_all(b"definitely not a zip archive").unwrap();

    let err = normalize::from_path(file.path()).unwrap_err();
    assert!(matches!(err, NormalizeError::Parse { .. }), "{err:?}");
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_pipeline_from_fixture() {
    let table = normalize::from_path(&fixture("sales.csv")).unwrap();
    assert_eq!(suggest(&table), ChartKind::Column);

    let dataset = map_dataset(
        &table,
        ChartKind::Bar,
        &FieldSelection::default(),
        &ColorConfig::default(),
    );
    let MappedDataset::Category(category) = dataset else {
        panic!("expected category dataset");
    };
    assert_eq!(category.orientation, Orientation::Horizontal);
    assert_eq!(category.labels, vec!["North", "South", "East", "West"]);
    assert_eq!(
        category.series[0].values,
        vec![Some(1234.5), Some(980.0), Some(1500.0), None]
    );
}

#[test]
fn test_pipeline_scatter_drops_text_points() {
    let text = std::fs::read_to_string(fixture("points.csv")).unwrap();
    let table = normalize::normalize(Source::Delimited {
        text: &text,
        delimiter: b',',
    })
    .unwrap();

    // "n/a" makes weight mixed, which still counts as numeric.
    assert_eq!(suggest(&table), ChartKind::Scatter);

    let MappedDataset::Scatter(scatter) = map_dataset(
        &table,
        ChartKind::Scatter,
        &FieldSelection::default(),
        &ColorConfig::default(),
    ) else {
        panic!("expected scatter dataset");
    };
    assert_eq!(scatter.x_label, "height");
    assert_eq!(scatter.y_label, "weight");
    assert_eq!(scatter.points.len(), 3);
}

// =============================================================================
// CLI
// =============================================================================

#[test]
fn test_cli_suggest_only() {
    let out = run_sheetchart(&["--suggest-only", fixture("sales.csv").to_str().unwrap()], None)
        .unwrap();
    assert_eq!(out.trim(), "column");
}

#[test]
fn test_cli_reads_stdin() {
    let json = run_json(&[], Some("Stage,Count\nA,3\nB,1\n"));
    assert_eq!(json["suggested"], "column");
    assert_eq!(json["kind"], "column");
    assert_eq!(json["dataset"]["shape"], "category");
    assert_eq!(json["dataset"]["labels"][1], "B");
}

#[test]
fn test_cli_flags_shape_output() {
    let path = fixture("funnel.json");
    let json = run_json(
        &[
            path.to_str().unwrap(),
            "--kind",
            "funnel",
            "--fields",
            "x: Stage, y: Count",
            "--palette",
            "monochrome",
            "--pin",
            "Visited=#ff0000",
        ],
        None,
    );

    assert_eq!(json["kind"], "funnel");
    let dataset = &json["dataset"];
    assert_eq!(dataset["shape"], "funnel");
    assert_eq!(dataset["labels"][0], "Visited");
    assert_eq!(dataset["labels"][2], "Purchased");
    assert_eq!(dataset["series"][0]["colors"][0], "rgba(255, 0, 0, 1)");
    assert_eq!(dataset["barThickness"][0], 48.0);
}

#[test]
fn test_cli_config_file_with_flag_override() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("chart.json");
    std::fs::write(
        &config,
        r##"{ "kind": "line", "colors": { "customColor": "#00ff00", "opacity": 0.5 } }"##,
    )
    .unwrap();

    let json = run_json(
        &[
            fixture("sales.csv").to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--color",
            "blue",
        ],
        None,
    );
    assert_eq!(json["kind"], "line");
    assert_eq!(json["dataset"]["series"][0]["colors"][0], "rgba(0, 0, 255, 0.5)");
}

#[test]
fn test_cli_table_kind_includes_rows() {
    let json = run_json(&["--kind", "table"], Some("a,b\nx,1\n"));
    assert_eq!(json["dataset"]["shape"], "table");
    assert_eq!(json["table"]["headers"][1], "b");
    assert_eq!(json["table"]["rows"][0][1], 1.0);
}

#[test]
fn test_cli_rejects_bad_field_mapping() {
    let err = run_sheetchart(&["--fields", "z: Region"], Some("Region\nNorth\n")).unwrap_err();
    assert!(err.contains("invalid field mapping"), "{err}");
}

#[test]
fn test_cli_rejects_unknown_kind() {
    let err = run_sheetchart(&["--kind", "donut"], Some("a\n1\n")).unwrap_err();
    assert!(err.contains("donut"), "{err}");
}
