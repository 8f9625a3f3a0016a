use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use sheetchart::ir::ChartKind;
use sheetchart::normalize::{self, Source};
use sheetchart::palette::Palette;
use sheetchart::parser::parse_field_mapping;
use sheetchart::sheet_url::fetch_sheet;
use sheetchart::{suggest, ChartRequest, DatasetMapper, NormalizeError, Table, Theme};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sheetchart")]
#[command(about = "Turn tabular data into chart-ready JSON", long_about = None)]
struct Args {
    /// CSV/TSV/XLSX/ODS/JSON file or published sheet URL. Reads CSV from stdin when omitted.
    source: Option<String>,

    /// Chart kind: column, bar, line, combo, pie, heatmap, table, funnel, scatter
    #[arg(short, long)]
    kind: Option<ChartKind>,

    /// Field mapping, e.g. 'x: Region, y: "Unit Sales", y2: Cost'
    #[arg(short, long)]
    fields: Option<String>,

    /// Color palette: neon, colorful, monochrome
    #[arg(long)]
    palette: Option<Palette>,

    /// Color for every element (hex, rgb(), rgba() or a CSS name)
    #[arg(long)]
    color: Option<String>,

    /// Theme slot to paint with (primary, accent, danger, ...)
    #[arg(long)]
    theme_color: Option<String>,

    /// Pin a color to a row or category label (repeatable)
    #[arg(long = "pin", value_name = "LABEL=COLOR")]
    pins: Vec<String>,

    /// Opacity in [0, 1]
    #[arg(long)]
    opacity: Option<f64>,

    /// JSON chart request (kind, fields, colors); flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON object mapping theme slot names to colors
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Print only the suggested chart kind
    #[arg(long)]
    suggest_only: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let table = load_table(args.source.as_deref())?;
    info!(
        columns = table.headers().len(),
        rows = table.row_count(),
        "table loaded"
    );

    let suggested = suggest(&table);
    if args.suggest_only {
        println!("{suggested}");
        return Ok(());
    }

    let request = build_request(&args)?;
    let theme = match &args.theme {
        Some(path) => read_json::<Theme>(path, "theme")?,
        None => Theme::default(),
    };

    let kind = request.kind.unwrap_or(suggested);
    let dataset = DatasetMapper::new(theme).map(&table, kind, &request.fields, &request.colors);

    let mut output = json!({
        "suggested": suggested,
        "kind": kind,
        "dataset": dataset,
    });
    if kind == ChartKind::Table {
        output["table"] = serde_json::to_value(&table).context("Failed to serialize table")?;
    }

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("Failed to serialize output")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{rendered}").context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn load_table(source: Option<&str>) -> Result<Table> {
    match source {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            let client = reqwest::Client::new();
            runtime
                .block_on(fetch_sheet(&client, url))
                .map_err(|e| load_error(e, url))
        }
        Some(path) => normalize::from_path(Path::new(path)).map_err(|e| load_error(e, path)),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read CSV from stdin")?;
            normalize::normalize(Source::Delimited {
                text: &text,
                delimiter: b',',
            })
            .map_err(|e| load_error(e, "stdin"))
        }
    }
}

fn load_error(err: NormalizeError, source: &str) -> anyhow::Error {
    let context = match err.hint() {
        Some(hint) => format!("Failed to load {source} ({hint})"),
        None => format!("Failed to load {source}"),
    };
    anyhow::Error::new(err).context(context)
}

/// Config file first, then flags on top.
fn build_request(args: &Args) -> Result<ChartRequest> {
    let mut request = match &args.config {
        Some(path) => read_json::<ChartRequest>(path, "config")?,
        None => ChartRequest::default(),
    };

    if let Some(kind) = args.kind {
        request.kind = Some(kind);
    }

    if let Some(mapping) = &args.fields {
        let fields = parse_field_mapping(mapping).map_err(anyhow::Error::msg)?;
        if fields.x.is_some() {
            request.fields.x = fields.x;
        }
        if fields.y.is_some() {
            request.fields.y = fields.y;
        }
        if fields.y2.is_some() {
            request.fields.y2 = fields.y2;
        }
    }

    let colors = &mut request.colors;
    if let Some(palette) = args.palette {
        colors.palette = Some(palette);
    }
    if let Some(color) = &args.color {
        colors.custom_color = Some(color.clone());
    }
    if let Some(slot) = &args.theme_color {
        colors.theme_color_ref = Some(slot.clone());
    }
    if let Some(opacity) = args.opacity {
        colors.opacity = opacity;
    }
    for pin in &args.pins {
        let Some((label, color)) = pin.split_once('=') else {
            bail!("invalid --pin '{pin}', expected LABEL=COLOR");
        };
        colors
            .per_value_color
            .insert(label.trim().to_string(), color.trim().to_string());
    }

    Ok(request)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {what} file {}", path.display()))
}
