// Library exports for sheetchart

pub mod classify;
pub mod data;
pub mod error;
pub mod normalize;
pub mod palette;
pub mod parser;
pub mod sheet_url;

// Chart pipeline
pub mod advisor;
pub mod color;
pub mod ir;
pub mod resolve;
pub mod scale;
pub mod transform;

pub use advisor::suggest;
pub use color::{Color, ColorConfig, ColorResolver, Theme};
pub use data::{Cell, Row, Table};
pub use error::NormalizeError;
pub use ir::{ChartKind, MappedDataset};
pub use normalize::{normalize, Source};
pub use resolve::FieldSelection;
pub use transform::{map_dataset, DatasetMapper};

use serde::Deserialize;

/// Everything a caller chooses about one chart, loadable from a JSON config.
///
/// ```json
/// { "kind": "column", "fields": { "x": "Region" }, "colors": { "palette": "neon" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartRequest {
    /// Chart kind; `None` means use the advisor's suggestion.
    pub kind: Option<ChartKind>,
    pub fields: FieldSelection,
    pub colors: ColorConfig,
}

impl ChartRequest {
    /// The requested kind, or the suggestion for `table`.
    pub fn kind_for(&self, table: &Table) -> ChartKind {
        self.kind.unwrap_or_else(|| suggest(table))
    }
}
