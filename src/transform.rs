use crate::classify::ColumnCensus;
use crate::color::{ColorConfig, ColorResolver, Theme};
use crate::data::{Cell, Table};
use crate::ir::{
    CategoryDataset, ChartKind, FunnelDataset, HeatmapCell, HeatmapDataset, MappedDataset,
    Orientation, ScatterDataset, ScatterPoint, Series, SeriesKind,
};
use crate::resolve::{resolve_fields, FieldSelection, ResolvedFields};
use crate::scale::LinearScale;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Funnel bar thickness bounds in pixels; the smallest stage stays visible.
pub const FUNNEL_THICKNESS: (f64, f64) = (24.0, 48.0);
/// Heatmap cell intensity floor so near-zero cells remain faintly visible.
pub const HEATMAP_MIN_INTENSITY: f64 = 0.05;
/// The single y category used when a heatmap has no second categorical column.
pub const HEATMAP_VALUE_CATEGORY: &str = "Value";
/// Series label when no value column could be resolved.
const DEFAULT_SERIES_LABEL: &str = "Value";

/// Turns a canonical table into the dataset a given chart kind renders.
///
/// Pure: the same inputs always give the same dataset, and neither the table
/// nor the color configuration is modified.
#[derive(Debug, Clone, Default)]
pub struct DatasetMapper {
    resolver: ColorResolver,
}

impl DatasetMapper {
    pub fn new(theme: Theme) -> Self {
        Self {
            resolver: ColorResolver::new(theme),
        }
    }

    pub fn map(
        &self,
        table: &Table,
        kind: ChartKind,
        selection: &FieldSelection,
        colors: &ColorConfig,
    ) -> MappedDataset {
        if table.is_empty() {
            return MappedDataset::empty(kind);
        }

        let census = ColumnCensus::of(table);
        let fields = resolve_fields(table, &census, selection);
        debug!(%kind, ?fields, rows = table.row_count(), "mapping dataset");

        let ctx = MapContext {
            table,
            census: &census,
            fields: &fields,
            selection,
            colors,
            resolver: &self.resolver,
            alpha: colors.alpha(),
        };

        match kind {
            ChartKind::Column => MappedDataset::Category(ctx.bars(Orientation::Vertical)),
            ChartKind::Bar => MappedDataset::Category(ctx.bars(Orientation::Horizontal)),
            ChartKind::Line => MappedDataset::Category(ctx.line()),
            ChartKind::Pie => MappedDataset::Category(ctx.pie()),
            ChartKind::Combo => MappedDataset::Category(ctx.combo()),
            ChartKind::Scatter => MappedDataset::Scatter(ctx.scatter()),
            ChartKind::Heatmap => MappedDataset::Heatmap(ctx.heatmap()),
            ChartKind::Funnel => MappedDataset::Funnel(ctx.funnel()),
            ChartKind::Table => MappedDataset::Table,
        }
    }
}

/// Map with the built-in theme.
pub fn map_dataset(
    table: &Table,
    kind: ChartKind,
    selection: &FieldSelection,
    colors: &ColorConfig,
) -> MappedDataset {
    DatasetMapper::default().map(table, kind, selection, colors)
}

struct MapContext<'a> {
    table: &'a Table,
    census: &'a ColumnCensus,
    fields: &'a ResolvedFields,
    selection: &'a FieldSelection,
    colors: &'a ColorConfig,
    resolver: &'a ColorResolver,
    alpha: f64,
}

impl MapContext<'_> {
    // =========================================================================
    // Category charts
    // =========================================================================

    fn bars(&self, orientation: Orientation) -> CategoryDataset {
        let labels = self.row_labels();
        let series = self.per_point_series(SeriesKind::Bar, &labels);
        CategoryDataset {
            labels,
            series: vec![series],
            orientation,
        }
    }

    /// Row order is kept as-is; it already carries the ordinal meaning.
    fn line(&self) -> CategoryDataset {
        let labels = self.row_labels();
        let series_label = self.series_label(self.fields.y.as_deref());
        let series = Series {
            kind: SeriesKind::Line,
            values: self.values(self.fields.y.as_deref()),
            colors: vec![self.resolver.resolve(self.colors, 0, &series_label, self.alpha)],
            label: series_label,
        };
        CategoryDataset {
            labels,
            series: vec![series],
            orientation: Orientation::Vertical,
        }
    }

    fn pie(&self) -> CategoryDataset {
        let labels = self.row_labels();
        let series = self.per_point_series(SeriesKind::Pie, &labels);
        CategoryDataset {
            labels,
            series: vec![series],
            orientation: Orientation::Vertical,
        }
    }

    /// Bars over `y` plus, when a second value column exists, a line over `y2`.
    fn combo(&self) -> CategoryDataset {
        let labels = self.row_labels();
        let mut series = vec![self.per_point_series(SeriesKind::Bar, &labels)];

        if let Some(y2) = self.fields.y2.as_deref() {
            let label = y2.to_string();
            series.push(Series {
                kind: SeriesKind::Line,
                values: self.values(Some(y2)),
                colors: vec![self.resolver.resolve(self.colors, 1, &label, self.alpha)],
                label,
            });
        }

        CategoryDataset {
            labels,
            series,
            orientation: Orientation::Vertical,
        }
    }

    // =========================================================================
    // Funnel
    // =========================================================================

    /// Stages sorted by value, largest first. Ties keep table order and
    /// non-numeric stages sink to the bottom.
    fn funnel(&self) -> FunnelDataset {
        let labels = self.row_labels();
        let values = self.values(self.fields.y.as_deref());

        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| descending(values[a], values[b]));

        let thickness_scale =
            LinearScale::from_zero(values.iter().flatten().copied(), FUNNEL_THICKNESS);

        let mut sorted_labels = Vec::with_capacity(order.len());
        let mut sorted_values = Vec::with_capacity(order.len());
        let mut colors = Vec::with_capacity(order.len());
        let mut bar_thickness = Vec::with_capacity(order.len());

        for (position, &row) in order.iter().enumerate() {
            let value = values[row];
            colors.push(self.resolver.resolve(self.colors, position, &labels[row], self.alpha));
            bar_thickness.push(value.map_or(FUNNEL_THICKNESS.0, |v| thickness_scale.map(v)));
            sorted_labels.push(labels[row].clone());
            sorted_values.push(value);
        }

        FunnelDataset {
            labels: sorted_labels,
            series: vec![Series {
                label: self.series_label(self.fields.y.as_deref()),
                kind: SeriesKind::Bar,
                values: sorted_values,
                colors,
            }],
            bar_thickness,
        }
    }

    // =========================================================================
    // Scatter
    // =========================================================================

    /// Pair two numeric columns into points. Rows where either side is not a
    /// number are left out entirely.
    fn scatter(&self) -> ScatterDataset {
        let numeric = &self.census.numeric;
        let Some(first) = numeric.first() else {
            return ScatterDataset::default();
        };

        // An explicit numeric pick on one axis takes the first other numeric
        // column on the free axis.
        let (x_col, y_col) = match (
            self.numeric_choice(&self.selection.x),
            self.numeric_choice(&self.selection.y),
        ) {
            (Some(x), Some(y)) => (x, y),
            (Some(x), None) => (x, other_numeric(numeric, x).unwrap_or(x)),
            (None, Some(y)) => (other_numeric(numeric, y).unwrap_or(y), y),
            (None, None) => (first, other_numeric(numeric, first).unwrap_or(first)),
        };

        let labels = self.row_labels();
        let points = self
            .table
            .column(x_col)
            .zip(self.table.column(y_col))
            .enumerate()
            .filter_map(|(row, (x, y))| {
                let (x, y) = (x.as_number()?, y.as_number()?);
                Some(ScatterPoint {
                    x,
                    y,
                    color: self.resolver.resolve(self.colors, 0, &labels[row], self.alpha),
                })
            })
            .collect();

        ScatterDataset {
            x_label: x_col.clone(),
            y_label: y_col.clone(),
            points,
        }
    }

    /// An explicit selection that names a numeric-bearing column.
    fn numeric_choice(&self, selected: &Option<String>) -> Option<&String> {
        let name = selected.as_ref()?;
        self.census.numeric.iter().find(|h| *h == name)
    }

    // =========================================================================
    // Heatmap
    // =========================================================================

    /// Category grid. Each cell takes the value of the first row in table
    /// order whose categories match; duplicates are not aggregated. Pairs with
    /// no row get 0, pairs whose first row is not numeric are omitted.
    fn heatmap(&self) -> HeatmapDataset {
        let row_labels = self.row_labels();

        let x_keys: Vec<Option<String>> = match self.census.categorical.first() {
            Some(col) => self.table.column(col).map(Cell::label).collect(),
            None => row_labels.iter().cloned().map(Some).collect(),
        };
        let y_keys: Vec<Option<String>> = match self.census.categorical.get(1) {
            Some(col) => self.table.column(col).map(Cell::label).collect(),
            None => vec![Some(HEATMAP_VALUE_CATEGORY.to_string()); self.table.row_count()],
        };

        let x_categories = unique_in_order(&x_keys);
        let y_categories = unique_in_order(&y_keys);
        let values = self.values(self.fields.y.as_deref());

        let mut first_match: HashMap<(&str, &str), usize> = HashMap::new();
        for (row, (x, y)) in x_keys.iter().zip(&y_keys).enumerate() {
            if let (Some(x), Some(y)) = (x, y) {
                first_match.entry((x.as_str(), y.as_str())).or_insert(row);
            }
        }

        let mut raw_cells = Vec::new();
        for (xi, x) in x_categories.iter().enumerate() {
            for (yi, y) in y_categories.iter().enumerate() {
                let value = match first_match.get(&(x.as_str(), y.as_str())) {
                    Some(&row) => match values[row] {
                        Some(v) => v,
                        None => continue,
                    },
                    None => 0.0,
                };
                raw_cells.push((xi, yi, value));
            }
        }

        let intensity = LinearScale::from_zero(raw_cells.iter().map(|c| c.2), (0.0, 1.0));
        let cells = raw_cells
            .into_iter()
            .map(|(xi, yi, value)| {
                let base = self.resolver.resolve(self.colors, 0, &x_categories[xi], self.alpha);
                let scaled = intensity.map(value).clamp(HEATMAP_MIN_INTENSITY, 1.0);
                HeatmapCell {
                    x_index: xi,
                    y_index: yi,
                    value,
                    color: base.with_alpha(base.a * scaled),
                }
            })
            .collect();

        HeatmapDataset {
            x_categories,
            y_categories,
            cells,
        }
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    /// One display label per row from `x`; `Row N` when the cell is empty.
    fn row_labels(&self) -> Vec<String> {
        let x = self.fields.x.as_deref().unwrap_or_default();
        self.table
            .column(x)
            .enumerate()
            .map(|(i, cell)| cell.label().unwrap_or_else(|| format!("Row {}", i + 1)))
            .collect()
    }

    /// Numeric values of a column in row order; non-numbers become gaps.
    fn values(&self, column: Option<&str>) -> Vec<Option<f64>> {
        match column {
            Some(col) => self.table.column(col).map(Cell::as_number).collect(),
            None => vec![None; self.table.row_count()],
        }
    }

    fn series_label(&self, column: Option<&str>) -> String {
        column.unwrap_or(DEFAULT_SERIES_LABEL).to_string()
    }

    /// Series over `y` with one color per point, keyed by row index and label.
    fn per_point_series(&self, kind: SeriesKind, labels: &[String]) -> Series {
        let colors = labels
            .iter()
            .enumerate()
            .map(|(i, label)| self.resolver.resolve(self.colors, i, label, self.alpha))
            .collect();
        Series {
            label: self.series_label(self.fields.y.as_deref()),
            kind,
            values: self.values(self.fields.y.as_deref()),
            colors,
        }
    }
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn other_numeric<'a>(numeric: &'a [String], taken: &str) -> Option<&'a String> {
    numeric.iter().find(|h| h.as_str() != taken)
}

fn unique_in_order(keys: &[Option<String>]) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.iter()
        .flatten()
        .filter(|k| seen.insert(k.as_str()))
        .cloned()
        .collect()
}
