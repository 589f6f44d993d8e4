use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::AnalyticsError;

/// Available chart kinds supported by the application
///
/// Wire names follow the client chart library: `bar`, `line`, `pie`,
/// `scatter`, `bar-3d`, `pie-3d`, `3d-scatter`, `line-3d`. The legacy
/// spelling `scatter3d` is accepted on input as an alias of `3d-scatter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    /// Bar chart - one bar per row, labels taken from the x column
    #[serde(rename = "bar")]
    Bar,

    /// Line chart - rows sorted ascending by numeric x value
    #[serde(rename = "line")]
    Line,

    /// Pie chart - y values summed per distinct x category
    #[serde(rename = "pie")]
    Pie,

    /// Scatter plot - one (x, y) point per row
    #[serde(rename = "scatter")]
    Scatter,

    /// 3D bar chart - bars on a category grid with normalized heights
    #[serde(rename = "bar-3d")]
    Bar3d,

    /// 3D pie chart - pie aggregation with a fixed wedge palette
    #[serde(rename = "pie-3d")]
    Pie3d,

    /// 3D scatter plot - one (x, y, z) point per row
    #[serde(rename = "3d-scatter", alias = "scatter3d")]
    Scatter3d,

    /// 3D line chart - (x, y, z) points in row order
    #[serde(rename = "line-3d")]
    Line3d,
}

impl ChartKind {
    /// Parse a wire-format chart kind string.
    ///
    /// # Errors
    /// * `AnalyticsError::UnsupportedChartKind` for anything unknown
    pub fn parse(s: &str) -> Result<Self, AnalyticsError> {
        match s {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            "pie" => Ok(ChartKind::Pie),
            "scatter" => Ok(ChartKind::Scatter),
            "bar-3d" => Ok(ChartKind::Bar3d),
            "pie-3d" => Ok(ChartKind::Pie3d),
            "3d-scatter" | "scatter3d" => Ok(ChartKind::Scatter3d),
            "line-3d" => Ok(ChartKind::Line3d),
            _ => Err(AnalyticsError::UnsupportedChartKind(s.to_string())),
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Bar3d => "bar-3d",
            ChartKind::Pie3d => "pie-3d",
            ChartKind::Scatter3d => "3d-scatter",
            ChartKind::Line3d => "line-3d",
        }
    }

    /// True for kinds that plot three axes.
    pub fn needs_z_axis(&self) -> bool {
        matches!(
            self,
            ChartKind::Bar3d | ChartKind::Scatter3d | ChartKind::Line3d
        )
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chart configuration: kind plus the columns mapped to each axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_axis: String,
    pub y_axis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_axis: Option<String>,
}

/// One dataset entry inside a 2D chart payload.
///
/// Field names serialize in camelCase because the payload is consumed
/// verbatim by the browser chart library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<DataValue>,
    pub background_color: Paint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
}

/// A single plotted value: a bare number or an (x, y) point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Scalar(f64),
    Point { x: f64, y: f64 },
}

/// Fill color for a dataset: one color for the whole series, or one
/// color per slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paint {
    Single(String),
    PerSlice(Vec<String>),
}

/// Chart-library-ready payload, shaped per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartPayload {
    /// `labels` + `datasets` shape used by the 2D kinds and `pie-3d`.
    Datasets {
        labels: Vec<String>,
        datasets: Vec<ChartDataset>,
    },

    /// Bar grid for `bar-3d`: category indices on x/z, normalized
    /// heights on y, raw values alongside.
    Bars3d {
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        labels: Vec<String>,
        values: Vec<f64>,
    },

    /// Coordinate triples for `3d-scatter` and `line-3d`.
    Points3d {
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        labels: Vec<String>,
    },
}

const BASE_FILL: &str = "rgba(75, 192, 192, 0.6)";
const BASE_BORDER: &str = "rgba(75, 192, 192, 1)";

/// Height scale for normalized 3D bars.
const BAR3D_HEIGHT: f64 = 10.0;

/// Wedge palette for `pie-3d`, cycled by slice index.
const PIE3D_PALETTE: [&str; 8] = [
    "#4bc0c0", "#ff6384", "#36a2eb", "#ffcd56", "#9966ff", "#ff9f40", "#c9cbcf", "#2ecc71",
];

/// Build a chart payload from a dataset and a chart configuration.
///
/// This is the single entry point for payload generation. It validates
/// the axis mapping against the dataset's column set and delegates to
/// the per-kind builder. The result is a deterministic function of its
/// inputs.
///
/// # Arguments
/// * `dataset` - The parsed sheet rows
/// * `spec` - Chart kind and axis mapping
///
/// # Returns
/// * `Result<ChartPayload, AnalyticsError>` - The shaped payload or an error
///
/// # Errors
/// * `AnalyticsError::InvalidAxis` when a mapped column is not in the
///   dataset (including a missing z column on a 3-axis kind)
pub fn build_chart_data(
    dataset: &Dataset,
    spec: &ChartSpec,
) -> Result<ChartPayload, AnalyticsError> {
    validate_axes(dataset, spec)?;

    let x = spec.x_axis.as_str();
    let y = spec.y_axis.as_str();

    match spec.kind {
        ChartKind::Bar => Ok(build_bar(dataset, x, y)),
        ChartKind::Line => Ok(build_line(dataset, x, y)),
        ChartKind::Pie => Ok(build_pie(dataset, x, y, PieColors::HueRotation)),
        ChartKind::Pie3d => Ok(build_pie(dataset, x, y, PieColors::Palette)),
        ChartKind::Scatter => Ok(build_scatter(dataset, x, y)),
        ChartKind::Bar3d => {
            let z = spec.z_axis.as_deref().unwrap_or_default();
            Ok(build_bar3d(dataset, x, y, z))
        }
        ChartKind::Scatter3d | ChartKind::Line3d => {
            let z = spec.z_axis.as_deref().unwrap_or_default();
            Ok(build_points3d(dataset, x, y, z))
        }
    }
}

/// Check every mapped axis against the dataset's column set.
pub fn validate_axes(dataset: &Dataset, spec: &ChartSpec) -> Result<(), AnalyticsError> {
    if !dataset.has_column(&spec.x_axis) {
        return Err(AnalyticsError::InvalidAxis(spec.x_axis.clone()));
    }
    if !dataset.has_column(&spec.y_axis) {
        return Err(AnalyticsError::InvalidAxis(spec.y_axis.clone()));
    }
    if spec.kind.needs_z_axis() {
        match spec.z_axis.as_deref() {
            Some(z) if dataset.has_column(z) => {}
            Some(z) => return Err(AnalyticsError::InvalidAxis(z.to_string())),
            None => return Err(AnalyticsError::InvalidAxis("z_axis".to_string())),
        }
    }
    Ok(())
}

fn build_bar(dataset: &Dataset, x: &str, y: &str) -> ChartPayload {
    let labels: Vec<String> = (0..dataset.len()).map(|i| dataset.label_at(i, x)).collect();
    let data: Vec<DataValue> = (0..dataset.len())
        .map(|i| DataValue::Scalar(dataset.number_at(i, y)))
        .collect();

    ChartPayload::Datasets {
        labels,
        datasets: vec![ChartDataset {
            label: format!("{} vs {}", y, x),
            data,
            background_color: Paint::Single(BASE_FILL.to_string()),
            border_color: Some(BASE_BORDER.to_string()),
            border_width: Some(1),
        }],
    }
}

fn build_line(dataset: &Dataset, x: &str, y: &str) -> ChartPayload {
    // Stable sort keeps input order for equal x values.
    let mut order: Vec<usize> = (0..dataset.len()).collect();
    order.sort_by(|&a, &b| {
        dataset
            .number_at(a, x)
            .partial_cmp(&dataset.number_at(b, x))
            .unwrap_or(Ordering::Equal)
    });

    let labels: Vec<String> = order.iter().map(|&i| dataset.label_at(i, x)).collect();
    let data: Vec<DataValue> = order
        .iter()
        .map(|&i| DataValue::Scalar(dataset.number_at(i, y)))
        .collect();

    ChartPayload::Datasets {
        labels,
        datasets: vec![ChartDataset {
            label: format!("{} vs {}", y, x),
            data,
            background_color: Paint::Single(BASE_FILL.to_string()),
            border_color: Some(BASE_BORDER.to_string()),
            border_width: Some(1),
        }],
    }
}

enum PieColors {
    HueRotation,
    Palette,
}

fn build_pie(dataset: &Dataset, x: &str, y: &str, colors: PieColors) -> ChartPayload {
    // Sum y per distinct x category, categories in first-seen order.
    let mut totals: IndexMap<String, f64> = IndexMap::new();
    for i in 0..dataset.len() {
        let category = dataset.label_at(i, x);
        *totals.entry(category).or_insert(0.0) += dataset.number_at(i, y);
    }

    let grand_total: f64 = totals.values().sum();

    let labels: Vec<String> = totals
        .keys()
        .map(|category| {
            let value = totals[category];
            let pct = if grand_total != 0.0 {
                value / grand_total * 100.0
            } else {
                0.0
            };
            format!("{} ({:.1}%)", category, pct)
        })
        .collect();

    let data: Vec<DataValue> = totals.values().map(|&v| DataValue::Scalar(v)).collect();

    let fills: Vec<String> = (0..totals.len())
        .map(|i| match colors {
            PieColors::HueRotation => format!("hsl({}, 70%, 60%)", (i * 40) % 360),
            PieColors::Palette => PIE3D_PALETTE[i % PIE3D_PALETTE.len()].to_string(),
        })
        .collect();

    ChartPayload::Datasets {
        labels,
        datasets: vec![ChartDataset {
            label: format!("{} distribution", y),
            data,
            background_color: Paint::PerSlice(fills),
            border_color: None,
            border_width: Some(1),
        }],
    }
}

fn build_scatter(dataset: &Dataset, x: &str, y: &str) -> ChartPayload {
    let data: Vec<DataValue> = (0..dataset.len())
        .map(|i| DataValue::Point {
            x: dataset.number_at(i, x),
            y: dataset.number_at(i, y),
        })
        .collect();

    ChartPayload::Datasets {
        labels: (0..dataset.len()).map(|i| dataset.label_at(i, x)).collect(),
        datasets: vec![ChartDataset {
            label: format!("{} vs {}", y, x),
            data,
            background_color: Paint::Single(BASE_FILL.to_string()),
            border_color: None,
            border_width: None,
        }],
    }
}

fn build_bar3d(dataset: &Dataset, x: &str, y: &str, z: &str) -> ChartPayload {
    // Category grid: distinct x and z labels get indices in first-seen
    // order, one bar per row at its (x, z) grid position.
    let mut x_index: IndexMap<String, usize> = IndexMap::new();
    let mut z_index: IndexMap<String, usize> = IndexMap::new();

    let mut xs = Vec::with_capacity(dataset.len());
    let mut zs = Vec::with_capacity(dataset.len());
    let mut values = Vec::with_capacity(dataset.len());
    let mut labels = Vec::with_capacity(dataset.len());

    for i in 0..dataset.len() {
        let x_label = dataset.label_at(i, x);
        let z_label = dataset.label_at(i, z);
        let value = dataset.number_at(i, y);

        let next_x = x_index.len();
        let xi = *x_index.entry(x_label.clone()).or_insert(next_x);
        let next_z = z_index.len();
        let zi = *z_index.entry(z_label.clone()).or_insert(next_z);

        labels.push(format!("{} / {}: {}", x_label, z_label, value));
        xs.push(xi as f64);
        zs.push(zi as f64);
        values.push(value);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let heights: Vec<f64> = values
        .iter()
        .map(|&v| {
            if max > min {
                (v - min) / (max - min) * BAR3D_HEIGHT
            } else {
                0.0
            }
        })
        .collect();

    ChartPayload::Bars3d {
        x: xs,
        y: heights,
        z: zs,
        labels,
        values,
    }
}

fn build_points3d(dataset: &Dataset, x: &str, y: &str, z: &str) -> ChartPayload {
    // Non-numeric z columns plot as category indices, first-seen order.
    let z_is_numeric = dataset.classify().numeric_columns.iter().any(|c| c == z);
    let mut z_index: IndexMap<String, usize> = IndexMap::new();

    let mut xs = Vec::with_capacity(dataset.len());
    let mut ys = Vec::with_capacity(dataset.len());
    let mut zs = Vec::with_capacity(dataset.len());
    let mut labels = Vec::with_capacity(dataset.len());

    for i in 0..dataset.len() {
        xs.push(dataset.number_at(i, x));
        ys.push(dataset.number_at(i, y));
        labels.push(dataset.label_at(i, x));

        if z_is_numeric {
            zs.push(dataset.number_at(i, z));
        } else {
            let z_label = dataset.label_at(i, z);
            let next = z_index.len();
            let zi = *z_index.entry(z_label).or_insert(next);
            zs.push(zi as f64);
        }
    }

    ChartPayload::Points3d {
        x: xs,
        y: ys,
        z: zs,
        labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CellValue, Row};

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            row(&[("Cat", text("A")), ("Val", num(10.0))]),
            row(&[("Cat", text("B")), ("Val", num(30.0))]),
            row(&[("Cat", text("A")), ("Val", num(20.0))]),
        ])
        .unwrap()
    }

    fn spec(kind: ChartKind, x: &str, y: &str, z: Option<&str>) -> ChartSpec {
        ChartSpec {
            kind,
            x_axis: x.to_string(),
            y_axis: y.to_string(),
            z_axis: z.map(str::to_string),
        }
    }

    #[test]
    fn kind_parsing_accepts_all_wire_names() {
        assert_eq!(ChartKind::parse("bar").unwrap(), ChartKind::Bar);
        assert_eq!(ChartKind::parse("bar-3d").unwrap(), ChartKind::Bar3d);
        assert_eq!(ChartKind::parse("3d-scatter").unwrap(), ChartKind::Scatter3d);
        // Legacy alias maps to the canonical kind.
        assert_eq!(ChartKind::parse("scatter3d").unwrap(), ChartKind::Scatter3d);
        assert!(matches!(
            ChartKind::parse("donut"),
            Err(AnalyticsError::UnsupportedChartKind(_))
        ));
    }

    #[test]
    fn bar_preserves_row_order() {
        let payload =
            build_chart_data(&sample(), &spec(ChartKind::Bar, "Cat", "Val", None)).unwrap();

        match payload {
            ChartPayload::Datasets { labels, datasets } => {
                assert_eq!(labels, vec!["A", "B", "A"]);
                assert_eq!(datasets.len(), 1);
                assert_eq!(datasets[0].label, "Val vs Cat");
                assert_eq!(
                    datasets[0].data,
                    vec![
                        DataValue::Scalar(10.0),
                        DataValue::Scalar(30.0),
                        DataValue::Scalar(20.0)
                    ]
                );
                assert_eq!(datasets[0].border_width, Some(1));
            }
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn line_sorts_rows_by_numeric_x() {
        let ds = Dataset::new(vec![
            row(&[("X", num(3.0)), ("Y", num(30.0))]),
            row(&[("X", num(1.0)), ("Y", num(10.0))]),
            row(&[("X", num(2.0)), ("Y", num(20.0))]),
        ])
        .unwrap();

        let payload = build_chart_data(&ds, &spec(ChartKind::Line, "X", "Y", None)).unwrap();
        match payload {
            ChartPayload::Datasets { labels, datasets } => {
                assert_eq!(labels, vec!["1", "2", "3"]);
                assert_eq!(
                    datasets[0].data,
                    vec![
                        DataValue::Scalar(10.0),
                        DataValue::Scalar(20.0),
                        DataValue::Scalar(30.0)
                    ]
                );
            }
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn line_sort_is_stable_for_equal_x() {
        let ds = Dataset::new(vec![
            row(&[("X", num(1.0)), ("Y", num(100.0))]),
            row(&[("X", num(1.0)), ("Y", num(200.0))]),
        ])
        .unwrap();

        let payload = build_chart_data(&ds, &spec(ChartKind::Line, "X", "Y", None)).unwrap();
        match payload {
            ChartPayload::Datasets { datasets, .. } => {
                assert_eq!(
                    datasets[0].data,
                    vec![DataValue::Scalar(100.0), DataValue::Scalar(200.0)]
                );
            }
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn pie_aggregates_and_labels_percentages() {
        // Two equal categories split 50.0% / 50.0%.
        let ds = Dataset::new(vec![
            row(&[("Cat", text("A")), ("Val", num(30.0))]),
            row(&[("Cat", text("B")), ("Val", num(30.0))]),
        ])
        .unwrap();

        let payload = build_chart_data(&ds, &spec(ChartKind::Pie, "Cat", "Val", None)).unwrap();
        match payload {
            ChartPayload::Datasets { labels, datasets } => {
                assert_eq!(labels, vec!["A (50.0%)", "B (50.0%)"]);
                assert_eq!(datasets[0].label, "Val distribution");
                assert_eq!(
                    datasets[0].data,
                    vec![DataValue::Scalar(30.0), DataValue::Scalar(30.0)]
                );
                match &datasets[0].background_color {
                    Paint::PerSlice(fills) => {
                        assert_eq!(fills[0], "hsl(0, 70%, 60%)");
                        assert_eq!(fills[1], "hsl(40, 70%, 60%)");
                    }
                    other => panic!("expected per-slice fills, got {:?}", other),
                }
            }
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn pie_sums_repeated_categories() {
        let payload =
            build_chart_data(&sample(), &spec(ChartKind::Pie, "Cat", "Val", None)).unwrap();
        match payload {
            ChartPayload::Datasets { labels, datasets } => {
                // A = 10 + 20 = 30 of 60 total, B = 30 of 60.
                assert_eq!(labels, vec!["A (50.0%)", "B (50.0%)"]);
                assert_eq!(
                    datasets[0].data,
                    vec![DataValue::Scalar(30.0), DataValue::Scalar(30.0)]
                );
            }
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn pie_with_zero_total_reports_zero_percent() {
        let ds = Dataset::new(vec![row(&[("Cat", text("A")), ("Val", num(0.0))])]).unwrap();
        let payload = build_chart_data(&ds, &spec(ChartKind::Pie, "Cat", "Val", None)).unwrap();
        match payload {
            ChartPayload::Datasets { labels, .. } => {
                assert_eq!(labels, vec!["A (0.0%)"]);
            }
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn scatter_emits_one_point_per_row() {
        let ds = Dataset::new(vec![
            row(&[("X", num(1.0)), ("Y", num(2.0))]),
            row(&[("X", num(3.0)), ("Y", num(4.0))]),
        ])
        .unwrap();

        let payload = build_chart_data(&ds, &spec(ChartKind::Scatter, "X", "Y", None)).unwrap();
        match payload {
            ChartPayload::Datasets { datasets, .. } => {
                assert_eq!(
                    datasets[0].data,
                    vec![
                        DataValue::Point { x: 1.0, y: 2.0 },
                        DataValue::Point { x: 3.0, y: 4.0 }
                    ]
                );
                assert_eq!(datasets[0].border_width, None);
            }
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn bar3d_normalizes_heights_onto_the_grid() {
        let ds = Dataset::new(vec![
            row(&[("Region", text("N")), ("Sales", num(5.0)), ("Q", text("Q1"))]),
            row(&[("Region", text("S")), ("Sales", num(15.0)), ("Q", text("Q1"))]),
            row(&[("Region", text("N")), ("Sales", num(10.0)), ("Q", text("Q2"))]),
        ])
        .unwrap();

        let payload =
            build_chart_data(&ds, &spec(ChartKind::Bar3d, "Region", "Sales", Some("Q"))).unwrap();
        match payload {
            ChartPayload::Bars3d {
                x,
                y,
                z,
                labels,
                values,
            } => {
                assert_eq!(x, vec![0.0, 1.0, 0.0]);
                assert_eq!(z, vec![0.0, 0.0, 1.0]);
                assert_eq!(values, vec![5.0, 15.0, 10.0]);
                // (v - 5) / 10 * 10
                assert_eq!(y, vec![0.0, 10.0, 5.0]);
                assert_eq!(labels[0], "N / Q1: 5");
            }
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn bar3d_flat_values_have_zero_height() {
        let ds = Dataset::new(vec![
            row(&[("A", text("x")), ("V", num(7.0)), ("B", text("p"))]),
            row(&[("A", text("y")), ("V", num(7.0)), ("B", text("q"))]),
        ])
        .unwrap();

        let payload = build_chart_data(&ds, &spec(ChartKind::Bar3d, "A", "V", Some("B"))).unwrap();
        match payload {
            ChartPayload::Bars3d { y, .. } => assert_eq!(y, vec![0.0, 0.0]),
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn scatter3d_encodes_text_z_as_indices() {
        let ds = Dataset::new(vec![
            row(&[("X", num(1.0)), ("Y", num(2.0)), ("Z", text("low"))]),
            row(&[("X", num(3.0)), ("Y", num(4.0)), ("Z", text("high"))]),
            row(&[("X", num(5.0)), ("Y", num(6.0)), ("Z", text("low"))]),
        ])
        .unwrap();

        let payload =
            build_chart_data(&ds, &spec(ChartKind::Scatter3d, "X", "Y", Some("Z"))).unwrap();
        match payload {
            ChartPayload::Points3d { x, z, .. } => {
                assert_eq!(x, vec![1.0, 3.0, 5.0]);
                assert_eq!(z, vec![0.0, 1.0, 0.0]);
            }
            other => panic!("unexpected payload shape: {:?}", other),
        }
    }

    #[test]
    fn invalid_axis_produces_no_payload() {
        let err = build_chart_data(&sample(), &spec(ChartKind::Bar, "Nope", "Val", None))
            .expect_err("axis should be rejected");
        assert!(matches!(err, AnalyticsError::InvalidAxis(name) if name == "Nope"));

        let err = build_chart_data(&sample(), &spec(ChartKind::Bar3d, "Cat", "Val", None))
            .expect_err("missing z should be rejected");
        assert!(matches!(err, AnalyticsError::InvalidAxis(_)));
    }

    #[test]
    fn builds_are_deterministic() {
        let a = build_chart_data(&sample(), &spec(ChartKind::Pie, "Cat", "Val", None)).unwrap();
        let b = build_chart_data(&sample(), &spec(ChartKind::Pie, "Cat", "Val", None)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn payload_serializes_in_camel_case() {
        let payload =
            build_chart_data(&sample(), &spec(ChartKind::Bar, "Cat", "Val", None)).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        let dataset = &json["datasets"][0];
        assert_eq!(dataset["backgroundColor"], "rgba(75, 192, 192, 0.6)");
        assert_eq!(dataset["borderColor"], "rgba(75, 192, 192, 1)");
        assert_eq!(dataset["borderWidth"], 1);
    }
}
