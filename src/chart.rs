//! Chart synthesis and constrained chart construction.
//!
//! A second model call decides whether the result table deserves a chart.
//! The model does not return code: it returns a small JSON spec (chart kind
//! plus column names), and [`build_chart`] is the entire execution surface.
//! The builder admits only the five chart kinds and columns present in the
//! result table, so a spec cannot reference anything else.
//!
//! # Chart Kinds
//!
//! | Kind | Inputs | Typical questions |
//! |------|--------|-------------------|
//! | `bar` | x labels, numeric y | "compare", "by category" |
//! | `pie` | x labels, non-negative y | "share", "percentage" |
//! | `line` | x labels, numeric y | "trend", "over time" |
//! | `scatter` | numeric x, numeric y | "relationship", "correlation" |
//! | `histogram` | numeric x | "distribution of values" |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{AppResult, chart_build_error, chart_synthesis_error},
    llm::LlmClient,
    planner::strip_code_fence,
    store::ResultTable
};

/// Default number of histogram bins
const HISTOGRAM_BINS: usize = 10;

/// Allowed chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    Scatter,
    Histogram
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bar => f.write_str("bar"),
            Self::Pie => f.write_str("pie"),
            Self::Line => f.write_str("line"),
            Self::Scatter => f.write_str("scatter"),
            Self::Histogram => f.write_str("histogram")
        }
    }
}

/// Chart instruction produced by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind:  ChartKind,
    /// Column holding labels (bar/pie/line) or values (scatter/histogram)
    pub x:     String,
    /// Value column; required for all kinds except histogram
    #[serde(default)]
    pub y:     Option<String>,
    #[serde(default)]
    pub title: Option<String>
}

// deny_unknown_fields keeps a bare spec object from parsing as an empty
// plan (a missing Option field would otherwise read as "no chart")
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ChartPlan {
    chart: Option<ChartSpec>
}

/// Labeled numeric series (bar, pie, line)
#[derive(Debug, Clone, Serialize)]
pub struct CategorySeries {
    pub title:       String,
    pub label:       String,
    pub value_label: String,
    pub labels:      Vec<String>,
    pub values:      Vec<f64>
}

/// Numeric point series (scatter)
#[derive(Debug, Clone, Serialize)]
pub struct PointSeries {
    pub title:   String,
    pub x_label: String,
    pub y_label: String,
    pub points:  Vec<(f64, f64)>
}

/// One histogram bin over `[lo, hi)`
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub lo:    f64,
    pub hi:    f64,
    pub count: usize
}

/// Binned value distribution
#[derive(Debug, Clone, Serialize)]
pub struct HistogramChart {
    pub title: String,
    pub label: String,
    pub bins:  Vec<HistogramBin>
}

/// A renderable chart built from the result table
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Chart {
    Bar(CategorySeries),
    Pie(CategorySeries),
    Line(CategorySeries),
    Scatter(PointSeries),
    Histogram(HistogramChart)
}

impl Chart {
    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Bar(_) => ChartKind::Bar,
            Self::Pie(_) => ChartKind::Pie,
            Self::Line(_) => ChartKind::Line,
            Self::Scatter(_) => ChartKind::Scatter,
            Self::Histogram(_) => ChartKind::Histogram
        }
    }
}

/// Build the chart-synthesis prompt
pub fn build_chart_prompt(question: &str, table: &ResultTable, sample_rows: usize) -> String {
    let mut sample = String::new();
    sample.push_str(&table.columns.join(" | "));
    sample.push('\n');
    for row in table.rows.iter().take(sample_rows) {
        let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        sample.push_str(&cells.join(" | "));
        sample.push('\n');
    }

    format!(
        "You are a data visualization planner.\n\
         \n\
         A user asked: {question}\n\
         \n\
         The query result has {rows} rows with these columns and sample data:\n\
         {sample}\n\
         Decide whether a chart helps answer the question.\n\
         \n\
         CHART SELECTION RULES:\n\
         - bar: comparisons or distribution by category\n\
         - pie: percentages, proportions, shares\n\
         - line: trends, over time, time series\n\
         - scatter: relationships, correlations (both axes numeric)\n\
         - histogram: frequency of a single numeric column\n\
         If the user explicitly asks for a chart type, use that exact type.\n\
         \n\
         Respond with ONLY a JSON object, no markdown, no commentary:\n\
         - No chart: {{\"chart\": null}}\n\
         - Chart: {{\"chart\": {{\"kind\": \"bar\", \"x\": \"<column>\", \
         \"y\": \"<column>\", \"title\": \"<short title>\"}}}}\n\
         \"x\" and \"y\" MUST be column names from the result above. \
         Omit \"y\" for histogram.\n",
        question = question,
        rows = table.len(),
        sample = sample
    )
}

/// Extract the chart spec from a model response
///
/// # Errors
///
/// Returns a chart synthesis error when the response is not the expected
/// JSON shape. A `{"chart": null}` answer is the explicit no-chart signal.
pub fn extract_chart_spec(response: &str) -> AppResult<Option<ChartSpec>> {
    let candidate = strip_code_fence(response.trim());
    if candidate.eq_ignore_ascii_case("null") || candidate.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if let Ok(plan) = serde_json::from_str::<ChartPlan>(candidate) {
        return Ok(plan.chart);
    }
    if let Ok(spec) = serde_json::from_str::<ChartSpec>(candidate) {
        return Ok(Some(spec));
    }
    let shown: String = candidate.chars().take(120).collect();
    Err(chart_synthesis_error(format!(
        "model did not return a chart plan: {}",
        shown
    )))
}

/// Build a chart from a spec, admitting only result-table columns
///
/// # Errors
///
/// Returns a chart build error when the spec names a column absent from the
/// table, omits a required `y`, targets non-numeric data, or the table holds
/// no plottable rows.
pub fn build_chart(spec: &ChartSpec, table: &ResultTable) -> AppResult<Chart> {
    if table.is_empty() {
        return Err(chart_build_error("result table is empty"));
    }
    let x_idx = column_index(table, &spec.x)?;

    match spec.kind {
        ChartKind::Bar | ChartKind::Pie | ChartKind::Line => {
            let y_name = require_y(spec)?;
            let y_idx = column_index(table, y_name)?;
            let series = category_series(spec, table, x_idx, y_idx, y_name)?;
            if spec.kind == ChartKind::Pie && series.values.iter().any(|v| *v < 0.0) {
                return Err(chart_build_error("pie chart requires non-negative values"));
            }
            Ok(match spec.kind {
                ChartKind::Bar => Chart::Bar(series),
                ChartKind::Pie => Chart::Pie(series),
                _ => Chart::Line(series)
            })
        }
        ChartKind::Scatter => {
            let y_name = require_y(spec)?;
            let y_idx = column_index(table, y_name)?;
            let mut points = Vec::new();
            for row in &table.rows {
                let (Some(x_cell), Some(y_cell)) = (row.get(x_idx), row.get(y_idx)) else {
                    continue;
                };
                if x_cell.is_null() || y_cell.is_null() {
                    continue;
                }
                let x = numeric(x_cell.as_f64(), &spec.x)?;
                let y = numeric(y_cell.as_f64(), y_name)?;
                points.push((x, y));
            }
            if points.is_empty() {
                return Err(chart_build_error("no plottable rows"));
            }
            Ok(Chart::Scatter(PointSeries {
                title: spec
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("{} vs {}", y_name, spec.x)),
                x_label: spec.x.clone(),
                y_label: y_name.to_string(),
                points
            }))
        }
        ChartKind::Histogram => {
            if spec.y.is_some() {
                return Err(chart_build_error("histogram takes only an x column"));
            }
            let mut values = Vec::new();
            for row in &table.rows {
                let Some(cell) = row.get(x_idx) else { continue };
                if cell.is_null() {
                    continue;
                }
                values.push(numeric(cell.as_f64(), &spec.x)?);
            }
            if values.is_empty() {
                return Err(chart_build_error("no plottable rows"));
            }
            Ok(Chart::Histogram(HistogramChart {
                title: spec
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("distribution of {}", spec.x)),
                label: spec.x.clone(),
                bins:  bin_values(&values, HISTOGRAM_BINS)
            }))
        }
    }
}

/// Ask the model for a chart and build it
///
/// Returns `None` for the explicit no-chart answer or an empty table.
pub async fn synthesize_chart(
    client: &LlmClient,
    question: &str,
    table: &ResultTable,
    sample_rows: usize
) -> AppResult<Option<Chart>> {
    if table.is_empty() {
        return Ok(None);
    }
    let prompt = build_chart_prompt(question, table, sample_rows);
    let response = client
        .complete(&prompt)
        .await
        .map_err(|e| chart_synthesis_error(e.to_string()))?;
    debug!(response = %response, "chart plan response");
    match extract_chart_spec(&response)? {
        Some(spec) => Ok(Some(build_chart(&spec, table)?)),
        None => Ok(None)
    }
}

fn column_index(table: &ResultTable, name: &str) -> AppResult<usize> {
    table.column_index(name).ok_or_else(|| {
        chart_build_error(format!(
            "column '{}' is not in the result table ({})",
            name,
            table.columns.join(", ")
        ))
    })
}

fn require_y(spec: &ChartSpec) -> AppResult<&str> {
    spec.y.as_deref().ok_or_else(|| {
        chart_build_error(format!("chart kind '{}' requires a y column", spec.kind))
    })
}

fn numeric(value: Option<f64>, column: &str) -> AppResult<f64> {
    value.ok_or_else(|| {
        chart_build_error(format!("column '{}' contains non-numeric values", column))
    })
}

fn category_series(
    spec: &ChartSpec,
    table: &ResultTable,
    x_idx: usize,
    y_idx: usize,
    y_name: &str
) -> AppResult<CategorySeries> {
    let mut labels = Vec::new();
    let mut values = Vec::new();
    for row in &table.rows {
        let (Some(x_cell), Some(y_cell)) = (row.get(x_idx), row.get(y_idx)) else {
            continue;
        };
        if x_cell.is_null() || y_cell.is_null() {
            continue;
        }
        labels.push(x_cell.to_string());
        values.push(numeric(y_cell.as_f64(), y_name)?);
    }
    if values.is_empty() {
        return Err(chart_build_error("no plottable rows"));
    }
    Ok(CategorySeries {
        title: spec
            .title
            .clone()
            .unwrap_or_else(|| format!("{} by {}", y_name, spec.x)),
        label: spec.x.clone(),
        value_label: y_name.to_string(),
        labels,
        values
    })
}

fn bin_values(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        return vec![HistogramBin {
            lo,
            hi,
            count: values.len()
        }];
    }
    let bins = bin_count.max(1);
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lo: lo + width * i as f64,
            hi: lo + width * (i + 1) as f64,
            count
        })
        .collect()
}
