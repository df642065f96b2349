use colored::Colorize;

use crate::{
    chart::{CategorySeries, Chart, HistogramChart, PointSeries},
    schema::TableSchema,
    session::Answer,
    store::{ResultTable, TableDiagnostics}
};

/// Width of the longest bar in bar/pie/histogram rendering
const BAR_WIDTH: usize = 40;
/// Plot area of line and scatter grids
const GRID_WIDTH: usize = 56;
const GRID_HEIGHT: usize = 12;

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool,
    pub verbose: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true,
            verbose: false
        }
    }
}

/// Format a full answer (SQL, result table, optional chart)
pub fn format_answer(answer: &Answer, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(answer).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(answer).unwrap_or_default(),
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&heading("Generated SQL", opts));
            output.push_str(&answer.sql);
            output.push_str("\n\n");
            output.push_str(&heading("Results", opts));
            output.push_str(&format_result_table(&answer.table, opts));
            if opts.verbose {
                output.push_str(&format!(
                    "({} rows, {} columns)\n",
                    answer.table.len(),
                    answer.table.columns.len()
                ));
            }
            if let Some(chart) = &answer.chart {
                output.push('\n');
                output.push_str(&heading("Chart", opts));
                output.push_str(&render_chart(chart, opts));
            }
            output
        }
    }
}

/// Format the dataset schema
pub fn format_schema(schema: &TableSchema, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(schema).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(schema).unwrap_or_default(),
        OutputFormat::Text => {
            let mut output = heading("Detected schema", opts);
            output.push_str(&format!("Table: {}\n", schema.table));
            output.push_str(&schema.to_summary());
            output
        }
    }
}

/// Format dataset diagnostics
pub fn format_diagnostics(diag: &TableDiagnostics, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(diag).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(diag).unwrap_or_default(),
        OutputFormat::Text => {
            let mut output = heading("Column diagnostics", opts);
            output.push_str(&format!("Total rows: {}\n", diag.total_rows));
            for col in &diag.columns {
                let samples: Vec<String> =
                    col.samples.iter().map(|c| c.to_string()).collect();
                output.push_str(&format!(
                    "- {} ({} distinct): {}\n",
                    col.name,
                    col.distinct_count,
                    samples.join(", ")
                ));
            }
            output
        }
    }
}

/// Render a result table as an aligned text grid
pub fn format_result_table(table: &ResultTable, opts: &OutputOptions) -> String {
    if table.columns.is_empty() {
        return String::from("(empty result)\n");
    }

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut output = String::new();
    let header: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| pad(c, widths[i]))
        .collect();
    let header_line = header.join(" │ ");
    if opts.colored {
        output.push_str(&header_line.cyan().bold().to_string());
    } else {
        output.push_str(&header_line);
    }
    output.push('\n');
    let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    output.push_str(&sep.join("─┼─"));
    output.push('\n');
    for row in &rendered {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, c)| pad(c, widths.get(i).copied().unwrap_or(0)))
            .collect();
        output.push_str(&cells.join(" │ "));
        output.push('\n');
    }
    if table.rows.is_empty() {
        output.push_str("(no rows)\n");
    }
    output
}

/// Render a chart for the terminal
pub fn render_chart(chart: &Chart, opts: &OutputOptions) -> String {
    match chart {
        Chart::Bar(series) => render_bars(series, false, opts),
        Chart::Pie(series) => render_bars(series, true, opts),
        Chart::Line(series) => render_line(series, opts),
        Chart::Scatter(series) => render_scatter(series, opts),
        Chart::Histogram(hist) => render_histogram(hist, opts)
    }
}

fn render_bars(series: &CategorySeries, as_share: bool, opts: &OutputOptions) -> String {
    let mut output = title_line(&series.title, opts);
    let total: f64 = series.values.iter().sum();
    let max = series.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let label_width = series
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);

    for (label, value) in series.labels.iter().zip(&series.values) {
        let fraction = if as_share {
            if total > 0.0 { value / total } else { 0.0 }
        } else if max > 0.0 {
            (value / max).max(0.0)
        } else {
            0.0
        };
        let bar = "█".repeat((fraction * BAR_WIDTH as f64).round() as usize);
        let bar = if opts.colored {
            bar.green().to_string()
        } else {
            bar
        };
        if as_share {
            output.push_str(&format!(
                "{} │{} {:.1}% ({})\n",
                pad(label, label_width),
                bar,
                fraction * 100.0,
                format_number(*value)
            ));
        } else {
            output.push_str(&format!(
                "{} │{} {}\n",
                pad(label, label_width),
                bar,
                format_number(*value)
            ));
        }
    }
    output
}

fn render_histogram(hist: &HistogramChart, opts: &OutputOptions) -> String {
    let mut output = title_line(&hist.title, opts);
    let max = hist.bins.iter().map(|b| b.count).max().unwrap_or(0);
    let labels: Vec<String> = hist
        .bins
        .iter()
        .map(|b| format!("[{}, {})", format_number(b.lo), format_number(b.hi)))
        .collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    for (label, bin) in labels.iter().zip(&hist.bins) {
        let fraction = if max > 0 {
            bin.count as f64 / max as f64
        } else {
            0.0
        };
        let bar = "█".repeat((fraction * BAR_WIDTH as f64).round() as usize);
        let bar = if opts.colored {
            bar.green().to_string()
        } else {
            bar
        };
        output.push_str(&format!(
            "{} │{} {}\n",
            pad(label, label_width),
            bar,
            bin.count
        ));
    }
    output
}

fn render_line(series: &CategorySeries, opts: &OutputOptions) -> String {
    let mut output = title_line(&series.title, opts);
    let values = sample_values(&series.values, GRID_WIDTH);
    let (min, max) = min_max(&values);
    let span = if max > min { max - min } else { 1.0 };

    let mut grid = vec![vec![' '; values.len()]; GRID_HEIGHT];
    for (col, value) in values.iter().enumerate() {
        let scaled = ((value - min) / span * (GRID_HEIGHT - 1) as f64).round() as usize;
        let row = GRID_HEIGHT - 1 - scaled.min(GRID_HEIGHT - 1);
        grid[row][col] = '•';
    }

    for (i, row) in grid.iter().enumerate() {
        let axis_value = if i == 0 {
            format_number(max)
        } else if i == GRID_HEIGHT - 1 {
            format_number(min)
        } else {
            String::new()
        };
        let line: String = row.iter().collect();
        output.push_str(&format!("{:>10} ┤{}\n", axis_value, line.trim_end()));
    }
    output.push_str(&format!("{:>10} └{}\n", "", "─".repeat(values.len())));
    if let (Some(first), Some(last)) = (series.labels.first(), series.labels.last()) {
        output.push_str(&format!(
            "{:>10}  {}{}{}\n",
            series.label,
            first,
            " ".repeat(values.len().saturating_sub(first.chars().count() + last.chars().count())),
            last
        ));
    }
    output
}

fn render_scatter(series: &PointSeries, opts: &OutputOptions) -> String {
    let mut output = title_line(&series.title, opts);
    let xs: Vec<f64> = series.points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = series.points.iter().map(|p| p.1).collect();
    let (x_min, x_max) = min_max(&xs);
    let (y_min, y_max) = min_max(&ys);
    let x_span = if x_max > x_min { x_max - x_min } else { 1.0 };
    let y_span = if y_max > y_min { y_max - y_min } else { 1.0 };

    let mut grid = vec![vec![' '; GRID_WIDTH]; GRID_HEIGHT];
    for (x, y) in &series.points {
        let col = ((x - x_min) / x_span * (GRID_WIDTH - 1) as f64).round() as usize;
        let scaled = ((y - y_min) / y_span * (GRID_HEIGHT - 1) as f64).round() as usize;
        let row = GRID_HEIGHT - 1 - scaled.min(GRID_HEIGHT - 1);
        grid[row][col.min(GRID_WIDTH - 1)] = '•';
    }

    for (i, row) in grid.iter().enumerate() {
        let axis_value = if i == 0 {
            format_number(y_max)
        } else if i == GRID_HEIGHT - 1 {
            format_number(y_min)
        } else {
            String::new()
        };
        let line: String = row.iter().collect();
        output.push_str(&format!("{:>10} ┤{}\n", axis_value, line.trim_end()));
    }
    output.push_str(&format!("{:>10} └{}\n", "", "─".repeat(GRID_WIDTH)));
    output.push_str(&format!(
        "{:>10}  {} ({} → {})\n",
        series.y_label,
        series.x_label,
        format_number(x_min),
        format_number(x_max)
    ));
    output
}

fn heading(text: &str, opts: &OutputOptions) -> String {
    let line = format!("=== {} ===\n", text);
    if opts.colored {
        line.bold().to_string()
    } else {
        line
    }
}

fn title_line(title: &str, opts: &OutputOptions) -> String {
    if opts.colored {
        format!("{}\n", title.cyan().bold())
    } else {
        format!("{}\n", title)
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

/// Downsample a series to at most `width` evenly spaced points
fn sample_values(values: &[f64], width: usize) -> Vec<f64> {
    if values.len() <= width {
        return values.to_vec();
    }
    (0..width)
        .map(|i| values[i * (values.len() - 1) / (width - 1)])
        .collect()
}
