// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use csv_chat::{
    chart::{CategorySeries, Chart, HistogramBin, HistogramChart, PointSeries},
    output::{
        OutputFormat, OutputOptions, format_answer, format_result_table, format_schema,
        render_chart
    },
    schema::{ColumnInfo, TableSchema},
    session::Answer,
    store::{Cell, ResultTable}
};

fn plain() -> OutputOptions {
    OutputOptions {
        format:  OutputFormat::Text,
        colored: false,
        verbose: false
    }
}

fn sample_table() -> ResultTable {
    ResultTable {
        columns: vec!["category".into(), "total".into()],
        rows:    vec![
            vec![Cell::Text("food".into()), Cell::Real(18.0)],
            vec![Cell::Text("travel".into()), Cell::Real(3.0)],
        ]
    }
}

fn sample_answer(chart: Option<Chart>) -> Answer {
    Answer {
        question: "total amount by category".into(),
        sql: "SELECT category, SUM(amount) AS total FROM data GROUP BY category".into(),
        table: sample_table(),
        chart
    }
}

fn bar_series() -> CategorySeries {
    CategorySeries {
        title:       "total by category".into(),
        label:       "category".into(),
        value_label: "total".into(),
        labels:      vec!["food".into(), "travel".into()],
        values:      vec![18.0, 3.0]
    }
}

#[test]
fn test_result_table_grid() {
    let text = format_result_table(&sample_table(), &plain());

    assert!(text.contains("category"));
    assert!(text.contains("│"));
    assert!(text.contains("food"));
    assert!(text.contains("18"));
}

#[test]
fn test_result_table_alignment() {
    let text = format_result_table(&sample_table(), &plain());
    let lines: Vec<&str> = text.lines().collect();

    // Header and both data rows share the column boundary
    let sep_pos = lines[0].find('│').unwrap();
    assert_eq!(lines[2].find('│').unwrap(), sep_pos);
    assert_eq!(lines[3].find('│').unwrap(), sep_pos);
}

#[test]
fn test_empty_result_table() {
    let table = ResultTable {
        columns: vec!["a".into()],
        rows:    vec![]
    };
    let text = format_result_table(&table, &plain());

    assert!(text.contains("(no rows)"));
}

#[test]
fn test_answer_text_format() {
    let text = format_answer(&sample_answer(None), &plain());

    assert!(text.contains("=== Generated SQL ==="));
    assert!(text.contains("SELECT category"));
    assert!(text.contains("=== Results ==="));
    assert!(!text.contains("=== Chart ==="));
}

#[test]
fn test_answer_text_format_with_chart() {
    let text = format_answer(&sample_answer(Some(Chart::Bar(bar_series()))), &plain());

    assert!(text.contains("=== Chart ==="));
    assert!(text.contains("█"));
}

#[test]
fn test_answer_verbose_counts() {
    let opts = OutputOptions {
        verbose: true,
        ..plain()
    };
    let text = format_answer(&sample_answer(None), &opts);

    assert!(text.contains("(2 rows, 2 columns)"));
}

#[test]
fn test_answer_json_format() {
    let opts = OutputOptions {
        format: OutputFormat::Json,
        ..plain()
    };
    let text = format_answer(&sample_answer(None), &opts);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["question"], "total amount by category");
    assert_eq!(value["table"]["columns"][0], "category");
    assert_eq!(value["table"]["rows"][0][1], 18.0);
    assert!(value["chart"].is_null());
}

#[test]
fn test_answer_yaml_format() {
    let opts = OutputOptions {
        format: OutputFormat::Yaml,
        ..plain()
    };
    let text = format_answer(&sample_answer(None), &opts);

    assert!(text.contains("question:"));
    assert!(text.contains("sql:"));
}

#[test]
fn test_schema_text_format() {
    let schema = TableSchema {
        table:   "data".into(),
        columns: vec![ColumnInfo {
            name:      "amount".into(),
            data_type: "REAL".into()
        }]
    };
    let text = format_schema(&schema, &plain());

    assert!(text.contains("=== Detected schema ==="));
    assert!(text.contains("Table: data"));
    assert!(text.contains("- amount (REAL)"));
}

#[test]
fn test_render_bar_chart() {
    let text = render_chart(&Chart::Bar(bar_series()), &plain());

    assert!(text.contains("total by category"));
    assert!(text.contains("food"));
    assert!(text.contains("█"));
    assert!(text.contains("18"));
    // The largest value owns the longest bar
    let food_bar = text.lines().find(|l| l.contains("food")).unwrap();
    let travel_bar = text.lines().find(|l| l.contains("travel")).unwrap();
    let bars = |line: &str| line.chars().filter(|c| *c == '█').count();
    assert!(bars(food_bar) > bars(travel_bar));
}

#[test]
fn test_render_pie_chart_shows_shares() {
    let text = render_chart(&Chart::Pie(bar_series()), &plain());

    assert!(text.contains("%"));
    assert!(text.contains("85.7%"));
    assert!(text.contains("14.3%"));
}

#[test]
fn test_render_line_chart() {
    let series = CategorySeries {
        title:       "amount over time".into(),
        label:       "day".into(),
        value_label: "amount".into(),
        labels:      vec!["mon".into(), "tue".into(), "wed".into()],
        values:      vec![1.0, 5.0, 3.0]
    };
    let text = render_chart(&Chart::Line(series), &plain());

    assert!(text.contains("amount over time"));
    assert!(text.contains("•"));
    assert!(text.contains("5"));
    assert!(text.contains("mon"));
}

#[test]
fn test_render_scatter_chart() {
    let series = PointSeries {
        title:   "y vs x".into(),
        x_label: "x".into(),
        y_label: "y".into(),
        points:  vec![(0.0, 0.0), (1.0, 2.0), (2.0, 4.0)]
    };
    let text = render_chart(&Chart::Scatter(series), &plain());

    assert!(text.contains("y vs x"));
    assert!(text.contains("•"));
}

#[test]
fn test_render_histogram() {
    let hist = HistogramChart {
        title: "distribution of amount".into(),
        label: "amount".into(),
        bins:  vec![
            HistogramBin {
                lo:    0.0,
                hi:    5.0,
                count: 3
            },
            HistogramBin {
                lo:    5.0,
                hi:    10.0,
                count: 1
            },
        ]
    };
    let text = render_chart(&Chart::Histogram(hist), &plain());

    assert!(text.contains("[0, 5)"));
    assert!(text.contains("█"));
    assert!(text.contains("3"));
}

#[test]
fn test_no_color_output_has_no_ansi() {
    let text = format_answer(&sample_answer(Some(Chart::Bar(bar_series()))), &plain());

    assert!(!text.contains('\u{1b}'));
}
