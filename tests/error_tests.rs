// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use csv_chat::error::{
    chart_build_error, chart_synthesis_error, config_error, execution_error, file_read_error,
    llm_api_error, load_error, rejected_query_error, synthesis_error
};

#[test]
fn test_file_read_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error = file_read_error("/path/to/input.csv", io_error);
    let msg = error.to_string();
    assert!(msg.contains("input.csv"));
}

#[test]
fn test_load_error() {
    let error = load_error("ragged row at line 3");
    assert!(error.to_string().contains("Failed to load dataset"));
}

#[test]
fn test_synthesis_error() {
    let error = synthesis_error("no retrieval statement in model response");
    assert!(error.to_string().contains("Query synthesis failed"));
}

#[test]
fn test_rejected_query_error() {
    let error = rejected_query_error("DELETE is not a read-only retrieval statement");
    assert!(error.to_string().contains("Query rejected"));
}

#[test]
fn test_rejected_query_error_with_position() {
    let error = rejected_query_error("Expected an expression at Line: 1, Column 8");
    let msg = error.to_string();
    assert!(msg.contains("line 1"));
    assert!(msg.contains("column 8"));
}

#[test]
fn test_execution_error() {
    let error = execution_error("no such column: regoin");
    assert!(error.to_string().contains("Query execution failed"));
}

#[test]
fn test_chart_synthesis_error() {
    let error = chart_synthesis_error("model did not return a chart plan");
    assert!(error.to_string().contains("Chart synthesis failed"));
}

#[test]
fn test_chart_build_error() {
    let error = chart_build_error("column 'region' is not in the result table");
    assert!(error.to_string().contains("Chart construction failed"));
}

#[test]
fn test_llm_api_error() {
    let error = llm_api_error("API rate limit exceeded");
    let _msg = error.to_string();
}

#[test]
fn test_config_error() {
    let error = config_error("Invalid configuration value");
    let _msg = error.to_string();
}

#[test]
fn test_error_messages_are_distinct() {
    let load = load_error("x");
    let synth = synthesis_error("x");
    let rejected = rejected_query_error("x");
    let exec = execution_error("x");
    let messages = [
        load.to_string(),
        synth.to_string(),
        rejected.to_string(),
        exec.to_string()
    ];
    for (i, a) in messages.iter().enumerate() {
        for b in messages.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}
