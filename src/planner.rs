//! Query synthesis: prompt construction and statement extraction.
//!
//! The prompt pins the model to the single dataset table and its known
//! columns and demands exactly one read-only SQLite statement. The response
//! is untrusted text: extraction strips code fences and commentary, accepts
//! a `{"sql": ...}` JSON wrapper some models insist on, and hands whatever
//! remains to the gate — extraction never decides safety.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
    error::{AppResult, synthesis_error},
    llm::LlmClient,
    schema::TableSchema,
    store::TABLE_NAME
};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```").expect("valid pattern"));

static STATEMENT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(select|with)\b").expect("valid pattern"));

/// Build the query-synthesis prompt
pub fn build_query_prompt(schema_summary: &str, question: &str, max_rows: usize) -> String {
    format!(
        "You are an expert SQL generator.\n\
         \n\
         Database: SQLite\n\
         Table: {table}\n\
         Columns:\n\
         {schema}\n\
         STRICT RULES:\n\
         - Output exactly ONE SQL statement and nothing else\n\
         - The statement MUST be a read-only SELECT against the table \"{table}\"\n\
         - Use only the columns listed above\n\
         - Never modify data or schema (no INSERT, UPDATE, DELETE, DROP, ALTER, ATTACH)\n\
         - Limit results to {max_rows} rows\n\
         - For percentages use COUNT(*) * 100.0 / (SELECT COUNT(*) FROM {table}) \
         to force floating-point division\n\
         - End the statement with a semicolon\n\
         - No explanations, no markdown, no code fences\n\
         \n\
         User question:\n\
         {question}\n",
        table = TABLE_NAME,
        schema = schema_summary,
        max_rows = max_rows,
        question = question
    )
}

/// Strip the first fenced code block, returning its contents
///
/// Returns the input unchanged when it carries no fence.
pub fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE.captures(text) {
        Some(caps) => caps
            .get(1)
            .map(|m| m.as_str().trim())
            .unwrap_or_else(|| text.trim()),
        None => text.trim()
    }
}

/// Extract a single candidate statement from a model response
///
/// Handles, in order: fenced code blocks, a JSON `{"sql": ...}` wrapper,
/// and leading commentary before the statement itself.
///
/// # Errors
///
/// Returns a synthesis error when no retrieval statement can be found.
pub fn extract_sql(response: &str) -> AppResult<String> {
    let mut candidate = strip_code_fence(response.trim());

    // Some models wrap the statement in a JSON plan despite instructions
    let unwrapped;
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate)
        && let Some(sql) = value.get("sql").and_then(|s| s.as_str())
    {
        unwrapped = sql.trim().to_string();
        candidate = &unwrapped;
    }

    let Some(m) = STATEMENT_START.find(candidate) else {
        return Err(synthesis_error(format!(
            "no retrieval statement in model response: {}",
            truncate(response, 120)
        )));
    };

    Ok(candidate[m.start()..].trim().to_string())
}

/// Synthesize one SQL statement for `question`
pub async fn synthesize_query(
    client: &LlmClient,
    schema: &TableSchema,
    question: &str,
    max_rows: usize
) -> AppResult<String> {
    let prompt = build_query_prompt(&schema.to_summary(), question, max_rows);
    let response = client.complete(&prompt).await?;
    debug!(response = %truncate(&response, 300), "model response");
    extract_sql(&response)
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text
    }
}
