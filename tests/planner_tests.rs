use csv_chat::{
    planner::{build_query_prompt, extract_sql, strip_code_fence},
    schema::{ColumnInfo, TableSchema}
};

fn sample_schema() -> TableSchema {
    TableSchema {
        table:   "data".into(),
        columns: vec![
            ColumnInfo {
                name:      "category".into(),
                data_type: "TEXT".into()
            },
            ColumnInfo {
                name:      "amount".into(),
                data_type: "REAL".into()
            },
        ]
    }
}

#[test]
fn test_prompt_contains_schema_and_question() {
    let schema = sample_schema();
    let prompt = build_query_prompt(&schema.to_summary(), "total amount by category", 100);

    assert!(prompt.contains("- category (TEXT)"));
    assert!(prompt.contains("- amount (REAL)"));
    assert!(prompt.contains("total amount by category"));
    assert!(prompt.contains("Table: data"));
    assert!(prompt.contains("100 rows"));
}

#[test]
fn test_extract_bare_statement() {
    let sql = extract_sql("SELECT category FROM data;").unwrap();

    assert_eq!(sql, "SELECT category FROM data;");
}

#[test]
fn test_extract_from_sql_fence() {
    let response = "```sql\nSELECT * FROM data LIMIT 10;\n```";
    let sql = extract_sql(response).unwrap();

    assert_eq!(sql, "SELECT * FROM data LIMIT 10;");
}

#[test]
fn test_extract_from_plain_fence() {
    let response = "```\nSELECT amount FROM data;\n```";
    let sql = extract_sql(response).unwrap();

    assert_eq!(sql, "SELECT amount FROM data;");
}

#[test]
fn test_extract_from_json_plan() {
    let response = r#"{"sql": "SELECT category FROM data;"}"#;
    let sql = extract_sql(response).unwrap();

    assert_eq!(sql, "SELECT category FROM data;");
}

#[test]
fn test_extract_from_fenced_json_plan() {
    let response = "```json\n{\"sql\": \"SELECT 1;\"}\n```";
    let sql = extract_sql(response).unwrap();

    assert_eq!(sql, "SELECT 1;");
}

#[test]
fn test_extract_skips_leading_commentary() {
    let response = "Sure! Here is your query:\nSELECT category FROM data;";
    let sql = extract_sql(response).unwrap();

    assert_eq!(sql, "SELECT category FROM data;");
}

#[test]
fn test_extract_cte_statement() {
    let response = "WITH t AS (SELECT 1) SELECT * FROM t;";
    let sql = extract_sql(response).unwrap();

    assert!(sql.starts_with("WITH"));
}

#[test]
fn test_extract_lowercase_statement() {
    let sql = extract_sql("select * from data").unwrap();

    assert_eq!(sql, "select * from data");
}

#[test]
fn test_extract_no_statement_fails() {
    let result = extract_sql("I cannot answer that question.");

    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Query synthesis failed")
    );
}

#[test]
fn test_extract_empty_response_fails() {
    assert!(extract_sql("").is_err());
}

#[test]
fn test_strip_code_fence_passthrough() {
    assert_eq!(strip_code_fence("no fences here"), "no fences here");
}

#[test]
fn test_strip_code_fence_inner() {
    assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
}
