// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use csv_chat::{
    schema::{ColumnDef, ColumnType},
    store::{Cell, Store}
};

fn sample_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef {
            name: "id".into(),
            ty:   ColumnType::Integer
        },
        ColumnDef {
            name: "category".into(),
            ty:   ColumnType::Text
        },
        ColumnDef {
            name: "amount".into(),
            ty:   ColumnType::Real
        },
    ]
}

fn sample_rows() -> Vec<Vec<String>> {
    vec![
        vec!["1".into(), "food".into(), "10.5".into()],
        vec!["2".into(), "travel".into(), "3".into()],
        vec!["3".into(), "food".into(), "7.5".into()],
    ]
}

fn loaded_store() -> Store {
    let mut store = Store::in_memory().unwrap();
    store.replace_table(&sample_columns(), &sample_rows()).unwrap();
    store
}

#[test]
fn test_replace_and_count() {
    let store = loaded_store();

    assert_eq!(store.row_count().unwrap(), 3);
}

#[test]
fn test_schema_roundtrip() {
    let store = loaded_store();
    let schema = store.schema().unwrap();

    assert_eq!(schema.table, "data");
    assert_eq!(schema.column_names(), vec!["id", "category", "amount"]);
    assert_eq!(schema.columns[0].data_type, "INTEGER");
    assert_eq!(schema.columns[1].data_type, "TEXT");
    assert_eq!(schema.columns[2].data_type, "REAL");
}

#[test]
fn test_reload_replaces_contents() {
    let mut store = loaded_store();
    let columns = vec![ColumnDef {
        name: "only".into(),
        ty:   ColumnType::Text
    }];
    store
        .replace_table(&columns, &[vec!["x".into()]])
        .unwrap();

    assert_eq!(store.row_count().unwrap(), 1);
    assert_eq!(store.schema().unwrap().column_names(), vec!["only"]);
}

#[test]
fn test_select_projection_columns() {
    let store = loaded_store();
    let result = store.select("SELECT category, amount FROM data").unwrap();

    assert_eq!(result.columns, vec!["category", "amount"]);
    assert_eq!(result.len(), 3);
}

#[test]
fn test_select_typed_cells() {
    let store = loaded_store();
    let result = store.select("SELECT id, amount FROM data ORDER BY id").unwrap();

    assert_eq!(result.rows[0][0], Cell::Integer(1));
    assert_eq!(result.rows[0][1], Cell::Real(10.5));
}

#[test]
fn test_select_aggregate() {
    let store = loaded_store();
    let result = store
        .select("SELECT category, SUM(amount) AS total FROM data GROUP BY category ORDER BY category")
        .unwrap();

    assert_eq!(result.columns, vec!["category", "total"]);
    assert_eq!(result.len(), 2);
    assert_eq!(result.rows[0][0], Cell::Text("food".into()));
    assert_eq!(result.rows[0][1], Cell::Real(18.0));
}

#[test]
fn test_select_unknown_column_fails() {
    let store = loaded_store();
    let result = store.select("SELECT nonexistent FROM data");

    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Query execution failed")
    );
}

#[test]
fn test_empty_values_stored_as_null() {
    let mut store = Store::in_memory().unwrap();
    let columns = vec![
        ColumnDef {
            name: "id".into(),
            ty:   ColumnType::Integer
        },
        ColumnDef {
            name: "note".into(),
            ty:   ColumnType::Text
        },
    ];
    store
        .replace_table(&columns, &[vec!["1".into(), "".into()]])
        .unwrap();
    let result = store.select("SELECT note FROM data").unwrap();

    assert!(result.rows[0][0].is_null());
}

#[test]
fn test_column_index_is_case_insensitive() {
    let store = loaded_store();
    let result = store.select("SELECT category AS Cat FROM data").unwrap();

    assert_eq!(result.column_index("cat"), Some(0));
    assert_eq!(result.column_index("CAT"), Some(0));
    assert_eq!(result.column_index("missing"), None);
}

#[test]
fn test_diagnostics() {
    let store = loaded_store();
    let diag = store.diagnostics(5).unwrap();

    assert_eq!(diag.total_rows, 3);
    assert_eq!(diag.columns.len(), 3);
    let category = diag
        .columns
        .iter()
        .find(|c| c.name == "category")
        .unwrap();
    assert_eq!(category.distinct_count, 2);
    assert!(!category.samples.is_empty());
}

#[test]
fn test_quoted_identifier_columns() {
    let mut store = Store::in_memory().unwrap();
    let columns = vec![ColumnDef {
        name: "select".into(),
        ty:   ColumnType::Text
    }];
    store
        .replace_table(&columns, &[vec!["x".into()]])
        .unwrap();

    assert_eq!(store.schema().unwrap().column_names(), vec!["select"]);
    assert_eq!(store.row_count().unwrap(), 1);
}

#[test]
fn test_cell_as_f64() {
    assert_eq!(Cell::Integer(4).as_f64(), Some(4.0));
    assert_eq!(Cell::Real(2.5).as_f64(), Some(2.5));
    assert_eq!(Cell::Text("3.5".into()).as_f64(), Some(3.5));
    assert_eq!(Cell::Text("oslo".into()).as_f64(), None);
    assert_eq!(Cell::Null.as_f64(), None);
}
