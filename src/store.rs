//! SQLite-backed dataset store.
//!
//! One process-local database file, one fixed table (`data`), overwritten on
//! every load. The store is the only component that touches SQLite; queries
//! reach it exclusively through the gate.
//!
//! # Example
//!
//! ```
//! use csv_chat::{
//!     schema::{ColumnDef, ColumnType},
//!     store::Store
//! };
//!
//! let mut store = Store::in_memory().unwrap();
//! let columns = vec![
//!     ColumnDef {
//!         name: "id".into(),
//!         ty:   ColumnType::Integer
//!     },
//!     ColumnDef {
//!         name: "city".into(),
//!         ty:   ColumnType::Text
//!     },
//! ];
//! let rows = vec![vec!["1".into(), "oslo".into()]];
//! store.replace_table(&columns, &rows).unwrap();
//!
//! let result = store.select("SELECT city FROM data").unwrap();
//! assert_eq!(result.columns, vec!["city"]);
//! assert_eq!(result.rows.len(), 1);
//! ```

use std::path::Path;

use rusqlite::{Connection, params_from_iter, types::Value as SqlValue};
use serde::Serialize;

use crate::{
    error::{AppResult, execution_error, store_error},
    schema::{ColumnDef, ColumnInfo, ColumnType, TableSchema}
};

/// Fixed name of the dataset table
pub const TABLE_NAME: &str = "data";

/// One cell of a result table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String)
}

impl Cell {
    /// Numeric view of the cell, parsing numeric text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Integer(n) => Some(*n as f64),
            Self::Real(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok()
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str(""),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Real(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s)
        }
    }
}

impl From<SqlValue> for Cell {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Self::Null,
            SqlValue::Integer(n) => Self::Integer(n),
            SqlValue::Real(f) => Self::Real(f),
            SqlValue::Text(s) => Self::Text(s),
            SqlValue::Blob(_) => Self::Text(String::from("[BLOB]"))
        }
    }
}

/// Rows and columns returned by executing a gated query
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultTable {
    /// Column names in projection order
    pub columns: Vec<String>,
    /// Row values, one `Vec<Cell>` per row
    pub rows:    Vec<Vec<Cell>>
}

impl ResultTable {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name (ASCII case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Per-column diagnostics for the loaded dataset
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDiagnostics {
    pub name:           String,
    pub distinct_count: usize,
    pub samples:        Vec<Cell>
}

/// Dataset diagnostics (row count plus per-column detail)
#[derive(Debug, Clone, Serialize)]
pub struct TableDiagnostics {
    pub total_rows: usize,
    pub columns:    Vec<ColumnDiagnostics>
}

/// Handle to the process-local SQLite database
pub struct Store {
    conn: Connection
}

impl Store {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = Connection::open(path).map_err(store_error)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database
    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory().map_err(store_error)?;
        Ok(Self { conn })
    }

    /// Replace the dataset table with new contents
    ///
    /// Drops any previous table, creates it from the column definitions and
    /// inserts all rows inside a single transaction. Values are bound with
    /// the inferred type; empty strings become NULL.
    pub fn replace_table(&mut self, columns: &[ColumnDef], rows: &[Vec<String>]) -> AppResult<()> {
        let column_defs: Vec<String> = columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.ty.as_sql()))
            .collect();
        let create = format!(
            "CREATE TABLE {} ({})",
            quote_ident(TABLE_NAME),
            column_defs.join(", ")
        );
        let placeholders: Vec<String> =
            (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let insert = format!(
            "INSERT INTO {} VALUES ({})",
            quote_ident(TABLE_NAME),
            placeholders.join(", ")
        );

        let tx = self.conn.transaction().map_err(store_error)?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(TABLE_NAME)))
            .map_err(store_error)?;
        tx.execute_batch(&create).map_err(store_error)?;
        {
            let mut stmt = tx.prepare(&insert).map_err(store_error)?;
            for row in rows {
                let values: Vec<SqlValue> = columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| bind_value(row.get(i).map(String::as_str), col.ty))
                    .collect();
                stmt.execute(params_from_iter(values)).map_err(store_error)?;
            }
        }
        tx.commit().map_err(store_error)?;
        Ok(())
    }

    /// Read the dataset schema back via PRAGMA table_info
    pub fn schema(&self) -> AppResult<TableSchema> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(TABLE_NAME)))
            .map_err(store_error)?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name:      row.get(1)?,
                    data_type: row.get(2)?
                })
            })
            .map_err(store_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(store_error)?;
        Ok(TableSchema {
            table: TABLE_NAME.to_string(),
            columns
        })
    }

    /// Total rows in the dataset table
    pub fn row_count(&self) -> AppResult<usize> {
        self.conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_ident(TABLE_NAME)),
                [],
                |row| row.get::<_, i64>(0)
            )
            .map(|n| n as usize)
            .map_err(store_error)
    }

    /// Execute a gated retrieval statement and collect the result
    ///
    /// # Errors
    ///
    /// Returns an execution error on any runtime failure (unknown column,
    /// missing table, type errors in expressions).
    pub fn select(&self, sql: &str) -> AppResult<ResultTable> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| execution_error(e.to_string()))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let width = columns.len();
        let rows = stmt
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(width);
                for i in 0..width {
                    cells.push(Cell::from(row.get::<_, SqlValue>(i)?));
                }
                Ok(cells)
            })
            .map_err(|e| execution_error(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| execution_error(e.to_string()))?;
        Ok(ResultTable { columns, rows })
    }

    /// Collect per-column diagnostics: distinct counts and sample values
    pub fn diagnostics(&self, sample_limit: usize) -> AppResult<TableDiagnostics> {
        let total_rows = self.row_count()?;
        let schema = self.schema()?;
        let mut columns = Vec::with_capacity(schema.columns.len());
        for col in &schema.columns {
            let ident = quote_ident(&col.name);
            let distinct_count = self
                .conn
                .query_row(
                    &format!(
                        "SELECT COUNT(DISTINCT {}) FROM {}",
                        ident,
                        quote_ident(TABLE_NAME)
                    ),
                    [],
                    |row| row.get::<_, i64>(0)
                )
                .map_err(store_error)? as usize;
            let samples = self.select(&format!(
                "SELECT {} FROM {} WHERE {} IS NOT NULL LIMIT {}",
                ident,
                quote_ident(TABLE_NAME),
                ident,
                sample_limit
            ))?;
            columns.push(ColumnDiagnostics {
                name: col.name.clone(),
                distinct_count,
                samples: samples.rows.into_iter().flatten().collect()
            });
        }
        Ok(TableDiagnostics {
            total_rows,
            columns
        })
    }
}

/// Quote an identifier for SQLite
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Bind a raw CSV value according to the column's inferred type
fn bind_value(raw: Option<&str>, ty: ColumnType) -> SqlValue {
    let Some(raw) = raw else {
        return SqlValue::Null;
    };
    if raw.is_empty() {
        return SqlValue::Null;
    }
    match ty {
        ColumnType::Integer => raw
            .parse::<i64>()
            .map(SqlValue::Integer)
            .unwrap_or_else(|_| SqlValue::Text(raw.to_string())),
        ColumnType::Real => raw
            .parse::<f64>()
            .map(SqlValue::Real)
            .unwrap_or_else(|_| SqlValue::Text(raw.to_string())),
        ColumnType::Text => SqlValue::Text(raw.to_string())
    }
}
