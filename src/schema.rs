//! Dataset schema representation.
//!
//! The loader infers a [`ColumnType`] per CSV column; the store materializes
//! those as SQLite column affinities and reads them back through
//! `PRAGMA table_info` as a [`TableSchema`]. The schema summary is the exact
//! text handed to the model when a question is asked.
//!
//! # Example
//!
//! ```
//! use csv_chat::schema::{ColumnInfo, TableSchema};
//!
//! let schema = TableSchema {
//!     table:   "data".into(),
//!     columns: vec![
//!         ColumnInfo {
//!             name:      "category".into(),
//!             data_type: "TEXT".into()
//!         },
//!         ColumnInfo {
//!             name:      "amount".into(),
//!             data_type: "REAL".into()
//!         },
//!     ]
//! };
//!
//! let summary = schema.to_summary();
//! assert!(summary.contains("- category (TEXT)"));
//! ```

use serde::Serialize;

/// Column type inferred from CSV values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text
}

impl ColumnType {
    /// SQLite type name used in the generated CREATE TABLE
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT"
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Column definition produced by the loader (write path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    /// Cleaned column name
    pub name: String,
    /// Inferred type
    pub ty:   ColumnType
}

/// Column metadata read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name
    pub name:      String,
    /// Declared SQLite type
    pub data_type: String
}

/// Schema of the single dataset table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableSchema {
    /// Table name
    pub table:   String,
    /// Ordered list of columns
    pub columns: Vec<ColumnInfo>
}

impl TableSchema {
    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether the schema contains a column with this name
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Get summary of the schema for prompts and display
    ///
    /// One `- name (TYPE)` line per column, in table order.
    pub fn to_summary(&self) -> String {
        let mut summary = String::new();
        for col in &self.columns {
            summary.push_str(&format!("- {} ({})\n", col.name, col.data_type));
        }
        summary
    }
}
