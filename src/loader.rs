//! CSV loading and column type inference.
//!
//! Turns raw file bytes into a [`Dataset`]: cleaned header names, a type
//! inferred per column, and all rows as strings. The loader never touches
//! the store; the session writes the dataset through
//! [`Store::replace_table`](crate::store::Store::replace_table).
//!
//! # Header Cleaning
//!
//! Header cells are trimmed, lowercased, and have spaces and dashes replaced
//! with underscores. An empty header cell at position `i` becomes `col_i`.
//!
//! # Type Inference
//!
//! | Column values | Inferred type |
//! |---------------|---------------|
//! | All parse as `i64` | `INTEGER` |
//! | All parse as `f64` | `REAL` |
//! | Anything else | `TEXT` |
//!
//! Empty cells are treated as NULL and do not participate in inference.

use std::{fs, path::Path};

use crate::{
    error::{AppResult, file_read_error, load_error},
    schema::{ColumnDef, ColumnType}
};

/// Parsed CSV contents ready to be written to the store.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Cleaned columns with inferred types, in file order
    pub columns: Vec<ColumnDef>,
    /// Row values as raw strings; empty string means NULL
    pub rows:    Vec<Vec<String>>
}

impl Dataset {
    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names in file order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Load a CSV file from disk
pub fn load_csv_file(path: &Path) -> AppResult<Dataset> {
    let bytes =
        fs::read(path).map_err(|e| file_read_error(&path.display().to_string(), e))?;
    load_csv_bytes(&bytes)
}

/// Parse CSV bytes into a dataset
///
/// # Errors
///
/// Returns a load error if the bytes hold no header row, rows have
/// inconsistent widths, or the CSV structure is malformed.
pub fn load_csv_bytes(bytes: &[u8]) -> AppResult<Dataset> {
    let text = decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| load_error(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(load_error("missing header row"));
    }

    let names: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| clean_column_name(h, i))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| load_error(e.to_string()))?;
        rows.push(record.iter().map(|v| v.trim().to_string()).collect());
    }

    let columns = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| ColumnDef {
            name,
            ty: infer_column_type(&rows, i)
        })
        .collect();

    Ok(Dataset { columns, rows })
}

/// Decode file bytes as UTF-8, falling back to Latin-1
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1 maps every byte to the code point of the same value
        Err(_) => bytes.iter().map(|&b| b as char).collect()
    }
}

/// Normalize a header cell into a usable column name
fn clean_column_name(raw: &str, index: usize) -> String {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_");
    if cleaned.is_empty() {
        format!("col_{}", index)
    } else {
        cleaned
    }
}

/// Infer the type of column `index` across all rows
fn infer_column_type(rows: &[Vec<String>], index: usize) -> ColumnType {
    let mut saw_value = false;
    let mut all_integer = true;
    let mut all_real = true;

    for row in rows {
        let Some(value) = row.get(index) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        saw_value = true;
        if value.parse::<i64>().is_err() {
            all_integer = false;
        }
        if value.parse::<f64>().is_err() {
            all_real = false;
            break;
        }
    }

    if !saw_value {
        ColumnType::Text
    } else if all_integer {
        ColumnType::Integer
    } else if all_real {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}
