//! Conversion of records into the rectangular grid sent to the spreadsheet.
//!
//! The header is the union of keys across all rows in first-seen order. Every
//! data row has exactly one cell per header column; keys a row lacks, and
//! `null` values, render as empty strings.

use serde_json::Value;

use crate::record::Record;

/// An ordered field-name → value mapping for one output row.
pub type Row = serde_json::Map<String, Value>;

/// Builds a header row plus one row per input, padded to a rectangle.
///
/// Returns an empty grid for an empty input.
#[must_use]
pub fn build_grid(rows: &[Row]) -> Vec<Vec<String>> {
    if rows.is_empty() {
        return Vec::new();
    }

    let mut header: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !header.contains(&key.as_str()) {
                header.push(key);
            }
        }
    }

    let mut grid = Vec::with_capacity(rows.len() + 1);
    grid.push(header.iter().map(|k| (*k).to_owned()).collect());
    for row in rows {
        grid.push(
            header
                .iter()
                .map(|key| row.get(*key).map(render_cell).unwrap_or_default())
                .collect(),
        );
    }
    grid
}

/// Builds the grid for a batch of collected records.
#[must_use]
pub fn records_to_grid(records: &[Record]) -> Vec<Vec<String>> {
    let rows: Vec<Row> = records.iter().map(Record::to_row).collect();
    build_grid(&rows)
}

/// Renders a single JSON value as literal cell text.
///
/// Objects become `key: value` lines and arrays one item per line, so nested
/// hours and image lists stay readable in a single cell.
#[must_use]
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_cell)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", render_cell(v)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod tests;
