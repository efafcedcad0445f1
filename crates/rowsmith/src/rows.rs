//! Reading input rows from JSON.

use rowsmith_error::{BatchError, IoError, RowsmithResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument};

/// Parse a JSON array of flat objects into row records.
///
/// String values are kept as-is, `null` becomes an empty string, and other
/// scalars use their JSON text (`3`, `true`). Nested arrays and objects are
/// kept as compact JSON.
///
/// # Errors
///
/// Returns a validation error if the text is not a JSON array of objects.
///
/// # Examples
///
/// ```
/// use rowsmith::parse_rows;
///
/// let rows = parse_rows(r#"[{"name": "Bob", "age": 41}]"#).unwrap();
/// assert_eq!(rows[0]["name"], "Bob");
/// assert_eq!(rows[0]["age"], "41");
/// ```
pub fn parse_rows(json: &str) -> RowsmithResult<Vec<HashMap<String, String>>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| BatchError::validation(format!("rows are not valid JSON: {}", e)))?;
    let Value::Array(items) = value else {
        return Err(BatchError::validation("rows must be a JSON array").into());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| -> RowsmithResult<HashMap<String, String>> {
            let Value::Object(fields) = item else {
                return Err(
                    BatchError::validation(format!("row {} is not a JSON object", index)).into(),
                );
            };
            Ok(fields
                .into_iter()
                .map(|(column, value)| (column, cell_text(value)))
                .collect())
        })
        .collect()
}

/// Read and parse a rows file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or a validation error
/// if its contents are not rows.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn read_rows(path: impl AsRef<Path>) -> RowsmithResult<Vec<HashMap<String, String>>> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| IoError::read(path.as_ref().display().to_string(), e))?;
    let rows = parse_rows(&text)?;
    debug!(rows = rows.len(), "Rows loaded");
    Ok(rows)
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
