//! Row inputs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One unit of input data, such as a single CSV record.
///
/// Rows are immutable once read: fields are private and exposed through getters.
///
/// # Examples
///
/// ```
/// use rowsmith_core::Row;
/// use std::collections::HashMap;
///
/// let row = Row::new(0, HashMap::from([("name".to_string(), "Bob".to_string())]));
/// assert_eq!(row.get("name"), Some("Bob"));
/// assert_eq!(row.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Row {
    /// Zero-based position within the batch.
    index: usize,
    /// Column name to cell value.
    input: HashMap<String, String>,
}

impl Row {
    /// Create a row at the given batch position.
    pub fn new(index: usize, input: HashMap<String, String>) -> Self {
        Self { index, input }
    }

    /// Number a sequence of records in order.
    pub fn from_records(records: impl IntoIterator<Item = HashMap<String, String>>) -> Vec<Row> {
        records
            .into_iter()
            .enumerate()
            .map(|(index, input)| Row::new(index, input))
            .collect()
    }

    /// Look up a single column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.input.get(column).map(String::as_str)
    }
}
