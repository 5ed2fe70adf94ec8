//! In-memory dataset accumulated from fetched rows.
//!
//! The dataset is the sole source of truth for the output artifact: it is
//! built once from the full fetch result and never mutated afterwards.

use chrono::{DateTime, Utc};

use crate::client::Row;

/// The full accumulation of all fetched rows for one export run.
///
/// Rows keep fetch order (source insertion order); no re-sorting happens.
/// An empty dataset is an explicit value, distinct from "not yet fetched":
/// callers that have not run the fetch simply have no `Dataset` at all.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<Row>,
    columns: Vec<String>,
    fetched_at: DateTime<Utc>,
}

impl Dataset {
    /// Builds a dataset from rows in fetch order.
    ///
    /// The column list is the union of all row keys in first-seen order, so
    /// rows fetched later may contribute columns the first row lacks. No
    /// validation that rows share a schema takes place.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        Self {
            rows,
            columns,
            fetched_at: Utc::now(),
        }
    }

    /// Rows in fetch order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of exported columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Exported column names, first-seen order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// True if the dataset holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// When the fetch that produced this dataset completed.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
        let mut row = Row::new();
        for (key, value) in pairs {
            row.insert((*key).to_string(), value.clone());
        }
        row
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::from_rows(Vec::new());

        assert!(dataset.is_empty());
        assert_eq!(dataset.row_count(), 0);
        assert_eq!(dataset.column_count(), 0);
        assert!(dataset.columns().is_empty());
    }

    #[test]
    fn test_columns_follow_first_row_key_order() {
        let rows = vec![
            row(&[
                ("pid", serde_json::json!(1)),
                ("address", serde_json::json!("1 Main St")),
                ("value", serde_json::json!(350000)),
            ]),
            row(&[
                ("pid", serde_json::json!(2)),
                ("address", serde_json::json!("2 Main St")),
                ("value", serde_json::json!(412000)),
            ]),
        ];

        let dataset = Dataset::from_rows(rows);

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.columns(), ["pid", "address", "value"]);
    }

    #[test]
    fn test_columns_union_later_keys_appended() {
        // A key only later rows carry still lands in the header
        let rows = vec![
            row(&[("pid", serde_json::json!(1))]),
            row(&[
                ("pid", serde_json::json!(2)),
                ("zoning", serde_json::json!("R1")),
            ]),
        ];

        let dataset = Dataset::from_rows(rows);

        assert_eq!(dataset.columns(), ["pid", "zoning"]);
        assert_eq!(dataset.column_count(), 2);
    }

    #[test]
    fn test_rows_keep_fetch_order() {
        let rows: Vec<Row> = (0..5)
            .map(|i| row(&[("id", serde_json::json!(i))]))
            .collect();

        let dataset = Dataset::from_rows(rows);

        let ids: Vec<i64> = dataset
            .rows()
            .iter()
            .filter_map(|r| r.get("id").and_then(serde_json::Value::as_i64))
            .collect();
        assert_eq!(ids, [0, 1, 2, 3, 4]);
    }
}
