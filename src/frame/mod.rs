//! # In-Memory Tables
//!
//! This module provides `DataFrame`, the tabular value that flows between
//! nodes, is materialized into the backing store by the query engine, and is
//! produced again from query results.
//!
//! ## Layout
//!
//! A frame is column-major: an ordered list of named columns of equal
//! length, plus an optional row index.
//!
//! ```text
//! DataFrame
//! ├── index: None            -> rows are labelled 0..n
//! │          Some([..])      -> one label per row
//! └── columns
//!     ├── Column { name: "id",   values: [1, 2] }
//!     └── Column { name: "name", values: ['aaa', 'bbb'] }
//! ```
//!
//! ## Column Names
//!
//! Names need not be unique when a frame is built; a CSV file or a join
//! result may legitimately repeat one. Engine output always passes through
//! [`uniquify`] so downstream consumers can address columns by name.
//!
//! ## Module Organization
//!
//! - `names`: [`uniquify`] column name deduplication
//! - `series`: [`Series`], one labelled row
//! - `load`: [`read_csv`] loader with per-column type inference
//! - `json`: row-oriented JSON used by the persisted graph format

mod json;
mod load;
mod names;
mod series;

pub use json::{frame_from_json, frame_to_json, series_from_json, series_to_json};
pub use load::{read_csv, read_csv_from_reader};
pub use names::uniquify;
pub use series::Series;

use crate::types::{ColumnType, Value};
use eyre::{bail, ensure, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dtype(&self) -> ColumnType {
        ColumnType::infer(&self.values)
    }
}

/// Ordered named columns of equal length with an optional row index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<Column>,
    index: Option<Vec<Value>>,
}

impl DataFrame {
    /// Builds a frame from columns, which must all have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for column in &columns {
                ensure!(
                    column.len() == expected,
                    "column '{}' has {} values, expected {}",
                    column.name(),
                    column.len(),
                    expected
                );
            }
        }
        Ok(Self {
            columns,
            index: None,
        })
    }

    /// Wraps columns the caller has filled in lockstep, such as the columns
    /// of one query result.
    pub(crate) fn from_equal_columns(columns: Vec<Column>) -> Self {
        debug_assert!(columns.windows(2).all(|w| w[0].len() == w[1].len()));
        Self {
            columns,
            index: None,
        }
    }

    /// Builds a frame from row-major data.
    pub fn from_rows<S: Into<String>>(names: Vec<S>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); names.len()];

        for (row_number, row) in rows.into_iter().enumerate() {
            ensure!(
                row.len() == names.len(),
                "row {} has {} values, expected {}",
                row_number,
                row.len(),
                names.len()
            );
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        Self::new(
            names
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    /// A frame with the given column names and no rows.
    pub fn empty<S: Into<String>>(names: Vec<S>) -> Self {
        Self {
            columns: names
                .into_iter()
                .map(|name| Column::new(name, Vec::new()))
                .collect(),
            index: None,
        }
    }

    /// Attaches explicit row labels.
    pub fn with_index(mut self, index: Vec<Value>) -> Result<Self> {
        if !self.columns.is_empty() {
            ensure!(
                index.len() == self.row_count(),
                "index has {} labels, frame has {} rows",
                index.len(),
                self.row_count()
            );
        }
        self.index = Some(index);
        Ok(self)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// First column with the given name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        match (self.columns.first(), &self.index) {
            (Some(column), _) => column.len(),
            (None, Some(index)) => index.len(),
            (None, None) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn index(&self) -> Option<&[Value]> {
        self.index.as_deref()
    }

    /// Label of a row: its index value, or its position when unindexed.
    pub fn index_label(&self, row: usize) -> Value {
        match &self.index {
            Some(index) => index.get(row).cloned().unwrap_or(Value::Null),
            None => Value::Int(row as i64),
        }
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    pub fn set_cell(&mut self, row: usize, column: &str, value: Value) -> Result<()> {
        let rows = self.row_count();
        let Some(target) = self.columns.iter_mut().find(|c| c.name == column) else {
            bail!("no column named '{}'", column);
        };
        ensure!(row < rows, "row {} out of bounds ({} rows)", row, rows);
        target.values[row] = value;
        Ok(())
    }

    /// Renames duplicate columns with [`uniquify`].
    pub fn uniquify_columns(&mut self) {
        let names = uniquify(&self.column_names());
        for (column, name) in self.columns.iter_mut().zip(names) {
            column.name = name;
        }
    }

    pub fn has_unique_columns(&self) -> bool {
        let names = self.column_names();
        uniquify(&names)
            .iter()
            .zip(&names)
            .all(|(unique, original)| unique.as_str() == *original)
    }

    /// Values of one row in column order.
    pub fn row_values(&self, row: usize) -> Option<Vec<Value>> {
        if row >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[row].clone()).collect())
    }

    /// One row as a labelled [`Series`].
    pub fn row(&self, row: usize) -> Option<Series> {
        let values = self.row_values(row)?;
        let labels = self.columns.iter().map(|c| c.name.clone()).collect();
        Some(Series::new(self.index_label(row), labels, values))
    }

    pub fn rows(&self) -> impl Iterator<Item = Series> + '_ {
        (0..self.row_count()).filter_map(move |i| self.row(i))
    }

    /// Calls `body` with each row's label and values, in index order.
    ///
    /// Stops at the first error; rows after it are not visited.
    pub fn for_each_row<F>(&self, mut body: F) -> Result<()>
    where
        F: FnMut(Value, Series) -> Result<()>,
    {
        for series in self.rows() {
            body(series.name.clone(), series)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> DataFrame {
        DataFrame::from_rows(
            vec!["id", "name"],
            vec![
                vec![Value::Int(1), Value::Text("aaa".into())],
                vec![Value::Int(2), Value::Text("bbb".into())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_rows_builds_columns() {
        let df = people();
        assert_eq!(df.row_count(), 2);
        assert_eq!(df.column_names(), vec!["id", "name"]);
        assert_eq!(df.cell(1, "name"), Some(&Value::Text("bbb".into())));
        assert_eq!(df.column("id").unwrap().dtype(), ColumnType::Int);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = DataFrame::from_rows(vec!["a", "b"], vec![vec![Value::Int(1)]]);
        assert!(result.is_err());
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let result = DataFrame::new(vec![
            Column::new("a", vec![Value::Int(1)]),
            Column::new("b", vec![]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unindexed_rows_are_labelled_by_position() {
        let df = people();
        assert_eq!(df.index_label(1), Value::Int(1));
        assert_eq!(df.row(0).unwrap().name, Value::Int(0));
    }

    #[test]
    fn explicit_index_labels_rows() {
        let df = people()
            .with_index(vec![Value::Text("x".into()), Value::Text("y".into())])
            .unwrap();
        assert_eq!(df.row(1).unwrap().name, Value::Text("y".into()));
    }

    #[test]
    fn index_length_must_match() {
        assert!(people().with_index(vec![Value::Int(0)]).is_err());
    }

    #[test]
    fn uniquify_columns_renames_duplicates() {
        let mut df = DataFrame::empty(vec!["a", "a", "b"]);
        assert!(!df.has_unique_columns());

        df.uniquify_columns();

        assert_eq!(df.column_names(), vec!["a", "a_2", "b"]);
        assert!(df.has_unique_columns());
    }

    #[test]
    fn set_cell_updates_value() {
        let mut df = people();
        df.set_cell(0, "name", Value::Text("zzz".into())).unwrap();
        assert_eq!(df.cell(0, "name"), Some(&Value::Text("zzz".into())));
        assert!(df.set_cell(5, "name", Value::Null).is_err());
        assert!(df.set_cell(0, "missing", Value::Null).is_err());
    }

    #[test]
    fn for_each_row_visits_in_order() {
        let df = people();
        let mut seen = Vec::new();

        df.for_each_row(|idx, row| {
            seen.push((idx, row.get_text("name")?.to_string()));
            Ok(())
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![(Value::Int(0), "aaa".to_string()), (Value::Int(1), "bbb".to_string())]
        );
    }

    #[test]
    fn for_each_row_stops_on_error() {
        let df = people();
        let mut visits = 0;

        let result = df.for_each_row(|_, _| {
            visits += 1;
            eyre::bail!("stop")
        });

        assert!(result.is_err());
        assert_eq!(visits, 1);
    }
}
