//! # Column Types
//!
//! Frames are dynamically typed per cell, but a column still has a type: the
//! common type of its non-null cells. `ColumnType` is inferred, never
//! declared, and decides the declared type used when a frame is materialized
//! into the backing store.
//!
//! ## Inference Rules
//!
//! | Non-null cells                | Column type |
//! |-------------------------------|-------------|
//! | none                          | `Null`      |
//! | all Bool                      | `Bool`      |
//! | all Int                       | `Int`       |
//! | Int and Float only            | `Float`     |
//! | all Text / all Blob           | `Text` / `Blob` |
//! | anything else                 | `Mixed`     |
//!
//! ## Declared Types
//!
//! `Bool` is stored as INTEGER, matching how SQLite represents booleans.
//! `Null` and `Mixed` columns are declared without a type so SQLite applies
//! no affinity and keeps every cell as given.

use super::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Null,
    Bool,
    Int,
    Float,
    Text,
    Blob,
    Mixed,
}

impl ColumnType {
    /// Type of a single cell. `Null` cells do not constrain a column.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ColumnType::Null,
            Value::Bool(_) => ColumnType::Bool,
            Value::Int(_) => ColumnType::Int,
            Value::Float(_) => ColumnType::Float,
            Value::Text(_) => ColumnType::Text,
            Value::Blob(_) => ColumnType::Blob,
        }
    }

    /// Least common type of two column types.
    pub fn unify(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (Null, t) | (t, Null) => t,
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Mixed,
        }
    }

    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        values
            .into_iter()
            .fold(ColumnType::Null, |acc, v| acc.unify(ColumnType::of(v)))
    }

    /// Declared type used in `CREATE TABLE`, empty for no affinity.
    pub fn sql_declaration(self) -> &'static str {
        match self {
            ColumnType::Bool | ColumnType::Int => "INTEGER",
            ColumnType::Float => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Null | ColumnType::Mixed => "",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Null => "null",
            ColumnType::Bool => "bool",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Blob => "blob",
            ColumnType::Mixed => "mixed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_do_not_constrain_type() {
        let values = vec![Value::Null, Value::Int(1), Value::Null];
        assert_eq!(ColumnType::infer(&values), ColumnType::Int);
    }

    #[test]
    fn int_and_float_widen_to_float() {
        let values = vec![Value::Int(1), Value::Float(2.5)];
        assert_eq!(ColumnType::infer(&values), ColumnType::Float);
    }

    #[test]
    fn text_and_int_are_mixed() {
        let values = vec![Value::Int(1), Value::Text("a".into())];
        assert_eq!(ColumnType::infer(&values), ColumnType::Mixed);
        assert_eq!(ColumnType::Mixed.sql_declaration(), "");
    }

    #[test]
    fn empty_column_is_null_typed() {
        assert_eq!(ColumnType::infer(&Vec::<Value>::new()), ColumnType::Null);
    }

    #[test]
    fn bool_is_declared_as_integer() {
        assert_eq!(ColumnType::Bool.sql_declaration(), "INTEGER");
    }
}
