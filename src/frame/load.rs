//! # CSV Loading
//!
//! Reads a CSV file with a header row into a frame. Each field is parsed on
//! its own, then every column is normalized to one type:
//!
//! | Field text                       | Cell        |
//! |----------------------------------|-------------|
//! | empty                            | `Null`      |
//! | `True` / `False` (any case)      | `Bool`      |
//! | parses as `i64`                  | `Int`       |
//! | parses as `f64`                  | `Float`     |
//! | anything else                    | `Text`      |
//!
//! A column mixing integers and floats becomes all floats. A column mixing
//! anything else falls back to the original text of every non-empty field,
//! so a column such as `["1", "x"]` never ends up half numeric.

use super::{Column, DataFrame};
use crate::types::{ColumnType, Value};
use eyre::{Result, WrapErr};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path).wrap_err_with(|| format!("failed to open {}", path.display()))?;
    read_csv_from_reader(file).wrap_err_with(|| format!("failed to read CSV {}", path.display()))
}

pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<DataFrame> {
    let mut reader = ::csv::Reader::from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (column, field) in raw.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, fields)| Column::new(name, normalize(&fields)))
        .collect();

    DataFrame::new(columns)
}

fn normalize(fields: &[String]) -> Vec<Value> {
    let parsed: Vec<Value> = fields.iter().map(|f| parse_field(f)).collect();

    match ColumnType::infer(&parsed) {
        ColumnType::Float => parsed
            .into_iter()
            .map(|v| match v {
                Value::Int(i) => Value::Float(i as f64),
                other => other,
            })
            .collect(),
        ColumnType::Mixed => fields
            .iter()
            .map(|f| {
                if f.is_empty() {
                    Value::Null
                } else {
                    Value::Text(f.clone())
                }
            })
            .collect(),
        _ => parsed,
    }
}

fn parse_field(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if field.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = field.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Text(field.to_string())
}
