//! Row-oriented JSON for frames and series.
//!
//! Frames use the "split" layout: column names once, then one array per row.
//! The `index` key is present only for frames with explicit row labels, so an
//! unindexed frame comes back unindexed and compares equal to the original.
//!
//! ```text
//! {"columns": ["id", "name"], "data": [[1, "aaa"], [2, "bbb"]]}
//! {"columns": ["id"], "index": ["x", "y"], "data": [[1], [2]]}
//! ```
//!
//! Series use `{"name": <label>, "index": [<column names>], "data": [..]}`.

use super::{DataFrame, Series};
use crate::types::Value;
use eyre::{eyre, Result};
use serde_json::{json, Map, Value as Json};

pub fn frame_to_json(frame: &DataFrame) -> Json {
    let mut object = Map::new();
    object.insert("columns".to_string(), json!(frame.column_names()));
    if let Some(index) = frame.index() {
        object.insert(
            "index".to_string(),
            Json::Array(index.iter().map(Value::to_json).collect()),
        );
    }
    let rows = (0..frame.row_count())
        .filter_map(|i| frame.row_values(i))
        .map(|row| Json::Array(row.iter().map(Value::to_json).collect()))
        .collect();
    object.insert("data".to_string(), Json::Array(rows));
    Json::Object(object)
}

pub fn frame_from_json(json: &Json) -> Result<DataFrame> {
    let columns = json
        .get("columns")
        .and_then(Json::as_array)
        .ok_or_else(|| eyre!("frame JSON has no 'columns' array"))?
        .iter()
        .map(|c| {
            c.as_str()
                .map(String::from)
                .ok_or_else(|| eyre!("column name {} is not a string", c))
        })
        .collect::<Result<Vec<_>>>()?;

    let rows = json
        .get("data")
        .and_then(Json::as_array)
        .ok_or_else(|| eyre!("frame JSON has no 'data' array"))?
        .iter()
        .map(scalar_array)
        .collect::<Result<Vec<_>>>()?;

    let frame = DataFrame::from_rows(columns, rows)?;
    match json.get("index") {
        Some(index) => frame.with_index(scalar_array(index)?),
        None => Ok(frame),
    }
}

pub fn series_to_json(series: &Series) -> Json {
    json!({
        "name": series.name.to_json(),
        "index": series.index,
        "data": series.values.iter().map(Value::to_json).collect::<Vec<_>>(),
    })
}

pub fn series_from_json(json: &Json) -> Result<Series> {
    let name = json
        .get("name")
        .map(|n| Value::from_json(n).ok_or_else(|| eyre!("series name {} is not a scalar", n)))
        .transpose()?
        .unwrap_or(Value::Null);

    let index = json
        .get("index")
        .and_then(Json::as_array)
        .ok_or_else(|| eyre!("series JSON has no 'index' array"))?
        .iter()
        .map(|label| match label {
            Json::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>();

    let values = scalar_array(
        json.get("data")
            .ok_or_else(|| eyre!("series JSON has no 'data' array"))?,
    )?;

    if index.len() != values.len() {
        return Err(eyre!(
            "series has {} labels but {} values",
            index.len(),
            values.len()
        ));
    }

    Ok(Series::new(name, index, values))
}

fn scalar_array(json: &Json) -> Result<Vec<Value>> {
    json.as_array()
        .ok_or_else(|| eyre!("expected an array, got {}", json))?
        .iter()
        .map(|v| Value::from_json(v).ok_or_else(|| eyre!("{} is not a scalar", v)))
        .collect()
}
