//! # Persisted Pin Values
//!
//! Graphs are saved as JSON. Scalars are stored as plain JSON values; every
//! other pin value is a tagged object whose `_type` names its kind:
//!
//! | `_type`                    | Fields      | Decodes to                         |
//! |----------------------------|-------------|------------------------------------|
//! | `DataFrame`                | `data`      | frame, split layout (string/object)|
//! | `Series`                   | `data`      | series `{name, index, data}`       |
//! | `DBEngineData`             | `engineurl` | connected database handle          |
//! | `XLWBook` / `XLWBookData`  | `filepath`  | workbook reference                 |
//! | `Blob`                     | `hex`       | binary scalar                      |
//!
//! A list of frames (a query with several results) is a JSON array of
//! tagged frames.
//!
//! ## Decoding Never Fails
//!
//! A saved graph must always load, so [`decode`] has no error path. Broken
//! JSON, an unknown `_type`, a frame that doesn't parse, a database that
//! can't be reached and a workbook file that no longer exists all decode to
//! [`PinValue::Null`] with a warning.
//!
//! ## Slots
//!
//! Dynamic slots of a node are saved as [`SlotRecord`]s:
//!
//! ```text
//! {"name": "min_id", "uuid": "6f1c...", "kind": "param", "pinIndex": 3, "value": "2"}
//! ```
//!
//! `value` holds the encoded pin value as an embedded JSON string.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use tracing::warn;
use uuid::Uuid;

use crate::config::{
    TAG_BLOB, TAG_DATAFRAME, TAG_DB_ENGINE, TAG_FIELD, TAG_SERIES, TAG_WORKBOOK,
    TAG_WORKBOOK_DATA,
};
use crate::frame::{frame_from_json, frame_to_json, series_from_json, series_to_json};
use crate::frame::{DataFrame, Series};
use crate::handle::{ConnectionUrl, DbHandle, WorkbookRef};
use crate::types::Value;

/// Anything a pin can carry.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PinValue {
    #[default]
    Null,
    Scalar(Value),
    Frame(DataFrame),
    Frames(Vec<DataFrame>),
    Series(Series),
    Database(DbHandle),
    Workbook(WorkbookRef),
}

impl PinValue {
    /// Wraps a scalar; a null scalar is `PinValue::Null`.
    pub fn scalar(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => PinValue::Null,
            value => PinValue::Scalar(value),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PinValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PinValue::Null => "null",
            PinValue::Scalar(_) => "scalar",
            PinValue::Frame(_) => "frame",
            PinValue::Frames(_) => "frames",
            PinValue::Series(_) => "series",
            PinValue::Database(_) => "database",
            PinValue::Workbook(_) => "workbook",
        }
    }

    /// The value as a scalar parameter. Null is a null scalar; structured
    /// values have no scalar form.
    pub fn as_scalar(&self) -> Option<Value> {
        match self {
            PinValue::Null => Some(Value::Null),
            PinValue::Scalar(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&DataFrame> {
        match self {
            PinValue::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}

impl From<Value> for PinValue {
    fn from(value: Value) -> Self {
        PinValue::scalar(value)
    }
}

impl From<DataFrame> for PinValue {
    fn from(frame: DataFrame) -> Self {
        PinValue::Frame(frame)
    }
}

impl From<Series> for PinValue {
    fn from(series: Series) -> Self {
        PinValue::Series(series)
    }
}

impl From<DbHandle> for PinValue {
    fn from(handle: DbHandle) -> Self {
        PinValue::Database(handle)
    }
}

pub fn encode(value: &PinValue) -> Json {
    match value {
        PinValue::Null => Json::Null,
        PinValue::Scalar(v) => v.to_json(),
        PinValue::Frame(frame) => encode_frame(frame),
        PinValue::Frames(frames) => Json::Array(frames.iter().map(encode_frame).collect()),
        PinValue::Series(series) => json!({
            TAG_FIELD: TAG_SERIES,
            "data": series_to_json(series).to_string(),
        }),
        PinValue::Database(handle) => json!({
            TAG_FIELD: TAG_DB_ENGINE,
            "engineurl": handle.descriptor().as_str(),
        }),
        PinValue::Workbook(book) => json!({
            TAG_FIELD: TAG_WORKBOOK,
            "filepath": book.filepath().to_string_lossy(),
        }),
    }
}

fn encode_frame(frame: &DataFrame) -> Json {
    json!({
        TAG_FIELD: TAG_DATAFRAME,
        "data": frame_to_json(frame).to_string(),
    })
}

/// Encodes to the text stored in a saved graph.
pub fn encode_to_string(value: &PinValue) -> String {
    encode(value).to_string()
}

/// Decodes saved text; anything unreadable is `Null`.
pub fn decode_str(text: &str) -> PinValue {
    match serde_json::from_str::<Json>(text) {
        Ok(json) => decode(&json),
        Err(e) => {
            warn!(error = %e, "unreadable pin value, using null");
            PinValue::Null
        }
    }
}

pub fn decode(json: &Json) -> PinValue {
    match json {
        Json::Array(items) => {
            let frames: Option<Vec<DataFrame>> = items
                .iter()
                .map(|item| match decode(item) {
                    PinValue::Frame(frame) => Some(frame),
                    _ => None,
                })
                .collect();
            match frames {
                Some(frames) => PinValue::Frames(frames),
                None => {
                    warn!("array pin value is not a list of frames, using null");
                    PinValue::Null
                }
            }
        }
        Json::Object(map) if map.contains_key(TAG_FIELD) => decode_tagged(json),
        Json::Object(_) => {
            warn!("untagged object pin value, using null");
            PinValue::Null
        }
        scalar => Value::from_json(scalar).map_or(PinValue::Null, PinValue::scalar),
    }
}

fn decode_tagged(json: &Json) -> PinValue {
    let tag = json[TAG_FIELD].as_str().unwrap_or_default();
    let decoded = match tag {
        TAG_DATAFRAME => embedded(&json["data"])
            .and_then(|data| frame_from_json(&data))
            .map(PinValue::Frame),
        TAG_SERIES => embedded(&json["data"])
            .and_then(|data| series_from_json(&data))
            .map(PinValue::Series),
        TAG_DB_ENGINE => json["engineurl"]
            .as_str()
            .ok_or_else(|| eyre::eyre!("missing 'engineurl'"))
            .and_then(ConnectionUrl::parse)
            .and_then(DbHandle::connect)
            .map(PinValue::Database),
        TAG_WORKBOOK | TAG_WORKBOOK_DATA => decode_workbook(json),
        TAG_BLOB => Value::from_json(json)
            .map(PinValue::Scalar)
            .ok_or_else(|| eyre::eyre!("malformed blob")),
        other => Err(eyre::eyre!("unknown value type '{}'", other)),
    };

    decoded.unwrap_or_else(|e| {
        warn!(tag, error = %e, "pin value could not be restored, using null");
        PinValue::Null
    })
}

fn decode_workbook(json: &Json) -> eyre::Result<PinValue> {
    let path = json["filepath"]
        .as_str()
        .ok_or_else(|| eyre::eyre!("missing 'filepath'"))?;
    let book = WorkbookRef::new(path);
    if !book.is_restorable() {
        eyre::bail!("workbook '{}' does not exist", path);
    }
    Ok(PinValue::Workbook(book))
}

/// Frame and series payloads are embedded JSON strings; plain objects are
/// accepted too.
fn embedded(data: &Json) -> eyre::Result<Json> {
    match data {
        Json::String(text) => Ok(serde_json::from_str(text)?),
        Json::Object(_) => Ok(data.clone()),
        _ => eyre::bail!("missing 'data'"),
    }
}

/// Persisted form of one dynamic slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub name: String,
    pub uuid: Uuid,
    pub kind: SlotKind,
    #[serde(rename = "pinIndex")]
    pub pin_index: usize,
    pub value: String,
}

/// What a dynamic slot of a query node binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// A frame, addressable from SQL by the slot's name.
    Table,
    /// A scalar bound to `:name`.
    Param,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

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
    fn frame_is_tagged_with_embedded_string() {
        let json = encode(&PinValue::Frame(people()));

        assert_eq!(json[TAG_FIELD], TAG_DATAFRAME);
        assert!(json["data"].is_string());
        assert_eq!(decode(&json), PinValue::Frame(people()));
    }

    #[test]
    fn frame_data_may_be_an_object() {
        let json = json!({
            "_type": "DataFrame",
            "data": {"columns": ["x"], "data": [[1], [2]]},
        });
        let PinValue::Frame(frame) = decode(&json) else {
            panic!("expected a frame");
        };
        assert_eq!(frame.row_count(), 2);
    }

    #[test]
    fn frame_list_is_an_array() {
        let value = PinValue::Frames(vec![people(), DataFrame::empty(vec!["z"])]);
        assert_eq!(decode(&encode(&value)), value);
    }

    #[test]
    fn series_is_restored() {
        let series = people().row(1).unwrap();
        let value = PinValue::Series(series);
        assert_eq!(decode(&encode(&value)), value);
    }

    #[test]
    fn scalars_are_plain_json() {
        assert_eq!(encode(&PinValue::scalar(3)), json!(3));
        assert_eq!(decode(&json!("aaa")), PinValue::scalar("aaa"));
        assert_eq!(decode(&Json::Null), PinValue::Null);
        assert_eq!(PinValue::scalar(Value::Null), PinValue::Null);
    }

    #[test]
    fn blob_scalar_is_restored() {
        let value = PinValue::scalar(Value::Blob(vec![0, 255, 16]));
        assert_eq!(decode(&encode(&value)), value);
    }

    #[test]
    fn database_handle_reconnects_from_url() {
        let handle = DbHandle::open("sqlite://").unwrap();
        let json = encode(&PinValue::Database(handle));

        assert_eq!(json, json!({"_type": "DBEngineData", "engineurl": "sqlite://"}));
        let PinValue::Database(restored) = decode(&json) else {
            panic!("expected a database handle");
        };
        assert!(restored.is_live());
    }

    #[test]
    fn unsupported_database_decodes_to_null() {
        let json = json!({"_type": "DBEngineData", "engineurl": "mssql+pyodbc://server"});
        assert_eq!(decode(&json), PinValue::Null);
    }

    #[test]
    fn workbook_needs_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let json = json!({"_type": "XLWBookData", "filepath": path.to_string_lossy()});

        assert_eq!(decode(&json), PinValue::Null);

        std::fs::write(&path, b"").unwrap();
        let PinValue::Workbook(book) = decode(&json) else {
            panic!("expected a workbook");
        };
        assert_eq!(book.filepath(), Path::new(&path));
    }

    #[test]
    fn failures_decode_to_null() {
        assert_eq!(decode_str("{not json"), PinValue::Null);
        assert_eq!(decode(&json!({"_type": "Mystery"})), PinValue::Null);
        assert_eq!(decode(&json!({"_type": "DataFrame", "data": "[1,"})), PinValue::Null);
        assert_eq!(decode(&json!({"_type": "DataFrame"})), PinValue::Null);
        assert_eq!(decode(&json!({"plain": "object"})), PinValue::Null);
        assert_eq!(decode(&json!([1, 2])), PinValue::Null);
    }

    #[test]
    fn slot_record_field_names() {
        let record = SlotRecord {
            name: "min_id".into(),
            uuid: Uuid::nil(),
            kind: SlotKind::Param,
            pin_index: 3,
            value: "2".into(),
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["kind"], "param");
        assert_eq!(json["pinIndex"], 3);
        let back: SlotRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
