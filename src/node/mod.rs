//! # Nodes
//!
//! The nodes a pipeline is built from. Each node reads its inputs, calls the
//! same library function the exported script calls for its step, writes its
//! output slots and fires its exec pins.
//!
//! | Node               | Inputs                                   | Outputs           | Exec out               |
//! |--------------------|------------------------------------------|-------------------|------------------------|
//! | [`ConnectNode`]    | `url`                                    | `out`             | `completed`            |
//! | [`ReadCsvNode`]    | `path`                                   | `out`             | `completed`            |
//! | [`FrameQueryNode`] | `sql`, table and param slots, bulk params| `result`          | `completed`            |
//! | [`DbQueryNode`]    | `conn`, `sql`, `has_result`, param slots | `result`          | `completed`            |
//! | [`ForEachRowNode`] | `frame`                                  | `idx`, `row`      | `loop_body`, `completed` |
//! | [`GetValueNode`]   | `source`, `column`, `row`                | `out`             | `completed`            |
//!
//! The helpers in this module turn pin values into the argument types the
//! library functions take; the script runner uses them too, so a wrongly
//! typed input fails the same way on both paths.

mod connect;
mod db_query;
mod for_each_row;
mod frame_query;
mod get_value;
mod read_csv;
mod slots;

pub use connect::{open_connection, ConnectNode};
pub use db_query::DbQueryNode;
pub use for_each_row::ForEachRowNode;
pub use frame_query::FrameQueryNode;
pub use get_value::{get_value, GetValueNode};
pub use read_csv::ReadCsvNode;
pub use slots::{Slot, SlotMap};

pub(crate) use db_query::run_db_query;
pub(crate) use frame_query::run_frame_query;
pub(crate) use read_csv::load_csv;

use eyre::{bail, Result};
use tracing::debug;

use crate::frame::DataFrame;
use crate::handle::DbHandle;
use crate::persist::PinValue;
use crate::query::{ParamSet, QueryOutput, Tables};
use crate::types::Value;

pub const COMPLETED: &str = "completed";
pub const LOOP_BODY: &str = "loop_body";
pub const OUT: &str = "out";
pub const RESULT: &str = "result";
pub const IDX: &str = "idx";
pub const ROW: &str = "row";

pub fn text_input(value: PinValue, what: &str) -> Result<String> {
    match value {
        PinValue::Scalar(Value::Text(text)) => Ok(text),
        other => bail!("{} must be text, got {}", what, other.kind()),
    }
}

/// Reads a flag; integers are accepted as in SQL.
pub fn bool_input(value: PinValue, what: &str) -> Result<bool> {
    match value {
        PinValue::Scalar(Value::Bool(b)) => Ok(b),
        PinValue::Scalar(Value::Int(i)) => Ok(i != 0),
        other => bail!("{} must be a boolean, got {}", what, other.kind()),
    }
}

pub fn frame_input(value: PinValue, what: &str) -> Result<DataFrame> {
    match value {
        PinValue::Frame(frame) => Ok(frame),
        other => bail!("{} must be a frame, got {}", what, other.kind()),
    }
}

pub fn database_input(value: PinValue, what: &str) -> Result<DbHandle> {
    match value {
        PinValue::Database(handle) => Ok(handle),
        other => bail!("{} must be a database connection, got {}", what, other.kind()),
    }
}

/// Collects named scalar parameters. A structured value is an error.
pub fn param_set(values: impl IntoIterator<Item = (String, PinValue)>) -> Result<ParamSet> {
    let mut params = ParamSet::new();
    for (name, value) in values {
        let Some(scalar) = value.as_scalar() else {
            bail!("parameter '{}' must be a scalar, got {}", name, value.kind());
        };
        params.insert(name, scalar);
    }
    Ok(params)
}

/// Collects named frames. Values that are not frames are left out, so an
/// unconnected table slot behaves like a table that was never supplied.
pub fn table_set(values: impl IntoIterator<Item = (String, PinValue)>) -> Tables {
    let mut tables = Tables::new();
    for (name, value) in values {
        match value {
            PinValue::Frame(frame) => {
                tables.insert(name, frame);
            }
            other => debug!(table = %name, kind = other.kind(), "table slot holds no frame"),
        }
    }
    tables
}

impl From<QueryOutput> for PinValue {
    fn from(output: QueryOutput) -> Self {
        match output {
            QueryOutput::None => PinValue::Null,
            QueryOutput::Single(frame) => PinValue::Frame(frame),
            QueryOutput::Many(frames) => PinValue::Frames(frames),
        }
    }
}

impl From<Option<DataFrame>> for PinValue {
    fn from(frame: Option<DataFrame>) -> Self {
        frame.map_or(PinValue::Null, PinValue::Frame)
    }
}
