use eyre::{bail, eyre, Result};

use super::{text_input, COMPLETED, OUT};
use crate::export::Step;
use crate::graph::{Executor, Exporter, Input, Node};
use crate::persist::PinValue;
use crate::types::Value;

/// Reads one cell.
///
/// From a frame: the value in `column` at position `row` (default 0). From a
/// row published by a loop: the value in `column`; `row` is ignored.
pub fn get_value(source: PinValue, column: PinValue, row: PinValue) -> Result<PinValue> {
    let column = text_input(column, "column")?;
    let value = match &source {
        PinValue::Frame(frame) => {
            let row = match row {
                PinValue::Null => 0,
                PinValue::Scalar(Value::Int(i)) if i >= 0 => i as usize,
                other => bail!("row must be a non-negative integer, got {}", other.kind()),
            };
            frame
                .cell(row, &column)
                .ok_or_else(|| eyre!("frame has no cell at row {} column '{}'", row, column))?
        }
        PinValue::Series(series) => series
            .get(&column)
            .ok_or_else(|| eyre!("row has no column '{}'", column))?,
        other => bail!("cannot read a value from {}", other.kind()),
    };
    Ok(PinValue::scalar(value.clone()))
}

pub struct GetValueNode {
    name: String,
    source: Input,
    column: Input,
    row: Input,
}

impl GetValueNode {
    pub fn new(name: impl Into<String>, source: Input, column: Input) -> Self {
        Self {
            name: name.into(),
            source,
            column,
            row: Input::default(),
        }
    }

    pub fn with_row(mut self, row: Input) -> Self {
        self.row = row;
        self
    }
}

impl Node for GetValueNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&mut self, exec: &mut Executor<'_>) -> Result<()> {
        let value = get_value(
            exec.input(&self.source),
            exec.input(&self.column),
            exec.input(&self.row),
        )?;
        exec.set_output(OUT, value);
        exec.fire(COMPLETED)
    }

    fn export(&self, exporter: &mut Exporter<'_>) -> Result<()> {
        exporter.push(Step::GetValue {
            out: exporter.output(OUT),
            source: exporter.operand(&self.source),
            column: exporter.operand(&self.column),
            row: exporter.operand(&self.row),
        });
        exporter.follow(COMPLETED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DataFrame;

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
    fn frame_cell_defaults_to_first_row() {
        let value = get_value(PinValue::Frame(people()), PinValue::scalar("name"), PinValue::Null);
        assert_eq!(value.unwrap(), PinValue::scalar("aaa"));

        let value = get_value(PinValue::Frame(people()), PinValue::scalar("id"), PinValue::scalar(1));
        assert_eq!(value.unwrap(), PinValue::scalar(2));
    }

    #[test]
    fn series_cell_by_column() {
        let row = people().row(1).unwrap();
        let value = get_value(PinValue::Series(row), PinValue::scalar("name"), PinValue::Null);
        assert_eq!(value.unwrap(), PinValue::scalar("bbb"));
    }

    #[test]
    fn missing_cells_are_errors() {
        assert!(get_value(PinValue::Frame(people()), PinValue::scalar("zzz"), PinValue::Null).is_err());
        assert!(get_value(PinValue::Frame(people()), PinValue::scalar("id"), PinValue::scalar(9)).is_err());
        assert!(get_value(PinValue::Frame(people()), PinValue::scalar("id"), PinValue::scalar(-1)).is_err());
        assert!(get_value(PinValue::Null, PinValue::scalar("id"), PinValue::Null).is_err());
    }
}
