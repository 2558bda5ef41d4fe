use eyre::Result;

use super::{frame_input, COMPLETED, IDX, LOOP_BODY, ROW};
use crate::export::Step;
use crate::graph::{Executor, Exporter, Input, Node};
use crate::persist::PinValue;

/// Iterates over the rows of a frame.
///
/// For each row, in order, publishes the row's index label on `idx` and the
/// row itself on `row`, then fires `loop_body`. After the last row it fires
/// `completed` once. An error in the body stops the loop and `completed`
/// never fires.
pub struct ForEachRowNode {
    name: String,
    frame: Input,
}

impl ForEachRowNode {
    pub fn new(name: impl Into<String>, frame: Input) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }
}

impl Node for ForEachRowNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&mut self, exec: &mut Executor<'_>) -> Result<()> {
        let frame = frame_input(exec.input(&self.frame), "frame")?;
        frame.for_each_row(|idx, row| {
            exec.set_output(IDX, PinValue::scalar(idx));
            exec.set_output(ROW, PinValue::Series(row));
            exec.fire(LOOP_BODY)
        })?;
        exec.fire(COMPLETED)
    }

    fn export(&self, exporter: &mut Exporter<'_>) -> Result<()> {
        let body = exporter.block(LOOP_BODY)?;
        exporter.push(Step::ForEachRow {
            frame: exporter.operand(&self.frame),
            idx: exporter.output(IDX),
            row: exporter.output(ROW),
            body,
        });
        exporter.follow(COMPLETED)
    }
}
