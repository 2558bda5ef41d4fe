use eyre::{Result, WrapErr};

use super::{text_input, COMPLETED, OUT};
use crate::export::Step;
use crate::frame::read_csv;
use crate::graph::{Executor, Exporter, Input, Node};
use crate::persist::PinValue;

/// Loads a CSV file into a frame.
pub struct ReadCsvNode {
    name: String,
    path: Input,
}

impl ReadCsvNode {
    pub fn new(name: impl Into<String>, path: Input) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

pub(crate) fn load_csv(path: PinValue) -> Result<PinValue> {
    let path = text_input(path, "csv path")?;
    let frame = read_csv(&path).wrap_err_with(|| format!("failed to read '{}'", path))?;
    Ok(PinValue::Frame(frame))
}

impl Node for ReadCsvNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&mut self, exec: &mut Executor<'_>) -> Result<()> {
        let frame = load_csv(exec.input(&self.path))?;
        exec.set_output(OUT, frame);
        exec.fire(COMPLETED)
    }

    fn export(&self, exporter: &mut Exporter<'_>) -> Result<()> {
        exporter.push(Step::ReadCsv {
            out: exporter.output(OUT),
            path: exporter.operand(&self.path),
        });
        exporter.follow(COMPLETED)
    }
}
