use eyre::Result;

use super::{text_input, COMPLETED, OUT};
use crate::config::DEFAULT_CONNECTION_URL;
use crate::export::Step;
use crate::graph::{Executor, Exporter, Input, Node};
use crate::handle::DbHandle;
use crate::persist::PinValue;

/// Opens a database handle. A missing or blank URL opens the default
/// in-memory database.
pub fn open_connection(url: PinValue) -> Result<DbHandle> {
    if url.is_null() {
        return DbHandle::open(DEFAULT_CONNECTION_URL);
    }
    let url = text_input(url, "connection url")?;
    match url.trim() {
        "" => DbHandle::open(DEFAULT_CONNECTION_URL),
        url => DbHandle::open(url),
    }
}

pub struct ConnectNode {
    name: String,
    url: Input,
}

impl ConnectNode {
    pub fn new(name: impl Into<String>, url: Input) -> Self {
        Self {
            name: name.into(),
            url,
        }
    }
}

impl Node for ConnectNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&mut self, exec: &mut Executor<'_>) -> Result<()> {
        let handle = open_connection(exec.input(&self.url))?;
        exec.set_output(OUT, PinValue::Database(handle));
        exec.fire(COMPLETED)
    }

    fn export(&self, exporter: &mut Exporter<'_>) -> Result<()> {
        exporter.push(Step::Connect {
            out: exporter.output(OUT),
            url: exporter.operand(&self.url),
        });
        exporter.follow(COMPLETED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_opens_default() {
        let handle = open_connection(PinValue::scalar("  ")).unwrap();
        assert_eq!(handle.descriptor().as_str(), DEFAULT_CONNECTION_URL);

        let handle = open_connection(PinValue::Null).unwrap();
        assert!(handle.is_live());
    }

    #[test]
    fn non_text_url_is_an_error() {
        assert!(open_connection(PinValue::scalar(5)).is_err());
    }
}
