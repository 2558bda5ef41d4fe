use std::path::Path;

use eyre::Result;
use tracing::info;

use crate::frame::read_csv;
use crate::query::{ParamSet, QueryEngine, QueryOutput, Tables};

/// State of one interactive session: a single engine, the frames offered to
/// it and the current parameters.
///
/// Frames are materialized at most once per engine, so reloading a name the
/// engine has already used does not change what SQL sees.
pub struct Session {
    engine: QueryEngine,
    tables: Tables,
    params: ParamSet,
}

impl Session {
    pub fn new(engine: QueryEngine) -> Self {
        Self {
            engine,
            tables: Tables::new(),
            params: ParamSet::new(),
        }
    }

    /// Reads a CSV file as table `name`. Returns the row count.
    pub fn load_csv(&mut self, name: &str, path: impl AsRef<Path>) -> Result<usize> {
        let frame = read_csv(path.as_ref())?;
        let rows = frame.row_count();
        info!(table = name, rows, "loaded csv");
        self.tables.insert(name.to_string(), frame);
        Ok(rows)
    }

    pub fn is_materialized(&self, name: &str) -> bool {
        self.engine.loaded().contains(name)
    }

    pub fn run(&mut self, sql: &str) -> Result<QueryOutput> {
        self.engine.run(sql, &self.tables, &self.params)
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }
}
