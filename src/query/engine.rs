//! # Query Engine
//!
//! `QueryEngine::run` executes one SQL script against a set of named frames.
//! One engine owns one backing store and remembers which frames it has
//! already written there.
//!
//! ## One Call
//!
//! ```text
//! run(sql, tables, params)
//!   │
//!   ├── split_statements(sql)              ";\n" pieces, blanks dropped
//!   │
//!   ├── BEGIN ─────────────────────────────────────────────────────────┐
//!   │                                                                  │
//!   ├── for name in extract_table_names(sql)                           │
//!   │     loaded already?        ──> skip                              │
//!   │     not in `tables`?       ──> skip (may already be in store)    │
//!   │     otherwise              ──> write_table, remember for commit  │
//!   │                                                                  │
//!   ├── for (i, stmt) in statements                                    │
//!   │     row set  ──> frame, uniquify column names, collect           │
//!   │     no rows  ──> nothing                                         │
//!   │     error    ──> QueryExecutionError { i, stmt, source }  ─> ROLLBACK
//!   │                                                                  │
//!   ├── COMMIT ────────────────────────────────────────────────────────┘
//!   │     names written in this call join the loaded set
//!   │
//!   └── 0 frames ─> None,  1 ─> Single,  n ─> Many
//! ```
//!
//! ## At-Most-Once Loading
//!
//! A name enters [`LoadedTables`] only when the call that wrote it commits.
//! After that the engine never writes that name again, even if a later call
//! passes a different frame under it: the later call reads the data the
//! first call stored. A failed call rolls its tables back and leaves the
//! set unchanged, so the next call writes them afresh.
//!
//! An engine opened over a file store counts the tables already in the file
//! as loaded, so the rule also holds across engines sharing one file.

use std::collections::BTreeMap;

use eyre::{Result, WrapErr};
use hashbrown::HashSet;
use tracing::{debug, trace};

use super::builder::{EngineBuilder, EngineConfig};
use super::error::QueryExecutionError;
use super::params::ParamSet;
use super::script::{extract_table_names, split_statements};
use crate::frame::DataFrame;
use crate::store::{run_statement, write_table, SqliteStore};

/// Frames addressable by name from SQL.
pub type Tables = BTreeMap<String, DataFrame>;

/// Names an engine has written to its store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedTables {
    names: HashSet<String>,
}

impl LoadedTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Loaded names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// The row sets a script produced, in statement order.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryOutput {
    #[default]
    None,
    Single(DataFrame),
    Many(Vec<DataFrame>),
}

impl QueryOutput {
    pub fn from_frames(mut frames: Vec<DataFrame>) -> Self {
        match frames.len() {
            0 => QueryOutput::None,
            1 => frames.pop().map_or(QueryOutput::None, QueryOutput::Single),
            _ => QueryOutput::Many(frames),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryOutput::None => 0,
            QueryOutput::Single(_) => 1,
            QueryOutput::Many(frames) => frames.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn single(&self) -> Option<&DataFrame> {
        match self {
            QueryOutput::Single(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn frames(&self) -> &[DataFrame] {
        match self {
            QueryOutput::None => &[],
            QueryOutput::Single(frame) => std::slice::from_ref(frame),
            QueryOutput::Many(frames) => frames,
        }
    }

    pub fn into_frames(self) -> Vec<DataFrame> {
        match self {
            QueryOutput::None => Vec::new(),
            QueryOutput::Single(frame) => vec![frame],
            QueryOutput::Many(frames) => frames,
        }
    }
}

pub struct QueryEngine {
    store: SqliteStore,
    loaded: LoadedTables,
}

impl QueryEngine {
    pub fn new(store: SqliteStore, loaded: LoadedTables) -> Self {
        Self { store, loaded }
    }

    /// An engine over a fresh in-memory store with default options.
    pub fn in_memory() -> Result<Self> {
        Self::builder().open()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn loaded(&self) -> &LoadedTables {
        &self.loaded
    }

    pub fn run(&mut self, sql: &str, tables: &Tables, params: &ParamSet) -> Result<QueryOutput> {
        let statements = split_statements(sql);
        let tx = self.store.transaction()?;

        let mut written = Vec::new();
        for name in extract_table_names(sql) {
            if self.loaded.contains(&name) {
                trace!(table = %name, "already loaded");
                continue;
            }
            let Some(frame) = tables.get(&name) else {
                trace!(table = %name, "no frame supplied");
                continue;
            };
            write_table(&tx, &name, frame)
                .wrap_err_with(|| format!("failed to materialize table '{}'", name))?;
            written.push(name);
        }

        let mut results = Vec::new();
        for (index, statement) in statements.iter().enumerate() {
            debug!(index, statement, "executing statement");
            match run_statement(&tx, statement, params) {
                Ok(Some(mut frame)) => {
                    frame.uniquify_columns();
                    results.push(frame);
                }
                Ok(None) => {}
                Err(source) => {
                    return Err(QueryExecutionError::new(index, statement, source).into());
                }
            }
        }

        tx.commit().wrap_err("failed to commit query")?;
        for name in written {
            self.loaded.insert(name);
        }

        Ok(QueryOutput::from_frames(results))
    }
}

/// Runs `sql` once on a fresh engine built from `config`.
///
/// This is the entry point shared by the live query node and the script
/// runner.
pub fn query_frames(
    config: &EngineConfig,
    sql: &str,
    tables: &Tables,
    params: &ParamSet,
) -> Result<QueryOutput> {
    let mut engine = EngineBuilder::from_config(config.clone()).open()?;
    engine.run(sql, tables, params)
}
