//! # frameql - SQL over In-Memory Data Frames
//!
//! frameql runs parameterized, multi-statement SQL scripts over in-memory
//! tables. Frames are materialized into an embedded SQLite store the first
//! time a script references them, statements run in one transaction, and
//! every statement that yields rows contributes a result frame.
//!
//! The same operations are available two ways: as nodes of a live execution
//! graph, and as steps of an exported [`export::Script`] that runs with no
//! graph present. Both paths call the same library functions and produce
//! equal values.
//!
//! ## Quick Start
//!
//! ```ignore
//! use frameql::frame::DataFrame;
//! use frameql::query::{ParamSet, QueryEngine, QueryOutput, Tables};
//! use frameql::types::Value;
//!
//! let people = DataFrame::from_rows(
//!     vec!["id", "name"],
//!     vec![
//!         vec![Value::Int(1), Value::from("aaa")],
//!         vec![Value::Int(2), Value::from("bbb")],
//!     ],
//! )?;
//! let tables: Tables = [("people".to_string(), people)].into_iter().collect();
//! let params: ParamSet = [("min", 2)].into_iter().collect();
//!
//! let mut engine = QueryEngine::builder().memory().open()?;
//! let output = engine.run("SELECT name FROM people WHERE id >= :min", &tables, &params)?;
//! assert_eq!(output.len(), 1);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │   graph (live nodes)      │   export (Script::run)  │
//! ├─────────────────────────────────────────────────────┤
//! │   node: connect, read_csv, frame/db query,          │
//! │         for-each-row, get-value                     │
//! ├──────────────────────────┬──────────────────────────┤
//! │  query: QueryEngine      │  handle: DbHandle        │
//! │  split, bind, uniquify   │  reconnecting handles    │
//! ├──────────────────────────┴──────────────────────────┤
//! │  store: SQLite backing store (rusqlite)             │
//! ├─────────────────────────────────────────────────────┤
//! │  frame / types: DataFrame, Series, Value            │
//! └─────────────────────────────────────────────────────┘
//!             persist: tagged-JSON pin values
//! ```
//!
//! ## Module Overview
//!
//! - [`config`]: shared constants
//! - [`types`]: `Value` and column type inference
//! - [`frame`]: `DataFrame`, `Series`, `uniquify`, CSV loading
//! - [`store`]: SQLite backing store, table materialization
//! - [`query`]: `QueryEngine`, parameters, statement splitting
//! - [`handle`]: reconnecting handles, external database queries
//! - [`persist`]: saving and restoring pin values
//! - [`graph`]: the execution graph nodes run in
//! - [`node`]: the nodes
//! - [`export`]: exported scripts and their runner
//! - [`cli`]: the interactive prompt

pub mod cli;
pub mod config;
pub mod export;
pub mod frame;
pub mod graph;
pub mod handle;
pub mod node;
pub mod persist;
pub mod query;
pub mod store;
pub mod types;

pub use frame::{DataFrame, Series};
pub use query::{ParamSet, QueryEngine, QueryOutput};
pub use types::Value;
