//! # SQL over Frames
//!
//! This module runs multi-statement SQL scripts against named in-memory
//! frames and named scalar parameters.
//!
//! ## Module Organization
//!
//! - `script`: statement splitting and referenced-table discovery
//! - `params`: [`ParamSet`] and the slot-over-bulk merge rule
//! - `engine`: [`QueryEngine`], [`QueryOutput`] and [`query_frames`]
//! - `builder`: [`EngineBuilder`] and [`EngineConfig`]
//! - `error`: [`QueryExecutionError`]
//!
//! ## Example
//!
//! ```ignore
//! let mut engine = QueryEngine::in_memory()?;
//! let mut tables = Tables::new();
//! tables.insert("people".into(), read_csv("people.csv")?);
//!
//! let params: ParamSet = [("min_id", 2)].into_iter().collect();
//! let out = engine.run("select * from people where id >= :min_id", &tables, &params)?;
//! ```

mod builder;
mod engine;
mod error;
mod params;
pub mod script;

pub use builder::{EngineBuilder, EngineConfig};
pub use engine::{query_frames, LoadedTables, QueryEngine, QueryOutput, Tables};
pub use error::QueryExecutionError;
pub use params::ParamSet;
pub use script::{extract_table_names, split_statements};
