//! # frameql Configuration Module
//!
//! Constants shared by the query engine, the node graph, the exported-script
//! runner and the CLI. Runtime configuration of the backing store lives in
//! [`crate::query::EngineConfig`] and is built with
//! [`crate::query::EngineBuilder`].
//!
//! ## Module Organization
//!
//! - [`constants`]: fixed values with their relationships documented

pub mod constants;
pub use constants::*;
