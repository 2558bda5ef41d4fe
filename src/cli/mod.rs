//! # frameql CLI Module
//!
//! An interactive SQL prompt over CSV-loaded frames, plus the runner for
//! exported scripts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CLI Entry Point                        │
//! │                      (bin/frameql.rs)                       │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  frameql run <script.json>   │  REPL loop                   │
//! │  Script::run + print frames  │  rustyline, dot commands,    │
//! │                              │  one engine per session      │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │     Commands          │    Table Formatter    │   History   │
//! │  (.load, .tables,     │  ASCII box drawing    │  Persistent │
//! │   .param, .help)      │  for result frames    │  ~/.frameql_│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Interactive, with two CSV files as tables
//! frameql --load people=people.csv --load orders=orders.csv
//!
//! # Run an exported pipeline
//! frameql run pipeline.json
//! ```
//!
//! ## Module Organization
//!
//! - `repl`: read-eval-print loop with rustyline
//! - `session`: engine, frames and parameters of one REPL session
//! - `commands`: dot command parsing and execution
//! - `table`: ASCII table formatter for frames
//! - `history`: history file path resolution

pub mod commands;
pub mod history;
pub mod repl;
pub mod session;
pub mod table;

pub use repl::{print_frame, print_output, Repl};
pub use session::Session;
