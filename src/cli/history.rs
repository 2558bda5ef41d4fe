//! # History File Management
//!
//! History is stored in `~/.frameql_history` unless `FRAMEQL_HISTORY` says
//! otherwise:
//!
//! ```bash
//! export FRAMEQL_HISTORY=/custom/path/history
//! frameql --load people=people.csv
//! ```
//!
//! An empty `FRAMEQL_HISTORY` disables history. The path is resolved once at
//! startup and handed to rustyline, which does the file I/O.

use std::env;
use std::path::PathBuf;

use crate::config::{DEFAULT_HISTORY_FILE, HISTORY_ENV_VAR};

pub fn history_path() -> Option<PathBuf> {
    resolve(env::var(HISTORY_ENV_VAR).ok(), env::var("HOME").ok())
}

fn resolve(custom: Option<String>, home: Option<String>) -> Option<PathBuf> {
    match custom {
        Some(path) if path.is_empty() => None,
        Some(path) => Some(PathBuf::from(path)),
        None => home.map(|home| PathBuf::from(home).join(DEFAULT_HISTORY_FILE)),
    }
}
