//! # Engine Builder
//!
//! `EngineBuilder` configures and opens a [`QueryEngine`]. Every setting is
//! optional; unset settings take the defaults below when `open()` is called.
//!
//! | Option             | Default          | Description                           |
//! |--------------------|------------------|---------------------------------------|
//! | store              | `Memory`         | in-memory or file-backed SQLite       |
//! | register_functions | true             | register `power(x, y)` on open        |
//! | busy_timeout       | 5000 ms          | wait for a locked file store          |
//!
//! ```ignore
//! let mut engine = QueryEngine::builder()
//!     .path("./scratch.db")
//!     .busy_timeout(Duration::from_secs(1))
//!     .open()?;
//! ```
//!
//! A resolved set of settings is an [`EngineConfig`]. Configs are plain data:
//! the live query node keeps one and opens a fresh engine from it on every
//! compute, and the script runner does the same.

use std::path::Path;
use std::time::Duration;

use eyre::Result;

use super::engine::{LoadedTables, QueryEngine};
use crate::config::DEFAULT_BUSY_TIMEOUT_MS;
use crate::store::{SqliteStore, StoreKind, StoreOptions};

/// Resolved engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub store: StoreKind,
    pub register_functions: bool,
    pub busy_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Memory,
            register_functions: true,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    store_kind: Option<StoreKind>,
    register_functions: Option<bool>,
    busy_timeout: Option<Duration>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            store_kind: Some(config.store),
            register_functions: Some(config.register_functions),
            busy_timeout: Some(config.busy_timeout),
        }
    }

    /// Keeps the store in memory. This is the default.
    pub fn memory(mut self) -> Self {
        self.store_kind = Some(StoreKind::Memory);
        self
    }

    /// Keeps the store in a SQLite file at `path`, created if missing.
    ///
    /// Tables written by one engine stay in the file; a second engine over
    /// the same file fails to materialize a frame whose table exists.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.store_kind = Some(StoreKind::File(path.as_ref().to_path_buf()));
        self
    }

    pub fn store_kind(mut self, kind: StoreKind) -> Self {
        self.store_kind = Some(kind);
        self
    }

    pub fn register_functions(mut self, enabled: bool) -> Self {
        self.register_functions = Some(enabled);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Settings with defaults filled in.
    pub fn config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            store: self.store_kind.clone().unwrap_or(defaults.store),
            register_functions: self.register_functions.unwrap_or(defaults.register_functions),
            busy_timeout: self.busy_timeout.unwrap_or(defaults.busy_timeout),
        }
    }

    /// Opens the store and returns an engine.
    ///
    /// A file store may already hold tables from an earlier engine; those
    /// names start out loaded, so frames supplied under them are not written
    /// again.
    pub fn open(self) -> Result<QueryEngine> {
        let config = self.config();
        let options = StoreOptions {
            register_functions: config.register_functions,
            busy_timeout: config.busy_timeout,
        };
        let store = SqliteStore::open(config.store, &options)?;
        let mut loaded = LoadedTables::new();
        if let StoreKind::File(_) = store.kind() {
            for name in store.table_names()? {
                loaded.insert(name);
            }
        }
        Ok(QueryEngine::new(store, loaded))
    }

    pub fn get_store_kind(&self) -> Option<&StoreKind> {
        self.store_kind.as_ref()
    }

    pub fn get_register_functions(&self) -> Option<bool> {
        self.register_functions
    }

    pub fn get_busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ParamSet, Tables};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn builder_path_sets_store_kind() {
        let builder = EngineBuilder::new().path("/tmp/scratch.db");

        assert_eq!(
            builder.get_store_kind(),
            Some(&StoreKind::File(PathBuf::from("/tmp/scratch.db")))
        );
    }

    #[test]
    fn builder_unset_options_are_none() {
        let builder = EngineBuilder::new();

        assert!(builder.get_store_kind().is_none());
        assert!(builder.get_register_functions().is_none());
        assert!(builder.get_busy_timeout().is_none());
    }

    #[test]
    fn builder_config_fills_defaults() {
        let config = EngineBuilder::new()
            .busy_timeout(Duration::from_millis(10))
            .config();

        assert_eq!(config.store, StoreKind::Memory);
        assert!(config.register_functions);
        assert_eq!(config.busy_timeout, Duration::from_millis(10));
    }

    #[test]
    fn builder_from_config_round_trips() {
        let config = EngineConfig {
            store: StoreKind::File(PathBuf::from("x.db")),
            register_functions: false,
            busy_timeout: Duration::from_secs(2),
        };

        assert_eq!(EngineBuilder::from_config(config.clone()).config(), config);
    }

    #[test]
    fn builder_open_creates_file_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.db");

        let mut engine = EngineBuilder::new().path(&path).open().unwrap();
        engine
            .run("create table t (x)", &Tables::new(), &ParamSet::new())
            .unwrap();

        assert!(path.exists());
        assert!(engine.store().table_exists("t").unwrap());
    }

    #[test]
    fn reopened_file_store_starts_with_its_tables_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.db");
        EngineBuilder::new()
            .path(&path)
            .open()
            .unwrap()
            .run("create table kept (x)", &Tables::new(), &ParamSet::new())
            .unwrap();

        let engine = EngineBuilder::new().path(&path).open().unwrap();

        assert_eq!(engine.loaded().names(), vec!["kept"]);
        assert!(EngineBuilder::new().memory().open().unwrap().loaded().is_empty());
    }

    #[test]
    fn builder_open_without_functions() {
        let mut engine = EngineBuilder::new()
            .memory()
            .register_functions(false)
            .open()
            .unwrap();

        let result = engine.run("select power(2, 3)", &Tables::new(), &ParamSet::new());
        assert!(result.is_err());
    }
}
