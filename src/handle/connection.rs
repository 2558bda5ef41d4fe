//! External database connections.
//!
//! A connection is described by a URL in the SQLAlchemy style. Only SQLite
//! targets are supported:
//!
//! | URL                          | Target                      |
//! |------------------------------|-----------------------------|
//! | `sqlite://`                  | new in-memory database      |
//! | `sqlite::memory:`            | new in-memory database      |
//! | `sqlite:///:memory:`         | new in-memory database      |
//! | `sqlite:///data/app.db`      | `data/app.db` (relative)    |
//! | `sqlite:////srv/app.db`      | `/srv/app.db` (absolute)    |
//! | `sqlite+pysqlite:///app.db`  | driver suffix is ignored    |
//!
//! Any other scheme is rejected when the URL is parsed. Reconnecting an
//! in-memory target yields a new, empty database.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use eyre::{bail, Result, WrapErr};
use rusqlite::Connection;
use tracing::debug;

use super::{Handle, Reconnect};
use crate::frame::DataFrame;
use crate::query::{split_statements, ParamSet, QueryExecutionError};
use crate::store::run_statement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    Memory,
    File(PathBuf),
}

/// A parsed connection URL. Displays as the text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionUrl {
    raw: String,
    target: SqliteTarget,
}

impl ConnectionUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let raw = url.trim();
        let Some((scheme, rest)) = raw.split_once(':') else {
            bail!("'{}' is not a connection URL", raw);
        };

        let backend = scheme.split('+').next().unwrap_or(scheme);
        if !backend.eq_ignore_ascii_case("sqlite") {
            bail!("unsupported database '{}' in connection URL '{}'", backend, raw);
        }

        let target = match rest {
            "" | "//" | ":memory:" | "///:memory:" => SqliteTarget::Memory,
            _ => match rest.strip_prefix("///") {
                Some(path) if !path.is_empty() => SqliteTarget::File(PathBuf::from(path)),
                _ => bail!("malformed SQLite URL '{}', expected sqlite:///path", raw),
            },
        };

        Ok(Self {
            raw: raw.to_string(),
            target,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn target(&self) -> &SqliteTarget {
        &self.target
    }

    fn open(&self) -> Result<Connection> {
        let conn = match &self.target {
            SqliteTarget::Memory => Connection::open_in_memory(),
            SqliteTarget::File(path) => Connection::open(path),
        };
        conn.wrap_err_with(|| format!("failed to connect to {}", self.raw))
    }
}

impl FromStr for ConnectionUrl {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A live connection to an external database.
pub struct DbConnection {
    conn: Connection,
}

impl DbConnection {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Reconnect for DbConnection {
    type Descriptor = ConnectionUrl;

    fn reconnect(url: &ConnectionUrl) -> Result<Self> {
        debug!(%url, "connecting");
        Ok(Self { conn: url.open()? })
    }

    fn is_usable(&self) -> bool {
        self.conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
    }
}

pub type DbHandle = Handle<DbConnection>;

impl DbHandle {
    /// Parses `url` and connects.
    pub fn open(url: &str) -> Result<Self> {
        Self::connect(ConnectionUrl::parse(url)?)
    }
}

/// Runs a script on an external database.
///
/// Statements run in order inside one transaction. Only the last statement
/// can produce the result, and only when `has_result` is set; row sets of
/// earlier statements are discarded. Column names are returned as the
/// database reports them.
pub fn query_database(
    handle: &DbHandle,
    sql: &str,
    has_result: bool,
    params: &ParamSet,
) -> Result<Option<DataFrame>> {
    let mut live = handle.resolve()?;
    let statements = split_statements(sql);
    let last = statements.len().checked_sub(1);

    let tx = live.connection_mut().transaction()?;
    let mut result = None;
    for (index, statement) in statements.iter().enumerate() {
        debug!(index, statement, "executing on external database");
        let frame = run_statement(&tx, statement, params)
            .map_err(|source| QueryExecutionError::new(index, statement, source))?;
        if has_result && Some(index) == last {
            result = frame;
        }
    }
    tx.commit().wrap_err("failed to commit")?;

    Ok(result)
}
