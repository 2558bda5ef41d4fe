//! # Backing Store
//!
//! The query engine materializes frames into an ephemeral relational store
//! and runs SQL against it. This module is the thin adapter over `rusqlite`
//! that does exactly three things:
//!
//! 1. open a connection (in-memory or file) and register scalar functions,
//! 2. write a frame as a new table,
//! 3. run one prepared statement with named parameters, returning a frame
//!    when the statement produces a row set.
//!
//! The store knows nothing about which tables an engine has already loaded;
//! that policy lives in `query::LoadedTables`.
//!
//! ## Result Detection
//!
//! Whether a statement yields rows is decided by the prepared statement's
//! column count before it is stepped:
//!
//! ```text
//! prepare(sql)
//!     │
//!     ├── column_count() == 0 ──> raw_execute()  ──> Ok(None)
//!     │                           (DDL, INSERT, UPDATE, DELETE)
//!     │
//!     └── column_count()  > 0 ──> raw_query()    ──> Ok(Some(frame))
//!                                 (SELECT, PRAGMA, RETURNING)
//! ```
//!
//! A `SELECT` that matches nothing still yields a frame: zero rows, but the
//! column names are known.
//!
//! A piece must hold exactly one statement. Anything after it other than
//! whitespace, comments or a bare `;` fails with `MultipleStatement` before
//! the first statement runs.
//!
//! ## Parameter Binding
//!
//! SQLite accepts `:name`, `@name` and `$name`. The prefix is stripped and
//! the bare name looked up in the [`ParamSet`]. An unknown name, or a
//! positional `?` placeholder, fails with `InvalidParameterName` so the
//! caller can report it like any other statement failure.

use std::path::PathBuf;
use std::time::Duration;

use eyre::{bail, Result, WrapErr};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Batch, Connection, OpenFlags, Transaction};
use tracing::{debug, trace};

use crate::config::{DEFAULT_BUSY_TIMEOUT_MS, POWER_FUNCTION_NAME};
use crate::frame::{uniquify, Column, DataFrame};
use crate::query::ParamSet;
use crate::types::Value;

/// Where a store keeps its tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreKind {
    /// Process-local, discarded when the store is dropped.
    #[default]
    Memory,
    /// A SQLite database file, created if missing.
    File(PathBuf),
}

/// Connection options applied when a store is opened.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub register_functions: bool,
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            register_functions: true,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

pub struct SqliteStore {
    conn: Connection,
    kind: StoreKind,
}

impl SqliteStore {
    pub fn open(kind: StoreKind, options: &StoreOptions) -> Result<Self> {
        let conn = match &kind {
            StoreKind::Memory => Connection::open_in_memory()
                .wrap_err("failed to open in-memory store")?,
            StoreKind::File(path) => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            )
            .wrap_err_with(|| format!("failed to open store at {}", path.display()))?,
        };

        conn.busy_timeout(options.busy_timeout)?;
        if options.register_functions {
            register_functions(&conn)?;
        }

        debug!(?kind, "opened backing store");
        Ok(Self { conn, kind })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(StoreKind::Memory, &StoreOptions::default())
    }

    pub fn kind(&self) -> &StoreKind {
        &self.kind
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Starts the transaction scope of one engine call. Dropping the
    /// returned guard without committing rolls back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        table_exists(&self.conn, name)
    }

    /// User tables in name order.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }
}

/// Registers the scalar functions every store connection offers.
pub fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        POWER_FUNCTION_NAME,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(power(ctx)),
    )
    .wrap_err("failed to register power()")?;
    Ok(())
}

/// `power(x, y)`: integer result for integer arguments when it fits, float
/// otherwise, NULL for NULL or non-numeric arguments and non-finite results.
fn power(ctx: &Context<'_>) -> Value {
    match (ctx.get_raw(0), ctx.get_raw(1)) {
        (ValueRef::Integer(base), ValueRef::Integer(exp)) if exp >= 0 => u32::try_from(exp)
            .ok()
            .and_then(|exp| base.checked_pow(exp))
            .map(Value::Int)
            .unwrap_or_else(|| finite((base as f64).powf(exp as f64))),
        (base, exp) => match (numeric(base), numeric(exp)) {
            (Some(base), Some(exp)) => finite(base.powf(exp)),
            _ => Value::Null,
        },
    }
}

fn numeric(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        _ => None,
    }
}

fn finite(f: f64) -> Value {
    if f.is_finite() {
        Value::Float(f)
    } else {
        Value::Null
    }
}

pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// The stored name SQLite would resolve `name` to. Table names compare
/// without regard to ASCII case in SQLite, so `T` finds a table `t`.
fn stored_table_name(conn: &Connection, name: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
    )?;
    let mut rows = stmt.query([name])?;
    let stored = match rows.next()? {
        Some(row) => Some(row.get(0)?),
        None => None,
    };
    Ok(stored)
}

/// Double-quotes an identifier for use in generated DDL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Creates `name` and inserts every row of `frame`.
///
/// Fails if the table already exists, including under a name that differs
/// only in case. Duplicate column names are made unique first; the row index
/// is not written.
pub fn write_table(conn: &Connection, name: &str, frame: &DataFrame) -> Result<()> {
    match stored_table_name(conn, name)? {
        Some(existing) if existing == name => bail!("table '{}' already exists", name),
        Some(existing) => bail!(
            "table '{}' clashes with existing table '{}': the store ignores case in table names",
            name,
            existing
        ),
        None => {}
    }

    let names = uniquify(&frame.column_names());
    let definitions = names
        .iter()
        .zip(frame.columns())
        .map(|(column_name, column)| {
            let declared = column.dtype().sql_declaration();
            if declared.is_empty() {
                quote_identifier(column_name)
            } else {
                format!("{} {}", quote_identifier(column_name), declared)
            }
        })
        .collect::<Vec<_>>();

    let table = quote_identifier(name);
    let create = if definitions.is_empty() {
        // SQLite needs at least one column; a frame without columns still
        // becomes a queryable (empty) table.
        format!("CREATE TABLE {} (\"_\")", table)
    } else {
        format!("CREATE TABLE {} ({})", table, definitions.join(", "))
    };
    conn.execute(&create, [])
        .wrap_err_with(|| format!("failed to create table '{}'", name))?;

    if frame.column_count() > 0 {
        let placeholders = vec!["?"; frame.column_count()].join(", ");
        let insert = format!("INSERT INTO {} VALUES ({})", table, placeholders);
        let mut stmt = conn.prepare(&insert)?;
        for row in 0..frame.row_count() {
            let values = frame.row_values(row).unwrap_or_default();
            stmt.execute(params_from_iter(values.iter()))
                .wrap_err_with(|| format!("failed to insert row {} into '{}'", row, name))?;
        }
    }

    debug!(
        table = name,
        rows = frame.row_count(),
        columns = frame.column_count(),
        "materialized frame"
    );
    Ok(())
}

/// Prepares and runs one statement.
///
/// Returns `Ok(None)` when the statement produces no row set, otherwise the
/// rows as a frame with the column names exactly as the store reports them.
pub fn run_statement(
    conn: &Connection,
    sql: &str,
    params: &ParamSet,
) -> rusqlite::Result<Option<DataFrame>> {
    let mut batch = Batch::new(conn, sql);
    let Some(mut stmt) = batch.next()? else {
        return Ok(None);
    };
    if !matches!(batch.next(), Ok(None)) {
        return Err(rusqlite::Error::MultipleStatement);
    }

    for i in 1..=stmt.parameter_count() {
        let placeholder = stmt
            .parameter_name(i)
            .map(String::from)
            .unwrap_or_else(|| format!("?{}", i));
        let value = bare_name(&placeholder)
            .and_then(|name| params.get(name))
            .ok_or_else(|| rusqlite::Error::InvalidParameterName(placeholder.clone()))?;
        trace!(parameter = %placeholder, %value, "binding");
        stmt.raw_bind_parameter(i, value)?;
    }

    if stmt.column_count() == 0 {
        let changed = stmt.raw_execute()?;
        trace!(changed, "statement returned no rows");
        return Ok(None);
    }

    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut data: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        for (i, column) in data.iter_mut().enumerate() {
            column.push(Value::from_sql_ref(row.get_ref(i)?));
        }
    }

    let columns = names
        .into_iter()
        .zip(data)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Some(DataFrame::from_equal_columns(columns)))
}

fn bare_name(placeholder: &str) -> Option<&str> {
    placeholder
        .strip_prefix(':')
        .or_else(|| placeholder.strip_prefix('@'))
        .or_else(|| placeholder.strip_prefix('$'))
        .filter(|name| !name.is_empty())
}
