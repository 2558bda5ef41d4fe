//! # frameql Configuration Constants
//!
//! Fixed values shared by the live node graph and the exported script
//! runner. Both paths split scripts and name result columns with these.
//!
//! ## Groups
//!
//! ```text
//! STATEMENT_SEPARATOR (";\n")
//!       │
//!       └─> used by query::script::split_statements for every engine call,
//!           by node::DbQueryNode, and by the REPL when it joins input lines
//!
//! FIRST_DUPLICATE_SUFFIX (2)
//!       │
//!       └─> frame::uniquify renames the second "a" to "a_2"
//!
//! DEFAULT_CONNECTION_URL ("sqlite://")
//!       │
//!       └─> in-memory SQLite, used when a connect node has no URL
//! ```
//!
//! ## Environment Variables
//!
//! | Variable          | Default               | Effect                          |
//! |-------------------|-----------------------|---------------------------------|
//! | `FRAMEQL_LOG`     | `warn`                | tracing filter for the binary   |
//! | `FRAMEQL_HISTORY` | `~/.frameql_history`  | REPL history file, empty = off  |

// ============================================================================
// SCRIPT HANDLING
// Shared by the engine, the external-database query and the REPL
// ============================================================================

/// Statement separator. Only a semicolon immediately followed by a newline
/// ends a statement; a bare `;` is left to the backing store.
pub const STATEMENT_SEPARATOR: &str = ";\n";

/// First suffix appended to a duplicated column name.
pub const FIRST_DUPLICATE_SUFFIX: usize = 2;

/// Name of the scalar UDF registered on every backing store connection.
pub const POWER_FUNCTION_NAME: &str = "power";

// ============================================================================
// CONNECTIONS
// ============================================================================

/// Connection URL used when none is supplied (in-memory SQLite).
pub const DEFAULT_CONNECTION_URL: &str = "sqlite://";

/// Busy timeout applied to file-backed stores, in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// PERSISTED VALUE TAGS
// The `_type` field of tagged objects in the persisted graph format
// ============================================================================

pub const TAG_FIELD: &str = "_type";
pub const TAG_DATAFRAME: &str = "DataFrame";
pub const TAG_SERIES: &str = "Series";
pub const TAG_DB_ENGINE: &str = "DBEngineData";
pub const TAG_WORKBOOK: &str = "XLWBook";
pub const TAG_WORKBOOK_DATA: &str = "XLWBookData";
pub const TAG_BLOB: &str = "Blob";

// ============================================================================
// CLI
// ============================================================================

/// Environment variable holding the tracing filter for the binary.
pub const LOG_ENV_VAR: &str = "FRAMEQL_LOG";

/// Filter used when `FRAMEQL_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Environment variable overriding the REPL history location.
pub const HISTORY_ENV_VAR: &str = "FRAMEQL_HISTORY";

/// History file name inside the home directory.
pub const DEFAULT_HISTORY_FILE: &str = ".frameql_history";

/// Widest column the ASCII table formatter renders before truncating.
pub const MAX_COLUMN_WIDTH: usize = 50;

const _: () = assert!(
    FIRST_DUPLICATE_SUFFIX >= 2,
    "the first duplicate must not reuse the `_1` suffix of an ordinary name"
);
