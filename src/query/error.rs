/// A statement of a script failed in the store.
///
/// Travels inside `eyre::Report`; recover it with
/// `report.downcast_ref::<QueryExecutionError>()`.
#[derive(Debug)]
pub struct QueryExecutionError {
    /// Zero-based position among the script's non-blank statements.
    pub index: usize,
    pub statement: String,
    pub source: rusqlite::Error,
}

impl QueryExecutionError {
    pub fn new(index: usize, statement: &str, source: rusqlite::Error) -> Self {
        Self {
            index,
            statement: statement.to_string(),
            source,
        }
    }

    /// True when the failure was an unbound or positional parameter.
    pub fn is_parameter_error(&self) -> bool {
        matches!(self.source, rusqlite::Error::InvalidParameterName(_))
    }
}

impl std::fmt::Display for QueryExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let rusqlite::Error::InvalidParameterName(name) = &self.source {
            return write!(
                f,
                "statement {} has no value for parameter {}: {}",
                self.index, name, self.statement
            );
        }
        write!(
            f,
            "statement {} failed: {}: {}",
            self.index, self.source, self.statement
        )
    }
}

impl std::error::Error for QueryExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
