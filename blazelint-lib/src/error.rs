//! Error types for the linter.

/// Result type alias for linting operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can surface from the parser frontend. Detection itself never
/// fails: unparsable colors and missing subtrees are "check not applicable."
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Stylesheet parsing error.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },
}

impl Error {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }
}
