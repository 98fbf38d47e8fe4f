use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::direction::Direction;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error while reading line {line} in {path}: {source}")]
    IoLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized direction '{value}'; expected read or write")]
    InvalidDirection { value: String },

    #[error("line {line} in {path} has fewer than two tab-separated columns: {content:?}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("strict write to {path} expected {expected} columns, got {found}")]
    ColumnCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("column {column} written to {path} contains a tab or line break")]
    EmbeddedDelimiter { path: PathBuf, column: usize },

    #[error("cannot {operation} {path}: {reason}")]
    PreconditionViolation {
        operation: &'static str,
        path: PathBuf,
        reason: PreconditionReason,
    },
}

/// Why a session refused an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionReason {
    /// The session was opened in the other direction.
    WrongDirection(Direction),
    Closed,
}

impl fmt::Display for PreconditionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongDirection(direction) => write!(f, "session is open for {direction}"),
            Self::Closed => f.write_str("session is closed"),
        }
    }
}

impl StoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn io_line(path: impl Into<PathBuf>, line: usize, source: std::io::Error) -> Self {
        Self::IoLine {
            path: path.into(),
            line,
            source,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{PreconditionReason, StoreError};
    use crate::direction::Direction;

    #[test]
    fn precondition_message_names_operation_and_direction() {
        let error = StoreError::PreconditionViolation {
            operation: "write",
            path: "people.tsv".into(),
            reason: PreconditionReason::WrongDirection(Direction::Read),
        };
        assert_eq!(
            error.to_string(),
            "cannot write people.tsv: session is open for read"
        );
    }

    #[test]
    fn io_helper_keeps_source() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = StoreError::io("opening record file for append", "/x/y.tsv", source);
        assert!(matches!(
            error,
            StoreError::Io {
                operation: "opening record file for append",
                ..
            }
        ));
        assert!(std::error::Error::source(&error).is_some());
        assert!(!error.is_not_found());
    }
}
