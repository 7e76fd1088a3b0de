//! Error types for the load pipeline.
//!
//! Every variant is fatal to the running pass. The driver attaches the path of
//! the failing file as `anyhow` context, the typed error stays reachable with
//! `anyhow::Error::downcast_ref::<EtlError>()`.

use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    /// Input JSON is missing required fields or has the wrong shape.
    #[error("Malformed record in {}{}: {message}", .path.display(), line_suffix(.line))]
    MalformedRecord {
        path: PathBuf,
        /// 1-based line number for event batches.
        line: Option<usize>,
        message: String,
    },

    /// The database could not be reached or rejected the statement.
    #[error("Database unreachable or query rejected: {0}")]
    ConnectivityFailure(#[source] rusqlite::Error),

    /// A constraint the conflict policy does not cover (NOT NULL, foreign key, ...).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(#[source] rusqlite::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to list files under {}: {source}", .root.display())]
    Listing {
        root: PathBuf,
        source: walkdir::Error,
    },
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" line {}", line),
        None => String::new(),
    }
}

impl From<rusqlite::Error> for EtlError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => EtlError::ConstraintViolation(err),
            _ => EtlError::ConnectivityFailure(err),
        }
    }
}

impl EtlError {
    pub fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        EtlError::MalformedRecord {
            path: path.into(),
            line: None,
            message: message.to_string(),
        }
    }

    pub fn malformed_line(path: impl Into<PathBuf>, line: usize, message: impl ToString) -> Self {
        EtlError::MalformedRecord {
            path: path.into(),
            line: Some(line),
            message: message.to_string(),
        }
    }
}
