use std::path::PathBuf;

use thiserror::Error;

use crate::model::DatabaseError;

pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Failures of the import machinery itself, as opposed to bad row content.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("inbox path is not a directory: {0}")]
    InboxNotADirectory(PathBuf),
}

/// Validation failure classes for a CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowErrorKind {
    MissingRequiredColumn,
    MalformedChoiceList,
    UnresolvableCorrectChoice,
    InvalidEnumValue,
}

impl std::fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MissingRequiredColumn => "MissingRequiredColumn",
            Self::MalformedChoiceList => "MalformedChoiceList",
            Self::UnresolvableCorrectChoice => "UnresolvableCorrectChoice",
            Self::InvalidEnumValue => "InvalidEnumValue",
        };
        write!(f, "{name}")
    }
}

/// A single failing row. Row numbers are 1-based and count the header, so
/// the first data row is row 2; header-level problems report row 1.
#[derive(Debug, Clone, Error)]
#[error("row {row}: {kind}: {message}")]
pub struct RowError {
    pub row: usize,
    pub kind: RowErrorKind,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, kind: RowErrorKind, message: impl Into<String>) -> Self {
        Self {
            row,
            kind,
            message: message.into(),
        }
    }
}
