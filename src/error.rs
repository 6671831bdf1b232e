//! Error type for the fallible entry points (ingest and export).
//!
//! Query operations never return errors: unknown keys, empty queries and
//! malformed filter modes are reported through the warning channel and yield
//! empty results instead.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SbrError>;

#[derive(Error, Debug)]
pub enum SbrError {
    /// The data prefix was empty or whitespace only.
    #[error("empty data prefix")]
    EmptyPrefix,

    #[error("missing input file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("I/O error on {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A data row could not be parsed; `line` is 1-based and counts the header.
    #[error("parse error in {file} at line {line}: {message}")]
    Parse {
        file: String,
        line: u64,
        message: String,
    },

    #[error("{file} line {line}: {axis} id {id} outside 1..={max}")]
    IdOutOfRange {
        file: String,
        line: u64,
        axis: &'static str,
        id: i64,
        max: usize,
    },

    #[error("{file} line {line}: weight is not a finite number")]
    NonFiniteWeight { file: String, line: u64 },
}

impl SbrError {
    /// File label the error refers to, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            SbrError::EmptyPrefix | SbrError::MissingFile(_) => None,
            SbrError::Io { file, .. }
            | SbrError::Csv { file, .. }
            | SbrError::Parse { file, .. }
            | SbrError::IdOutOfRange { file, .. }
            | SbrError::NonFiniteWeight { file, .. } => Some(file.as_str()),
        }
    }

    /// Line number the error refers to, if any.
    pub fn line(&self) -> Option<u64> {
        match self {
            SbrError::Parse { line, .. }
            | SbrError::IdOutOfRange { line, .. }
            | SbrError::NonFiniteWeight { line, .. } => Some(*line),
            SbrError::Csv { source, .. } => source.position().map(|p| p.line()),
            _ => None,
        }
    }
}
