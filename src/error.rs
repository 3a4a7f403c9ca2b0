//! Error types for loading, aggregating and writing summary tables.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("input file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("line {line}: Likes value {value:?} is not numeric")]
    TypeConversion { line: u64, value: String },

    #[error("line {line}: Likes value {value:?} is outside the supported numeric range")]
    OutOfRange { line: u64, value: String },

    #[error("line {line}: PostTimestamp value {value:?} is not a recognised date-time")]
    DateParse { line: u64, value: String },

    #[error("failed to write {}: {source}", .path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SummaryResult<T> = std::result::Result<T, SummaryError>;

impl SummaryError {
    /// Wraps a csv error raised while writing `path`.
    ///
    /// csv reports write failures as its own error type; the underlying
    /// OS error is recovered when there is one.
    pub fn from_csv_write(path: PathBuf, err: csv::Error) -> Self {
        let source = match err.into_kind() {
            csv::ErrorKind::Io(io) => io,
            other => std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", other)),
        };
        SummaryError::IoWrite { path, source }
    }
}
