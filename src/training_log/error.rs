use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Scalar fields a log must report for a record to be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Algorithm,
    HitAt1,
    BatchSize,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequiredField::Algorithm => "method",
            RequiredField::HitAt1 => "Hit@1",
            RequiredField::BatchSize => "batch_size",
        };
        f.write_str(name)
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|field| field.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed log {path}: never reported {}", join_fields(.missing))]
    MalformedLog {
        path: PathBuf,
        missing: Vec<RequiredField>,
    },
    #[error("No epoch lines found in {path}")]
    EmptySeries { path: PathBuf },
    #[error("{path}:{line}: malformed epoch line: {reason}")]
    MalformedEpochLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("{path}:{line}: invalid {field} value {value:?}")]
    InvalidValue {
        path: PathBuf,
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("{path}:{line}: invalid timestamp {value:?}")]
    InvalidTimestamp {
        path: PathBuf,
        line: usize,
        value: String,
    },
}
