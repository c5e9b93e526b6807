use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("source unavailable: {location}: {reason}")]
    SourceUnavailable { location: String, reason: String },

    #[error("malformed date {value:?} in column {column} of {table}")]
    MalformedDate {
        table: String,
        column: String,
        value: String,
    },

    #[error("malformed number {value:?} in column {column} of {table}")]
    MalformedNumber {
        table: String,
        column: String,
        value: String,
    },

    #[error("schema mismatch: column {column:?} missing from {table}")]
    SchemaMismatch { table: String, column: String },

    #[error("{provider} has no sub-region column to apply scope {scope:?} to")]
    ScopeUnsupported { provider: String, scope: String },

    #[error("column {0:?} present on both sides of a join")]
    ColumnConflict(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
