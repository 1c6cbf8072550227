use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ambiguous schema: headers {first:?} and {second:?} both canonicalize to {canonical:?}")]
    AmbiguousSchema {
        first: String,
        second: String,
        canonical: String,
    },

    #[error("derivation {derivation:?} requires column {column:?} which is not present")]
    MissingColumn {
        derivation: String,
        column: String,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PrepError>;
