// src/error.rs

use std::path::PathBuf;

/// Everything the reconciliation pipeline can fail with.
///
/// Partial coverage (a country without GDP data, a row without a key) is never
/// an error; it is reported through the result partitions instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be opened or read.
    #[error("cannot access {path:?}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited reader rejected the input.
    #[error("malformed table {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A key that must be present was not found.
    #[error("key `{key}` not found in {context}")]
    MissingKey { key: String, context: String },

    /// A GDP field holds text that is not a number.
    #[error("GDP value `{value}` for `{code}` is not a number")]
    MalformedNumber { code: String, value: String },

    /// log10 is undefined for zero and negative GDP.
    #[error("GDP value {value} for `{code}` is not positive")]
    NonPositiveValue { code: String, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn missing_key(key: impl Into<String>, context: impl Into<String>) -> Self {
        Error::MissingKey {
            key: key.into(),
            context: context.into(),
        }
    }
}
