use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComplaintError>;

/// Errors raised by the complaint core and its store collaborators.
///
/// Unmatched or blank-protocol rows during reconciliation are not errors.
#[derive(Debug, Error)]
pub enum ComplaintError {
    /// The store could not be read or written.
    #[error("store unavailable: {0}")]
    Store(String),
    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// An update targeted a key the store does not hold.
    #[error("record not found: {0}")]
    NotFound(String),
    /// A label did not name a known category or status.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for ComplaintError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<serde_json::Error> for ComplaintError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ComplaintError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for ComplaintError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}
