use thiserror::Error;

/// Error type for the concerns core owns itself: configuration files and
/// (de)serialization.
///
/// Subsystem crates keep their own error types at their boundaries — the
/// transport's `BackendError` surfaces as an error-flavored explanation, the
/// export pipeline's `ExportError` as a user-facing failure notice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CurioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for CurioError {
    fn from(err: toml::de::Error) -> Self {
        CurioError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CurioError {
    fn from(err: toml::ser::Error) -> Self {
        CurioError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CurioError {
    fn from(err: serde_json::Error) -> Self {
        CurioError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for CurioMind operations.
pub type Result<T> = std::result::Result<T, CurioError>;
