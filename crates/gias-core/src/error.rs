use thiserror::Error;

/// Top-level error type for the Give-It-A-Summary workspace.
///
/// Subsystem crates define their own error types; this one covers
/// configuration files and transcript export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GiasError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for GiasError {
    fn from(err: toml::de::Error) -> Self {
        GiasError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GiasError {
    fn from(err: toml::ser::Error) -> Self {
        GiasError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GiasError {
    fn from(err: serde_json::Error) -> Self {
        GiasError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for workspace-level operations.
pub type Result<T> = std::result::Result<T, GiasError>;
