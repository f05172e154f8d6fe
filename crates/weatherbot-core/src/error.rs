use thiserror::Error;

/// Top-level error type for Weatherbot.
///
/// Subsystem crates define their own error enums and implement
/// `From<SubsystemError> for WeatherbotError` so `?` works across crate
/// boundaries in the binary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WeatherbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Classifier unavailable: {0}")]
    Classifier(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for WeatherbotError {
    fn from(err: toml::de::Error) -> Self {
        WeatherbotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WeatherbotError {
    fn from(err: toml::ser::Error) -> Self {
        WeatherbotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for WeatherbotError {
    fn from(err: serde_json::Error) -> Self {
        WeatherbotError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Weatherbot operations.
pub type Result<T> = std::result::Result<T, WeatherbotError>;
