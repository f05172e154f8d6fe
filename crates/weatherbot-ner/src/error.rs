use thiserror::Error;
use weatherbot_core::WeatherbotError;

/// Errors raised by an entity classifier.
///
/// None of these are recovered inside the detector: a classifier that cannot
/// answer makes the turn fail.
#[derive(Error, Debug)]
pub enum NerError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

impl From<NerError> for WeatherbotError {
    fn from(err: NerError) -> Self {
        WeatherbotError::Classifier(err.to_string())
    }
}
