//! Error types for the conversational core.

use weatherbot_core::WeatherbotError;
use weatherbot_ner::NerError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("location detection failed: {0}")]
    Classifier(#[from] NerError),
    #[error("session error: {0}")]
    Session(String),
}

impl From<ChatError> for WeatherbotError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Classifier(e) => e.into(),
            other => WeatherbotError::Session(other.to_string()),
        }
    }
}
