//! Token-classification seam.

use async_trait::async_trait;

use crate::error::NerError;
use crate::types::EntitySpan;

/// Runs named-entity recognition over a single piece of text.
///
/// Implementations return spans in the order the model produced them.
#[async_trait]
pub trait EntityClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Vec<EntitySpan>, NerError>;
}
