//! Location detection policy on top of an entity classifier.

use std::sync::Arc;

use tracing::debug;
use weatherbot_core::Message;

use crate::classifier::EntityClassifier;
use crate::error::NerError;
use crate::types::EntitySpan;

/// Default confidence a location span must exceed.
pub const DEFAULT_MIN_SCORE: f32 = 0.9;

/// Answers "is there a location here?" over single utterances and histories.
///
/// A span qualifies when it is labelled as a location and its score is
/// strictly greater than `min_score`. Classifier errors are returned as-is.
#[derive(Clone)]
pub struct LocationDetector {
    classifier: Arc<dyn EntityClassifier>,
    min_score: f32,
}

impl LocationDetector {
    pub fn new(classifier: Arc<dyn EntityClassifier>) -> Self {
        Self {
            classifier,
            min_score: DEFAULT_MIN_SCORE,
        }
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    /// Whether `utterance` mentions a location with enough confidence.
    pub async fn has_location(&self, utterance: &str) -> Result<bool, NerError> {
        let spans = self.classifier.classify(utterance).await?;
        Ok(self.first_qualifying(&spans).is_some())
    }

    /// The first confidently detected location in `history`, scanning
    /// messages oldest first and stopping at the first hit.
    pub async fn find_location(&self, history: &[Message]) -> Result<Option<String>, NerError> {
        for message in history {
            let spans = self.classifier.classify(message.content()).await?;
            if let Some(span) = self.first_qualifying(&spans) {
                let word = span.word.trim();
                if !word.is_empty() {
                    debug!(location = %word, "Location recalled from history");
                    return Ok(Some(word.to_string()));
                }
            }
        }
        Ok(None)
    }

    fn first_qualifying<'a>(&self, spans: &'a [EntitySpan]) -> Option<&'a EntitySpan> {
        spans
            .iter()
            .find(|s| s.is_location() && s.score > self.min_score)
    }
}
