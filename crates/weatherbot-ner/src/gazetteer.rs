//! Offline location classifier backed by a list of known place names.

use async_trait::async_trait;
use regex::Regex;

use crate::classifier::EntityClassifier;
use crate::error::NerError;
use crate::types::{EntitySpan, LOCATION_GROUP};

/// Score assigned to every gazetteer hit.
const GAZETTEER_SCORE: f32 = 0.99;

/// Place names recognised without any configuration.
const BUILTIN_LOCATIONS: &[&str] = &[
    "Amsterdam",
    "Athens",
    "Auckland",
    "Bangkok",
    "Barcelona",
    "Beijing",
    "Berlin",
    "Boston",
    "Brussels",
    "Buenos Aires",
    "Cairo",
    "Cape Town",
    "Chicago",
    "Copenhagen",
    "Delhi",
    "Dubai",
    "Dublin",
    "Edinburgh",
    "Helsinki",
    "Hong Kong",
    "Istanbul",
    "Lagos",
    "Las Vegas",
    "Lisbon",
    "London",
    "Los Angeles",
    "Madrid",
    "Melbourne",
    "Mexico City",
    "Miami",
    "Montreal",
    "Moscow",
    "Mumbai",
    "Nairobi",
    "New York",
    "Oslo",
    "Paris",
    "Prague",
    "Rio de Janeiro",
    "Rome",
    "San Francisco",
    "Santiago",
    "Seattle",
    "Seoul",
    "Shanghai",
    "Singapore",
    "Stockholm",
    "Sydney",
    "Tokyo",
    "Toronto",
    "Vancouver",
    "Vienna",
    "Warsaw",
    "Washington",
    "York",
    "Zurich",
];

/// Classifies place names by whole-word, case-insensitive matching.
///
/// Longer names are tried first so "New York" is one span, not "York".
pub struct GazetteerClassifier {
    pattern: Regex,
}

impl GazetteerClassifier {
    /// Build a classifier over the built-in names plus `extra`.
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self, NerError> {
        let mut names: Vec<String> = BUILTIN_LOCATIONS
            .iter()
            .map(|s| s.to_string())
            .chain(
                extra
                    .iter()
                    .map(|s| s.as_ref().trim().to_string())
                    .filter(|s| !s.is_empty()),
            )
            .collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        let alternation = names
            .iter()
            .map(|n| anchored(n))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)(?:{})", alternation))
            .map_err(|e| NerError::InvalidPattern(e.to_string()))?;

        Ok(Self { pattern })
    }

    /// Synchronous core of [`EntityClassifier::classify`].
    pub fn spans(&self, text: &str) -> Vec<EntitySpan> {
        self.pattern
            .find_iter(text)
            .map(|m| {
                EntitySpan::new(LOCATION_GROUP, GAZETTEER_SCORE, m.as_str())
                    .with_offsets(m.start(), m.end())
            })
            .collect()
    }
}

/// Escape `name`, with a word boundary only on the sides that end in a word
/// character.
fn anchored(name: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let body = regex::escape(name).replace(' ', r"\s+");
    let lead = if name.chars().next().is_some_and(is_word) { r"\b" } else { "" };
    let trail = if name.chars().last().is_some_and(is_word) { r"\b" } else { "" };
    format!("{lead}{body}{trail}")
}

#[async_trait]
impl EntityClassifier for GazetteerClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<EntitySpan>, NerError> {
        Ok(self.spans(text))
    }
}
