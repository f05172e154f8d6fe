use serde::{Deserialize, Serialize};

/// Group label the NER model assigns to places.
pub const LOCATION_GROUP: &str = "LOC";

/// One aggregated entity span returned by a token classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Entity group label, e.g. `LOC`, `PER`, `ORG`, `MISC`.
    pub entity_group: String,
    /// Classifier confidence in `[0, 1]`.
    pub score: f32,
    /// Surface text of the span. Multi-token names arrive as one word ("new york").
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl EntitySpan {
    pub fn new(entity_group: impl Into<String>, score: f32, word: impl Into<String>) -> Self {
        Self {
            entity_group: entity_group.into(),
            score,
            word: word.into(),
            start: None,
            end: None,
        }
    }

    pub fn with_offsets(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// True when the span is labelled as a place (`LOC` or `location`, any case).
    pub fn is_location(&self) -> bool {
        self.entity_group.eq_ignore_ascii_case(LOCATION_GROUP)
            || self.entity_group.eq_ignore_ascii_case("location")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_location_accepts_loc_labels() {
        assert!(EntitySpan::new("LOC", 0.99, "paris").is_location());
        assert!(EntitySpan::new("loc", 0.99, "paris").is_location());
        assert!(EntitySpan::new("Location", 0.99, "paris").is_location());
    }

    #[test]
    fn test_is_location_rejects_other_groups() {
        assert!(!EntitySpan::new("PER", 0.99, "paris hilton").is_location());
        assert!(!EntitySpan::new("ORG", 0.99, "paris saint-germain").is_location());
        assert!(!EntitySpan::new("MISC", 0.99, "parisian").is_location());
    }

    #[test]
    fn test_deserialize_inference_api_item() {
        let json = r#"{"entity_group":"LOC","score":0.9987,"word":"new york","start":19,"end":27}"#;
        let span: EntitySpan = serde_json::from_str(json).unwrap();
        assert_eq!(span.entity_group, "LOC");
        assert_eq!(span.word, "new york");
        assert_eq!(span.start, Some(19));
        assert_eq!(span.end, Some(27));
        assert!(span.score > 0.99);
    }

    #[test]
    fn test_deserialize_without_offsets() {
        let json = r#"{"entity_group":"PER","score":0.5,"word":"sam"}"#;
        let span: EntitySpan = serde_json::from_str(json).unwrap();
        assert_eq!(span.start, None);
        assert_eq!(span.end, None);
    }

    #[test]
    fn test_with_offsets() {
        let span = EntitySpan::new("LOC", 0.95, "oslo").with_offsets(3, 7);
        assert_eq!(span.start, Some(3));
        assert_eq!(span.end, Some(7));
    }
}
