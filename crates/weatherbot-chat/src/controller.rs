//! Per-turn history policy.
//!
//! Each turn the working history is either reset, replaced by a location
//! recalled from earlier turns, or carried over unchanged, and the user text
//! is then appended. The agent always sees the resulting snapshot.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use weatherbot_agent::ConversationAgent;
use weatherbot_core::ConversationHistory;
use weatherbot_ner::LocationDetector;

use crate::error::ChatError;

/// What the controller did to the history before appending the user text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryAction {
    /// The new message names a location; prior context was dropped.
    Reset,
    /// Prior context was replaced by the location it mentioned.
    Substitute { location: String },
    /// No location anywhere; history kept as it was.
    Carry,
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub response: String,
    pub action: HistoryAction,
}

/// Drives one turn: prune the history, append the user text, ask the agent.
#[derive(Clone)]
pub struct SessionController {
    detector: LocationDetector,
    agent: Arc<dyn ConversationAgent>,
}

impl SessionController {
    pub fn new(detector: LocationDetector, agent: Arc<dyn ConversationAgent>) -> Self {
        Self { detector, agent }
    }

    /// Working history for a new session.
    pub fn fresh_context(&self) -> ConversationHistory {
        self.agent.fresh_context()
    }

    /// Run one turn against `history`.
    ///
    /// Classifier failures abort the turn before the history is touched.
    pub async fn handle_turn(
        &self,
        history: &mut ConversationHistory,
        user_text: &str,
    ) -> Result<TurnOutcome, ChatError> {
        let action = if self.detector.has_location(user_text).await? {
            history.clear();
            HistoryAction::Reset
        } else {
            match self.detector.find_location(history.snapshot()).await? {
                Some(location) => {
                    history.clear();
                    history.add_user_message(location.clone());
                    HistoryAction::Substitute { location }
                }
                None => HistoryAction::Carry,
            }
        };
        debug!(action = ?action, history_len = history.len(), "History pruned");

        history.add_user_message(user_text);
        let response = self.agent.respond(history.snapshot()).await;

        info!(
            action = ?action,
            history_len = history.len(),
            "Turn complete"
        );
        Ok(TurnOutcome { response, action })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use weatherbot_agent::{AgentReply, LOCATION_NOT_FOUND_REPLY};
    use weatherbot_core::Message;
    use weatherbot_ner::{EntityClassifier, EntitySpan, GazetteerClassifier, NerError};

    /// Answers from the last user message, refusing when no known place
    /// appears anywhere in the snapshot. Records every snapshot it sees.
    #[derive(Default)]
    pub(crate) struct EchoAgent {
        pub seen: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl ConversationAgent for EchoAgent {
        async fn reply(&self, messages: &[Message]) -> AgentReply {
            let contents: Vec<String> = messages.iter().map(|m| m.content().to_string()).collect();
            self.seen.lock().unwrap().push(contents.clone());
            let gazetteer = GazetteerClassifier::new::<&str>(&[]).unwrap();
            match contents.iter().find_map(|c| gazetteer.spans(c).into_iter().next()) {
                Some(span) => AgentReply::Answer(format!("Weather for {}", span.word)),
                None => AgentReply::LocationNotFound,
            }
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl ConversationAgent for FailingAgent {
        async fn reply(&self, _messages: &[Message]) -> AgentReply {
            AgentReply::Unavailable("upstream timeout".to_string())
        }
    }

    struct BrokenClassifier;

    #[async_trait]
    impl EntityClassifier for BrokenClassifier {
        async fn classify(&self, _text: &str) -> Result<Vec<EntitySpan>, NerError> {
            Err(NerError::Unavailable("model is loading".to_string()))
        }
    }

    /// Fails on one exact text and finds nothing in any other.
    struct FailsOn(&'static str);

    #[async_trait]
    impl EntityClassifier for FailsOn {
        async fn classify(&self, text: &str) -> Result<Vec<EntitySpan>, NerError> {
            if text == self.0 {
                Err(NerError::Unavailable("model is loading".to_string()))
            } else {
                Ok(Vec::new())
            }
        }
    }

    pub(crate) fn gazetteer_detector() -> LocationDetector {
        LocationDetector::new(Arc::new(GazetteerClassifier::new::<&str>(&[]).unwrap()))
    }

    fn controller() -> (SessionController, Arc<EchoAgent>) {
        let agent = Arc::new(EchoAgent::default());
        (
            SessionController::new(gazetteer_detector(), agent.clone()),
            agent,
        )
    }

    fn contents(history: &ConversationHistory) -> Vec<&str> {
        history.snapshot().iter().map(|m| m.content()).collect()
    }

    #[test]
    fn test_fresh_context_is_empty() {
        let (c, _) = controller();
        assert!(c.fresh_context().is_empty());
    }

    #[tokio::test]
    async fn test_location_in_message_resets_history() {
        let (c, agent) = controller();
        let mut history = c.fresh_context();
        history.add_user_message("hello there");
        history.add_user_message("how are you");

        let outcome = c
            .handle_turn(&mut history, "What's the weather in Paris?")
            .await
            .unwrap();

        assert_eq!(outcome.action, HistoryAction::Reset);
        assert_eq!(outcome.response, "Weather for Paris");
        assert_eq!(contents(&history), vec!["What's the weather in Paris?"]);
        assert_eq!(
            agent.seen.lock().unwrap()[0],
            vec!["What's the weather in Paris?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_follow_up_substitutes_recalled_location() {
        let (c, agent) = controller();
        let mut history = c.fresh_context();
        c.handle_turn(&mut history, "What's the weather in Paris?")
            .await
            .unwrap();

        let outcome = c.handle_turn(&mut history, "And tomorrow?").await.unwrap();

        assert_eq!(
            outcome.action,
            HistoryAction::Substitute {
                location: "Paris".to_string()
            }
        );
        assert_eq!(contents(&history), vec!["Paris", "And tomorrow?"]);
        assert_eq!(
            agent.seen.lock().unwrap()[1],
            vec!["Paris".to_string(), "And tomorrow?".to_string()]
        );
        assert_eq!(outcome.response, "Weather for Paris");
    }

    #[tokio::test]
    async fn test_substitute_keeps_working_across_turns() {
        let (c, _) = controller();
        let mut history = c.fresh_context();
        c.handle_turn(&mut history, "Weather in Oslo").await.unwrap();
        c.handle_turn(&mut history, "and tomorrow?").await.unwrap();
        let outcome = c.handle_turn(&mut history, "and the weekend?").await.unwrap();

        assert_eq!(
            outcome.action,
            HistoryAction::Substitute {
                location: "Oslo".to_string()
            }
        );
        assert_eq!(contents(&history), vec!["Oslo", "and the weekend?"]);
    }

    #[tokio::test]
    async fn test_no_location_anywhere_carries_and_apologises() {
        let (c, _) = controller();
        let mut history = c.fresh_context();

        let outcome = c
            .handle_turn(&mut history, "What's the weather like?")
            .await
            .unwrap();

        assert_eq!(outcome.action, HistoryAction::Carry);
        assert_eq!(outcome.response, LOCATION_NOT_FOUND_REPLY);
        assert_eq!(contents(&history), vec!["What's the weather like?"]);
    }

    #[tokio::test]
    async fn test_carry_keeps_prior_history() {
        let (c, _) = controller();
        let mut history = c.fresh_context();
        history.add_user_message("hi");

        let outcome = c.handle_turn(&mut history, "is it cold?").await.unwrap();

        assert_eq!(outcome.action, HistoryAction::Carry);
        assert_eq!(contents(&history), vec!["hi", "is it cold?"]);
    }

    #[tokio::test]
    async fn test_agent_failure_returns_fallback() {
        let c = SessionController::new(gazetteer_detector(), Arc::new(FailingAgent));
        let mut history = c.fresh_context();

        let outcome = c.handle_turn(&mut history, "Weather in Rome").await.unwrap();

        assert_eq!(
            outcome.response,
            "Unfortunately I was not able to find any data for you at the moment."
        );
        assert_eq!(contents(&history), vec!["Weather in Rome"]);
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates() {
        let c = SessionController::new(
            LocationDetector::new(Arc::new(BrokenClassifier)),
            Arc::new(EchoAgent::default()),
        );
        let mut history = c.fresh_context();

        let err = c.handle_turn(&mut history, "Weather in Rome").await.unwrap_err();

        assert!(matches!(err, ChatError::Classifier(NerError::Unavailable(_))));
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_recall_failure_leaves_history_unchanged() {
        let agent = Arc::new(EchoAgent::default());
        let c = SessionController::new(
            LocationDetector::new(Arc::new(FailsOn("hi there"))),
            agent.clone(),
        );
        let mut history = c.fresh_context();
        history.add_user_message("hi there");
        history.add_user_message("still here");

        let err = c.handle_turn(&mut history, "and tomorrow?").await.unwrap_err();

        assert!(matches!(err, ChatError::Classifier(NerError::Unavailable(_))));
        assert_eq!(contents(&history), vec!["hi there", "still here"]);
        assert!(agent.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_history_action_serializes_tagged() {
        let json = serde_json::to_value(HistoryAction::Substitute {
            location: "Paris".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "substitute");
        assert_eq!(json["location"], "Paris");
        assert_eq!(
            serde_json::to_value(HistoryAction::Reset).unwrap()["kind"],
            "reset"
        );
    }
}
