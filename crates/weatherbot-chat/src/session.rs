//! State owned by one chat session.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use weatherbot_core::{ConversationHistory, DisplayTranscript, Role};

use crate::controller::{SessionController, TurnOutcome};
use crate::error::ChatError;

/// One conversation: the agent-facing history plus the human transcript.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub history: ConversationHistory,
    pub transcript: DisplayTranscript,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub turn_count: u64,
}

impl ChatSession {
    /// Start a session whose history is the controller's fresh context.
    pub fn new(controller: &SessionController) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            history: controller.fresh_context(),
            transcript: DisplayTranscript::new(),
            created_at: now,
            last_active_at: now,
            turn_count: 0,
        }
    }

    /// Whether the session has been idle for longer than `timeout_minutes`.
    pub fn is_expired(&self, timeout_minutes: u32) -> bool {
        self.is_expired_at(timeout_minutes, Utc::now())
    }

    fn is_expired_at(&self, timeout_minutes: u32, now: DateTime<Utc>) -> bool {
        let idle = now.signed_duration_since(self.last_active_at);
        idle.num_seconds() > i64::from(timeout_minutes) * 60
    }

    /// Run one turn and record both sides in the transcript.
    ///
    /// A failed turn leaves the transcript unchanged.
    pub async fn take_turn(
        &mut self,
        controller: &SessionController,
        user_text: &str,
    ) -> Result<TurnOutcome, ChatError> {
        self.last_active_at = Utc::now();
        let outcome = controller.handle_turn(&mut self.history, user_text).await?;
        self.transcript.push(Role::User, user_text);
        self.transcript.push(Role::Assistant, outcome.response.clone());
        self.turn_count += 1;
        Ok(outcome)
    }
}
