//! Concurrent registry of chat sessions.
//!
//! Turns on one session are serialized by that session's async mutex, held
//! for the whole turn. Turns on different sessions run independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};
use uuid::Uuid;
use weatherbot_core::config::ChatConfig;
use weatherbot_core::TranscriptEntry;

use crate::controller::{HistoryAction, SessionController};
use crate::error::ChatError;
use crate::session::ChatSession;

type SessionHandle = Arc<AsyncMutex<ChatSession>>;

/// Result of [`SessionRegistry::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub session_id: Uuid,
    pub response: String,
    pub action: HistoryAction,
}

/// Listing entry for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub turn_count: u64,
}

/// Owns every live session and routes messages to them.
pub struct SessionRegistry {
    controller: SessionController,
    sessions: Mutex<HashMap<Uuid, SessionHandle>>,
    config: ChatConfig,
}

impl SessionRegistry {
    pub fn new(controller: SessionController, config: ChatConfig) -> Self {
        Self {
            controller,
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Handle one user message.
    ///
    /// An unknown or expired `session_id` starts a new session; the returned
    /// id tells the caller which one was used.
    pub async fn submit(
        &self,
        session_id: Option<Uuid>,
        message: &str,
    ) -> Result<SubmitOutcome, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        let handle = self.resolve_session(session_id).await?;
        let mut session = handle.lock().await;
        let outcome = session.take_turn(&self.controller, message).await?;

        info!(
            session_id = %session.id,
            turn = session.turn_count,
            "Message handled"
        );
        Ok(SubmitOutcome {
            session_id: session.id,
            response: outcome.response,
            action: outcome.action,
        })
    }

    /// Start an empty session and return its id.
    ///
    /// Expired sessions are swept out first.
    pub fn create_session(&self) -> Result<Uuid, ChatError> {
        let session = ChatSession::new(&self.controller);
        let id = session.id;
        let mut sessions = self.lock_sessions()?;
        self.sweep_expired(&mut sessions);
        sessions.insert(id, Arc::new(AsyncMutex::new(session)));
        drop(sessions);
        debug!(session_id = %id, "Session created");
        Ok(id)
    }

    /// Everything said in a session, oldest first.
    pub async fn transcript(&self, session_id: Uuid) -> Result<Vec<TranscriptEntry>, ChatError> {
        let handle = self.get(session_id)?;
        let session = handle.lock().await;
        Ok(session.transcript.entries().to_vec())
    }

    /// Summaries of all live sessions, most recently active first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ChatError> {
        let handles: Vec<SessionHandle> = self.lock_sessions()?.values().cloned().collect();
        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let s = handle.lock().await;
            if s.is_expired(self.config.session_timeout_minutes) {
                continue;
            }
            summaries.push(SessionSummary {
                id: s.id,
                created_at: s.created_at,
                last_active_at: s.last_active_at,
                turn_count: s.turn_count,
            });
        }
        summaries.sort_by(|a, b| b.last_active_at.cmp(&a.last_active_at));
        Ok(summaries)
    }

    pub fn delete_session(&self, session_id: Uuid) -> Result<(), ChatError> {
        match self.lock_sessions()?.remove(&session_id) {
            Some(_) => {
                debug!(session_id = %session_id, "Session deleted");
                Ok(())
            }
            None => Err(ChatError::SessionNotFound(session_id)),
        }
    }

    /// Number of live sessions. Expired ones are swept out first.
    pub fn session_count(&self) -> usize {
        match self.lock_sessions() {
            Ok(mut sessions) => {
                self.sweep_expired(&mut sessions);
                sessions.len()
            }
            Err(_) => 0,
        }
    }

    // -- Private helpers --

    fn lock_sessions(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionHandle>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::Session(format!("session lock poisoned: {e}")))
    }

    /// Drop idle sessions past the timeout. A session mid-turn is locked and
    /// therefore skipped.
    fn sweep_expired(&self, sessions: &mut HashMap<Uuid, SessionHandle>) {
        let timeout = self.config.session_timeout_minutes;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session.is_expired(timeout),
            Err(_) => true,
        });
        let swept = before - sessions.len();
        if swept > 0 {
            info!(swept, remaining = sessions.len(), "Expired sessions removed");
        }
    }

    fn get(&self, session_id: Uuid) -> Result<SessionHandle, ChatError> {
        self.lock_sessions()?
            .get(&session_id)
            .cloned()
            .ok_or(ChatError::SessionNotFound(session_id))
    }

    async fn resolve_session(&self, requested: Option<Uuid>) -> Result<SessionHandle, ChatError> {
        if let Some(id) = requested {
            let existing = self.lock_sessions()?.get(&id).cloned();
            if let Some(handle) = existing {
                let expired = handle
                    .lock()
                    .await
                    .is_expired(self.config.session_timeout_minutes);
                if !expired {
                    return Ok(handle);
                }
                info!(session_id = %id, "Session expired, starting a new one");
                self.lock_sessions()?.remove(&id);
            }
        }
        let id = self.create_session()?;
        self.get(id)
    }
}
