//! Conversational core for Weatherbot.
//!
//! Provides the per-turn history policy ([`SessionController`]), per-session
//! state ([`ChatSession`]) and the concurrent [`SessionRegistry`] shared by
//! the terminal and HTTP shells.

pub mod controller;
pub mod error;
pub mod registry;
pub mod session;

pub use controller::{HistoryAction, SessionController, TurnOutcome};
pub use error::ChatError;
pub use registry::{SessionRegistry, SessionSummary, SubmitOutcome};
pub use session::ChatSession;
