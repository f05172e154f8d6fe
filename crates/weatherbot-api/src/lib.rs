//! Weatherbot API crate - axum HTTP shell over the session registry.
//!
//! Exposes chat turns, session listing, transcripts and a health check.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
