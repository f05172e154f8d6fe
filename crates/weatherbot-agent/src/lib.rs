//! Weatherbot agent crate - language model + weather tool pipeline.
//!
//! Provides:
//! - The [`ConversationAgent`] boundary and its [`AgentReply`] result type
//! - [`WeatherAgent`], a bounded ReAct tool loop over a language model
//! - A Hugging Face text-generation client and an OpenWeatherMap client

pub mod agent;
pub mod error;
pub mod llm;
pub mod react;
pub mod weather;

pub use agent::{
    AgentReply, ConversationAgent, WeatherAgent, FALLBACK_REPLY, ITERATION_LIMIT_REPLY,
    LOCATION_NOT_FOUND_REPLY,
};
pub use error::{AgentError, WeatherError};
pub use llm::{HuggingFaceTextGeneration, LanguageModel};
pub use weather::{OpenWeatherMapClient, WeatherProvider, WeatherReport};
