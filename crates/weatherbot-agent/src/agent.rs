//! The conversation agent boundary and the ReAct weather agent.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use weatherbot_core::{ConversationHistory, Message};

use crate::error::{AgentError, WeatherError};
use crate::llm::LanguageModel;
use crate::react::{build_prompt, AgentStep, OutputParser, Step, OBSERVATION_STOP, TOOL_NAME};
use crate::weather::WeatherProvider;

/// Reply when the weather provider cannot resolve the location.
pub const LOCATION_NOT_FOUND_REPLY: &str = "Sorry but I was not able to detect a valid location.";
/// Reply for every other pipeline failure.
pub const FALLBACK_REPLY: &str =
    "Unfortunately I was not able to find any data for you at the moment.";
/// Reply when the model used up its iterations without a final answer.
pub const ITERATION_LIMIT_REPLY: &str = "Agent stopped due to iteration limit or time limit.";

/// Default number of model calls allowed per reply.
pub const DEFAULT_MAX_ITERATIONS: u32 = 4;

/// Outcome of one agent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    /// The pipeline produced a final answer.
    Answer(String),
    /// The weather provider could not resolve the location.
    LocationNotFound,
    /// Any other failure; the reason is for logs, never for the user.
    Unavailable(String),
}

impl AgentReply {
    /// User-facing text for this reply.
    pub fn text(&self) -> &str {
        match self {
            Self::Answer(text) => text,
            Self::LocationNotFound => LOCATION_NOT_FOUND_REPLY,
            Self::Unavailable(_) => FALLBACK_REPLY,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Answer(text) => text,
            other => other.text().to_string(),
        }
    }
}

/// Stateless responder over a full message snapshot.
///
/// Implementations keep no memory between calls; everything relevant must be
/// in `messages`. `reply` never fails: errors are folded into [`AgentReply`].
#[async_trait]
pub trait ConversationAgent: Send + Sync {
    /// A new, empty working history for a session.
    fn fresh_context(&self) -> ConversationHistory {
        ConversationHistory::new()
    }

    async fn reply(&self, messages: &[Message]) -> AgentReply;

    async fn respond(&self, messages: &[Message]) -> String {
        self.reply(messages).await.into_text()
    }
}

// =============================================================================
// WeatherAgent
// =============================================================================

/// ReAct loop over a language model with a single weather tool.
pub struct WeatherAgent {
    llm: Arc<dyn LanguageModel>,
    weather: Arc<dyn WeatherProvider>,
    parser: OutputParser,
    max_iterations: u32,
}

impl WeatherAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self {
            llm,
            weather,
            parser: OutputParser::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Cap on model calls per reply. Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run the tool loop to a final answer.
    ///
    /// Malformed model output costs an iteration and is answered with a
    /// corrective observation. A not-found location from the weather tool
    /// ends the run immediately.
    async fn run(&self, messages: &[Message]) -> Result<String, AgentError> {
        let mut steps: Vec<Step> = Vec::new();

        for iteration in 1..=self.max_iterations {
            let prompt = build_prompt(messages, &steps);
            let output = self.llm.complete(&prompt, &[OBSERVATION_STOP]).await?;

            let observation = match self.parser.parse(&output) {
                Ok(AgentStep::Finish(answer)) => {
                    debug!(iteration, "Agent finished");
                    return Ok(answer);
                }
                Ok(AgentStep::Act { tool, input }) if tool == TOOL_NAME => {
                    debug!(iteration, location = %input, "Calling weather tool");
                    self.weather.current_weather(&input).await?.describe()
                }
                Ok(AgentStep::Act { tool, .. }) => {
                    debug!(iteration, tool = %tool, "Model asked for an unknown tool");
                    format!("{tool} is not a valid tool, try one of [{TOOL_NAME}].")
                }
                Err(e) => {
                    debug!(iteration, error = %e, "Unparseable model output");
                    e.to_string()
                }
            };

            steps.push(Step {
                log: output,
                observation,
            });
        }

        warn!(
            max_iterations = self.max_iterations,
            "Agent hit its iteration limit"
        );
        Ok(ITERATION_LIMIT_REPLY.to_string())
    }
}

#[async_trait]
impl ConversationAgent for WeatherAgent {
    async fn reply(&self, messages: &[Message]) -> AgentReply {
        match self.run(messages).await {
            Ok(answer) => AgentReply::Answer(answer),
            Err(AgentError::Weather(WeatherError::LocationNotFound(location))) => {
                info!(location = %location, "Weather provider could not resolve location");
                AgentReply::LocationNotFound
            }
            Err(e) => {
                warn!(error = %e, "Agent pipeline failed");
                AgentReply::Unavailable(e.to_string())
            }
        }
    }
}
