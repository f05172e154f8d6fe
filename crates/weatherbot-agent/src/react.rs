//! ReAct prompt assembly and model output parsing.
//!
//! The model is asked to reply in a fixed line format:
//!
//! ```text
//! Thought: ...
//! Action: open_weather_map
//! Action Input: Paris
//! ```
//!
//! or, once it has what it needs, `Final Answer: ...`. Generation stops at
//! [`OBSERVATION_STOP`] so the loop can insert the real tool result.

use regex::Regex;
use thiserror::Error;
use weatherbot_core::{Message, Role};

/// Name the model uses to call the weather tool.
pub const TOOL_NAME: &str = "open_weather_map";
/// Stop sequence passed to the model on every call.
pub const OBSERVATION_STOP: &str = "\nObservation:";

const FINAL_ANSWER_MARKER: &str = "Final Answer:";

const TOOL_DESCRIPTION: &str = "Looks up the current weather for a place. \
Input should be a location string (e.g. London,GB).";

/// What the model decided to do in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Finish(String),
    Act { tool: String, input: String },
}

/// Model output that fits neither an action nor a final answer.
///
/// The message is fed back to the model as the step's observation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputParseError {
    #[error("Could not parse output: it contains both a final answer and an action. Reply with only one of them.")]
    Ambiguous,
    #[error("Invalid format: missing 'Action:' after 'Thought:'. Reply with an action or a final answer.")]
    MissingAction,
    #[error("Invalid format: missing 'Action Input:' after 'Action:'.")]
    MissingActionInput,
}

/// One completed tool step kept in the scratchpad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Raw model output for the step.
    pub log: String,
    pub observation: String,
}

/// Parses model output into an [`AgentStep`].
pub struct OutputParser {
    action: Regex,
    action_only: Regex,
}

impl OutputParser {
    pub fn new() -> Self {
        Self {
            action: Regex::new(
                r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)",
            )
            .unwrap(),
            action_only: Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").unwrap(),
        }
    }

    pub fn parse(&self, text: &str) -> Result<AgentStep, OutputParseError> {
        let final_answer = text.find(FINAL_ANSWER_MARKER);

        if let Some(caps) = self.action.captures(text) {
            if final_answer.is_some() {
                return Err(OutputParseError::Ambiguous);
            }
            let tool = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let input = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            return Ok(AgentStep::Act {
                tool: tool.to_string(),
                input: clean_tool_input(input),
            });
        }

        if let Some(idx) = final_answer {
            let answer = text[idx + FINAL_ANSWER_MARKER.len()..].trim();
            return Ok(AgentStep::Finish(answer.to_string()));
        }

        if self.action_only.is_match(text) {
            Err(OutputParseError::MissingActionInput)
        } else {
            Err(OutputParseError::MissingAction)
        }
    }
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip whitespace, then any surrounding quotes, from a tool input.
fn clean_tool_input(raw: &str) -> String {
    let first_line = raw.trim().lines().next().unwrap_or_default();
    first_line.trim().trim_matches('"').trim().to_string()
}

/// Render the chat messages as the question the model must answer.
fn render_question(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let speaker = match m.role() {
                Role::User => "Human",
                Role::Assistant => "AI",
                Role::System => "System",
            };
            format!("{}: {}", speaker, m.content())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the full prompt for the next model call.
pub fn build_prompt(messages: &[Message], steps: &[Step]) -> String {
    let mut prompt = format!(
        "Answer the following questions as best you can. \
You have access to the following tools:\n\n\
{TOOL_NAME}: {TOOL_DESCRIPTION}\n\n\
Use the following format:\n\n\
Question: the input question you must answer\n\
Thought: you should always think about what to do\n\
Action: the action to take, should be one of [{TOOL_NAME}]\n\
Action Input: the input to the action\n\
Observation: the result of the action\n\
... (this Thought/Action/Action Input/Observation can repeat N times)\n\
Thought: I now know the final answer\n\
Final Answer: the final answer to the original input question\n\n\
Begin!\n\n\
Question: {}\n\
Thought:",
        render_question(messages)
    );
    for step in steps {
        prompt.push_str(&step.log);
        prompt.push_str("\nObservation: ");
        prompt.push_str(&step.observation);
        prompt.push_str("\nThought: ");
    }
    prompt
}
