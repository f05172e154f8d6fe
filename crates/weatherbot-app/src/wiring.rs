//! Builds the collaborator clients and the session controller from config.

use std::sync::Arc;

use weatherbot_agent::{
    ConversationAgent, HuggingFaceTextGeneration, OpenWeatherMapClient, WeatherAgent,
};
use weatherbot_chat::SessionController;
use weatherbot_core::config::{
    DetectorBackend, DetectorConfig, HUGGINGFACE_TOKEN_ENV, OPENWEATHERMAP_KEY_ENV,
};
use weatherbot_core::{WeatherbotConfig, WeatherbotError};
use weatherbot_ner::{
    EntityClassifier, GazetteerClassifier, HuggingFaceNerClassifier, LocationDetector, NerError,
};

/// API credentials, read from the environment only.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub huggingface_token: Option<String>,
    pub openweathermap_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            huggingface_token: non_empty_env(HUGGINGFACE_TOKEN_ENV),
            openweathermap_key: non_empty_env(OPENWEATHERMAP_KEY_ENV),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn build_classifier(
    config: &DetectorConfig,
    token: Option<String>,
) -> Result<Arc<dyn EntityClassifier>, NerError> {
    match config.backend {
        DetectorBackend::Huggingface => {
            tracing::info!(model = %config.model, "Using hosted entity classifier");
            Ok(Arc::new(HuggingFaceNerClassifier::new(config, token)?))
        }
        DetectorBackend::Gazetteer => {
            tracing::info!(
                extra_locations = config.extra_locations.len(),
                "Using gazetteer entity classifier"
            );
            Ok(Arc::new(GazetteerClassifier::new(config.extra_locations.as_slice())?))
        }
    }
}

pub fn build_agent(
    config: &WeatherbotConfig,
    secrets: &Secrets,
) -> Result<Arc<dyn ConversationAgent>, WeatherbotError> {
    let weather = OpenWeatherMapClient::new(&config.weather, secrets.openweathermap_key.clone())
        .map_err(|e| WeatherbotError::Config(format!("{e}: set {OPENWEATHERMAP_KEY_ENV}")))?;
    let llm = HuggingFaceTextGeneration::new(&config.agent, secrets.huggingface_token.clone())?;
    tracing::info!(
        model = %config.agent.model,
        max_iterations = config.agent.max_iterations,
        "Weather agent ready"
    );
    Ok(Arc::new(
        WeatherAgent::new(Arc::new(llm), Arc::new(weather))
            .with_max_iterations(config.agent.max_iterations),
    ))
}

/// Wire the detector and agent into a controller.
pub fn build_controller(
    config: &WeatherbotConfig,
    secrets: &Secrets,
) -> Result<SessionController, WeatherbotError> {
    if secrets.huggingface_token.is_none() {
        tracing::warn!(
            "{HUGGINGFACE_TOKEN_ENV} is not set; hosted model calls will be anonymous"
        );
    }
    let classifier = build_classifier(&config.detector, secrets.huggingface_token.clone())?;
    let detector = LocationDetector::new(classifier).with_min_score(config.detector.min_score);
    let agent = build_agent(config, secrets)?;
    Ok(SessionController::new(detector, agent))
}
