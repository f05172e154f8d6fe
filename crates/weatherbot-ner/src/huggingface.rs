//! Hosted token-classification client (Hugging Face Inference API).

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use weatherbot_core::config::DetectorConfig;

use crate::classifier::EntityClassifier;
use crate::error::NerError;
use crate::types::EntitySpan;

/// NER classifier calling a hosted model with `aggregation_strategy = "simple"`,
/// so multi-token names such as "san francisco" come back as one span.
pub struct HuggingFaceNerClassifier {
    endpoint: String,
    model: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl HuggingFaceNerClassifier {
    pub fn new(config: &DetectorConfig, token: Option<String>) -> Result<Self, NerError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NerError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            token,
            http,
        })
    }

    pub(crate) fn api_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model)
    }

    pub(crate) fn build_request_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "inputs": text,
            "parameters": { "aggregation_strategy": "simple" },
            "options": { "wait_for_model": true },
        })
    }

    /// Parse the inference reply: an array of spans, or `{"error": "..."}`.
    pub(crate) fn parse_response(json: serde_json::Value) -> Result<Vec<EntitySpan>, NerError> {
        if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
            return Err(NerError::Unavailable(message.to_string()));
        }
        serde_json::from_value(json).map_err(|e| NerError::Parse(e.to_string()))
    }
}

#[async_trait]
impl EntityClassifier for HuggingFaceNerClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<EntitySpan>, NerError> {
        debug!(model = %self.model, text_len = text.len(), "NER request");

        let mut request = self
            .http
            .post(self.api_url())
            .json(&Self::build_request_body(text));
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NerError::Network(e.to_string()))?;

        let status = response.status();
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NerError::Parse(format!("HTTP {status}: {e}")))?;

        if !status.is_success() && json.get("error").is_none() {
            return Err(NerError::Unavailable(format!("HTTP {status}")));
        }

        let spans = Self::parse_response(json)?;
        debug!(spans = spans.len(), "NER response");
        Ok(spans)
    }
}
