//! Language model seam and the hosted text-generation client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use weatherbot_core::config::AgentConfig;

use crate::error::AgentError;

/// A completion-style language model.
///
/// Generation must stop before any of the `stop` sequences; the returned
/// text does not include the prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, AgentError>;
}

/// Hugging Face Inference API text-generation client.
pub struct HuggingFaceTextGeneration {
    endpoint: String,
    model: String,
    token: Option<String>,
    temperature: f64,
    max_new_tokens: u32,
    http: reqwest::Client,
}

impl HuggingFaceTextGeneration {
    pub fn new(config: &AgentConfig, token: Option<String>) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            token,
            temperature: config.temperature,
            max_new_tokens: config.max_new_tokens,
            http,
        })
    }

    pub(crate) fn api_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model)
    }

    pub(crate) fn build_request_body(&self, prompt: &str, stop: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "temperature": self.temperature,
                "max_new_tokens": self.max_new_tokens,
                "return_full_text": false,
                "stop": stop,
            },
            "options": { "wait_for_model": true },
        })
    }

    /// Parse `[{"generated_text": "..."}]` and trim anything from the first
    /// stop sequence onward (the API may leave it in the text).
    pub(crate) fn parse_response(
        json: serde_json::Value,
        stop: &[&str],
    ) -> Result<String, AgentError> {
        if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
            return Err(AgentError::Api(message.to_string()));
        }
        let text = json
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item["generated_text"].as_str())
            .ok_or_else(|| AgentError::Parse("missing generated_text".to_string()))?;

        let cut = stop
            .iter()
            .filter_map(|s| text.find(s))
            .min()
            .unwrap_or(text.len());
        Ok(text[..cut].to_string())
    }
}

#[async_trait]
impl LanguageModel for HuggingFaceTextGeneration {
    async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, AgentError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Text generation request");

        let mut request = self
            .http
            .post(self.api_url())
            .json(&self.build_request_body(prompt, stop));
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AgentError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::Api(format!("HTTP {status}: {text}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;

        Self::parse_response(json, stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HuggingFaceTextGeneration {
        HuggingFaceTextGeneration::new(&AgentConfig::default(), None).unwrap()
    }

    #[test]
    fn test_api_url() {
        assert_eq!(
            client().api_url(),
            "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2"
        );
    }

    #[test]
    fn test_request_body_carries_sampling_parameters() {
        let body = client().build_request_body("Question: hi", &["\nObservation:"]);
        assert_eq!(body["inputs"], "Question: hi");
        assert_eq!(body["parameters"]["temperature"], 0.01);
        assert_eq!(body["parameters"]["max_new_tokens"], 512);
        assert_eq!(body["parameters"]["return_full_text"], false);
        assert_eq!(body["parameters"]["stop"][0], "\nObservation:");
    }

    #[test]
    fn test_parse_response_generated_text() {
        let json = serde_json::json!([{"generated_text": " I should look it up."}]);
        let text = HuggingFaceTextGeneration::parse_response(json, &[]).unwrap();
        assert_eq!(text, " I should look it up.");
    }

    #[test]
    fn test_parse_response_cuts_at_stop_sequence() {
        let json = serde_json::json!([{
            "generated_text": "Action: open_weather_map\nAction Input: Paris\nObservation: made up"
        }]);
        let text = HuggingFaceTextGeneration::parse_response(json, &["\nObservation:"]).unwrap();
        assert_eq!(text, "Action: open_weather_map\nAction Input: Paris");
    }

    #[test]
    fn test_parse_response_error_object() {
        let json = serde_json::json!({"error": "Rate limit reached"});
        let err = HuggingFaceTextGeneration::parse_response(json, &[]).unwrap_err();
        assert!(matches!(err, AgentError::Api(ref m) if m == "Rate limit reached"));
    }

    #[test]
    fn test_parse_response_missing_text() {
        let err =
            HuggingFaceTextGeneration::parse_response(serde_json::json!([]), &[]).unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }
}
