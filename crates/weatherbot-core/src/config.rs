use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, WeatherbotError};

/// Environment variable holding the Hugging Face Inference API token.
pub const HUGGINGFACE_TOKEN_ENV: &str = "HUGGINGFACEHUB_API_TOKEN";
/// Environment variable holding the OpenWeatherMap API key.
pub const OPENWEATHERMAP_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

/// Top-level configuration for Weatherbot.
///
/// Loaded from `~/.weatherbot/config.toml` by default. Secrets are never
/// read from this file; see [`HUGGINGFACE_TOKEN_ENV`] and
/// [`OPENWEATHERMAP_KEY_ENV`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherbotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
}

impl WeatherbotConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WeatherbotConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| WeatherbotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP shell settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests allowed per second across all chat routes.
    pub rate_limit_per_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            rate_limit_per_sec: 20,
        }
    }
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum user message length in characters.
    pub max_message_length: usize,
    /// Idle minutes after which a session is discarded.
    pub session_timeout_minutes: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
            session_timeout_minutes: 30,
        }
    }
}

/// Which entity classifier backs location detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorBackend {
    /// Hosted token-classification model.
    Huggingface,
    /// Offline list of known place names.
    Gazetteer,
}

/// Location detector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub backend: DetectorBackend,
    /// Base URL of the inference API (the model id is appended).
    pub endpoint: String,
    pub model: String,
    /// A location counts only when the classifier score is strictly above this.
    pub min_score: f32,
    pub timeout_secs: u64,
    /// Additional place names for the gazetteer backend.
    pub extra_locations: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::Huggingface,
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model: "dslim/bert-base-NER-uncased".to_string(),
            min_score: 0.9,
            timeout_secs: 30,
            extra_locations: Vec::new(),
        }
    }
}

/// Language model and tool-loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Base URL of the inference API (the model id is appended).
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_new_tokens: u32,
    /// Upper bound on model calls per turn.
    pub max_iterations: u32,
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            temperature: 0.01,
            max_new_tokens: 512,
            max_iterations: 4,
            timeout_secs: 60,
        }
    }
}

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub endpoint: String,
    /// OpenWeatherMap units: "metric", "imperial" or "standard".
    pub units: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openweathermap.org/data/2.5".to_string(),
            units: "metric".to_string(),
            timeout_secs: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = WeatherbotConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.chat.max_message_length, 2000);
        assert_eq!(config.detector.backend, DetectorBackend::Huggingface);
        assert_eq!(config.detector.model, "dslim/bert-base-NER-uncased");
        assert_eq!(config.detector.min_score, 0.9);
        assert_eq!(config.agent.model, "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(config.agent.temperature, 0.01);
        assert_eq!(config.agent.max_iterations, 4);
        assert_eq!(config.weather.units, "metric");
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[server]
host = "0.0.0.0"
port = 8080
rate_limit_per_sec = 5

[detector]
backend = "gazetteer"
min_score = 0.95
extra_locations = ["Smallville"]

[agent]
max_iterations = 6

[weather]
units = "imperial"
"#;
        let file = create_temp_config(content);
        let config = WeatherbotConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.rate_limit_per_sec, 5);
        assert_eq!(config.detector.backend, DetectorBackend::Gazetteer);
        assert_eq!(config.detector.min_score, 0.95);
        assert_eq!(config.detector.extra_locations, vec!["Smallville"]);
        assert_eq!(config.agent.max_iterations, 6);
        assert_eq!(config.weather.units, "imperial");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[agent]
temperature = 0.2
"#;
        let file = create_temp_config(content);
        let config = WeatherbotConfig::load(file.path()).unwrap();
        assert_eq!(config.agent.temperature, 0.2);
        assert_eq!(config.agent.max_iterations, 4);
        assert_eq!(config.agent.model, "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(config.chat.session_timeout_minutes, 30);
    }

    #[test]
    fn test_load_rejects_unknown_backend() {
        let file = create_temp_config("[detector]\nbackend = \"spacy\"\n");
        let err = WeatherbotConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, WeatherbotError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = WeatherbotConfig::load(Path::new("/nonexistent/weatherbot.toml")).unwrap_err();
        assert!(matches!(err, WeatherbotError::Io(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = WeatherbotConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.server.port, 3030);
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let file = create_temp_config("[server\nport = 9000\n");
        let config = WeatherbotConfig::load_or_default(file.path());
        assert_eq!(config.server.port, 3030);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = WeatherbotConfig::default();
        config.detector.backend = DetectorBackend::Gazetteer;
        config.server.port = 4040;
        config.save(&path).unwrap();

        let reloaded = WeatherbotConfig::load(&path).unwrap();
        assert_eq!(reloaded.detector.backend, DetectorBackend::Gazetteer);
        assert_eq!(reloaded.server.port, 4040);
        assert_eq!(reloaded.agent.max_iterations, config.agent.max_iterations);
    }
}
