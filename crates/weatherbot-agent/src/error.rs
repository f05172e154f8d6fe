use thiserror::Error;
use weatherbot_core::WeatherbotError;

/// Errors from the language model pipeline.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("API error: {0}")]
    Api(String),
    #[error("rate limited")]
    RateLimited,
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("weather tool failed: {0}")]
    Weather(#[from] WeatherError),
}

/// Errors from the weather provider.
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The provider could not resolve the given place name.
    #[error("location not found: {0}")]
    LocationNotFound(String),
    #[error("missing API key")]
    MissingApiKey,
    #[error("API error: {0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<AgentError> for WeatherbotError {
    fn from(err: AgentError) -> Self {
        WeatherbotError::Agent(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_display() {
        assert_eq!(AgentError::RateLimited.to_string(), "rate limited");
        assert_eq!(
            AgentError::Api("HTTP 500".to_string()).to_string(),
            "API error: HTTP 500"
        );
        assert_eq!(
            AgentError::Network("reset".to_string()).to_string(),
            "network error: reset"
        );
    }

    #[test]
    fn test_weather_error_display() {
        assert_eq!(
            WeatherError::LocationNotFound("Atlantis".to_string()).to_string(),
            "location not found: Atlantis"
        );
        assert_eq!(WeatherError::MissingApiKey.to_string(), "missing API key");
    }

    #[test]
    fn test_weather_error_wraps_into_agent_error() {
        let err: AgentError = WeatherError::LocationNotFound("Atlantis".to_string()).into();
        assert!(matches!(
            err,
            AgentError::Weather(WeatherError::LocationNotFound(_))
        ));
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn test_agent_error_into_weatherbot_error() {
        let err: WeatherbotError = AgentError::RateLimited.into();
        assert!(matches!(err, WeatherbotError::Agent(_)));
    }
}
