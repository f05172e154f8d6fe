//! Weather provider seam and the OpenWeatherMap client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use weatherbot_core::config::WeatherConfig;

use crate::error::WeatherError;

/// Looks up current conditions for a free-text place name.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, location: &str) -> Result<WeatherReport, WeatherError>;
}

/// Current conditions at one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub country: Option<String>,
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u32,
    pub wind_speed: f64,
    pub wind_deg: Option<f64>,
    pub cloud_cover: Option<u32>,
    /// OpenWeatherMap unit system the numbers are expressed in.
    pub units: String,
}

impl WeatherReport {
    fn temperature_unit(&self) -> &'static str {
        match self.units.as_str() {
            "imperial" => "°F",
            "standard" => "K",
            _ => "°C",
        }
    }

    fn speed_unit(&self) -> &'static str {
        match self.units.as_str() {
            "imperial" => "mph",
            _ => "m/s",
        }
    }

    /// Multi-line summary handed to the model as the tool observation.
    pub fn describe(&self) -> String {
        let place = match self.country {
            Some(ref c) => format!("{}, {}", self.location, c),
            None => self.location.clone(),
        };
        let t = self.temperature_unit();
        let mut lines = vec![
            format!("In {place}, the current weather is as follows:"),
            format!("Detailed status: {}", self.description),
        ];
        match self.wind_deg {
            Some(deg) => lines.push(format!(
                "Wind speed: {} {}, direction: {}°",
                self.wind_speed,
                self.speed_unit(),
                deg
            )),
            None => lines.push(format!("Wind speed: {} {}", self.wind_speed, self.speed_unit())),
        }
        lines.push(format!("Humidity: {}%", self.humidity));
        lines.push("Temperature:".to_string());
        lines.push(format!("  - Current: {}{t}", self.temperature));
        lines.push(format!("  - High: {}{t}", self.temp_max));
        lines.push(format!("  - Low: {}{t}", self.temp_min));
        lines.push(format!("  - Feels like: {}{t}", self.feels_like));
        if let Some(clouds) = self.cloud_cover {
            lines.push(format!("Cloud cover: {clouds}%"));
        }
        lines.join("\n")
    }
}

// =============================================================================
// OpenWeatherMap
// =============================================================================

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    main: OwmMain,
    #[serde(default)]
    wind: Option<OwmWind>,
    #[serde(default)]
    clouds: Option<OwmClouds>,
    #[serde(default)]
    sys: Option<OwmSys>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    #[serde(default)]
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: u32,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: Option<String>,
}

/// OpenWeatherMap current-weather client.
pub struct OpenWeatherMapClient {
    endpoint: String,
    api_key: String,
    units: String,
    http: reqwest::Client,
}

impl OpenWeatherMapClient {
    pub fn new(config: &WeatherConfig, api_key: Option<String>) -> Result<Self, WeatherError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(WeatherError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            units: config.units.clone(),
            http,
        })
    }

    pub(crate) fn api_url(&self) -> String {
        format!("{}/weather", self.endpoint)
    }

    /// Interpret an OpenWeatherMap reply. `cod` arrives as a number on
    /// success and as a string on errors.
    pub(crate) fn parse_response(
        location: &str,
        units: &str,
        json: serde_json::Value,
    ) -> Result<WeatherReport, WeatherError> {
        let cod = match &json["cod"] {
            serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
            serde_json::Value::String(s) => s.parse().unwrap_or(0),
            _ => 200,
        };
        if cod == 404 {
            return Err(WeatherError::LocationNotFound(location.to_string()));
        }
        if cod != 200 {
            let message = json["message"].as_str().unwrap_or("unknown error");
            return Err(WeatherError::Api(format!("{cod}: {message}")));
        }

        let parsed: OwmResponse =
            serde_json::from_value(json).map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(WeatherReport {
            location: parsed.name,
            country: parsed.sys.and_then(|s| s.country),
            description: parsed
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.as_ref().map(|w| w.speed).unwrap_or(0.0),
            wind_deg: parsed.wind.and_then(|w| w.deg),
            cloud_cover: parsed.clouds.map(|c| c.all),
            units: units.to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    async fn current_weather(&self, location: &str) -> Result<WeatherReport, WeatherError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WeatherError::LocationNotFound(String::new()));
        }
        debug!(location = %location, "Weather request");

        let response = self
            .http
            .get(self.api_url())
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(WeatherError::LocationNotFound(location.to_string()));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("HTTP {status}: {e}")))?;

        Self::parse_response(location, &self.units, json)
    }
}
