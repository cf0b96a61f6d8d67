use super::http::{build_client, get_json, required_str};
use super::traits::{CachePolicy, Tool, ToolFailure, ToolFuture, ToolPolicy};
use crate::plan::ToolKind;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Current weather via Open-Meteo: geocode the location first, then fetch
/// current conditions. No API key required.
pub struct WeatherTool {
    client: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl WeatherTool {
    pub fn new() -> Self {
        Self {
            client: build_client(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
        }
    }

    /// Point both endpoints at a test server.
    pub fn with_base_urls(
        geocoding_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Self {
        Self {
            client: build_client(),
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        }
    }

    async fn geocode(&self, location: &str) -> Result<Value, ToolFailure> {
        let params = [
            ("name", location.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let payload = get_json(&self.client, &self.geocoding_url, &params).await?;

        payload
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .cloned()
            // No match is a semantic miss, not a network problem.
            .ok_or_else(|| ToolFailure::fatal(format!("could not geocode location: {location}")))
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WeatherTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Weather
    }

    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get current weather for a location using Open-Meteo. Returns temperature, wind, and weather code along with the resolved location."
    }

    fn policy(&self) -> ToolPolicy {
        ToolPolicy {
            timeout: Duration::from_secs(12),
            cache: CachePolicy::with_ttl(Duration::from_secs(300)),
            ..ToolPolicy::default()
        }
    }

    fn invoke<'a>(&'a self, input: &'a Value) -> ToolFuture<'a> {
        Box::pin(async move {
            let location = required_str(input, "location")?;
            let temperature_unit = input
                .get("temperature_unit")
                .and_then(Value::as_str)
                .unwrap_or("celsius");
            let wind_speed_unit = input
                .get("wind_speed_unit")
                .and_then(Value::as_str)
                .unwrap_or("kmh");
            let timezone = input
                .get("timezone")
                .and_then(Value::as_str)
                .unwrap_or("auto");

            let place = self.geocode(location).await?;
            let latitude = place.get("latitude").cloned().unwrap_or(Value::Null);
            let longitude = place.get("longitude").cloned().unwrap_or(Value::Null);
            let resolved = ["name", "admin1", "country"]
                .iter()
                .filter_map(|key| place.get(*key).and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(", ");

            let params = [
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                (
                    "current",
                    "temperature_2m,weather_code,wind_speed_10m".to_string(),
                ),
                ("temperature_unit", temperature_unit.to_string()),
                ("wind_speed_unit", wind_speed_unit.to_string()),
                ("timezone", timezone.to_string()),
            ];
            let forecast = get_json(&self.client, &self.forecast_url, &params).await?;
            let current = forecast.get("current").cloned().unwrap_or(json!({}));

            Ok(json!({
                "location_input": location,
                "location_resolved": resolved,
                "latitude": latitude,
                "longitude": longitude,
                "current": current,
            }))
        })
    }
}
