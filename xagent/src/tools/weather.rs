//! Current weather via OpenWeather, with mock data when no key is set or the call fails.

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

pub const TOOL_GET_CURRENT_WEATHER: &str = "get_current_weather";

const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Celsius,
    Fahrenheit,
}

impl Unit {
    fn parse(s: Option<&str>) -> Self {
        match s.map(str::to_lowercase).as_deref() {
            Some("fahrenheit") => Unit::Fahrenheit,
            _ => Unit::Celsius,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
        }
    }

    fn openweather_units(self) -> &'static str {
        match self {
            Unit::Celsius => "metric",
            Unit::Fahrenheit => "imperial",
        }
    }
}

/// Tool output; serialized as pretty JSON with non-ASCII text kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: f64,
    pub unit: String,
    pub description: String,
    pub humidity: String,
    pub wind_speed: String,
    pub date: String,
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

fn now_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn clock(unix: i64) -> String {
    Local
        .timestamp_opt(unix, 0)
        .single()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn mock_report(location: &str, unit: Unit) -> WeatherReport {
    let temperature = match unit {
        Unit::Celsius => 25.0,
        Unit::Fahrenheit => 77.0,
    };
    WeatherReport {
        location: location.to_string(),
        temperature,
        unit: unit.symbol().to_string(),
        description: "晴".to_string(),
        humidity: "65%".to_string(),
        wind_speed: "8.5 m/s".to_string(),
        date: now_stamp(),
        sunrise: "06:00:00".to_string(),
        sunset: "18:00:00".to_string(),
    }
}

pub struct WeatherTool {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl WeatherTool {
    /// Without a key every call returns mock data.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_client(api_key, reqwest::Client::new())
    }

    pub fn with_client(api_key: Option<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        }
    }

    async fn fetch(&self, key: &str, location: &str, unit: Unit) -> Result<WeatherReport, String> {
        let response = self
            .client
            .get(OPENWEATHER_URL)
            .query(&[
                ("q", location),
                ("appid", key),
                ("units", unit.openweather_units()),
            ])
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;
        if !response.status().is_success() {
            return Err(format!("API error {}", response.status()));
        }
        let data: OwResponse = response
            .json()
            .await
            .map_err(|e| format!("bad response: {}", e))?;
        Ok(WeatherReport {
            location: data.name,
            temperature: data.main.temp,
            unit: unit.symbol().to_string(),
            description: data
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_default(),
            humidity: format!("{}%", data.main.humidity),
            wind_speed: format!("{} m/s", data.wind.speed),
            date: now_stamp(),
            sunrise: clock(data.sys.sunrise),
            sunset: clock(data.sys.sunset),
        })
    }

    async fn report(&self, location: &str, unit: Unit) -> WeatherReport {
        let Some(key) = &self.api_key else {
            tracing::debug!(location, "no OpenWeather key, using mock weather");
            return mock_report(location, unit);
        };
        match self.fetch(key, location, unit).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(location, error = %e, "weather lookup failed, using mock weather");
                mock_report(location, unit)
            }
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        TOOL_GET_CURRENT_WEATHER
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_GET_CURRENT_WEATHER.to_string(),
            description: Some("Get the current weather in a given location.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "City name, e.g. 北京 or San Francisco"
                    },
                    "unit": {
                        "type": "string",
                        "enum": ["celsius", "fahrenheit"]
                    }
                },
                "required": ["location"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let location = args
            .get("location")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'location'".to_string()))?;
        let unit = Unit::parse(args.get("unit").and_then(Value::as_str));
        let report = self.report(location, unit).await;
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| ToolSourceError::InvalidInput(e.to_string()))?;
        Ok(ToolCallContent { text })
    }
}
