use serde::Deserialize;

/// Body of the provider's `current.json` endpoint; only the fields we read.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeatherResponse {
    pub current: CurrentConditions,
    #[serde(default)]
    pub location: Option<ProviderLocation>,
}

/// Current conditions block
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in degrees Celsius
    pub temp_c: f64,
}

/// Location the provider resolved the query to
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderLocation {
    pub name: String,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
}
