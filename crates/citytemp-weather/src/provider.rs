use crate::types::{CurrentWeatherResponse, WeatherError};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

const USER_AGENT: &str = "citytemp/0.1.0";

/// Anything that can report the current temperature for a city name.
///
/// `None` means "no reading this cycle"; implementations never fail loudly.
pub trait TemperatureSource: Send + Sync {
    fn fetch_temperature(&self, city_name: &str) -> impl Future<Output = Option<f64>> + Send;
}

/// Client for the weather provider's current-conditions endpoint.
///
/// Uses transport defaults: no timeout override, no retries.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Current temperature in Celsius for `city_name`.
    ///
    /// Returns `None` on transport error, non-success status, or a body
    /// without `current.temp_c`.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_temperature(&self, city_name: &str) -> Option<f64> {
        match self.try_fetch_temperature(city_name).await {
            Ok(temperature) => {
                tracing::debug!("Fetched {} C for {}", temperature, city_name);
                Some(temperature)
            }
            Err(e) => {
                tracing::warn!("Error fetching weather for {}: {}", city_name, e);
                None
            }
        }
    }

    async fn try_fetch_temperature(&self, city_name: &str) -> Result<f64, WeatherError> {
        let url = format!("{}/current.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city_name), ("aqi", "no")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: CurrentWeatherResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        if let Some(location) = &body.location {
            tracing::debug!("Provider resolved {} to {}", city_name, location.name);
        }

        Ok(body.current.temp_c)
    }
}

impl TemperatureSource for WeatherClient {
    fn fetch_temperature(&self, city_name: &str) -> impl Future<Output = Option<f64>> + Send {
        WeatherClient::fetch_temperature(self, city_name)
    }
}
