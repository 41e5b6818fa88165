use std::sync::Arc;

use citytemp_services::CityClient;
use citytemp_weather::WeatherClient;

/// Shared handles passed to every handler.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub cities: CityClient,
    pub weather: Arc<WeatherClient>,
    pub project_name: String,
}

impl ApiState {
    pub fn new(
        cities: CityClient,
        weather: WeatherClient,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            cities,
            weather: Arc::new(weather),
            project_name: project_name.into(),
        }
    }
}
