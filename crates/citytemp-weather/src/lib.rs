//! Weather provider client for citytemp
//!
//! Fetches the current temperature for a city by name. Failures are logged
//! and reported as "no reading" so a refresh cycle can skip that city.

pub mod provider;
pub mod types;

pub use provider::{TemperatureSource, WeatherClient};
pub use types::*;
