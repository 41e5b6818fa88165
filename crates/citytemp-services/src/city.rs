//! City and temperature records as exchanged with storage and API callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named location that owns a history of temperature readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub additional_info: Option<String>,
}

/// Request to create a city.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityCreate {
    pub name: String,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// Partial city update; only `Some` fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// One timestamped reading with its owning city attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub id: i64,
    pub date_time: DateTime<Utc>,
    pub temperature: f64,
    pub city: City,
}

/// A reading to insert; `date_time` defaults to insertion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTemperature {
    pub city_id: i64,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
}

impl NewTemperature {
    pub fn new(city_id: i64, temperature: f64) -> Self {
        Self {
            city_id,
            temperature,
            date_time: None,
        }
    }
}
