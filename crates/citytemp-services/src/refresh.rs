//! Refresh cycle: fetch the current temperature for every city and store
//! the successful readings in one batch.
//!
//! Fetches run concurrently with no cap and no timeout beyond the transport
//! defaults, so a hung fetch stalls the whole cycle. Fine for a handful of
//! cities; revisit before the city list grows large.

use futures::future::join_all;

use citytemp_weather::TemperatureSource;

use crate::city::{City, NewTemperature};
use crate::city_client::CityClient;

/// Fetch and store the current temperature of every city.
///
/// Returns the bulk-insert outcome message. Cities whose fetch failed are
/// skipped for this cycle.
pub async fn refresh_all_temperatures<S>(cities: &CityClient, source: &S) -> String
where
    S: TemperatureSource,
{
    let all_cities = match cities.list_cities().await {
        Ok(all_cities) => all_cities,
        Err(e) => {
            tracing::error!("Could not load cities for refresh: {}", e);
            return format!("An error occurred: {}", e);
        }
    };

    tracing::info!("Refreshing temperatures for {} cities", all_cities.len());

    let readings = join_all(
        all_cities
            .iter()
            .map(|city| source.fetch_temperature(&city.name)),
    )
    .await;

    let batch = pair_readings(&all_cities, readings);
    tracing::info!(
        "Fetched {} of {} temperatures",
        batch.len(),
        all_cities.len()
    );

    cities.bulk_insert_temperatures(batch).await
}

/// Pair each city with its reading by position, dropping missing readings.
fn pair_readings(cities: &[City], readings: Vec<Option<f64>>) -> Vec<NewTemperature> {
    cities
        .iter()
        .zip(readings)
        .filter_map(|(city, reading)| reading.map(|t| NewTemperature::new(city.id, t)))
        .collect()
}
