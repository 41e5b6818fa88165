use anyhow::{Context, Result};

use citytemp_core::{DatabaseLocation, Settings};
use citytemp_services::{CityClient, SqliteCityStore};
use citytemp_weather::WeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    citytemp_core::init()?;

    let (settings, _) = Settings::load_validated()?;

    let store = match settings.database_location()? {
        DatabaseLocation::Memory => {
            tracing::warn!("Using an in-memory database; data is lost on exit");
            SqliteCityStore::in_memory()?
        }
        DatabaseLocation::File(path) => SqliteCityStore::new(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?,
    };

    let cities = CityClient::new(store);
    let weather = WeatherClient::new(
        settings.weather_api_key.clone(),
        settings.weather_api_url.clone(),
    )?;

    let state = citytemp_api::ApiState::new(cities, weather, settings.project_name.clone());
    let addr = settings.socket_addr()?;

    let (bound, server) = warp::serve(citytemp_api::routes(state))
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("{} listening on http://{}", settings.project_name, bound);
    server.await;
    tracing::info!("{} stopped", settings.project_name);

    Ok(())
}
