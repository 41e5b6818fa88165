//! Async city client over the SQLite store.
//!
//! Every call runs on tokio's blocking pool behind a mutex. Single-city
//! mutations report typed errors; temperature reads and the bulk insert are
//! best effort and never fail the caller.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::instrument;

use crate::city::{City, CityCreate, CityUpdate, NewTemperature, Temperature};
use crate::city_store::SqliteCityStore;
use crate::error::{CityStoreError, CityStoreResult};

/// Shareable handle to the city store.
#[derive(Clone)]
pub struct CityClient {
    store: Arc<Mutex<SqliteCityStore>>,
}

impl CityClient {
    pub fn new(store: SqliteCityStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a store operation on the blocking pool.
    async fn run<T, F>(&self, op: F) -> CityStoreResult<T>
    where
        F: FnOnce(&SqliteCityStore) -> CityStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(&store.lock()))
            .await
            .map_err(|e| CityStoreError::storage(format!("Storage task failed: {}", e)))?
    }

    /// Create a new city.
    #[instrument(skip(self), level = "info")]
    pub async fn create_city(&self, input: CityCreate) -> CityStoreResult<City> {
        self.run(move |store| store.create_city(&input)).await
    }

    /// Get a city by ID.
    ///
    /// # Errors
    /// Returns `CityStoreError::NotFound` if the city doesn't exist.
    #[instrument(skip(self), level = "info")]
    pub async fn get_city(&self, id: i64) -> CityStoreResult<City> {
        let result = self.run(move |store| store.get_city(id)).await;
        if let Err(CityStoreError::NotFound(_)) = result {
            tracing::warn!("City with ID {} not found.", id);
        }
        result
    }

    /// List all cities.
    pub async fn list_cities(&self) -> CityStoreResult<Vec<City>> {
        self.run(|store| store.list_cities()).await
    }

    /// Update the fields present in `update`.
    #[instrument(skip(self), level = "info")]
    pub async fn update_city(&self, id: i64, update: CityUpdate) -> CityStoreResult<City> {
        let result = self.run(move |store| store.update_city(id, &update)).await;
        if let Err(CityStoreError::NotFound(_)) = result {
            tracing::warn!("City with ID {} not found for update.", id);
        }
        result
    }

    /// Delete a city and its temperatures.
    #[instrument(skip(self), level = "info")]
    pub async fn delete_city(&self, id: i64) -> CityStoreResult<String> {
        self.run(move |store| store.delete_city(id)).await
    }

    /// Insert all records in one transaction and describe the outcome.
    ///
    /// A failed batch is rolled back and reported in the returned message.
    pub async fn bulk_insert_temperatures(&self, records: Vec<NewTemperature>) -> String {
        tracing::info!("Starting to insert temperatures for {} cities", records.len());

        match self.run(move |store| store.insert_temperatures(&records)).await {
            Ok(count) => {
                tracing::info!("Successfully inserted temperatures for {} cities", count);
                format!("Temperatures for {} cities have been updated.", count)
            }
            Err(e) => {
                tracing::error!("An error occurred while inserting temperatures: {}", e);
                format!("An error occurred: {}", e)
            }
        }
    }

    /// All temperatures, or an empty list if the read fails.
    pub async fn list_temperatures(&self) -> Vec<Temperature> {
        tracing::info!("Fetching all temperatures from the database.");

        match self.run(|store| store.list_temperatures()).await {
            Ok(temperatures) => {
                tracing::info!("Successfully retrieved {} temperatures.", temperatures.len());
                temperatures
            }
            Err(e) => {
                tracing::error!("An error occurred while fetching temperatures: {}", e);
                Vec::new()
            }
        }
    }

    /// Temperatures for one city, or an empty list if the read fails.
    pub async fn list_temperatures_for_city(&self, city_id: i64) -> Vec<Temperature> {
        tracing::info!("Fetching temperatures for city with ID: {}", city_id);

        match self
            .run(move |store| store.list_temperatures_for_city(city_id))
            .await
        {
            Ok(temperatures) => {
                tracing::info!(
                    "Successfully retrieved {} temperatures for city ID: {}",
                    temperatures.len(),
                    city_id
                );
                temperatures
            }
            Err(e) => {
                tracing::error!(
                    "An error occurred while fetching temperatures for city ID {}: {}",
                    city_id,
                    e
                );
                Vec::new()
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> Arc<Mutex<SqliteCityStore>> {
        self.store.clone()
    }
}

impl std::fmt::Debug for CityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CityClient").finish_non_exhaustive()
    }
}
