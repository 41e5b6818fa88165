pub mod city;
pub mod city_client;
pub mod city_store;
pub mod error;
pub mod refresh;

pub use city::{City, CityCreate, CityUpdate, NewTemperature, Temperature};
pub use city_client::CityClient;
pub use city_store::SqliteCityStore;
pub use error::{CityStoreError, CityStoreResult};
pub use refresh::refresh_all_temperatures;
