//! Request handlers: pass-through to the city client and the refresh cycle.

use serde::{Deserialize, Serialize};
use warp::{Rejection, Reply};

use citytemp_services::{refresh_all_temperatures, CityCreate, CityUpdate};

use crate::error_mapping::ApiRejection;
use crate::state::ApiState;

/// Query string of `GET /temperatures/`.
#[derive(Debug, Default, Deserialize)]
pub struct TemperatureQuery {
    pub city_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub project: String,
}

fn reject(e: impl Into<ApiRejection>) -> Rejection {
    warp::reject::custom(e.into())
}

pub async fn create_city(input: CityCreate, state: ApiState) -> Result<impl Reply, Rejection> {
    let city = state.cities.create_city(input).await.map_err(reject)?;
    Ok(warp::reply::json(&city))
}

pub async fn list_cities(state: ApiState) -> Result<impl Reply, Rejection> {
    let cities = state.cities.list_cities().await.map_err(reject)?;
    Ok(warp::reply::json(&cities))
}

pub async fn get_city(id: i64, state: ApiState) -> Result<impl Reply, Rejection> {
    let city = state.cities.get_city(id).await.map_err(reject)?;
    Ok(warp::reply::json(&city))
}

pub async fn update_city(
    id: i64,
    update: CityUpdate,
    state: ApiState,
) -> Result<impl Reply, Rejection> {
    let city = state.cities.update_city(id, update).await.map_err(reject)?;
    Ok(warp::reply::json(&city))
}

pub async fn delete_city(id: i64, state: ApiState) -> Result<impl Reply, Rejection> {
    let message = state.cities.delete_city(id).await.map_err(reject)?;
    Ok(warp::reply::json(&message))
}

/// All temperatures, or only those of `city_id` when given.
pub async fn list_temperatures(
    query: TemperatureQuery,
    state: ApiState,
) -> Result<impl Reply, Rejection> {
    let temperatures = match query.city_id {
        Some(city_id) => state.cities.list_temperatures_for_city(city_id).await,
        None => state.cities.list_temperatures().await,
    };
    Ok(warp::reply::json(&temperatures))
}

/// Run one refresh cycle over every city.
pub async fn update_temperatures(state: ApiState) -> Result<impl Reply, Rejection> {
    let message = refresh_all_temperatures(&state.cities, state.weather.as_ref()).await;
    Ok(warp::reply::json(&message))
}

pub async fn health(state: ApiState) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&HealthStatus {
        status: "ok".to_string(),
        project: state.project_name,
    }))
}
