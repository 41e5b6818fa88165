//! Route table.
//!
//! Path filters come before method filters so an unknown path is a 404
//! rather than a 405 from some other route's method check.

use std::convert::Infallible;

use serde::de::DeserializeOwned;
use warp::{Filter, Rejection, Reply};

use crate::error_mapping::handle_rejection;
use crate::handlers;
use crate::state::ApiState;

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Every route, with rejection handling and request tracing.
pub fn routes(state: ApiState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    cities(state.clone())
        .or(temperatures(state.clone()))
        .or(health(state))
        .recover(handle_rejection)
        .with(warp::trace::request())
}

/// `/cities/` collection and `/cities/{id}` item routes.
pub fn cities(state: ApiState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let collection = warp::path("cities").and(warp::path::end());
    let item = warp::path!("cities" / i64);

    let create = collection
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_city);

    let list = collection
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_cities);

    let get = item
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::get_city);

    let update = item
        .and(warp::put())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::update_city);

    let delete = item
        .and(warp::delete())
        .and(with_state(state))
        .and_then(handlers::delete_city);

    create.or(list).or(get).or(update).or(delete)
}

/// `/temperatures/` listing and the `/temperature/update/` refresh trigger.
pub fn temperatures(
    state: ApiState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path("temperatures")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handlers::TemperatureQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::list_temperatures);

    let refresh = warp::path!("temperature" / "update")
        .and(warp::post())
        .and(with_state(state))
        .and_then(handlers::update_temperatures);

    list.or(refresh)
}

pub fn health(state: ApiState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("health")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::health)
}

fn with_state(state: ApiState) -> impl Filter<Extract = (ApiState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}
