//! HTTP surface for citytemp.
//!
//! Thin warp filters over the city client and the refresh cycle.

mod error_mapping;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error_mapping::{handle_rejection, ApiRejection, ErrorBody};
pub use routes::routes;
pub use state::ApiState;
