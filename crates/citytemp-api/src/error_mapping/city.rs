use citytemp_core::{AppError, DatabaseError};
use citytemp_services::CityStoreError;

use super::ApiRejection;

impl From<CityStoreError> for ApiRejection {
    fn from(e: CityStoreError) -> Self {
        let app_error = match e {
            CityStoreError::NotFound(_) => AppError::NotFound("City not found.".into()),
            CityStoreError::Conflict(name) => {
                AppError::Conflict(format!("City with name '{}' already exists.", name))
            }
            CityStoreError::Validation(msg) => AppError::Validation(msg),
            CityStoreError::Storage(msg) => AppError::Database(DatabaseError::QueryFailed(msg)),
        };
        ApiRejection(app_error)
    }
}
