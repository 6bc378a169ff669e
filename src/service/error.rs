use thiserror::Error;
use axum::http::StatusCode;

use crate::{
    error::HttpError,
    models::maintenancemodel::MaintenanceStatus,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Maintenance request cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: MaintenanceStatus, to: MaintenanceStatus },

    #[error("Sync failed: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Transport(err.to_string())
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        if let ServiceError::Database(ref e) = error {
            tracing::error!("database failure: {}", e);
        }
        HttpError::new(error.to_string(), error.status_code())
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,

            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::Transport(_) => StatusCode::BAD_GATEWAY,

            ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,

            ServiceError::Storage(_)
            | ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(ServiceError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Transport("x".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ServiceError::InvalidTransition {
                from: MaintenanceStatus::Completed,
                to: MaintenanceStatus::Cancelled,
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn http_error_keeps_message() {
        let http: HttpError = ServiceError::NotFound("Property not found".into()).into();
        assert_eq!(http.status, StatusCode::NOT_FOUND);
        assert_eq!(http.message, "Property not found");

        let http: HttpError = ServiceError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(http.message.starts_with("Database error"));
    }
}
