use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::to_string(&self).unwrap_or_default())
    }
}

#[derive(Debug, PartialEq)]
pub enum ErrorMessage {
    PropertyNotFound,
    UnknownWilaya,
    PaymentUnknownProperty,
    MaintenanceUnknownProperty,
    MaintenanceNotFound,
    BackendNotConfigured,
    SyncNotConfigured,
    NothingToSync,
}

impl ToString for ErrorMessage {
    fn to_string(&self) -> String {
        self.to_str().to_owned()
    }
}

impl ErrorMessage {
    fn to_str(&self) -> String {
        match self {
            ErrorMessage::PropertyNotFound => "Property not found".to_string(),
            ErrorMessage::UnknownWilaya => "Unknown wilaya".to_string(),
            ErrorMessage::PaymentUnknownProperty => {
                "Payment references an unknown property".to_string()
            }
            ErrorMessage::MaintenanceUnknownProperty => {
                "Maintenance request references an unknown property".to_string()
            }
            ErrorMessage::MaintenanceNotFound => "Maintenance request not found".to_string(),
            ErrorMessage::BackendNotConfigured => {
                "This operation needs a database backend; the service is running offline"
                    .to_string()
            }
            ErrorMessage::SyncNotConfigured => "No sync provider is configured".to_string(),
            ErrorMessage::NothingToSync => "There are no properties to sync".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        HttpError {
            message: message.into(),
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::NOT_FOUND,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn into_http_response(self) -> Response {
        let json_response = Json(ErrorResponse {
            status: "fail".to_string(),
            message: self.message.clone(),
        });

        (self.status, json_response).into_response()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpError: message: {}, status: {}",
            self.message, self.status
        )
    }
}

impl std::error::Error for HttpError {}

/// Malformed or incomplete JSON bodies answer like any other validation failure.
impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}
