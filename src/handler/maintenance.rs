use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::maintenancedb::MaintenanceExt,
    dtos::maintenancedtos::{CreateMaintenanceDto, UpdateMaintenanceStatusDto},
    error::HttpError,
    AppState,
};

pub fn maintenance_handler() -> Router {
    Router::new()
        .route("/", get(get_maintenance_requests).post(create_maintenance_request))
        .route("/:request_id", patch(update_maintenance_status))
}

pub async fn get_maintenance_requests(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let requests = app_state.db()?.get_maintenance_requests().await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": requests,
        "total": requests.len(),
    })))
}

pub async fn create_maintenance_request(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<CreateMaintenanceDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state.db()?.create_maintenance_request(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Maintenance request created successfully",
            "data": request,
        })),
    ))
}

pub async fn update_maintenance_status(
    Path(request_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<UpdateMaintenanceStatusDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state
        .db()?
        .update_maintenance_status(request_id, body)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Maintenance status updated",
        "data": request,
    })))
}
