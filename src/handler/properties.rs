use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::propertydtos::{PropertyFilter, PropertyInput},
    error::{ErrorMessage, HttpError},
    service::aggregation::filter_properties,
    AppState,
};

pub fn property_handler() -> Router {
    Router::new()
        .route("/", get(get_properties).post(create_property))
        .route("/search", get(search_properties))
        .route(
            "/:property_id",
            get(get_property).put(update_property).delete(delete_property),
        )
}

pub async fn get_properties(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state.properties.get_properties().await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": properties,
        "total": properties.len(),
    })))
}

pub async fn search_properties(
    Query(filter): Query<PropertyFilter>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state.properties.get_properties().await?;
    let matched = filter_properties(&properties, &filter);

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": matched,
        "total": matched.len(),
    })))
}

pub async fn get_property(
    Path(property_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .properties
        .get_property(&property_id)
        .await?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::PropertyNotFound.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": property,
    })))
}

pub async fn create_property(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<PropertyInput>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state.properties.create_property(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Property created successfully",
            "data": property,
        })),
    ))
}

pub async fn update_property(
    Path(property_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<PropertyInput>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .properties
        .update_property(&property_id, body)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Property updated successfully",
        "data": property,
    })))
}

/// The caller confirms before issuing this; payments and maintenance requests go with it.
pub async fn delete_property(
    Path(property_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.properties.delete_property(&property_id).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Property deleted successfully",
    })))
}
