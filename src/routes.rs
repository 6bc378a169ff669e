// routes.rs
use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        activity::activity_handler, maintenance::maintenance_handler, payments::payment_handler,
        properties::property_handler,
        reports::{get_geography, get_moughataas, report_handler},
        sync::sync_handler,
    },
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/properties", property_handler())
        .nest("/payments", payment_handler())
        .nest("/maintenance", maintenance_handler())
        .nest("/activity", activity_handler())
        .nest("/reports", report_handler())
        .nest("/sync", sync_handler())
        .route("/geography", get(get_geography))
        .route("/geography/:wilaya", get(get_moughataas))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
