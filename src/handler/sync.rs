use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;

use crate::{
    dtos::reportdtos::PullRequestDto,
    error::{ErrorMessage, HttpError},
    service::sync::SyncTarget,
    AppState, LastSync,
};

pub fn sync_handler() -> Router {
    Router::new()
        .route("/status", get(get_sync_status))
        .route("/push", post(push_properties))
        .route("/pull", post(pull_properties))
}

fn target(app_state: &AppState) -> Result<Arc<dyn SyncTarget>, HttpError> {
    app_state
        .sync_target
        .clone()
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::SyncNotConfigured.to_string()))
}

pub async fn get_sync_status(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let last_sync = app_state.last_sync.read().await.clone();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "provider": app_state.sync_target.as_ref().map(|t| t.name()),
            "lastSync": last_sync,
        }
    })))
}

pub async fn push_properties(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let target = target(&app_state)?;
    let properties = app_state.properties.get_properties().await?;

    let report = target.push(&properties).await?;

    *app_state.last_sync.write().await = Some(LastSync {
        direction: "push",
        count: report.pushed,
        at: Utc::now(),
    });

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": format!("{} properties pushed to {}", report.pushed, report.target),
        "data": report,
    })))
}

/// Without `confirm` the remote collection is fetched and counted only; with it
/// the local collection is replaced wholesale.
pub async fn pull_properties(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<PullRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    let target = target(&app_state)?;
    let remote = target.pull().await?;

    if !body.confirm {
        return Ok(Json(serde_json::json!({
            "status": "success",
            "message": "Confirm the pull to replace local properties",
            "data": {
                "fetched": remote.len(),
                "replaced": false,
            }
        })));
    }

    let count = app_state.properties.replace_properties(remote).await?;

    *app_state.last_sync.write().await = Some(LastSync {
        direction: "pull",
        count,
        at: Utc::now(),
    });

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": format!("{} properties pulled from {}", count, target.name()),
        "data": {
            "fetched": count,
            "replaced": true,
        }
    })))
}
