use std::sync::Arc;

use axum::{extract::Query, response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    db::activitydb::ActivityExt, dtos::reportdtos::ActivityQueryDto, error::HttpError, AppState,
};

pub fn activity_handler() -> Router {
    Router::new().route("/", get(get_activity))
}

pub async fn get_activity(
    Query(query): Query<ActivityQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let entries = app_state.db()?.get_activity(query.effective_limit()).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": entries,
    })))
}
