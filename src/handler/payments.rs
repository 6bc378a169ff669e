use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::paymentdb::PaymentExt,
    dtos::paymentdtos::{CreatePaymentDto, PaymentQueryDto},
    error::HttpError,
    AppState,
};

pub fn payment_handler() -> Router {
    Router::new().route("/", get(get_payments).post(create_payment))
}

pub async fn get_payments(
    Query(query): Query<PaymentQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = app_state.db()?.get_payments(query.property_id.as_deref()).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": payments,
        "total": payments.len(),
    })))
}

pub async fn create_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<CreatePaymentDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state.db()?.create_payment(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Payment recorded successfully",
            "data": payment,
        })),
    ))
}
