use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{Datelike, Utc};

use crate::{
    db::{activitydb::ActivityExt, maintenancedb::MaintenanceExt, paymentdb::PaymentExt},
    dtos::reportdtos::{
        MonthlyPaymentsQueryDto, WilayaMetric, WilayaQueryDto, DEFAULT_ACTIVITY_LIMIT,
    },
    error::{ErrorMessage, HttpError},
    models::{
        activitymodel::ActivityLog, maintenancemodel::MaintenanceRequest, paymentmodel::Payment,
        propertymodel::Property,
    },
    service::aggregation::{
        build_monthly_report, compute_dashboard_stats, group_payments_by_month,
        group_properties_by_wilaya, group_rent_by_wilaya, maintenance_summary,
        payments_total_for_month, property_locations,
    },
    utils::geography::{moughataas_of, WILAYAS},
    AppState,
};

pub fn report_handler() -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/wilayas", get(get_wilaya_breakdown))
        .route("/payments/monthly", get(get_monthly_payments))
        .route("/monthly", get(get_monthly_report))
        .route("/maintenance", get(get_maintenance_summary))
        .route("/map", get(get_property_map))
}

/// Fresh copy of every collection. Without a database only properties exist.
struct Snapshot {
    properties: Vec<Property>,
    payments: Vec<Payment>,
    maintenance: Vec<MaintenanceRequest>,
    activity: Vec<ActivityLog>,
}

async fn snapshot(app_state: &AppState) -> Result<Snapshot, HttpError> {
    let properties = app_state.properties.get_properties().await?;

    let Some(db) = app_state.db_client.as_ref() else {
        return Ok(Snapshot {
            properties,
            payments: Vec::new(),
            maintenance: Vec::new(),
            activity: Vec::new(),
        });
    };

    let payments = db
        .get_payments(None)
        .await?
        .into_iter()
        .map(|p| p.payment)
        .collect();
    let maintenance = db
        .get_maintenance_requests()
        .await?
        .into_iter()
        .map(|m| m.request)
        .collect();
    let activity = db.get_activity(DEFAULT_ACTIVITY_LIMIT).await?;

    Ok(Snapshot {
        properties,
        payments,
        maintenance,
        activity,
    })
}

pub async fn get_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let snapshot = snapshot(&app_state).await?;
    let stats = compute_dashboard_stats(
        &snapshot.properties,
        &snapshot.payments,
        &snapshot.maintenance,
        &snapshot.activity,
    );

    let today = Utc::now().date_naive();
    let collected_this_month =
        payments_total_for_month(&snapshot.payments, today.year(), today.month());

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "stats": stats,
            "collectedThisMonth": collected_this_month,
            "recentActivity": snapshot.activity,
        }
    })))
}

pub async fn get_wilaya_breakdown(
    Query(query): Query<WilayaQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state.properties.get_properties().await?;
    let groups = match query.metric {
        WilayaMetric::Count => group_properties_by_wilaya(&properties, query.top),
        WilayaMetric::Rent => group_rent_by_wilaya(&properties, query.top),
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "metric": query.metric,
        "data": groups,
    })))
}

pub async fn get_monthly_payments(
    Query(query): Query<MonthlyPaymentsQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let snapshot = snapshot(&app_state).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": group_payments_by_month(&snapshot.payments, query.last),
    })))
}

pub async fn get_monthly_report(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state.properties.get_properties().await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": build_monthly_report(&properties),
    })))
}

pub async fn get_maintenance_summary(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let snapshot = snapshot(&app_state).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": maintenance_summary(&snapshot.maintenance),
    })))
}

pub async fn get_property_map(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state.properties.get_properties().await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": property_locations(&properties),
    })))
}

/// Wilayas and their moughataas for the property form.
pub async fn get_geography() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "success",
        "data": WILAYAS,
    }))
}

pub async fn get_moughataas(Path(wilaya): Path<String>) -> Result<impl IntoResponse, HttpError> {
    let moughataas = moughataas_of(&wilaya)
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UnknownWilaya.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": moughataas,
    })))
}
