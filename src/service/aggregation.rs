// service/aggregation.rs
//! Dashboard and report statistics.
//!
//! Everything here is a pure function over already-fetched snapshots of the
//! store's collections: no database access, no cached state. Handlers fetch the
//! collections per request and recompute.
use std::collections::HashMap;

use chrono::Datelike;
use serde::Serialize;

use crate::{
    dtos::propertydtos::{PropertyFilter, UtilityFilter},
    models::{
        activitymodel::ActivityLog,
        maintenancemodel::{MaintenanceRequest, MaintenanceStatus},
        paymentmodel::Payment,
        propertymodel::Property,
    },
    utils::geography,
};

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_properties: usize,
    pub expected_monthly_revenue: i64,
    pub total_arrears: i64,
    pub water_issues: usize,
    pub electricity_issues: usize,
    pub total_collected: i64,
    pub open_maintenance: usize,
    pub paid_on_time: usize,
    pub with_arrears: usize,
    pub collection_rate: f64,
    pub on_time_rate: f64,
    /// Size of the activity page the caller fetched, not the table total.
    pub recent_activity: usize,
}

/// Money totals clamp at `i64::MAX` instead of wrapping.
fn money_sum(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0, i64::saturating_add)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Pass empty slices for collections the caller does not have.
pub fn compute_dashboard_stats(
    properties: &[Property],
    payments: &[Payment],
    maintenance: &[MaintenanceRequest],
    activities: &[ActivityLog],
) -> DashboardStats {
    let total_properties = properties.len();
    let expected_monthly_revenue = money_sum(properties.iter().map(|p| p.monthly_rent));
    let total_arrears = money_sum(properties.iter().map(|p| p.arrears));
    let water_issues = properties.iter().filter(|p| !p.water_ok).count();
    let electricity_issues = properties.iter().filter(|p| !p.electricity_ok).count();
    let total_collected = money_sum(payments.iter().map(|p| p.amount));
    let open_maintenance = maintenance.iter().filter(|r| r.status.is_open()).count();
    let paid_on_time = properties.iter().filter(|p| p.arrears == 0).count();
    let with_arrears = properties.iter().filter(|p| p.has_arrears()).count();

    DashboardStats {
        total_properties,
        expected_monthly_revenue,
        total_arrears,
        water_issues,
        electricity_issues,
        total_collected,
        open_maintenance,
        paid_on_time,
        with_arrears,
        collection_rate: ratio(total_collected as f64, expected_monthly_revenue as f64),
        on_time_rate: ratio(paid_on_time as f64, total_properties as f64),
        recent_activity: activities.len(),
    }
}

/// Descending by value, ties by key so the output is deterministic.
fn rank_desc(map: HashMap<String, i64>, top: Option<usize>) -> Vec<(String, i64)> {
    let mut entries: Vec<(String, i64)> = map.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if let Some(n) = top {
        entries.truncate(n);
    }
    entries
}

pub fn group_properties_by_wilaya(
    properties: &[Property],
    top: Option<usize>,
) -> Vec<(String, i64)> {
    let mut counts: HashMap<String, i64> = HashMap::new();
    for p in properties {
        *counts.entry(p.wilaya.clone()).or_insert(0) += 1;
    }
    rank_desc(counts, top)
}

pub fn group_rent_by_wilaya(properties: &[Property], top: Option<usize>) -> Vec<(String, i64)> {
    let mut rents: HashMap<String, i64> = HashMap::new();
    for p in properties {
        let total = rents.entry(p.wilaya.clone()).or_insert(0);
        *total = total.saturating_add(p.monthly_rent);
    }
    rank_desc(rents, top)
}

/// "YYYY-MM" -> collected amount, oldest first, keeping only the last `last` periods.
pub fn group_payments_by_month(payments: &[Payment], last: Option<usize>) -> Vec<(String, i64)> {
    let mut months: HashMap<String, i64> = HashMap::new();
    for p in payments {
        let key = p.payment_date.format("%Y-%m").to_string();
        let total = months.entry(key).or_insert(0);
        *total = total.saturating_add(p.amount);
    }
    let mut entries: Vec<(String, i64)> = months.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    if let Some(n) = last {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }
    entries
}

pub fn payments_total_for_month(payments: &[Payment], year: i32, month: u32) -> i64 {
    money_sum(
        payments
            .iter()
            .filter(|p| p.payment_date.year() == year && p.payment_date.month() == month)
            .map(|p| p.amount),
    )
}

fn matches_text(p: &Property, needle: &str) -> bool {
    [&p.tenant_name, &p.owner_name, &p.wilaya, &p.moughataa, &p.neighborhood]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

pub fn filter_properties(properties: &[Property], filter: &PropertyFilter) -> Vec<Property> {
    let needle = filter
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    let wilaya = filter.wilaya.as_deref().map(str::trim).filter(|w| !w.is_empty());

    properties
        .iter()
        .filter(|p| needle.as_deref().map_or(true, |n| matches_text(p, n)))
        .filter(|p| wilaya.map_or(true, |w| p.wilaya == w))
        .filter(|p| filter.contract_type.map_or(true, |c| p.contract_type == c))
        .filter(|p| filter.has_arrears.map_or(true, |a| p.has_arrears() == a))
        .filter(|p| match filter.utility {
            None => true,
            Some(UtilityFilter::WaterIssue) => !p.water_ok,
            Some(UtilityFilter::ElectricityIssue) => !p.electricity_ok,
            Some(UtilityFilter::AllOk) => p.utilities_ok(),
        })
        .cloned()
        .collect()
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReportRow {
    pub property_id: String,
    pub moughataa: String,
    pub tenant_name: String,
    pub paid_in_full: bool,
    pub arrears: i64,
    pub water_ok: bool,
    pub electricity_ok: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReportSummary {
    pub total_properties: usize,
    pub paid_on_time: usize,
    pub delayed: usize,
    pub utility_compliant: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MonthlyReport {
    pub rows: Vec<MonthlyReportRow>,
    pub summary: MonthlyReportSummary,
}

pub fn build_monthly_report(properties: &[Property]) -> MonthlyReport {
    let rows = properties
        .iter()
        .map(|p| MonthlyReportRow {
            property_id: p.id.clone(),
            moughataa: p.moughataa.clone(),
            tenant_name: p.tenant_name.clone(),
            paid_in_full: p.arrears == 0,
            arrears: p.arrears,
            water_ok: p.water_ok,
            electricity_ok: p.electricity_ok,
        })
        .collect::<Vec<_>>();

    let summary = MonthlyReportSummary {
        total_properties: properties.len(),
        paid_on_time: rows.iter().filter(|r| r.paid_in_full).count(),
        delayed: rows.iter().filter(|r| !r.paid_in_full).count(),
        utility_compliant: properties.iter().filter(|p| p.utilities_ok()).count(),
    };

    MonthlyReport { rows, summary }
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSummary {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Sum of actual costs over completed requests.
    pub total_cost: i64,
}

pub fn maintenance_summary(requests: &[MaintenanceRequest]) -> MaintenanceSummary {
    let mut summary = MaintenanceSummary::default();
    for r in requests {
        match r.status {
            MaintenanceStatus::Pending => summary.pending += 1,
            MaintenanceStatus::InProgress => summary.in_progress += 1,
            MaintenanceStatus::Completed => {
                summary.completed += 1;
                summary.total_cost = summary.total_cost.saturating_add(r.actual_cost);
            }
            MaintenanceStatus::Cancelled => summary.cancelled += 1,
        }
    }
    summary
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyLocation {
    pub property_id: String,
    pub wilaya: String,
    pub moughataa: String,
    pub tenant_name: String,
    pub lat: f64,
    pub lng: f64,
    pub has_arrears: bool,
}

/// Map markers. Properties outside the geography table are skipped.
pub fn property_locations(properties: &[Property]) -> Vec<PropertyLocation> {
    properties
        .iter()
        .filter_map(|p| {
            let point = geography::coordinates_for(&p.wilaya, &p.moughataa)?;
            Some(PropertyLocation {
                property_id: p.id.clone(),
                wilaya: p.wilaya.clone(),
                moughataa: p.moughataa.clone(),
                tenant_name: p.tenant_name.clone(),
                lat: point.lat,
                lng: point.lng,
                has_arrears: p.has_arrears(),
            })
        })
        .collect()
}
