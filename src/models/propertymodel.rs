use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_PROPERTY_STATUS: &str = "active";

/// Ids assigned here are v4 UUIDs. Records imported from older exports keep
/// whatever opaque id they were created with.
pub fn new_property_id() -> String {
    Uuid::new_v4().to_string()
}

// Arabic aliases accept rows exported by the spreadsheet front end.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "property_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    #[serde(alias = "منزل أرضي")]
    Ground,
    #[serde(alias = "طابق")]
    Story,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "contract_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    #[serde(alias = "بعقد")]
    WithContract,
    #[serde(alias = "بدون عقد")]
    WithoutContract,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_system", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentSystem {
    #[serde(alias = "مقدم")]
    Prepaid,
    #[serde(alias = "نهاية الشهر")]
    EndOfMonth,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,

    // Location
    pub wilaya: String,
    pub moughataa: String,
    pub neighborhood: String,
    pub house_number: String,

    // Specification
    pub rooms_count: i32,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default)]
    pub accessories: String,

    // Owner
    pub owner_name: String,
    pub owner_phone: String,
    pub owner_id: String,

    // Tenant
    pub tenant_name: String,
    pub tenant_phone: String,
    pub tenant_id: String,

    // Contract
    pub contract_date: NaiveDate,
    pub contract_type: ContractType,

    // Financial
    pub monthly_rent: i64,
    pub payment_system: PaymentSystem,
    #[serde(default)]
    pub arrears: i64,

    // Utilities (SNDE water, SOMELEC electricity)
    #[serde(rename = "sndeStatus")]
    pub water_ok: bool,
    #[serde(rename = "somelecStatus")]
    pub electricity_ok: bool,

    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_status() -> String {
    DEFAULT_PROPERTY_STATUS.to_string()
}

impl Property {
    pub fn has_arrears(&self) -> bool {
        self.arrears > 0
    }

    pub fn utilities_ok(&self) -> bool {
        self.water_ok && self.electricity_ok
    }

    /// Short label used in activity descriptions.
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.moughataa, self.house_number, self.tenant_name)
    }
}
