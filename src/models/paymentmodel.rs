use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Bank,
    Check,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub property_id: String,
    pub amount: i64,
    pub payment_date: NaiveDate,
    pub month_covered: String,
    pub method: PaymentMethod,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Payment joined with the tenant and district of the property it settles.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithProperty {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub tenant_name: Option<String>,
    pub moughataa: Option<String>,
}
