use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    models::propertymodel::{
        ContractType, PaymentSystem, Property, PropertyKind, DEFAULT_PROPERTY_STATUS,
    },
    utils::geography,
};

/// Full property record as submitted by the form, for both create and update.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_location"))]
pub struct PropertyInput {
    #[validate(length(min = 1, message = "Wilaya is required"))]
    pub wilaya: String,

    #[validate(length(min = 1, message = "Moughataa is required"))]
    pub moughataa: String,

    #[validate(
        length(min = 1, max = 200, message = "Neighborhood is required"),
        custom = "validate_not_blank"
    )]
    pub neighborhood: String,

    #[validate(
        length(min = 1, max = 50, message = "House number is required"),
        custom = "validate_not_blank"
    )]
    pub house_number: String,

    #[validate(range(min = 1, message = "A property has at least one room"))]
    pub rooms_count: i32,

    #[serde(rename = "type")]
    pub kind: PropertyKind,

    #[serde(default)]
    pub accessories: String,

    #[validate(
        length(min = 1, message = "Owner name is required"),
        custom = "validate_not_blank"
    )]
    pub owner_name: String,

    #[validate(
        length(min = 1, message = "Owner phone is required"),
        custom = "validate_not_blank"
    )]
    pub owner_phone: String,

    #[validate(
        length(min = 1, message = "Owner national id is required"),
        custom = "validate_not_blank"
    )]
    pub owner_id: String,

    #[validate(
        length(min = 1, message = "Tenant name is required"),
        custom = "validate_not_blank"
    )]
    pub tenant_name: String,

    #[validate(
        length(min = 1, message = "Tenant phone is required"),
        custom = "validate_not_blank"
    )]
    pub tenant_phone: String,

    #[validate(
        length(min = 1, message = "Tenant national id is required"),
        custom = "validate_not_blank"
    )]
    pub tenant_id: String,

    pub contract_date: NaiveDate,
    pub contract_type: ContractType,

    #[validate(range(
        min = 0,
        max = 1000000000,
        message = "Monthly rent must be between 0 and 1,000,000,000"
    ))]
    pub monthly_rent: i64,

    pub payment_system: PaymentSystem,

    #[serde(default)]
    #[validate(range(
        min = 0,
        max = 1000000000000,
        message = "Arrears must be between 0 and 1,000,000,000,000"
    ))]
    pub arrears: i64,

    #[serde(rename = "sndeStatus")]
    #[validate(required(message = "Water service status is required"))]
    pub water_ok: Option<bool>,

    #[serde(rename = "somelecStatus")]
    #[validate(required(message = "Electricity service status is required"))]
    pub electricity_ok: Option<bool>,

    #[serde(default)]
    pub notes: String,

    pub status: Option<String>,
}

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if !value.trim().is_empty() {
        return Ok(());
    }
    let mut error = ValidationError::new("blank");
    error.message = Some(Cow::from("must not be blank"));
    Err(error)
}

fn validate_location(input: &PropertyInput) -> Result<(), ValidationError> {
    if geography::is_valid_location(&input.wilaya, &input.moughataa) {
        return Ok(());
    }
    let mut error = ValidationError::new("unknown_location");
    error.message = Some(Cow::from(format!(
        "'{}' is not a moughataa of wilaya '{}'",
        input.moughataa.trim(),
        input.wilaya.trim()
    )));
    Err(error)
}

impl PropertyInput {
    /// Builds the stored record. Call only after `validate()` succeeded.
    pub fn into_property(self, id: String, created_at: DateTime<Utc>) -> Property {
        Property {
            id,
            wilaya: self.wilaya.trim().to_string(),
            moughataa: self.moughataa.trim().to_string(),
            neighborhood: self.neighborhood,
            house_number: self.house_number,
            rooms_count: self.rooms_count,
            kind: self.kind,
            accessories: self.accessories,
            owner_name: self.owner_name,
            owner_phone: self.owner_phone,
            owner_id: self.owner_id,
            tenant_name: self.tenant_name,
            tenant_phone: self.tenant_phone,
            tenant_id: self.tenant_id,
            contract_date: self.contract_date,
            contract_type: self.contract_type,
            monthly_rent: self.monthly_rent,
            payment_system: self.payment_system,
            arrears: self.arrears,
            water_ok: self.water_ok.unwrap_or_default(),
            electricity_ok: self.electricity_ok.unwrap_or_default(),
            notes: self.notes,
            status: self
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROPERTY_STATUS.to_string()),
            created_at,
        }
    }
}

impl From<&Property> for PropertyInput {
    fn from(p: &Property) -> Self {
        PropertyInput {
            wilaya: p.wilaya.clone(),
            moughataa: p.moughataa.clone(),
            neighborhood: p.neighborhood.clone(),
            house_number: p.house_number.clone(),
            rooms_count: p.rooms_count,
            kind: p.kind,
            accessories: p.accessories.clone(),
            owner_name: p.owner_name.clone(),
            owner_phone: p.owner_phone.clone(),
            owner_id: p.owner_id.clone(),
            tenant_name: p.tenant_name.clone(),
            tenant_phone: p.tenant_phone.clone(),
            tenant_id: p.tenant_id.clone(),
            contract_date: p.contract_date,
            contract_type: p.contract_type,
            monthly_rent: p.monthly_rent,
            payment_system: p.payment_system,
            arrears: p.arrears,
            water_ok: Some(p.water_ok),
            electricity_ok: Some(p.electricity_ok),
            notes: p.notes.clone(),
            status: Some(p.status.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UtilityFilter {
    WaterIssue,
    ElectricityIssue,
    AllOk,
}

/// Search criteria; every supplied criterion must match.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    /// Case-insensitive substring over tenant, owner and location fields.
    pub q: Option<String>,
    pub wilaya: Option<String>,
    pub contract_type: Option<ContractType>,
    pub has_arrears: Option<bool>,
    pub utility: Option<UtilityFilter>,
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub fn input(tenant: &str, wilaya: &str, moughataa: &str) -> PropertyInput {
        PropertyInput {
            wilaya: wilaya.to_string(),
            moughataa: moughataa.to_string(),
            neighborhood: "Ilot K".to_string(),
            house_number: "112".to_string(),
            rooms_count: 3,
            kind: PropertyKind::Ground,
            accessories: String::new(),
            owner_name: "Sidi Mohamed".to_string(),
            owner_phone: "22233445".to_string(),
            owner_id: "1234567890".to_string(),
            tenant_name: tenant.to_string(),
            tenant_phone: "46778899".to_string(),
            tenant_id: "0987654321".to_string(),
            contract_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            contract_type: ContractType::WithContract,
            monthly_rent: 10000,
            payment_system: PaymentSystem::EndOfMonth,
            arrears: 0,
            water_ok: Some(true),
            electricity_ok: Some(true),
            notes: String::new(),
            status: None,
        }
    }

    pub fn nkc_input(tenant: &str) -> PropertyInput {
        input(tenant, "نواكشوط الغربية", "تفرغ زينة")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::propertymodel::new_property_id;

    #[test]
    fn valid_input_passes() {
        assert!(nkc_input("Ahmed Salem").validate().is_ok());
    }

    #[test]
    fn rejects_unknown_geography() {
        let bad = input("Ahmed", "آدرار", "تفرغ زينة");
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("not a moughataa"));
    }

    #[test]
    fn rejects_missing_fields_and_negative_money() {
        let mut bad = nkc_input("");
        bad.rooms_count = 0;
        bad.arrears = -5;
        bad.water_ok = None;
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 4);
        let message = errors.to_string();
        assert!(message.contains("Tenant name is required"));
        assert!(message.contains("at least one room"));
        assert!(message.contains("Arrears must be between 0"));
        assert!(message.contains("Water service status is required"));
    }

    #[test]
    fn whitespace_only_names_are_rejected() {
        let mut bad = nkc_input("   ");
        bad.owner_phone = "\t".to_string();
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
        assert!(errors.to_string().contains("must not be blank"));
    }

    #[test]
    fn money_fields_have_upper_bounds() {
        let mut bad = nkc_input("Ahmed");
        bad.monthly_rent = i64::MAX;
        bad.arrears = i64::MAX;
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);

        let mut ok = nkc_input("Ahmed");
        ok.monthly_rent = 1_000_000_000;
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn status_defaults_to_active() {
        let property = nkc_input("Ahmed").into_property(new_property_id(), Utc::now());
        assert_eq!(property.status, "active");
        assert!(property.water_ok);
    }

    #[test]
    fn accepts_arabic_enum_labels() {
        let json = serde_json::json!({
            "wilaya": "نواكشوط الغربية",
            "moughataa": "لكصر",
            "neighborhood": "Capitale",
            "houseNumber": "7",
            "roomsCount": 2,
            "type": "طابق",
            "ownerName": "A",
            "ownerPhone": "1",
            "ownerId": "1",
            "tenantName": "B",
            "tenantPhone": "2",
            "tenantId": "2",
            "contractDate": "2024-03-01",
            "contractType": "بدون عقد",
            "monthlyRent": 5000,
            "paymentSystem": "مقدم",
            "sndeStatus": true,
            "somelecStatus": false
        });
        let input: PropertyInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.kind, PropertyKind::Story);
        assert_eq!(input.contract_type, ContractType::WithoutContract);
        assert_eq!(input.payment_system, PaymentSystem::Prepaid);
        assert_eq!(input.arrears, 0);
        assert!(input.validate().is_ok());
    }
}
