use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::maintenancemodel::{MaintenancePriority, MaintenanceStatus};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceDto {
    pub property_id: String,

    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: String,

    #[serde(default)]
    pub priority: MaintenancePriority,

    #[serde(default)]
    #[validate(range(
        min = 0,
        max = 1000000000,
        message = "Estimated cost must be between 0 and 1,000,000,000"
    ))]
    pub estimated_cost: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaintenanceStatusDto {
    pub status: MaintenanceStatus,

    #[validate(range(
        min = 0,
        max = 1000000000,
        message = "Actual cost must be between 0 and 1,000,000,000"
    ))]
    pub actual_cost: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn costs_are_bounded() {
        let request = CreateMaintenanceDto {
            property_id: "k3j2h1abc".to_string(),
            title: "Broken pipe".to_string(),
            description: String::new(),
            priority: MaintenancePriority::High,
            estimated_cost: i64::MAX,
        };
        assert!(request.validate().is_err());

        let done = UpdateMaintenanceStatusDto {
            status: MaintenanceStatus::Completed,
            actual_cost: Some(i64::MAX),
        };
        assert!(done.validate().is_err());

        let free = UpdateMaintenanceStatusDto {
            status: MaintenanceStatus::Completed,
            actual_cost: None,
        };
        assert!(free.validate().is_ok());
    }
}
