use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::paymentmodel::PaymentMethod;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentDto {
    pub property_id: String,

    #[validate(range(
        min = 1,
        max = 1000000000,
        message = "Payment amount must be between 1 and 1,000,000,000"
    ))]
    pub amount: i64,

    pub payment_date: NaiveDate,

    #[validate(length(min = 1, max = 100, message = "Covered month is required"))]
    pub month_covered: String,

    #[serde(default)]
    pub method: PaymentMethod,

    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQueryDto {
    pub property_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(amount: i64) -> CreatePaymentDto {
        CreatePaymentDto {
            property_id: "k3j2h1abc".to_string(),
            amount,
            payment_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            month_covered: "May 2024".to_string(),
            method: PaymentMethod::Cash,
            notes: String::new(),
        }
    }

    #[test]
    fn amount_must_be_positive_and_bounded() {
        assert!(payment(10000).validate().is_ok());
        assert!(payment(1_000_000_000).validate().is_ok());
        assert!(payment(0).validate().is_err());
        let err = payment(i64::MAX).validate().unwrap_err();
        assert!(err.to_string().contains("between 1 and 1,000,000,000"));
    }
}
