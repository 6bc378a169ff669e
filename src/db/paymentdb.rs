// src/db/paymentdb.rs
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::{db::DBClient, propertydb::require_known_property};
use crate::{
    dtos::paymentdtos::CreatePaymentDto,
    error::ErrorMessage,
    models::paymentmodel::{Payment, PaymentWithProperty},
    service::{
        activity_service::{ActivityEvent, ActivityRecorder},
        error::ServiceError,
    },
};

#[async_trait]
pub trait PaymentExt {
    /// Newest first, joined with tenant name and moughataa. `property_id` narrows
    /// the list to one property.
    async fn get_payments(
        &self,
        property_id: Option<&str>,
    ) -> Result<Vec<PaymentWithProperty>, ServiceError>;

    async fn create_payment(&self, payment: CreatePaymentDto) -> Result<Payment, ServiceError>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn get_payments(
        &self,
        property_id: Option<&str>,
    ) -> Result<Vec<PaymentWithProperty>, ServiceError> {
        let payments = sqlx::query_as::<_, PaymentWithProperty>(
            r#"
            SELECT
                p.id, p.property_id, p.amount, p.payment_date, p.month_covered,
                p.method, p.notes, p.created_at,
                pr.tenant_name, pr.moughataa
            FROM payments p
            LEFT JOIN properties pr ON p.property_id = pr.id
            WHERE ($1::text IS NULL OR p.property_id = $1)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn create_payment(&self, payment: CreatePaymentDto) -> Result<Payment, ServiceError> {
        payment.validate()?;

        let mut tx = self.pool.begin().await?;

        let known: Option<String> =
            sqlx::query_scalar("SELECT id FROM properties WHERE id = $1 FOR UPDATE")
                .bind(&payment.property_id)
                .fetch_optional(&mut *tx)
                .await?;
        let property_id = require_known_property(known, ErrorMessage::PaymentUnknownProperty)?;

        let created = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments
                (id, property_id, amount, payment_date, month_covered, method, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id, property_id, amount, payment_date, month_covered, method, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(property_id)
        .bind(payment.amount)
        .bind(payment.payment_date)
        .bind(&payment.month_covered)
        .bind(payment.method)
        .bind(&payment.notes)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        ActivityRecorder::record(&mut tx, ActivityEvent::PaymentRecorded(&created)).await?;
        tx.commit().await?;

        tracing::info!(
            "payment {} of {} recorded for property {}",
            created.id,
            created.amount,
            created.property_id
        );
        Ok(created)
    }
}
