use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgConnection;
use validator::Validate;

use crate::{
    db::db::DBClient,
    dtos::propertydtos::PropertyInput,
    error::ErrorMessage,
    models::propertymodel::{new_property_id, Property},
    service::{
        activity_service::{ActivityEvent, ActivityRecorder},
        error::ServiceError,
    },
};

const PROPERTY_COLUMNS: &str = r#"
    id, wilaya, moughataa, neighborhood, house_number, rooms_count, kind, accessories,
    owner_name, owner_phone, owner_id, tenant_name, tenant_phone, tenant_id,
    contract_date, contract_type, monthly_rent, payment_system, arrears,
    water_ok, electricity_ok, notes, status, created_at
"#;

/// Property persistence. Implemented by the relational backend and by the
/// offline file store.
#[async_trait]
pub trait PropertyExt: Send + Sync {
    /// Newest first.
    async fn get_properties(&self) -> Result<Vec<Property>, ServiceError>;

    async fn get_property(&self, property_id: &str) -> Result<Option<Property>, ServiceError>;

    async fn create_property(&self, input: PropertyInput) -> Result<Property, ServiceError>;

    async fn update_property(
        &self,
        property_id: &str,
        input: PropertyInput,
    ) -> Result<Property, ServiceError>;

    /// Removes the property together with its payments and maintenance requests.
    async fn delete_property(&self, property_id: &str) -> Result<(), ServiceError>;

    /// Makes `properties` the whole collection: local rows missing from it are
    /// deleted (with cascade), the rest inserted or overwritten by id.
    async fn replace_properties(&self, properties: Vec<Property>) -> Result<usize, ServiceError>;
}

/// Rejects a collection that contains an invalid record, a blank id or a
/// repeated id.
pub fn validate_collection(properties: &[Property]) -> Result<(), ServiceError> {
    let mut seen = HashSet::new();
    for property in properties {
        if property.id.trim().is_empty() {
            return Err(ServiceError::Validation("Property id must not be blank".to_string()));
        }
        if !seen.insert(property.id.as_str()) {
            return Err(ServiceError::Validation(format!(
                "Duplicate property id {}",
                property.id
            )));
        }
        PropertyInput::from(property).validate().map_err(|e| {
            ServiceError::Validation(format!("Property {}: {}", property.id, e))
        })?;
    }
    Ok(())
}

fn not_found() -> ServiceError {
    ServiceError::NotFound(ErrorMessage::PropertyNotFound.to_string())
}

/// Turns the result of an existence lookup into the error a dependent record
/// (payment or maintenance request) reports for an unknown property.
pub fn require_known_property(
    found: Option<String>,
    unknown: ErrorMessage,
) -> Result<String, ServiceError> {
    found.ok_or_else(|| ServiceError::Validation(unknown.to_string()))
}

impl DBClient {
    async fn fetch_property(
        conn: &mut PgConnection,
        property_id: &str,
    ) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties WHERE id = $1 FOR UPDATE",
            PROPERTY_COLUMNS
        ))
        .bind(property_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Insert-or-replace keyed by id.
    async fn upsert_property(
        conn: &mut PgConnection,
        property: &Property,
    ) -> Result<Property, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            INSERT INTO properties ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
            ON CONFLICT (id) DO UPDATE SET
                wilaya = EXCLUDED.wilaya,
                moughataa = EXCLUDED.moughataa,
                neighborhood = EXCLUDED.neighborhood,
                house_number = EXCLUDED.house_number,
                rooms_count = EXCLUDED.rooms_count,
                kind = EXCLUDED.kind,
                accessories = EXCLUDED.accessories,
                owner_name = EXCLUDED.owner_name,
                owner_phone = EXCLUDED.owner_phone,
                owner_id = EXCLUDED.owner_id,
                tenant_name = EXCLUDED.tenant_name,
                tenant_phone = EXCLUDED.tenant_phone,
                tenant_id = EXCLUDED.tenant_id,
                contract_date = EXCLUDED.contract_date,
                contract_type = EXCLUDED.contract_type,
                monthly_rent = EXCLUDED.monthly_rent,
                payment_system = EXCLUDED.payment_system,
                arrears = EXCLUDED.arrears,
                water_ok = EXCLUDED.water_ok,
                electricity_ok = EXCLUDED.electricity_ok,
                notes = EXCLUDED.notes,
                status = EXCLUDED.status
            RETURNING {cols}
            "#,
            cols = PROPERTY_COLUMNS
        ))
        .bind(&property.id)
        .bind(&property.wilaya)
        .bind(&property.moughataa)
        .bind(&property.neighborhood)
        .bind(&property.house_number)
        .bind(property.rooms_count)
        .bind(property.kind)
        .bind(&property.accessories)
        .bind(&property.owner_name)
        .bind(&property.owner_phone)
        .bind(&property.owner_id)
        .bind(&property.tenant_name)
        .bind(&property.tenant_phone)
        .bind(&property.tenant_id)
        .bind(property.contract_date)
        .bind(property.contract_type)
        .bind(property.monthly_rent)
        .bind(property.payment_system)
        .bind(property.arrears)
        .bind(property.water_ok)
        .bind(property.electricity_ok)
        .bind(&property.notes)
        .bind(&property.status)
        .bind(property.created_at)
        .fetch_one(&mut *conn)
        .await
    }

    /// Removes dependents first; earlier activity rows are kept but detached.
    async fn cascade_delete(conn: &mut PgConnection, property_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM payments WHERE property_id = $1")
            .bind(property_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM maintenance_requests WHERE property_id = $1")
            .bind(property_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("UPDATE activity_log SET property_id = NULL WHERE property_id = $1")
            .bind(property_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(property_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn get_properties(&self) -> Result<Vec<Property>, ServiceError> {
        let properties = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties ORDER BY created_at DESC",
            PROPERTY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn get_property(&self, property_id: &str) -> Result<Option<Property>, ServiceError> {
        let property = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties WHERE id = $1",
            PROPERTY_COLUMNS
        ))
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }

    async fn create_property(&self, input: PropertyInput) -> Result<Property, ServiceError> {
        input.validate()?;

        let property = input.into_property(new_property_id(), Utc::now());

        let mut tx = self.pool.begin().await?;
        let property = Self::upsert_property(&mut tx, &property).await?;
        ActivityRecorder::record(&mut tx, ActivityEvent::PropertyCreated(&property)).await?;
        tx.commit().await?;

        tracing::info!("property {} created", property.id);
        Ok(property)
    }

    async fn update_property(
        &self,
        property_id: &str,
        input: PropertyInput,
    ) -> Result<Property, ServiceError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let existing = Self::fetch_property(&mut tx, property_id)
            .await?
            .ok_or_else(not_found)?;

        let updated = input.into_property(existing.id, existing.created_at);
        let property = Self::upsert_property(&mut tx, &updated).await?;
        ActivityRecorder::record(&mut tx, ActivityEvent::PropertyUpdated(&property)).await?;
        tx.commit().await?;

        tracing::info!("property {} updated", property.id);
        Ok(property)
    }

    async fn delete_property(&self, property_id: &str) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;
        let existing = Self::fetch_property(&mut tx, property_id)
            .await?
            .ok_or_else(not_found)?;

        // Logged while the id still names a live row.
        ActivityRecorder::record(&mut tx, ActivityEvent::PropertyDeleted(&existing)).await?;
        Self::cascade_delete(&mut tx, property_id).await?;
        tx.commit().await?;

        tracing::info!(
            "property {} deleted with its payments and maintenance",
            property_id
        );
        Ok(())
    }

    async fn replace_properties(&self, properties: Vec<Property>) -> Result<usize, ServiceError> {
        validate_collection(&properties)?;

        let incoming: HashSet<&str> = properties.iter().map(|p| p.id.as_str()).collect();

        let mut tx = self.pool.begin().await?;
        let existing: Vec<String> = sqlx::query_scalar("SELECT id FROM properties")
            .fetch_all(&mut *tx)
            .await?;

        for stale in existing.iter().filter(|id| !incoming.contains(id.as_str())) {
            Self::cascade_delete(&mut tx, stale).await?;
        }
        for property in &properties {
            Self::upsert_property(&mut tx, property).await?;
        }
        let replaced = ActivityEvent::CollectionReplaced(properties.len());
        ActivityRecorder::record(&mut tx, replaced).await?;
        tx.commit().await?;

        tracing::info!("property collection replaced with {} records", properties.len());
        Ok(properties.len())
    }
}
