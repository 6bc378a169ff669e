// src/db/maintenancedb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{db::DBClient, propertydb::require_known_property};
use crate::{
    dtos::maintenancedtos::{CreateMaintenanceDto, UpdateMaintenanceStatusDto},
    error::ErrorMessage,
    models::maintenancemodel::{MaintenanceRequest, MaintenanceStatus, MaintenanceWithProperty},
    service::{
        activity_service::{ActivityEvent, ActivityRecorder},
        error::ServiceError,
    },
};

const MAINTENANCE_COLUMNS: &str = r#"
    id, property_id, title, description, priority, status,
    estimated_cost, actual_cost, created_at, resolved_at
"#;

#[async_trait]
pub trait MaintenanceExt {
    async fn get_maintenance_requests(&self) -> Result<Vec<MaintenanceWithProperty>, ServiceError>;

    /// New requests always start `pending`.
    async fn create_maintenance_request(
        &self,
        request: CreateMaintenanceDto,
    ) -> Result<MaintenanceRequest, ServiceError>;

    /// Status transitions are not written to the activity log.
    async fn update_maintenance_status(
        &self,
        request_id: Uuid,
        update: UpdateMaintenanceStatusDto,
    ) -> Result<MaintenanceRequest, ServiceError>;
}

/// Applies a status change to `current`, enforcing the request lifecycle.
/// Completing stamps `resolved_at` and takes the actual cost (0 when omitted).
pub fn apply_status_change(
    current: &MaintenanceRequest,
    update: &UpdateMaintenanceStatusDto,
    now: DateTime<Utc>,
) -> Result<MaintenanceRequest, ServiceError> {
    if !current.status.can_transition_to(update.status) {
        return Err(ServiceError::InvalidTransition {
            from: current.status,
            to: update.status,
        });
    }

    let mut next = current.clone();
    next.status = update.status;

    if update.status == MaintenanceStatus::Completed {
        next.actual_cost = update.actual_cost.unwrap_or(0);
        next.resolved_at = Some(now);
    } else if update.actual_cost.is_some() {
        return Err(ServiceError::Validation(
            "Actual cost can only be set when completing a request".to_string(),
        ));
    }

    Ok(next)
}

#[async_trait]
impl MaintenanceExt for DBClient {
    async fn get_maintenance_requests(&self) -> Result<Vec<MaintenanceWithProperty>, ServiceError> {
        let requests = sqlx::query_as::<_, MaintenanceWithProperty>(
            r#"
            SELECT
                m.id, m.property_id, m.title, m.description, m.priority, m.status,
                m.estimated_cost, m.actual_cost, m.created_at, m.resolved_at,
                pr.tenant_name, pr.moughataa
            FROM maintenance_requests m
            LEFT JOIN properties pr ON m.property_id = pr.id
            ORDER BY m.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn create_maintenance_request(
        &self,
        request: CreateMaintenanceDto,
    ) -> Result<MaintenanceRequest, ServiceError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let known: Option<String> =
            sqlx::query_scalar("SELECT id FROM properties WHERE id = $1 FOR UPDATE")
                .bind(&request.property_id)
                .fetch_optional(&mut *tx)
                .await?;
        let property_id =
            require_known_property(known, ErrorMessage::MaintenanceUnknownProperty)?;

        let created = sqlx::query_as::<_, MaintenanceRequest>(&format!(
            r#"
            INSERT INTO maintenance_requests
                (id, property_id, title, description, priority, status,
                 estimated_cost, actual_cost, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)
            RETURNING {}
            "#,
            MAINTENANCE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(property_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.priority)
        .bind(MaintenanceStatus::Pending)
        .bind(request.estimated_cost)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        ActivityRecorder::record(&mut tx, ActivityEvent::MaintenanceOpened(&created)).await?;
        tx.commit().await?;

        tracing::info!(
            "maintenance request {} opened for property {}",
            created.id,
            created.property_id
        );
        Ok(created)
    }

    async fn update_maintenance_status(
        &self,
        request_id: Uuid,
        update: UpdateMaintenanceStatusDto,
    ) -> Result<MaintenanceRequest, ServiceError> {
        update.validate()?;

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, MaintenanceRequest>(&format!(
            "SELECT {} FROM maintenance_requests WHERE id = $1 FOR UPDATE",
            MAINTENANCE_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound(ErrorMessage::MaintenanceNotFound.to_string()))?;

        let next = apply_status_change(&current, &update, Utc::now())?;

        let saved = sqlx::query_as::<_, MaintenanceRequest>(&format!(
            r#"
            UPDATE maintenance_requests
            SET status = $2, actual_cost = $3, resolved_at = $4
            WHERE id = $1
            RETURNING {}
            "#,
            MAINTENANCE_COLUMNS
        ))
        .bind(request_id)
        .bind(next.status)
        .bind(next.actual_cost)
        .bind(next.resolved_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "maintenance request {} moved {:?} -> {:?}",
            request_id,
            current.status,
            saved.status
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{maintenancemodel::MaintenancePriority, propertymodel::new_property_id};

    fn pending() -> MaintenanceRequest {
        MaintenanceRequest {
            id: Uuid::new_v4(),
            property_id: new_property_id(),
            title: "Water leak".to_string(),
            description: String::new(),
            priority: MaintenancePriority::Medium,
            status: MaintenanceStatus::Pending,
            estimated_cost: 3000,
            actual_cost: 0,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    fn to(status: MaintenanceStatus, actual_cost: Option<i64>) -> UpdateMaintenanceStatusDto {
        UpdateMaintenanceStatusDto { status, actual_cost }
    }

    #[test]
    fn completing_sets_cost_and_resolution_time() {
        let now = Utc::now();
        let done =
            apply_status_change(&pending(), &to(MaintenanceStatus::Completed, Some(5000)), now)
                .unwrap();
        assert_eq!(done.status, MaintenanceStatus::Completed);
        assert_eq!(done.actual_cost, 5000);
        assert_eq!(done.resolved_at, Some(now));
    }

    #[test]
    fn completing_without_cost_defaults_to_zero() {
        let started =
            apply_status_change(&pending(), &to(MaintenanceStatus::InProgress, None), Utc::now())
                .unwrap();
        assert!(started.resolved_at.is_none());
        let done =
            apply_status_change(&started, &to(MaintenanceStatus::Completed, None), Utc::now())
                .unwrap();
        assert_eq!(done.actual_cost, 0);
        assert!(done.resolved_at.is_some());
    }

    #[test]
    fn cancelling_after_completion_fails() {
        let now = Utc::now();
        let done =
            apply_status_change(&pending(), &to(MaintenanceStatus::Completed, Some(5000)), now)
                .unwrap();
        let err = apply_status_change(&done, &to(MaintenanceStatus::Cancelled, None), now)
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidTransition {
                from: MaintenanceStatus::Completed,
                to: MaintenanceStatus::Cancelled
            }
        ));
    }

    #[test]
    fn cost_outside_completion_is_rejected() {
        let err =
            apply_status_change(&pending(), &to(MaintenanceStatus::Cancelled, Some(10)), Utc::now())
                .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
