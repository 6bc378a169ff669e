// service/activity_service.rs
//! Appends audit entries to `activity_log`. Every writer takes the caller's
//! connection so the entry commits or rolls back with the mutation it describes.
use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    models::{
        activitymodel::{ActionType, ActivityLog},
        maintenancemodel::MaintenanceRequest,
        paymentmodel::Payment,
        propertymodel::Property,
    },
    service::error::ServiceError,
};

/// A mutation worth an audit entry.
#[derive(Debug, Clone, Copy)]
pub enum ActivityEvent<'a> {
    PropertyCreated(&'a Property),
    PropertyUpdated(&'a Property),
    PropertyDeleted(&'a Property),
    PaymentRecorded(&'a Payment),
    MaintenanceOpened(&'a MaintenanceRequest),
    /// A confirmed pull replaced the whole collection.
    CollectionReplaced(usize),
}

impl ActivityEvent<'_> {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActivityEvent::PropertyCreated(_) => ActionType::Create,
            ActivityEvent::PropertyUpdated(_) | ActivityEvent::CollectionReplaced(_) => {
                ActionType::Update
            }
            ActivityEvent::PropertyDeleted(_) => ActionType::Delete,
            ActivityEvent::PaymentRecorded(_) => ActionType::Payment,
            ActivityEvent::MaintenanceOpened(_) => ActionType::Maintenance,
        }
    }

    pub fn property_id(&self) -> Option<&str> {
        match self {
            ActivityEvent::PropertyCreated(p)
            | ActivityEvent::PropertyUpdated(p)
            | ActivityEvent::PropertyDeleted(p) => Some(&p.id),
            ActivityEvent::PaymentRecorded(payment) => Some(&payment.property_id),
            ActivityEvent::MaintenanceOpened(request) => Some(&request.property_id),
            ActivityEvent::CollectionReplaced(_) => None,
        }
    }

    pub fn description(&self) -> String {
        match self {
            ActivityEvent::PropertyCreated(p) => format!("New property added: {}", p.label()),
            ActivityEvent::PropertyUpdated(p) => {
                format!("Property details updated: {}", p.label())
            }
            ActivityEvent::PropertyDeleted(p) => {
                format!("Property deleted: {} [{}]", p.label(), p.id)
            }
            ActivityEvent::PaymentRecorded(payment) => format!(
                "Payment of {} MRU recorded for {}",
                payment.amount, payment.month_covered
            ),
            ActivityEvent::MaintenanceOpened(request) => {
                format!("New maintenance request: {}", request.title)
            }
            ActivityEvent::CollectionReplaced(count) => {
                format!("Property list replaced from sync ({} records)", count)
            }
        }
    }
}

pub struct ActivityRecorder;

impl ActivityRecorder {
    pub async fn record(
        conn: &mut PgConnection,
        event: ActivityEvent<'_>,
    ) -> Result<ActivityLog, ServiceError> {
        let entry = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_log (id, property_id, action_type, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, property_id, action_type, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.property_id())
        .bind(event.action_type())
        .bind(event.description())
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        tracing::debug!(
            "activity {:?} recorded for {:?}",
            entry.action_type,
            entry.property_id
        );
        Ok(entry)
    }
}
