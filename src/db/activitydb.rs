// src/db/activitydb.rs
use async_trait::async_trait;

use super::db::DBClient;
use crate::{models::activitymodel::ActivityLog, service::error::ServiceError};

#[async_trait]
pub trait ActivityExt {
    /// Newest first, capped at `limit`.
    async fn get_activity(&self, limit: i64) -> Result<Vec<ActivityLog>, ServiceError>;
}

#[async_trait]
impl ActivityExt for DBClient {
    async fn get_activity(&self, limit: i64) -> Result<Vec<ActivityLog>, ServiceError> {
        let entries = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, property_id, action_type, description, created_at
            FROM activity_log
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
