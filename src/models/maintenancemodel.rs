use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "maintenance_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "maintenance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MaintenanceStatus::Completed | MaintenanceStatus::Cancelled)
    }

    pub fn is_open(self) -> bool {
        matches!(self, MaintenanceStatus::Pending | MaintenanceStatus::InProgress)
    }

    /// pending -> in_progress -> {completed, cancelled}; pending may also be
    /// completed or cancelled directly. Terminal states never move.
    pub fn can_transition_to(self, next: MaintenanceStatus) -> bool {
        use MaintenanceStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, InProgress | Completed | Cancelled) | (InProgress, Completed | Cancelled)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub property_id: String,
    pub title: String,
    pub description: String,
    pub priority: MaintenancePriority,
    pub status: MaintenanceStatus,
    pub estimated_cost: i64,
    pub actual_cost: i64,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWithProperty {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: MaintenanceRequest,
    pub tenant_name: Option<String>,
    pub moughataa: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::MaintenanceStatus::*;

    #[test]
    fn terminal_states_never_move() {
        for next in [Pending, InProgress, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(Pending.can_transition_to(InProgress));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Pending.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Cancelled));
    }

    #[test]
    fn backward_and_self_transitions_are_rejected() {
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!InProgress.can_transition_to(InProgress));
    }
}
