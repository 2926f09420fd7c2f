//! Status history entries and their notification outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::service_order::OrderStatus;

/// What happened to the client notification for a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
    Skipped,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "PENDING",
            NotificationStatus::Sent => "SENT",
            NotificationStatus::Failed => "FAILED",
            NotificationStatus::Skipped => "SKIPPED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(NotificationStatus::Pending),
            "SENT" => Some(NotificationStatus::Sent),
            "FAILED" => Some(NotificationStatus::Failed),
            "SKIPPED" => Some(NotificationStatus::Skipped),
            _ => None,
        }
    }
}

impl Default for NotificationStatus {
    fn default() -> Self {
        NotificationStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: Uuid,
    pub order_id: Uuid,
    /// `None` for the entry written when the order is created.
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
    pub note: Option<String>,
    pub notification: NotificationStatus,
    pub notification_error: Option<String>,
}

impl StatusChange {
    pub fn new(
        order_id: Uuid,
        from_status: Option<OrderStatus>,
        to_status: OrderStatus,
        changed_by: Uuid,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            from_status,
            to_status,
            changed_by,
            changed_at: Utc::now(),
            note,
            notification: NotificationStatus::Pending,
            notification_error: None,
        }
    }

    pub fn initial(order_id: Uuid, changed_by: Uuid) -> Self {
        Self::new(order_id, None, OrderStatus::Received, changed_by, None)
    }

    pub fn record_notification(&mut self, status: NotificationStatus, error: Option<String>) {
        self.notification = status;
        self.notification_error = error;
    }
}
