//! Client notification port (implemented by the WhatsApp gateway adapter)

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::OrderStatus;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Gateway transport error: {0}")]
    Transport(String),

    #[error("Gateway rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Everything a message template may need about a status change
#[derive(Debug, Clone, Serialize)]
pub struct StatusNotice {
    pub phone: String,
    pub client_name: String,
    pub store_name: String,
    pub order_number: i64,
    pub status: OrderStatus,
    pub total_cents: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn notify(&self, notice: &StatusNotice) -> Result<(), NotificationError>;
}
