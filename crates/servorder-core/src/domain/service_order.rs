// ============================================================================
// Servorder Core - Service Order Entity
// File: crates/servorder-core/src/domain/service_order.rs
// Description: Work record with line items and a status lifecycle
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::company::clean;
use super::status_change::StatusChange;
use crate::error::DomainError;

/// Order status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Received,
    InProgress,
    Paused,
    Finished,
    Paid,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Received,
        OrderStatus::InProgress,
        OrderStatus::Paused,
        OrderStatus::Finished,
        OrderStatus::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "RECEIVED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Paused => "PAUSED",
            OrderStatus::Finished => "FINISHED",
            OrderStatus::Paid => "PAID",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "RECEIVED" => Some(OrderStatus::Received),
            "IN_PROGRESS" => Some(OrderStatus::InProgress),
            "PAUSED" => Some(OrderStatus::Paused),
            "FINISHED" => Some(OrderStatus::Finished),
            "PAID" => Some(OrderStatus::Paid),
            _ => None,
        }
    }

    /// Lowercase key used for message template lookup.
    pub fn key(&self) -> &'static str {
        match self {
            OrderStatus::Received => "received",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Paused => "paused",
            OrderStatus::Finished => "finished",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Received => "received",
            OrderStatus::InProgress => "in progress",
            OrderStatus::Paused => "paused",
            OrderStatus::Finished => "finished",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn next_statuses(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Received => &[OrderStatus::InProgress],
            OrderStatus::InProgress => &[OrderStatus::Paused, OrderStatus::Finished],
            OrderStatus::Paused => &[OrderStatus::InProgress],
            OrderStatus::Finished => &[OrderStatus::Paid],
            OrderStatus::Paid => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    /// Items and description can change until the work is finished.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Received | OrderStatus::InProgress | OrderStatus::Paused
        )
    }
}

/// Line item as submitted by a client of the API
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewServiceItem {
    #[validate(length(min = 1, max = 200, message = "Item description must be between 1 and 200 characters"))]
    pub description: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    #[validate(range(min = 0, message = "Unit price cannot be negative"))]
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl ServiceItem {
    pub fn subtotal_cents(&self) -> Option<i64> {
        self.unit_price_cents.checked_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: Uuid,
    pub company_id: Uuid,
    pub store_id: Uuid,
    pub client_id: Uuid,

    /// Per-store sequence number; zero until the order is persisted.
    pub number: i64,

    pub description: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<ServiceItem>,
    pub total_cents: i64,

    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

const MAX_DESCRIPTION_LENGTH: usize = 2000;

impl ServiceOrder {
    pub fn new(
        company_id: Uuid,
        store_id: Uuid,
        client_id: Uuid,
        description: Option<String>,
        items: Vec<NewServiceItem>,
        created_by: Uuid,
    ) -> Result<Self, DomainError> {
        let (items, total_cents) = build_items(items)?;
        let description = check_description(description)?;

        Ok(Self {
            id: Uuid::new_v4(),
            company_id,
            store_id,
            client_id,
            number: 0,
            description,
            status: OrderStatus::Received,
            items,
            total_cents,
            started_at: None,
            paused_at: None,
            finished_at: None,
            paid_at: None,
            created_at: Utc::now(),
            created_by: Some(created_by),
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        })
    }

    pub fn ensure_editable(&self) -> Result<(), DomainError> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(DomainError::OrderNotEditable(self.status))
        }
    }

    pub fn replace_items(&mut self, items: Vec<NewServiceItem>, modified_by: Uuid) -> Result<(), DomainError> {
        self.ensure_editable()?;
        let (items, total_cents) = build_items(items)?;
        self.items = items;
        self.total_cents = total_cents;
        self.touch(modified_by);
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>, modified_by: Uuid) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.description = check_description(description)?;
        self.touch(modified_by);
        Ok(())
    }

    /// Moves the order to `next` and returns the history entry to persist.
    pub fn transition_to(
        &mut self,
        next: OrderStatus,
        changed_by: Uuid,
        note: Option<String>,
    ) -> Result<StatusChange, DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }

        let now = Utc::now();
        match next {
            OrderStatus::InProgress => {
                if self.started_at.is_none() {
                    self.started_at = Some(now);
                }
            }
            OrderStatus::Paused => self.paused_at = Some(now),
            OrderStatus::Finished => self.finished_at = Some(now),
            OrderStatus::Paid => self.paid_at = Some(now),
            OrderStatus::Received => {}
        }

        let change = StatusChange::new(self.id, Some(self.status), next, changed_by, clean(note));
        self.status = next;
        self.modified_at = Some(now);
        self.modified_by = Some(changed_by);
        Ok(change)
    }

    pub fn touch(&mut self, modified_by: Uuid) {
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
    }

    pub fn soft_delete(&mut self, deleted_by: Uuid) {
        self.removed_at = Some(Utc::now());
        self.removed_by = Some(deleted_by);
    }

    pub fn is_deleted(&self) -> bool {
        self.removed_at.is_some()
    }
}

fn check_description(description: Option<String>) -> Result<Option<String>, DomainError> {
    let description = clean(description);
    if description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
    {
        return Err(DomainError::ValidationError(format!(
            "Description must be at most {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    Ok(description)
}

fn build_items(items: Vec<NewServiceItem>) -> Result<(Vec<ServiceItem>, i64), DomainError> {
    if items.is_empty() {
        return Err(DomainError::ValidationError(
            "A service order needs at least one item".to_string(),
        ));
    }

    let mut total: i64 = 0;
    let mut built = Vec::with_capacity(items.len());
    for item in items {
        item.validate()?;
        let item = ServiceItem {
            id: Uuid::new_v4(),
            description: item.description.trim().to_string(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
        };
        total = item
            .subtotal_cents()
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or_else(|| DomainError::ValidationError("Order total is too large".to_string()))?;
        built.push(item);
    }
    Ok((built, total))
}
