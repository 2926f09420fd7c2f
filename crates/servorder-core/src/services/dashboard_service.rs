//! Order dashboard for the caller's scope

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::access::Actor;
use crate::domain::OrderStatus;
use crate::error::DomainError;
use crate::repositories::{ServiceOrderRepository, StatusTotals};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardSummary {
    /// One entry per status, in lifecycle order, zero-filled.
    pub by_status: Vec<StatusTotals>,
    pub total_orders: i64,
    /// RECEIVED, IN_PROGRESS and PAUSED orders.
    pub open_orders: i64,
    /// Sum of PAID orders.
    pub revenue_cents: i64,
    /// Sum of FINISHED orders waiting for payment.
    pub receivable_cents: i64,
}

pub struct DashboardService {
    order_repo: Arc<dyn ServiceOrderRepository>,
}

impl DashboardService {
    pub fn new(order_repo: Arc<dyn ServiceOrderRepository>) -> Self {
        Self { order_repo }
    }

    pub async fn summary(
        &self,
        actor: &Actor,
        company_id: Option<Uuid>,
        store_id: Option<Uuid>,
    ) -> Result<DashboardSummary, DomainError> {
        let scope = actor.narrow(company_id, store_id)?;
        let totals = self.order_repo.status_totals(&scope).await?;

        let by_status: Vec<StatusTotals> = OrderStatus::ALL
            .iter()
            .map(|status| {
                totals
                    .iter()
                    .find(|t| t.status == *status)
                    .copied()
                    .unwrap_or(StatusTotals {
                        status: *status,
                        count: 0,
                        total_cents: 0,
                    })
            })
            .collect();

        let sum_of = |status: OrderStatus| {
            by_status
                .iter()
                .find(|t| t.status == status)
                .map_or(0, |t| t.total_cents)
        };

        Ok(DashboardSummary {
            total_orders: by_status.iter().map(|t| t.count).sum(),
            open_orders: by_status
                .iter()
                .filter(|t| t.status.is_editable())
                .map(|t| t.count)
                .sum(),
            revenue_cents: sum_of(OrderStatus::Paid),
            receivable_cents: sum_of(OrderStatus::Finished),
            by_status,
        })
    }
}
