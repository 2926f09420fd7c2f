use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use servorder_core::domain::{NewServiceItem, OrderStatus, ServiceOrder, StatusChange};
use servorder_core::services::{ChangeStatus, CreateServiceOrder, StatusChangeResult, UpdateServiceOrder};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceOrderRequest {
    pub store_id: Option<Uuid>,
    pub client_id: Uuid,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<NewServiceItem>,
}

impl From<CreateServiceOrderRequest> for CreateServiceOrder {
    fn from(req: CreateServiceOrderRequest) -> Self {
        Self {
            store_id: req.store_id,
            client_id: req.client_id,
            description: req.description,
            items: req.items,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateServiceOrderRequest {
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Option<Vec<NewServiceItem>>,
}

impl From<UpdateServiceOrderRequest> for UpdateServiceOrder {
    fn from(req: UpdateServiceOrderRequest) -> Self {
        Self {
            description: req.description,
            items: req.items,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeStatusRequest {
    pub status: OrderStatus,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

impl From<ChangeStatusRequest> for ChangeStatus {
    fn from(req: ChangeStatusRequest) -> Self {
        Self {
            status: req.status,
            note: req.note,
        }
    }
}

/// Order plus the history entry just written, including how the client
/// notification went.
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub order: ServiceOrder,
    pub change: StatusChange,
}

impl From<StatusChangeResult> for StatusChangeResponse {
    fn from(result: StatusChangeResult) -> Self {
        Self {
            order: result.order,
            change: result.change,
        }
    }
}
