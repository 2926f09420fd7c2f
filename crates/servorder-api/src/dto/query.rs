//! Query strings for list endpoints

use serde::Deserialize;
use uuid::Uuid;

use servorder_core::domain::{OrderStatus, Role};
use servorder_core::services::ServiceOrderQuery;
use servorder_shared::Pagination;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub role: Option<Role>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    pub fn filters(&self) -> ServiceOrderQuery {
        ServiceOrderQuery {
            company_id: self.company_id,
            store_id: self.store_id,
            client_id: self.client_id,
            status: self.status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}
