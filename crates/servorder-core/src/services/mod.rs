//! Domain services (business logic)

pub mod auth_service;
pub mod company_service;
pub mod store_service;
pub mod user_service;
pub mod client_service;
pub mod service_order_service;
pub mod dashboard_service;

pub use auth_service::{AuthService, LoginResult};
pub use company_service::{CompanyService, CreateCompany, UpdateCompany};
pub use store_service::{CreateStore, StoreService, UpdateStore};
pub use user_service::{CreateUser, UpdateUser, UserService};
pub use client_service::{ClientService, CreateClient, UpdateClient};
pub use service_order_service::{
    ChangeStatus, CreateServiceOrder, ServiceOrderQuery, ServiceOrderService, StatusChangeResult,
    UpdateServiceOrder,
};
pub use dashboard_service::{DashboardService, DashboardSummary};

#[cfg(test)]
pub(crate) mod test_support;
