//! Repository traits (ports)

pub mod company_repository;
pub mod store_repository;
pub mod user_repository;
pub mod client_repository;
pub mod service_order_repository;

pub use company_repository::{CompanyFilter, CompanyRepository};
pub use store_repository::{StoreFilter, StoreRepository};
pub use user_repository::{UserFilter, UserRepository};
pub use client_repository::{ClientFilter, ClientRepository};
pub use service_order_repository::{ServiceOrderFilter, ServiceOrderRepository, StatusTotals};

#[cfg(test)]
pub use company_repository::MockCompanyRepository;
#[cfg(test)]
pub use store_repository::MockStoreRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use client_repository::MockClientRepository;
#[cfg(test)]
pub use service_order_repository::MockServiceOrderRepository;
