//! # Servorder Core - Domain Module
//! 
//! Domain entities for the service-order application.

pub mod company;
pub mod store;
pub mod user;
pub mod client;
pub mod service_order;
pub mod status_change;

// Re-export all entities and enums
pub use company::Company;
pub use store::Store;
pub use user::{Role, User};
pub use client::Client;
pub use service_order::{NewServiceItem, OrderStatus, ServiceItem, ServiceOrder};
pub use status_change::{NotificationStatus, StatusChange};
