//! Request and response bodies

pub mod auth;
pub mod client;
pub mod company;
pub mod query;
pub mod service_order;
pub mod store;
pub mod user;
