//! # Servorder Core
//! 
//! Domain entities, access rules, services, and repository traits for the
//! service-order backend.

pub mod access;
pub mod domain;
pub mod error;
pub mod notifier;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use access::{Actor, TenantScope};
pub use domain::*;
pub use error::DomainError;
