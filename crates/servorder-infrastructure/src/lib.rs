//! # Servorder Infrastructure
//!
//! Adapters for the core ports: PostgreSQL and in-memory repositories and
//! the WhatsApp gateway notifier.

pub mod database;
pub mod memory;
pub mod whatsapp;

pub use database::{
    create_pool, run_migrations, PgClientRepository, PgCompanyRepository, PgServiceOrderRepository,
    PgStoreRepository, PgUserRepository,
};
pub use memory::MemoryStore;
pub use whatsapp::{MessageTemplates, ZapiNotifier};
