//! WhatsApp gateway adapter for the status notifier port

pub mod client;
pub mod templates;

pub use client::ZapiNotifier;
pub use templates::MessageTemplates;
