// ============================================================================
// Servorder Infrastructure - WhatsApp Message Templates
// File: crates/servorder-infrastructure/src/whatsapp/templates.rs
// ============================================================================
//! Per-status Handlebars templates. Variables: `client_name`, `store_name`,
//! `order_number`, `status_label`, `total`.

use std::collections::HashMap;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use servorder_core::domain::OrderStatus;
use servorder_core::notifier::{NotificationError, StatusNotice};
use servorder_shared::utils::format_cents;

fn default_template(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Received => {
            "Hello {{client_name}}! {{store_name}} received your service order #{{order_number}}. \
             We will let you know when work starts."
        }
        OrderStatus::InProgress => {
            "Hello {{client_name}}, work on service order #{{order_number}} at {{store_name}} is now in progress."
        }
        OrderStatus::Paused => {
            "Hello {{client_name}}, service order #{{order_number}} at {{store_name}} has been paused. \
             We will get back to you soon."
        }
        OrderStatus::Finished => {
            "Hello {{client_name}}, service order #{{order_number}} is finished and ready for pickup at \
             {{store_name}}. Total: {{total}}."
        }
        OrderStatus::Paid => {
            "Thank you, {{client_name}}! Payment of {{total}} for service order #{{order_number}} at \
             {{store_name}} was received."
        }
    }
}

#[derive(Serialize)]
struct TemplateData<'a> {
    client_name: &'a str,
    store_name: &'a str,
    order_number: i64,
    status_label: &'a str,
    total: String,
}

pub struct MessageTemplates {
    registry: Handlebars<'static>,
}

impl MessageTemplates {
    /// Registers the defaults, then the overrides keyed by status key
    /// (`received`, `in_progress`, `paused`, `finished`, `paid`). Unknown keys
    /// are rejected.
    pub fn new(overrides: &HashMap<String, String>) -> Result<Self, NotificationError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        for status in OrderStatus::ALL {
            registry
                .register_template_string(status.key(), default_template(status))
                .map_err(|e| NotificationError::Template(e.to_string()))?;
        }

        for (key, template) in overrides {
            if !OrderStatus::ALL.iter().any(|s| s.key() == key) {
                return Err(NotificationError::Template(format!("Unknown template key: {}", key)));
            }
            registry
                .register_template_string(key, template)
                .map_err(|e| NotificationError::Template(format!("{}: {}", key, e)))?;
            debug!("Registered WhatsApp template override for {}", key);
        }

        Ok(Self { registry })
    }

    pub fn render(&self, notice: &StatusNotice) -> Result<String, NotificationError> {
        let data = TemplateData {
            client_name: &notice.client_name,
            store_name: &notice.store_name,
            order_number: notice.order_number,
            status_label: notice.status.label(),
            total: format_cents(notice.total_cents),
        };
        self.registry
            .render(notice.status.key(), &data)
            .map_err(|e| NotificationError::Template(e.to_string()))
    }
}
