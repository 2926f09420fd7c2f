// ============================================================================
// Servorder Infrastructure - Z-API WhatsApp Client
// File: crates/servorder-infrastructure/src/whatsapp/client.rs
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use servorder_core::notifier::{NotificationError, StatusNotice, StatusNotifier};
use servorder_shared::config::WhatsAppSettings;
use servorder_shared::utils::mask_phone;

use super::templates::MessageTemplates;

#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    phone: &'a str,
    message: &'a str,
}

/// Sends status notices as text messages through a Z-API compatible gateway.
pub struct ZapiNotifier {
    client: Client,
    send_url: String,
    client_token: Option<String>,
    templates: MessageTemplates,
}

impl ZapiNotifier {
    pub fn new(settings: &WhatsAppSettings) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            send_url: format!(
                "{}/instances/{}/token/{}/send-text",
                settings.base_url.trim_end_matches('/'),
                settings.instance_id,
                settings.token
            ),
            client_token: settings.client_token.clone().filter(|t| !t.is_empty()),
            templates: MessageTemplates::new(&settings.templates)?,
        })
    }

    pub async fn send_text(&self, phone: &str, message: &str) -> Result<(), NotificationError> {
        let mut request = self
            .client
            .post(&self.send_url)
            .json(&SendTextRequest { phone, message });
        if let Some(token) = &self.client_token {
            request = request.header("Client-Token", token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("WhatsApp gateway accepted message to {}", mask_phone(phone));
        Ok(())
    }
}

#[async_trait]
impl StatusNotifier for ZapiNotifier {
    async fn notify(&self, notice: &StatusNotice) -> Result<(), NotificationError> {
        let message = self.templates.render(notice)?;
        self.send_text(&notice.phone, &message).await?;
        info!(
            "Sent {} notice for order #{} to {}",
            notice.status.as_str(),
            notice.order_number,
            mask_phone(&notice.phone)
        );
        Ok(())
    }
}
