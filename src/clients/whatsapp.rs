use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    clients::adapter::{ChannelAdapter, SendError},
    models::{channel::ChannelConfig, message::Channel, validation::validate_phone_number},
};

#[derive(Debug, Serialize)]
struct WhatsAppMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: WhatsAppText<'a>,
}

#[derive(Debug, Serialize)]
struct WhatsAppText<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct WhatsAppResponse {
    #[serde(default)]
    messages: Vec<WhatsAppMessageId>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppMessageId {
    id: String,
}

/// WhatsApp Cloud API text messages, posted straight to the configured URL.
pub struct WhatsAppAdapter {
    http_client: Client,
}

impl WhatsAppAdapter {
    pub fn new(http_client: Client) -> Self {
        info!("WhatsApp adapter initialized");
        Self { http_client }
    }
}

#[async_trait]
impl ChannelAdapter for WhatsAppAdapter {
    fn channel(&self) -> Channel {
        Channel::WhatsApp
    }

    async fn send(
        &self,
        recipient: &str,
        message: &str,
        config: &ChannelConfig,
    ) -> Result<String, SendError> {
        validate_phone_number(recipient)
            .map_err(|e| SendError::Rejected(format!("Invalid recipient: {}", e)))?;

        debug!(recipient, "Sending WhatsApp message");

        let payload = WhatsAppMessage {
            messaging_product: "whatsapp",
            to: recipient.trim_start_matches('+'),
            kind: "text",
            text: WhatsAppText { body: message },
        };

        let response = self
            .http_client
            .post(&config.api_url)
            .bearer_auth(&config.credential)
            .json(&payload)
            .send()
            .await
            .map_err(SendError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::from_status(status, &body));
        }

        let body: WhatsAppResponse = response
            .json()
            .await
            .map_err(|e| SendError::Transient(format!("Unreadable WhatsApp response: {}", e)))?;

        body.messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or_else(|| SendError::Transient("WhatsApp response carried no message id".into()))
    }
}
