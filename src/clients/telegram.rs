use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    clients::adapter::{ChannelAdapter, SendError},
    models::{channel::ChannelConfig, message::Channel, validation::validate_chat_id},
};

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    result: Option<TelegramMessage>,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
}

/// Telegram Bot API `sendMessage`. The bot token is part of the URL.
pub struct TelegramAdapter {
    http_client: Client,
}

impl TelegramAdapter {
    pub fn new(http_client: Client) -> Self {
        info!("Telegram adapter initialized");
        Self { http_client }
    }

    fn endpoint(config: &ChannelConfig) -> String {
        format!("{}{}/sendMessage", config.api_url, config.credential)
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn channel(&self) -> Channel {
        Channel::Telegram
    }

    async fn send(
        &self,
        recipient: &str,
        message: &str,
        config: &ChannelConfig,
    ) -> Result<String, SendError> {
        validate_chat_id(recipient)
            .map_err(|e| SendError::Rejected(format!("Invalid recipient: {}", e)))?;

        debug!(recipient, "Sending Telegram message");

        let response = self
            .http_client
            .post(Self::endpoint(config))
            .json(&SendMessage {
                chat_id: recipient,
                text: message,
            })
            .send()
            .await
            .map_err(|e| SendError::from_reqwest(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                SendError::Transient(format!("Unreadable Telegram response: {}", e.without_url()))
            })?;

        // Telegram reports most failures as `ok: false` with a matching HTTP status.
        match serde_json::from_str::<TelegramResponse>(&body) {
            Ok(TelegramResponse {
                ok: true,
                result: Some(sent),
                ..
            }) if status.is_success() => Ok(sent.message_id.to_string()),
            Ok(TelegramResponse {
                ok: false,
                error_code,
                description,
                ..
            }) => {
                let code = error_code
                    .and_then(|code| reqwest::StatusCode::from_u16(code).ok())
                    .unwrap_or(status);
                Err(SendError::from_status(
                    code,
                    description.as_deref().unwrap_or("no description"),
                ))
            }
            _ if !status.is_success() => Err(SendError::from_status(status, &body)),
            _ => Err(SendError::Transient(
                "Telegram response carried no message id".into(),
            )),
        }
    }
}
