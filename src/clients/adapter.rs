use std::{collections::HashMap, sync::Arc, time::Duration};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::models::{channel::ChannelConfig, message::Channel};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendError {
    /// Network fault or remote outage; worth another attempt later.
    #[error("Transient delivery failure: {0}")]
    Transient(String),

    /// The remote refused the payload; retrying will not change the answer.
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

impl SendError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = format!("Channel API returned status {}: {}", status, body);

        if status.is_server_error()
            || status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::REQUEST_TIMEOUT
        {
            SendError::Transient(detail)
        } else {
            SendError::Rejected(detail)
        }
    }

    pub fn from_reqwest(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => SendError::from_status(status, &error.to_string()),
            None => SendError::Transient(error.to_string()),
        }
    }
}

/// One delivery attempt over one channel.
///
/// Adapters never retry on their own; the dispatcher decides whether a
/// failure gets another attempt. The request timeout belongs to the adapter.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    fn channel(&self) -> Channel;

    /// Returns the identifier the channel assigned to the delivered message.
    async fn send(
        &self,
        recipient: &str,
        message: &str,
        config: &ChannelConfig,
    ) -> Result<String, SendError>;
}

#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<Channel, Arc<dyn ChannelAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, adapter: Arc<dyn ChannelAdapter>) -> Self {
        self.adapters.insert(adapter.channel(), adapter);
        self
    }

    pub fn get(&self, channel: Channel) -> Option<Arc<dyn ChannelAdapter>> {
        self.adapters.get(&channel).cloned()
    }

    pub fn channels(&self) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self.adapters.keys().copied().collect();
        channels.sort();
        channels
    }
}

pub fn build_http_client(timeout_seconds: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))
}
