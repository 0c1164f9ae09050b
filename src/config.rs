use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::{
    channel::{ChannelConfig, ChannelSettings},
    message::Channel,
    retry::RetryConfig,
};

pub const DEFAULT_WHATSAPP_API_URL: &str = "https://graph.facebook.com/v21.0/me/messages";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org/bot";

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_whatsapp_api_url")]
    pub whatsapp_api_url: String,
    #[serde(default)]
    pub whatsapp_token: String,
    #[serde(default)]
    pub whatsapp_enabled: bool,

    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    #[serde(default)]
    pub telegram_token: String,
    #[serde(default)]
    pub telegram_enabled: bool,

    #[serde(default)]
    pub settings_file: Option<String>,
    #[serde(default = "default_settings_reload_seconds")]
    pub settings_reload_seconds: u64,

    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_retry_backoff_multiplier")]
    pub retry_backoff_multiplier: u64,
    #[serde(default = "default_true")]
    pub retry_jitter: bool,

    #[serde(default = "default_dispatch_interval_ms")]
    pub dispatch_interval_ms: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_adapter_timeout_seconds")]
    pub adapter_timeout_seconds: u64,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_whatsapp_api_url() -> String {
    DEFAULT_WHATSAPP_API_URL.to_string()
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

fn default_settings_reload_seconds() -> u64 {
    5
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_initial_retry_delay_ms() -> u64 {
    5000
}

fn default_max_retry_delay_ms() -> u64 {
    60_000
}

fn default_retry_backoff_multiplier() -> u64 {
    1
}

fn default_true() -> bool {
    true
}

fn default_dispatch_interval_ms() -> u64 {
    2000
}

fn default_history_capacity() -> usize {
    100
}

fn default_adapter_timeout_seconds() -> u64 {
    10
}

fn default_server_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            whatsapp_api_url: default_whatsapp_api_url(),
            whatsapp_token: String::new(),
            whatsapp_enabled: false,
            telegram_api_url: default_telegram_api_url(),
            telegram_token: String::new(),
            telegram_enabled: false,
            settings_file: None,
            settings_reload_seconds: default_settings_reload_seconds(),
            max_retry_attempts: default_max_retry_attempts(),
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            retry_backoff_multiplier: default_retry_backoff_multiplier(),
            retry_jitter: true,
            dispatch_interval_ms: default_dispatch_interval_ms(),
            history_capacity: default_history_capacity(),
            adapter_timeout_seconds: default_adapter_timeout_seconds(),
            server_port: default_server_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_retry_attempts == 0 {
            return Err(anyhow!("MAX_RETRY_ATTEMPTS must be at least 1"));
        }
        if self.retry_backoff_multiplier == 0 {
            return Err(anyhow!("RETRY_BACKOFF_MULTIPLIER must be at least 1"));
        }
        if self.dispatch_interval_ms == 0 {
            return Err(anyhow!("DISPATCH_INTERVAL_MS must be greater than zero"));
        }
        if self.history_capacity == 0 {
            return Err(anyhow!("HISTORY_CAPACITY must be greater than zero"));
        }

        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retry_attempts,
            initial_delay_ms: self.initial_retry_delay_ms,
            max_delay_ms: self.max_retry_delay_ms,
            backoff_multiplier: self.retry_backoff_multiplier,
            jitter: self.retry_jitter,
        }
    }

    pub fn channel_settings(&self) -> ChannelSettings {
        ChannelSettings::new()
            .with_channel(
                Channel::WhatsApp,
                ChannelConfig::new(
                    self.whatsapp_enabled,
                    &self.whatsapp_api_url,
                    &self.whatsapp_token,
                ),
            )
            .with_channel(
                Channel::Telegram,
                ChannelConfig::new(
                    self.telegram_enabled,
                    &self.telegram_api_url,
                    &self.telegram_token,
                ),
            )
    }
}
