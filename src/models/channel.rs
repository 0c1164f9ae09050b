use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::message::Channel;

/// A credential must be longer than this to count as configured.
pub const MIN_CREDENTIAL_LEN: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub enabled: bool,
    pub api_url: String,

    #[serde(default, skip_serializing)]
    pub credential: String,
}

impl ChannelConfig {
    pub fn new(enabled: bool, api_url: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            enabled,
            api_url: api_url.into(),
            credential: credential.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credential.trim().len() > MIN_CREDENTIAL_LEN
    }
}

/// Per-channel configuration snapshot. Channels without an entry are disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSettings {
    channels: BTreeMap<Channel, ChannelConfig>,
}

impl ChannelSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Channel, config: ChannelConfig) -> Self {
        self.channels.insert(channel, config);
        self
    }

    pub fn get(&self, channel: Channel) -> ChannelConfig {
        self.channels.get(&channel).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, channel: Channel, config: ChannelConfig) {
        self.channels.insert(channel, config);
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut ChannelConfig {
        self.channels.entry(channel).or_default()
    }

    pub fn status(&self) -> ConfigStatus {
        Channel::ALL
            .iter()
            .map(|channel| {
                let config = self.get(*channel);
                (
                    *channel,
                    ChannelStatus {
                        enabled: config.enabled,
                        configured: config.is_configured(),
                    },
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub enabled: bool,
    pub configured: bool,
}

pub type ConfigStatus = BTreeMap<Channel, ChannelStatus>;
