use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Error, Result, anyhow};
use serde::Deserialize;
use tokio::{sync::watch, task::JoinHandle, time::interval};
use tracing::{debug, info, warn};

use crate::models::{
    channel::{ChannelConfig, ChannelSettings},
    message::Channel,
};

/// Source of per-channel configuration.
///
/// Reads always return the latest value so callers must not hold on to a
/// `ChannelConfig` across sends.
pub trait ConfigStore: Send + Sync {
    fn channel_config(&self, channel: Channel) -> ChannelConfig;

    fn snapshot(&self) -> ChannelSettings;

    /// Notified whenever the settings change.
    fn subscribe(&self) -> watch::Receiver<ChannelSettings>;
}

pub struct InMemoryConfigStore {
    settings: watch::Sender<ChannelSettings>,
}

impl InMemoryConfigStore {
    pub fn new(settings: ChannelSettings) -> Self {
        Self {
            settings: watch::Sender::new(settings),
        }
    }

    pub fn set_channel(&self, channel: Channel, config: ChannelConfig) {
        self.settings.send_modify(|settings| settings.set(channel, config));
        info!(%channel, "Channel configuration updated");
    }

    pub fn set_enabled(&self, channel: Channel, enabled: bool) {
        self.settings
            .send_modify(|settings| settings.get_mut(channel).enabled = enabled);
        info!(%channel, enabled, "Channel toggled");
    }

    /// Returns whether anything changed.
    pub fn replace(&self, settings: ChannelSettings) -> bool {
        self.settings.send_if_modified(|current| {
            if *current == settings {
                return false;
            }
            *current = settings;
            true
        })
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn channel_config(&self, channel: Channel) -> ChannelConfig {
        self.settings.borrow().get(channel)
    }

    fn snapshot(&self) -> ChannelSettings {
        self.settings.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ChannelSettings> {
        self.settings.subscribe()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    whatsapp: Option<ChannelEntry>,
    telegram: Option<ChannelEntry>,
}

impl SettingsFile {
    fn entry(&self, channel: Channel) -> Option<&ChannelEntry> {
        match channel {
            Channel::WhatsApp => self.whatsapp.as_ref(),
            Channel::Telegram => self.telegram.as_ref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelEntry {
    api_url: Option<String>,
    bot_token: Option<String>,
    enabled: Option<bool>,
}

/// Settings file layered over environment defaults.
///
/// Empty or missing URLs and tokens keep the default; a channel is enabled
/// only when the file says so.
pub struct FileConfigStore {
    path: PathBuf,
    defaults: ChannelSettings,
    inner: InMemoryConfigStore,
}

impl FileConfigStore {
    pub async fn open(path: impl AsRef<Path>, defaults: ChannelSettings) -> Result<Self, Error> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            inner: InMemoryConfigStore::new(defaults.clone()),
            defaults,
        };

        let exists = tokio::fs::try_exists(&store.path).await.map_err(|e| {
            anyhow!("Failed to check settings file {}: {}", store.path.display(), e)
        })?;

        if exists {
            store.reload().await?;
        } else {
            warn!(path = %store.path.display(), "Settings file not found, using defaults");
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file. On error the current settings are kept.
    pub async fn reload(&self) -> Result<bool, Error> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| anyhow!("Failed to read settings file {}: {}", self.path.display(), e))?;

        let file: SettingsFile = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Invalid settings file {}: {}", self.path.display(), e))?;

        let changed = self.inner.replace(self.merge(&file));
        if changed {
            info!(path = %self.path.display(), "Notification settings reloaded");
        } else {
            debug!(path = %self.path.display(), "Notification settings unchanged");
        }

        Ok(changed)
    }

    fn merge(&self, file: &SettingsFile) -> ChannelSettings {
        let mut merged = ChannelSettings::new();

        for channel in Channel::ALL {
            let defaults = self.defaults.get(channel);
            let entry = file.entry(channel);

            let pick = |value: Option<&String>, fallback: String| {
                value
                    .filter(|v| !v.trim().is_empty())
                    .cloned()
                    .unwrap_or(fallback)
            };

            merged.set(
                channel,
                ChannelConfig {
                    enabled: entry.and_then(|e| e.enabled).unwrap_or(false),
                    api_url: pick(entry.and_then(|e| e.api_url.as_ref()), defaults.api_url),
                    credential: pick(
                        entry.and_then(|e| e.bot_token.as_ref()),
                        defaults.credential,
                    ),
                },
            );
        }

        merged
    }

    pub fn spawn_watcher(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = store.reload().await {
                    warn!(error = %e, "Settings reload failed, keeping previous settings");
                }
            }
        })
    }
}

impl ConfigStore for FileConfigStore {
    fn channel_config(&self, channel: Channel) -> ChannelConfig {
        self.inner.channel_config(channel)
    }

    fn snapshot(&self) -> ChannelSettings {
        self.inner.snapshot()
    }

    fn subscribe(&self) -> watch::Receiver<ChannelSettings> {
        self.inner.subscribe()
    }
}
