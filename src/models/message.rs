use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    WhatsApp,
    Telegram,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::WhatsApp, Channel::Telegram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::WhatsApp => "whatsapp",
            Channel::Telegram => "telegram",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Entry,
    Exit,
    Absence,
    Late,
    Custom,
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NotificationKind::Entry => write!(f, "entry"),
            NotificationKind::Exit => write!(f, "exit"),
            NotificationKind::Absence => write!(f, "absence"),
            NotificationKind::Late => write!(f, "late"),
            NotificationKind::Custom => write!(f, "custom"),
        }
    }
}

/// A single notification waiting to be delivered over one channel.
///
/// The message is already rendered. `metadata` is carried through untouched
/// for whoever reads the delivery history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub id: Uuid,
    pub channel: Channel,
    pub recipient: String,
    pub message: String,
    pub subject_name: String,
    pub kind: NotificationKind,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub attempt_count: u32,

    pub created_at: DateTime<Utc>,
}

impl NotificationRequest {
    pub fn new(
        channel: Channel,
        recipient: impl Into<String>,
        message: impl Into<String>,
        subject_name: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel,
            recipient: recipient.into(),
            message: message.into(),
            subject_name: subject_name.into(),
            kind,
            metadata: HashMap::new(),
            attempt_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
