use serde::{Deserialize, Serialize};

use crate::models::message::{Channel, NotificationKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub kind: NotificationKind,
    pub name: String,
    pub body: String,
    pub channels: Vec<Channel>,
    pub active: bool,
}

impl Template {
    pub fn new(kind: NotificationKind, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            body: body.into(),
            channels: vec![Channel::WhatsApp],
            active: true,
        }
    }

    pub fn with_channels(mut self, channels: Vec<Channel>) -> Self {
        self.channels = channels;
        self
    }
}

pub fn default_attendance_templates() -> Vec<Template> {
    vec![
        Template::new(
            NotificationKind::Entry,
            "School entry",
            "Your child {studentName} arrived at school at {time}. Have a great day!",
        )
        .with_channels(vec![Channel::WhatsApp, Channel::Telegram]),
        Template::new(
            NotificationKind::Exit,
            "School exit",
            "Your child {studentName} left school at {time}. We hope they had a good day!",
        )
        .with_channels(vec![Channel::WhatsApp, Channel::Telegram]),
        Template::new(
            NotificationKind::Absence,
            "Absence",
            "Your child {studentName} has not arrived at school today ({date}). Please contact the school.",
        ),
        Template::new(
            NotificationKind::Late,
            "Late arrival",
            "Your child {studentName} arrived late at {time}. School starts at 8:00 AM.",
        ),
    ]
}
