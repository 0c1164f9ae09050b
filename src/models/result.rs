use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    message::{Channel, NotificationRequest},
    status::FailureReason,
};

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub request_id: Uuid,
    pub channel: Channel,
    pub attempt: u32,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_message_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<FailureReason>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl DispatchResult {
    pub fn delivered(request: &NotificationRequest, attempt: u32, message_id: String) -> Self {
        Self {
            request_id: request.id,
            channel: request.channel,
            attempt,
            success: true,
            channel_message_id: Some(message_id),
            error_reason: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(
        request: &NotificationRequest,
        attempt: u32,
        reason: FailureReason,
        error: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request.id,
            channel: request.channel,
            attempt,
            success: false,
            channel_message_id: None,
            error_reason: Some(reason),
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.success || self.error_reason.is_some_and(|reason| !reason.is_retryable())
    }

    /// Reclassifies a transient failure once no attempts are left.
    pub fn into_exhausted(mut self) -> Self {
        self.error_reason = Some(FailureReason::RetriesExhausted);
        self
    }
}

/// A request that reached a terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub request: NotificationRequest,
    pub result: DispatchResult,
}
