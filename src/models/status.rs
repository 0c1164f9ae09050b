use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchState {
    Idle,
    Claiming,
    Sending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    ChannelDisabled,
    NotConfigured,
    Rejected,
    Transient,
    RetriesExhausted,
}

impl FailureReason {
    /// Only remote or network faults are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureReason::Transient)
    }
}

impl Display for DispatchState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DispatchState::Idle => write!(f, "idle"),
            DispatchState::Claiming => write!(f, "claiming"),
            DispatchState::Sending => write!(f, "sending"),
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            FailureReason::ChannelDisabled => write!(f, "channel_disabled"),
            FailureReason::NotConfigured => write!(f, "not_configured"),
            FailureReason::Rejected => write!(f, "rejected"),
            FailureReason::Transient => write!(f, "transient"),
            FailureReason::RetriesExhausted => write!(f, "retries_exhausted"),
        }
    }
}
