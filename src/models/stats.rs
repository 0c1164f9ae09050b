use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{message::Channel, status::DispatchState};

#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    pub pending: usize,
    pub processing: bool,
    pub state: DispatchState,
    pub scheduled_retries: usize,
    pub channels: BTreeMap<Channel, usize>,
    pub delivered: u64,
    pub failed: u64,
    pub retried: u64,
}
