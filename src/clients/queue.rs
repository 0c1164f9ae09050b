use std::collections::{BTreeMap, VecDeque};

use parking_lot::Mutex;
use tracing::debug;

use crate::models::message::{Channel, NotificationRequest};

/// Shared FIFO of pending notifications.
///
/// Every channel interleaves on the same queue. Only requests waiting to be
/// claimed live here; in-flight and finished requests are owned elsewhere.
#[derive(Debug, Default)]
pub struct MessageQueue {
    pending: Mutex<VecDeque<NotificationRequest>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, request: NotificationRequest) -> usize {
        let mut pending = self.pending.lock();
        debug!(
            request_id = %request.id,
            channel = %request.channel,
            attempt_count = request.attempt_count,
            "Notification queued"
        );
        pending.push_back(request);
        pending.len()
    }

    pub fn dequeue_next(&self) -> Option<NotificationRequest> {
        self.pending.lock().pop_front()
    }

    pub fn pending_count_by_channel(&self) -> BTreeMap<Channel, usize> {
        let mut counts: BTreeMap<Channel, usize> =
            Channel::ALL.iter().map(|channel| (*channel, 0)).collect();

        for request in self.pending.lock().iter() {
            *counts.entry(request.channel).or_insert(0) += 1;
        }

        counts
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Drops everything still waiting, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.pending.lock());
        drained.len()
    }
}
