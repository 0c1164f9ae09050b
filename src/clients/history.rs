use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::models::result::HistoryRecord;

/// Bounded log of terminal outcomes, newest last.
#[derive(Debug)]
pub struct DeliveryHistory {
    capacity: usize,
    records: Mutex<VecDeque<HistoryRecord>>,
}

impl DeliveryHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn record(&self, record: HistoryRecord) {
        let mut records = self.records.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryRecord> {
        self.records.lock().iter().rev().take(limit).cloned().collect()
    }

    pub fn failures(&self) -> Vec<HistoryRecord> {
        self.records
            .lock()
            .iter()
            .filter(|record| !record.result.success)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
