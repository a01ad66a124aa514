//! Bus counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Registry-owned delivery counters
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// Envelopes accepted by `publish`
    published: AtomicU64,
    /// Mailbox appends (a broadcast counts once per mailbox)
    delivered: AtomicU64,
    /// Envelopes addressed to an unregistered name
    undeliverable: AtomicU64,
}

impl BusMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn inc_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn add_delivered(&self, n: u64) {
        self.delivered.fetch_add(n, Ordering::Relaxed);
    }

    pub fn undeliverable(&self) -> u64 {
        self.undeliverable.load(Ordering::Relaxed)
    }

    pub fn inc_undeliverable(&self) {
        self.undeliverable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BusMetricsSnapshot {
        BusMetricsSnapshot {
            published: self.published(),
            delivered: self.delivered(),
            undeliverable: self.undeliverable(),
        }
    }
}

/// Snapshot of bus counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusMetricsSnapshot {
    pub published: u64,
    pub delivered: u64,
    pub undeliverable: u64,
}
