// Relay counters
//
// Process-local atomics, exposed as JSON on GET /metrics.

pub use handlers::{get_metrics, MetricsResponse};

mod handlers;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RelayMetrics {
    peers_registered: AtomicU64,
    peers_replaced: AtomicU64,
    peers_disconnected: AtomicU64,
    envelopes_delivered: AtomicU64,
    delivery_failures: AtomicU64,
    unicast_dropped: AtomicU64,
    presence_events: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub peers_registered: u64,
    pub peers_replaced: u64,
    pub peers_disconnected: u64,
    pub envelopes_delivered: u64,
    pub delivery_failures: u64,
    pub unicast_dropped: u64,
    pub presence_events: u64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_registered(&self, replaced: bool) {
        self.peers_registered.fetch_add(1, Ordering::Relaxed);
        if replaced {
            self.peers_replaced.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_disconnected(&self) {
        self.peers_disconnected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.envelopes_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unicast_dropped(&self) {
        self.unicast_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_presence_event(&self) {
        self.presence_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            peers_registered: self.peers_registered.load(Ordering::Relaxed),
            peers_replaced: self.peers_replaced.load(Ordering::Relaxed),
            peers_disconnected: self.peers_disconnected.load(Ordering::Relaxed),
            envelopes_delivered: self.envelopes_delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            unicast_dropped: self.unicast_dropped.load(Ordering::Relaxed),
            presence_events: self.presence_events.load(Ordering::Relaxed),
        }
    }
}
