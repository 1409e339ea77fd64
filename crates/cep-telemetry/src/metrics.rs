use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// In-memory counter. Monotonically increasing.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Traffic counters for one client session.
#[derive(Debug, Default)]
pub struct ClientMetrics {
    pub packets_sent: Counter,
    pub notifications_received: Counter,
    pub malformed_dropped: Counter,
    pub send_failures: Counter,
}

impl ClientMetrics {
    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_sent: self.packets_sent.get(),
            notifications_received: self.notifications_received.get(),
            malformed_dropped: self.malformed_dropped.get(),
            send_failures: self.send_failures.get(),
        }
    }
}

/// Serializable snapshot of the session counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub packets_sent: u64,
    pub notifications_received: u64,
    pub malformed_dropped: u64,
    pub send_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_increments() {
        let counter = Counter::default();
        assert_eq!(counter.get(), 0);
        counter.increment();
        counter.add(4);
        assert_eq!(counter.get(), 5);
    }

    #[test]
    fn snapshot_copies_counters() {
        let metrics = ClientMetrics::default();
        metrics.packets_sent.add(3);
        metrics.malformed_dropped.increment();

        let snap = metrics.snapshot();
        assert_eq!(snap.packets_sent, 3);
        assert_eq!(snap.malformed_dropped, 1);
        assert_eq!(snap.notifications_received, 0);
        assert_eq!(snap.send_failures, 0);
    }

    #[test]
    fn snapshot_serde_roundtrip() {
        let snap = MetricsSnapshot {
            packets_sent: 1,
            notifications_received: 2,
            malformed_dropped: 3,
            send_failures: 4,
        };
        let json = serde_json::to_string(&snap).unwrap();
        let parsed: MetricsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, parsed);
    }
}
