//! Latency tracking for peer channels
//!
//! Each connected channel carries a periodic ping/pong exchange; the pong
//! echoes the ping's timestamp verbatim and the one-way latency estimate is
//! half the observed round trip, rounded to the nearest millisecond.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

/// Interval between pings on each channel (an immediate ping is also sent
/// at channel-open).
pub const PING_INTERVAL: Duration = Duration::from_secs(2);

/// Estimate one-way latency from a pong: `round((now - sent) / 2)`.
pub fn one_way_ms(now_ms: u64, sent_at_ms: u64) -> u64 {
    let rtt = now_ms.saturating_sub(sent_at_ms);
    (rtt + 1) / 2
}

/// Latest one-way latency estimate per peer.
///
/// Values are advisory: they feed the scheduler's buffer computation and the
/// roster display, nothing reacts to latency regressions.
#[derive(Debug, Default)]
pub struct LatencyMonitor {
    latencies: HashMap<String, u64>,
}

impl LatencyMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pong from `peer`. Returns the new one-way estimate.
    pub fn record_pong(&mut self, peer: &str, sent_at_ms: u64, now_ms: u64) -> u64 {
        let latency = one_way_ms(now_ms, sent_at_ms);
        self.set(peer, latency);
        latency
    }

    /// Store an already-computed one-way estimate for `peer`.
    pub fn set(&mut self, peer: &str, latency_ms: u64) {
        self.latencies.insert(peer.to_string(), latency_ms);
        tracing::debug!("latency to {}: {}ms one-way", peer, latency_ms);
    }

    pub fn peer_latency_ms(&self, peer: &str) -> Option<u64> {
        self.latencies.get(peer).copied()
    }

    /// Highest latency over all tracked peers, 0 when none are tracked.
    pub fn max_latency_ms(&self) -> u64 {
        self.latencies.values().copied().max().unwrap_or(0)
    }

    pub fn remove(&mut self, peer: &str) {
        self.latencies.remove(peer);
    }

    pub fn clear(&mut self) {
        self.latencies.clear();
    }
}

/// Thread-safe wrapper for LatencyMonitor
pub type SharedLatencyMonitor = Arc<RwLock<LatencyMonitor>>;

/// Create a new shared latency monitor
pub fn new_shared_monitor() -> SharedLatencyMonitor {
    Arc::new(RwLock::new(LatencyMonitor::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_way_rounds_to_nearest() {
        assert_eq!(one_way_ms(100, 0), 50);
        assert_eq!(one_way_ms(101, 0), 51); // 50.5 rounds up
        assert_eq!(one_way_ms(103, 0), 52); // 51.5 rounds up
        assert_eq!(one_way_ms(0, 100), 0); // clock skew clamps to zero
    }

    #[test]
    fn test_latest_sample_wins() {
        let mut monitor = LatencyMonitor::new();

        // Deterministic RTT sequence: stored value is always round(rtt/2)
        // of the most recent round trip, not an average.
        for (rtt, expected) in [(100u64, 50u64), (30, 15), (240, 120), (7, 4)] {
            let got = monitor.record_pong("peer1", 1_000, 1_000 + rtt);
            assert_eq!(got, expected);
            assert_eq!(monitor.peer_latency_ms("peer1"), Some(expected));
        }
    }

    #[test]
    fn test_max_latency() {
        let mut monitor = LatencyMonitor::new();
        assert_eq!(monitor.max_latency_ms(), 0);

        monitor.record_pong("a", 0, 60); // 30ms
        monitor.record_pong("b", 0, 200); // 100ms
        assert_eq!(monitor.max_latency_ms(), 100);

        monitor.remove("b");
        assert_eq!(monitor.max_latency_ms(), 30);

        monitor.clear();
        assert_eq!(monitor.max_latency_ms(), 0);
    }
}
