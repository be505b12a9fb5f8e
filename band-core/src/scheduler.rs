//! Clock-skew-compensated command scheduling
//!
//! The host stamps every transport envelope with an absolute wall-clock fire
//! time far enough in the future to cover the slowest member's delivery
//! delay; every participant (host included) arms a one-shot timer for
//! `envelope.time - now` and fires immediately if that is already negative.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Safety margin added on top of the doubled peer latency (ms).
const TRANSPORT_MARGIN_MS: u64 = 100;

/// Minimum scheduling buffer for play/pause/stop (ms). Protects against
/// under-buffering when every peer reports near-zero latency.
const TRANSPORT_FLOOR_MS: u64 = 300;

/// Margin and floor for seek, which favors responsiveness during active
/// playback over safety margin.
const SEEK_MARGIN_MS: u64 = 50;
const SEEK_FLOOR_MS: u64 = 150;

/// Current wall-clock time in milliseconds since UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Scheduling buffer for play/pause/stop given the worst peer latency.
/// Doubling covers host->member delivery plus margin.
pub fn transport_buffer_ms(max_latency_ms: u64) -> u64 {
    (2 * max_latency_ms + TRANSPORT_MARGIN_MS).max(TRANSPORT_FLOOR_MS)
}

/// Scheduling buffer for seek.
pub fn seek_buffer_ms(max_latency_ms: u64) -> u64 {
    (2 * max_latency_ms + SEEK_MARGIN_MS).max(SEEK_FLOOR_MS)
}

/// Delay until an envelope fires locally. A `start_at` already in the past
/// clamps to zero so the action runs immediately rather than being dropped.
/// `offset_ms` is the host-only compensation offset (may be negative).
pub fn fire_delay(start_at_ms: u64, now_ms: u64, offset_ms: i64) -> Duration {
    let delay = start_at_ms as i64 - now_ms as i64 + offset_ms;
    Duration::from_millis(delay.max(0) as u64)
}

/// Owns the one-shot timers armed for scheduled transport actions. All
/// pending timers are aborted on teardown so no action outlives its session.
#[derive(Default)]
pub struct Scheduler {
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer: sleep `delay`, then run `action`.
    pub fn arm<F>(&self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });

        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Abort every pending timer.
    pub fn cancel_all(&self) {
        for handle in self.pending.lock().drain(..) {
            handle.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
