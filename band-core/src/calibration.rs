//! Calibration Session
//!
//! A repeating, latency-compensated test-tone loop. Every participant runs
//! its own copy against the same absolute start time, so a human can tune
//! the host compensation offset by ear while beeps are sounding. The offset
//! cell is re-read on every iteration; slider changes take effect on the
//! next beep without restarting.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;

use crate::engine::PlaybackEngine;
use crate::scheduler::now_ms;

/// Key fired for each calibration beep.
const CALIBRATION_KEY: &str = "t";

/// Absolute fire time for beep `index`.
pub fn beep_time_ms(start_at_ms: u64, interval_ms: u64, index: u64, offset_ms: i64) -> i64 {
    start_at_ms as i64 + (index * interval_ms) as i64 + offset_ms
}

/// After a stall, the index of the next beep that is still in the future.
/// Skipping forward avoids a burst of catch-up beeps.
pub fn next_future_index(start_at_ms: u64, interval_ms: u64, now_ms: u64, offset_ms: i64) -> u64 {
    let elapsed = now_ms as i64 - start_at_ms as i64 - offset_ms;
    if elapsed <= 0 {
        return 0;
    }
    (elapsed as u64) / interval_ms + 1
}

/// Run the calibration loop until cancelled.
///
/// `offset_ms` is the shared host-delay cell; members pass a cell pinned to
/// zero since the offset applies only on the host's own execution path.
pub async fn run_calibration_loop(
    start_at_ms: u64,
    interval_ms: u64,
    offset_ms: Arc<AtomicI64>,
    engine: Arc<dyn PlaybackEngine>,
    mut cancel: oneshot::Receiver<()>,
) {
    if interval_ms == 0 {
        return;
    }
    debug!(
        "calibration loop started: start_at={} interval={}ms",
        start_at_ms, interval_ms
    );

    let mut index: u64 = 0;
    loop {
        // Re-read the offset each iteration so live tuning is audible.
        let offset = offset_ms.load(Ordering::Relaxed);
        let target = beep_time_ms(start_at_ms, interval_ms, index, offset);
        let now = now_ms() as i64;

        if now - target > interval_ms as i64 {
            // More than one interval late (stall or late join): skip ahead.
            let skipped = next_future_index(start_at_ms, interval_ms, now as u64, offset);
            debug!("calibration stalled, skipping beeps {}..{}", index, skipped);
            index = skipped;
            continue;
        }

        if target > now {
            let sleep = tokio::time::sleep(Duration::from_millis((target - now) as u64));
            tokio::select! {
                _ = &mut cancel => break,
                _ = sleep => {}
            }
        } else if cancel.try_recv().is_ok() {
            break;
        }

        engine.press_key(CALIBRATION_KEY);
        index += 1;
    }

    debug!("calibration loop ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_beep_time() {
        assert_eq!(beep_time_ms(1_000, 500, 0, 0), 1_000);
        assert_eq!(beep_time_ms(1_000, 500, 3, 0), 2_500);
        assert_eq!(beep_time_ms(1_000, 500, 3, -60), 2_440);
    }

    #[test]
    fn test_next_future_index_skips_forward() {
        // 1250ms after start with 500ms interval: beeps 0, 1 and 2 are
        // past/due, the next future beep is index 3.
        assert_eq!(next_future_index(1_000, 500, 2_250, 0), 3);
        // Exactly on a beep boundary still advances past it
        assert_eq!(next_future_index(1_000, 500, 2_000, 0), 3);
        // Before the start, begin at the first beep
        assert_eq!(next_future_index(1_000, 500, 400, 0), 0);
    }

    struct BeepCounter {
        presses: Mutex<Vec<String>>,
    }

    impl PlaybackEngine for BeepCounter {
        fn play_piece(&self, _: &crate::sync::SongInfo, _: &crate::engine::PlayOptions) {}
        fn pause_resume(&self) {}
        fn stop(&self) {}
        fn seek_to(&self, _: u64) {}
        fn press_key(&self, key: &str) {
            self.presses.lock().push(key.to_string());
        }
        fn current_position_ms(&self) -> u64 {
            0
        }
        fn is_paused(&self) -> bool {
            false
        }
        fn settings(&self) -> crate::settings::SettingsSnapshot {
            crate::settings::SettingsSnapshot::default()
        }
        fn apply_settings(&self, _: &crate::settings::SettingsSnapshot) {}
    }

    #[tokio::test]
    async fn test_loop_fires_and_cancels() {
        let engine = Arc::new(BeepCounter {
            presses: Mutex::new(Vec::new()),
        });
        let offset = Arc::new(AtomicI64::new(0));
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let start_at = now_ms() + 20;
        let handle = tokio::spawn(run_calibration_loop(
            start_at,
            30,
            offset,
            engine.clone() as Arc<dyn PlaybackEngine>,
            cancel_rx,
        ));

        tokio::time::sleep(Duration::from_millis(150)).await;
        let _ = cancel_tx.send(());
        let _ = handle.await;

        let presses = engine.presses.lock();
        assert!(!presses.is_empty());
        assert!(presses.iter().all(|k| k == CALIBRATION_KEY));
    }
}
