//! Duration Tracker
//!
//! While a task runs, a sidecar tokio task republishes its elapsed time on a
//! fixed interval. Stopping the tracker always publishes once more and waits
//! for the sidecar to exit, so the final value reflects the real run time even
//! when the task finishes between ticks.

use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct DurationTracker {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DurationTracker {
    /// Starts ticking now. `publish` receives the elapsed time since start on
    /// every tick (the first one fires immediately) and once more on stop.
    pub fn start<F>(interval: Duration, publish: F) -> Self
    where
        F: Fn(Duration) + Send + 'static,
    {
        let started = Instant::now();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let interval = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => publish(started.elapsed()),
                    // Fires on an explicit stop and when the tracker is dropped.
                    _ = &mut stop_rx => {
                        publish(started.elapsed());
                        break;
                    }
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Signals the sidecar, waits for its final publish, and releases the timer.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Duration tracker exited abnormally: {}", e);
            }
        }
    }
}

impl Drop for DurationTracker {
    fn drop(&mut self) {
        // Dropping the sender wakes the sidecar; it publishes once and exits on its own.
        self.stop_tx.take();
    }
}
