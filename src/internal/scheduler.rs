use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::info;

use crate::app::Action;

/// Handle for the periodic feed+status refresh timer.
///
/// The timer fires [`Action::PeriodicRefresh`] on a fixed period with no
/// backoff or jitter. Wrapping it in an explicit handle lets the app stop it
/// cleanly on shutdown and lets tests run without wall-clock waits.
#[derive(Debug)]
pub struct Scheduler {
    handle: JoinHandle<()>,
}

impl Scheduler {
    pub fn start(period: Duration, tx: UnboundedSender<Action>) -> Self {
        info!(period_secs = period.as_secs(), "starting periodic refresh");
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately; the startup refresh is
            // issued separately, so skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Action::PeriodicRefresh).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
