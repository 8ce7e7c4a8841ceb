use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Running refresh timer. Dropping the handle stops it.
#[derive(Debug)]
pub struct PollingHandle {
    task: JoinHandle<()>,
}

impl PollingHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Runs `refresh` every `every` while `visible` reads `true`. Ticks that land
/// while hidden are skipped rather than queued.
pub fn spawn_polling<F, Fut>(
    every: Duration,
    visible: watch::Receiver<bool>,
    mut refresh: F,
) -> PollingHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if !*visible.borrow() {
                debug!("view hidden, skipping refresh");
                continue;
            }
            refresh().await;
        }
    });
    PollingHandle { task }
}
