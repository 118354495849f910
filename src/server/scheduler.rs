use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// A job run on a fixed interval by one tokio task. Runs of the job never
/// overlap: the next tick is only awaited once the previous run returned.
pub struct PeriodicTask {
    name: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(name: impl Into<String>, interval: Duration, first_delay: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let interval = interval.max(Duration::from_millis(1));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    log::debug!("Periodic task {} cancelled before first run", task_name);
                    return;
                }
                _ = time::sleep(first_delay) => {}
            }

            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => job().await,
                }
            }
            log::debug!("Periodic task {} stopped", task_name);
        });

        Self {
            name,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stops scheduling new runs and waits up to `grace` for a run in
    /// progress. Returns false if the task had to be aborted.
    pub async fn cancel(mut self, grace: Duration) -> bool {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let Some(mut handle) = self.handle.take() else {
            return true;
        };
        match time::timeout(grace, &mut handle).await {
            Ok(_) => true,
            Err(_) => {
                log::warn!(
                    "Periodic task {} did not finish within {:?}, aborting",
                    self.name, grace
                );
                handle.abort();
                false
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
