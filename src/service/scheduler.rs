//! Cancellable periodic loops for the discovery cycles.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// A periodic loop backed by a cancellable timer.
///
/// Ticks immediately on spawn, then reschedules relative to the previous
/// deadline (`next = previous + period`), so slow ticks do not accumulate
/// drift. Cancellation observed by the timer task never reschedules:
/// after [`stop`](Self::stop) returns, no further tick runs.
pub struct PeriodicLoop {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicLoop {
    /// Spawn a loop invoking `tick` every `period`, starting now.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (shutdown, mut cancelled) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut deadline = Instant::now();

            loop {
                tokio::select! {
                    // Cancellation wins over an elapsed deadline.
                    biased;

                    _ = cancelled.changed() => break,
                    () = sleep_until(deadline) => {
                        tick().await;
                        deadline += period;
                    }
                }
            }
        });

        Self {
            name,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Cancel the loop and wait for the timer task to finish.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(true);

        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }

        debug!(name = self.name, "periodic loop stopped");
    }
}

/// The two independent discovery loops: static contact re-announcement and
/// dynamic (fingerprint-based) contact discovery.
pub struct ContactScheduler {
    contact_loop: PeriodicLoop,
    dynamic_contact_loop: PeriodicLoop,
}

impl ContactScheduler {
    /// Wrap the two running loops.
    pub fn new(contact_loop: PeriodicLoop, dynamic_contact_loop: PeriodicLoop) -> Self {
        Self {
            contact_loop,
            dynamic_contact_loop,
        }
    }

    /// Cancel both loops. Called before the secure channel service closes
    /// so no new discovery traffic is generated mid-teardown.
    pub async fn stop(&self) {
        self.dynamic_contact_loop.stop().await;
        self.contact_loop.stop().await;
    }
}
