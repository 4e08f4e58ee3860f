//! Real-time tick clock backed by a tokio interval task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::timer::TickCounter;

/// Handle to a running tick clock. Dropping it stops the clock.
#[derive(Debug)]
pub struct TickClock {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl TickClock {
    /// Stop posting ticks. Safe to call more than once.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Tick clock task ended abnormally");
        }
    }
}

impl Drop for TickClock {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a periodic task posting one tick into `counter` every `period`.
///
/// Must be called from inside a tokio runtime. The first tick fires one full
/// period after spawning. Missed ticks are delivered in a burst so the total
/// count tracks wall-clock time even when the runtime stalls.
pub fn spawn_tick_clock(counter: TickCounter, period: Duration) -> TickClock {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let period = period.max(Duration::from_millis(1));

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => counter.post(),
            }
        }
        tracing::debug!("Tick clock stopped");
    });

    TickClock {
        cancel,
        handle: Some(handle),
    }
}
