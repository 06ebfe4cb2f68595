use std::time::Duration;
use tokio::select;
use tokio::sync::watch;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Keeps a [PollTimer] alive. Dropping (or [PollHandle::cancel]ling) it stops
/// the loop driven by the timer at its next tick.
#[derive(Debug)]
pub struct PollHandle {
    _cancel: watch::Sender<()>,
}

impl PollHandle {
    pub fn cancel(self) {}
}

pub struct PollTimer {
    interval: Interval,
    cancelled: watch::Receiver<()>,
}

pub fn poll_timer(period: Duration) -> (PollHandle, PollTimer) {
    let (cancel, cancelled) = watch::channel(());
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    (PollHandle { _cancel: cancel }, PollTimer { interval, cancelled })
}

impl PollTimer {
    /// Waits for the next tick; the first one fires immediately. Returns
    /// `false` once the handle is gone.
    pub async fn tick(&mut self) -> bool {
        select! {
            biased;
            _ = self.cancelled.changed() => false,
            _ = self.interval.tick() => true,
        }
    }
}
