use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Tick { remaining: u32 },
    Expired,
}

/// Countdown clock. Emits one `Tick { remaining }` per period over the
/// channel and a single final `Expired` after `Tick { remaining: 0 }`.
///
/// `remaining` is derived from a monotonic instant rather than a decremented
/// counter, so if the host coalesces ticks (suspended tab, overloaded
/// runtime) the next delivered value is still authoritative.
pub struct Clock {
    tx: mpsc::Sender<ClockEvent>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Clock {
    /// One-second ticks, the wall-clock configuration.
    pub fn new() -> (Self, mpsc::Receiver<ClockEvent>) {
        Self::with_period(Duration::from_secs(1))
    }

    /// Custom tick period; `remaining` still counts whole periods, so a short
    /// period plays an attempt back accelerated.
    pub fn with_period(period: Duration) -> (Self, mpsc::Receiver<ClockEvent>) {
        let (tx, rx) = mpsc::channel(32);
        (
            Self {
                tx,
                period,
                task: None,
            },
            rx,
        )
    }

    /// Begins counting down from `total_seconds`. Restarting replaces any
    /// previous countdown; the receiver survives restarts.
    pub fn start(&mut self, total_seconds: u32) {
        self.stop();
        let tx = self.tx.clone();
        let period = self.period;
        let started = Instant::now();
        self.task = Some(tokio::spawn(async move {
            if total_seconds == 0 {
                let _ = tx.send(ClockEvent::Tick { remaining: 0 }).await;
                let _ = tx.send(ClockEvent::Expired).await;
                return;
            }
            let mut ticker = interval_at(started + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let elapsed =
                    (Instant::now().duration_since(started).as_millis() / period.as_millis().max(1)) as u32;
                let remaining = total_seconds.saturating_sub(elapsed);
                if tx.send(ClockEvent::Tick { remaining }).await.is_err() {
                    // Receiver gone; nothing left to tick for.
                    return;
                }
                if remaining == 0 {
                    let _ = tx.send(ClockEvent::Expired).await;
                    return;
                }
            }
        }));
    }

    /// Halts future ticks. Idempotent; safe before `start` and after expiry.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.stop();
    }
}
