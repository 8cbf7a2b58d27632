//! Cancellable periodic timers driving autoplay.
//!
//! A [`Scheduler`] is owned by the playback controller: armed on play,
//! disarmed on pause, seek, end of timeline, and when the controller is
//! dropped. Ticks are delivered out-of-band (over a channel for
//! [`IntervalTimer`], by hand for [`ManualScheduler`]); the host forwards each
//! one to [`PlaybackController::tick`](super::PlaybackController::tick).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// One timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// A periodic callback source with explicit start/stop.
pub trait Scheduler {
    /// Start firing every `interval`. Restarts if already running.
    fn start(&mut self, interval: Duration);

    /// Stop firing. Idempotent. No tick is delivered after this returns.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn start(&mut self, interval: Duration) {
        (**self).start(interval);
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }
}

/// Background-thread timer that sends a [`Tick`] per interval.
///
/// The worker shares only a stop flag and the channel sender. `stop` sets the
/// flag and joins the worker, so a stopped timer never sends again.
#[derive(Debug)]
pub struct IntervalTimer {
    sender: Sender<Tick>,
    worker: Option<Worker>,
}

#[derive(Debug)]
struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl IntervalTimer {
    /// Create a stopped timer and the receiving end of its tick channel.
    #[must_use]
    pub fn new() -> (Self, Receiver<Tick>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
                worker: None,
            },
            receiver,
        )
    }
}

/// Sleep granularity used to notice a stop request promptly.
const POLL: Duration = Duration::from_millis(5);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

impl Scheduler for IntervalTimer {
    fn start(&mut self, interval: Duration) {
        self.stop();

        let interval = interval.max(MIN_INTERVAL);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let sender = self.sender.clone();
        let handle = std::thread::spawn(move || {
            loop {
                let mut waited = Duration::ZERO;
                while waited < interval {
                    if flag.load(Ordering::Acquire) {
                        return;
                    }
                    let nap = POLL.min(interval - waited);
                    std::thread::sleep(nap);
                    waited += nap;
                }
                if flag.load(Ordering::Acquire) || sender.send(Tick).is_err() {
                    return;
                }
            }
        });

        tracing::debug!(interval_ms = interval.as_millis(), "playback timer started");
        self.worker = Some(Worker { stop, handle });
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop.store(true, Ordering::Release);
            if worker.handle.join().is_err() {
                tracing::warn!("playback timer thread panicked");
            }
            tracing::debug!("playback timer stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Deterministic scheduler for tests and hosts with their own event loop.
///
/// Records the armed interval and how often it was started and stopped; the
/// caller delivers ticks itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualScheduler {
    interval: Option<Duration>,
    pub starts: usize,
    pub stops: usize,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval the scheduler is armed with, if running.
    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        self.interval
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, interval: Duration) {
        self.interval = Some(interval);
        self.starts += 1;
    }

    fn stop(&mut self) {
        if self.interval.take().is_some() {
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.interval.is_some()
    }
}
