use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const TICK_RATE_MS: u64 = 100;

/// Seconds taken off the clock per tick.
pub const TICK_STEP_SECS: f64 = TICK_RATE_MS as f64 / 1000.0;

pub fn tick_interval() -> Duration {
    Duration::from_millis(TICK_RATE_MS)
}

/// Cancellation handle for one scheduled repeating tick. Dropping it cancels.
///
/// Every tick carries the generation it was scheduled under. A session owns
/// at most one handle and bumps its generation whenever it leaves `Playing`,
/// so ticks still queued from an older timer are dropped as stale.
#[derive(Debug)]
pub struct TickHandle {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Shared flag the tick producer polls.
    pub fn token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub trait TickScheduler: Send {
    /// Start delivering ticks for `generation` every `interval` until the
    /// returned handle is cancelled.
    fn schedule(&mut self, generation: u64, interval: Duration) -> TickHandle;
}

/// Production scheduler: a thread that sends tick events into the host's
/// event channel.
pub struct ChannelTicker<E> {
    tx: Sender<E>,
    wrap: fn(u64) -> E,
}

impl<E: Send + 'static> ChannelTicker<E> {
    pub fn new(tx: Sender<E>, wrap: fn(u64) -> E) -> Self {
        Self { tx, wrap }
    }
}

impl<E: Send + 'static> TickScheduler for ChannelTicker<E> {
    fn schedule(&mut self, generation: u64, interval: Duration) -> TickHandle {
        let handle = TickHandle::new(generation);
        let cancelled = handle.token();
        let tx = self.tx.clone();
        let wrap = self.wrap;

        thread::spawn(move || loop {
            thread::sleep(interval);
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(wrap(generation)).is_err() {
                break;
            }
        });

        handle
    }
}

/// One `schedule` call seen by a [`RecordingTicker`].
#[derive(Debug, Clone)]
pub struct ScheduledTick {
    pub generation: u64,
    pub interval: Duration,
    cancelled: Arc<AtomicBool>,
}

impl ScheduledTick {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Scheduler that spawns nothing and records what was asked of it. The test
/// drives ticks by hand.
#[derive(Debug, Clone, Default)]
pub struct RecordingTicker {
    log: Arc<Mutex<Vec<ScheduledTick>>>,
}

impl RecordingTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<ScheduledTick> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Schedules whose handle has not been cancelled yet.
    pub fn active(&self) -> Vec<ScheduledTick> {
        self.scheduled()
            .into_iter()
            .filter(|t| !t.is_cancelled())
            .collect()
    }
}

impl TickScheduler for RecordingTicker {
    fn schedule(&mut self, generation: u64, interval: Duration) -> TickHandle {
        let handle = TickHandle::new(generation);
        if let Ok(mut log) = self.log.lock() {
            log.push(ScheduledTick {
                generation,
                interval,
                cancelled: handle.token(),
            });
        }
        handle
    }
}
