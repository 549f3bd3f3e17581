//! Timer scheduling.
//!
//! Every deferred action in pagekit (debounce windows, notification expiry,
//! the clock tick, form restore) goes through a [`Scheduler`]. Two
//! implementations are provided:
//!
//! - [`ManualScheduler`]: a virtual clock that only moves when told to.
//! - [`TokioScheduler`]: real timers backed by tokio tasks.

mod manual;
mod tokio_timer;

pub use manual::ManualScheduler;
pub use tokio_timer::TokioScheduler;

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A one-shot timer callback.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// A repeating timer callback.
pub type RepeatingCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Handle identifying a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Creates a handle from a raw id.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Schedules and cancels deferred callbacks.
///
/// Implementations must never invoke a callback while holding a lock that
/// `schedule` or `cancel` also takes: callbacks routinely schedule and
/// cancel other timers. `schedule` itself must never run the callback, even
/// for a zero delay.
pub trait Scheduler: Send + Sync {
    /// Runs `callback` once after `delay`.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Runs `callback` every `interval` until cancelled.
    fn schedule_repeating(&self, interval: Duration, callback: RepeatingCallback) -> TimerHandle;

    /// Cancels a timer.
    ///
    /// Returns true if the timer was pending. Cancelling a timer that already
    /// fired or was already cancelled is a no-op.
    fn cancel(&self, handle: TimerHandle) -> bool;

    /// The scheduler's notion of wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Convenience for scheduling plain closures.
pub trait SchedulerExt: Scheduler {
    /// Boxes `callback` and schedules it once after `delay`.
    fn schedule_fn<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule(delay, Box::new(callback))
    }

    /// Wraps `callback` and schedules it every `interval`.
    fn every<F>(&self, interval: Duration, callback: F) -> TimerHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.schedule_repeating(interval, Arc::new(callback))
    }
}

impl<S: Scheduler + ?Sized> SchedulerExt for S {}

/// Smallest interval a repeating timer may use.
pub(crate) const MIN_REPEAT_INTERVAL: Duration = Duration::from_millis(1);
