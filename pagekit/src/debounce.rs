//! Debouncing.
//!
//! A burst of triggers, each arriving before the previous one's wait window
//! closes, collapses into a single invocation of the wrapped action:
//!
//! - trailing mode (`immediate == false`): the action runs once, `wait`
//!   after the last trigger, with that trigger's arguments;
//! - leading mode (`immediate == true`): the action runs synchronously on the
//!   first trigger of the burst; the timer that closes the burst does not
//!   invoke it again.

use crate::scheduler::{Scheduler, TimerHandle};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// The wrapped action.
pub type DebouncedAction<A> = Arc<dyn Fn(A) + Send + Sync + 'static>;

#[derive(Debug, Default)]
struct DebounceState {
    pending: Option<TimerHandle>,
    /// Bumped on every trigger and cancel; a timer only acts if its
    /// generation is still current.
    generation: u64,
}

struct Inner<A> {
    scheduler: Arc<dyn Scheduler>,
    action: DebouncedAction<A>,
    wait: Duration,
    immediate: bool,
    state: Mutex<DebounceState>,
}

/// A debounced trigger around an action taking `A`.
///
/// Clones share the same timer state, like copies of one function reference.
pub struct Debounced<A> {
    inner: Arc<Inner<A>>,
}

/// Wraps `action` so bursts of [`Debounced::trigger`] calls collapse.
///
/// ```
/// use pagekit::debounce::debounce;
/// use pagekit::scheduler::ManualScheduler;
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualScheduler::new());
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// let search = debounce(clock.clone(), move |q: String| sink.lock().unwrap().push(q), Duration::from_millis(300), false);
///
/// search.trigger("to".into());
/// search.trigger("tosh".into());
/// clock.advance(Duration::from_millis(300));
/// assert_eq!(*seen.lock().unwrap(), vec!["tosh".to_string()]);
/// ```
pub fn debounce<A, F>(scheduler: Arc<dyn Scheduler>, action: F, wait: Duration, immediate: bool) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        inner: Arc::new(Inner {
            scheduler,
            action: Arc::new(action),
            wait,
            immediate,
            state: Mutex::new(DebounceState::default()),
        }),
    }
}

impl<A: Send + 'static> Debounced<A> {
    /// Registers a call.
    ///
    /// Cancels the pending invocation, if any, and opens (or extends) the
    /// wait window. In leading mode the first call of a burst runs the
    /// action before returning.
    pub fn trigger(&self, args: A) {
        let inner = &self.inner;
        let (trailing_args, leading_args) = if inner.immediate {
            (None, Some(args))
        } else {
            (Some(args), None)
        };

        let call_now = {
            let mut state = inner.state.lock();
            let call_now = inner.immediate && state.pending.is_none();
            if let Some(handle) = state.pending.take() {
                inner.scheduler.cancel(handle);
            }
            state.generation += 1;
            let generation = state.generation;

            let timer_inner = Arc::clone(inner);
            // The state lock is held across `schedule` so a timer firing on
            // another thread observes `pending` only after it is recorded.
            let handle = inner.scheduler.schedule(
                inner.wait,
                Box::new(move || {
                    {
                        let mut state = timer_inner.state.lock();
                        if state.generation != generation {
                            return;
                        }
                        state.pending = None;
                    }
                    if let Some(args) = trailing_args {
                        (timer_inner.action)(args);
                    }
                }),
            );
            state.pending = Some(handle);
            call_now
        };

        if call_now {
            if let Some(args) = leading_args {
                (inner.action)(args);
            }
        }
    }

    /// Drops the pending invocation, closing the current burst.
    ///
    /// Returns whether anything was pending.
    pub fn cancel(&self) -> bool {
        let mut state = self.inner.state.lock();
        state.generation += 1;
        match state.pending.take() {
            Some(handle) => {
                self.inner.scheduler.cancel(handle);
                true
            }
            None => false,
        }
    }

    /// Whether a burst is open (a timer is pending).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// The wait window.
    #[must_use]
    pub fn wait(&self) -> Duration {
        self.inner.wait
    }

    /// Whether the action runs on the leading edge.
    #[must_use]
    pub fn is_immediate(&self) -> bool {
        self.inner.immediate
    }
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounced")
            .field("wait", &self.inner.wait)
            .field("immediate", &self.inner.immediate)
            .field("state", &*self.inner.state.lock())
            .finish()
    }
}
