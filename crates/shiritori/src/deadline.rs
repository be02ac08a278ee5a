//! Cancellable single-shot deadlines.
//!
//! A [`DeadlineTimer`] runs a callback once after a duration unless the
//! returned [`DeadlineHandle`] is cancelled first. Implementations may not be
//! able to stop a callback that has already started when `cancel` is called,
//! so callers that mutate shared state from the callback must tag it and
//! ignore stale firings.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use derive_more::{Display, Error};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace};

/// Callback run when a deadline expires.
pub type DeadlineCallback = Box<dyn FnOnce() + Send + 'static>;

/// Identifies one armed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("deadline#{}", _0)]
pub struct DeadlineHandle(u64);

impl DeadlineHandle {
    /// Wraps a raw handle value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A scheduler of cancellable single-shot callbacks.
pub trait DeadlineTimer: Send + Sync {
    /// Schedules `callback` to run once after `duration`.
    fn arm(&self, duration: Duration, callback: DeadlineCallback) -> DeadlineHandle;

    /// Cancels a deadline. Cancelling a fired or unknown handle does nothing.
    fn cancel(&self, handle: DeadlineHandle);
}

/// Returned when no tokio runtime is available to drive deadlines.
#[derive(Debug, Clone, Display, Error)]
#[display("Deadline timer requires a tokio runtime: {}", message)]
pub struct TimerError {
    /// Error message.
    pub message: String,
}

/// [`DeadlineTimer`] backed by sleeping tokio tasks.
///
/// Each armed deadline is a task that sleeps and then runs the callback;
/// cancelling aborts the task.
#[derive(Clone)]
pub struct TokioDeadlineTimer {
    runtime: Handle,
    next_id: Arc<AtomicU64>,
    tasks: Arc<Mutex<HashMap<u64, JoinHandle<()>>>>,
}

impl fmt::Debug for TokioDeadlineTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioDeadlineTimer")
            .field("armed", &self.armed())
            .finish()
    }
}

impl TokioDeadlineTimer {
    /// Creates a timer that spawns onto the given runtime.
    #[instrument(skip(runtime))]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: Arc::new(AtomicU64::new(1)),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates a timer on the runtime of the calling context.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError`] when called outside a tokio runtime.
    #[instrument]
    pub fn from_current() -> Result<Self, TimerError> {
        let runtime = Handle::try_current().map_err(|e| TimerError {
            message: e.to_string(),
        })?;
        Ok(Self::new(runtime))
    }

    /// Number of deadlines armed and not yet fired or cancelled.
    pub fn armed(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl DeadlineTimer for TokioDeadlineTimer {
    #[instrument(skip(self, callback))]
    fn arm(&self, duration: Duration, callback: DeadlineCallback) -> DeadlineHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        // Hold the map lock across spawn so the task cannot finish and
        // unregister itself before it has been registered.
        let mut guard = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            let still_armed = tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id)
                .is_some();
            if still_armed {
                trace!(deadline = id, "Deadline expired");
                callback();
            }
        });
        guard.insert(id, task);
        debug!(deadline = id, ?duration, "Armed deadline");
        DeadlineHandle(id)
    }

    #[instrument(skip(self))]
    fn cancel(&self, handle: DeadlineHandle) {
        let task = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.0);
        match task {
            Some(task) => {
                task.abort();
                debug!(deadline = handle.0, "Cancelled deadline");
            }
            None => trace!(deadline = handle.0, "Deadline already fired or cancelled"),
        }
    }
}
