//! Settle-delay timers and the debounce state machine
//!
//! A [`SettleTimer`] runs an action once a fixed delay has elapsed. The
//! returned [`TimerHandle`] owns the pending task: cancelling it, or just
//! dropping it, aborts the action. Components hold the handle for as long
//! as they are mounted, so teardown cannot leave a timer behind.
//!
//! [`Debouncer`] builds the per-key state machine on top:
//!
//! ```text
//! Idle ──trigger(k)──▶ PendingFire(k) ──delay elapses──▶ Fired(k)
//!                          │    ▲
//!                          └────┘ trigger(k2), k2 != k: old timer cancelled
//! ```
//!
//! Triggering with the key that is already pending or fired is a no-op;
//! any other key restarts the cycle, including a key seen earlier.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Fixed-delay timer factory
#[derive(Debug, Clone, Copy)]
pub struct SettleTimer {
    delay: Duration,
}

impl SettleTimer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `action` after the delay
    ///
    /// Returns `None` (and logs) when called outside a tokio runtime; the
    /// action is then never run.
    pub fn start<F>(&self, action: F) -> Option<TimerHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("Settle timer started outside an async runtime, action dropped");
                return None;
            }
        };

        let delay = self.delay;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        Some(TimerHandle { task })
    }
}

/// Pending settle timer; cancelled on drop
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(self) {
        // Drop aborts
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Debounce state for one observed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleState<K> {
    Idle,
    PendingFire(K),
    Fired(K),
}

struct Shared<K> {
    state: SettleState<K>,
    generation: u64,
}

/// Fires an action once per key change, after the settle delay
pub struct Debouncer<K> {
    timer: SettleTimer,
    shared: Arc<Mutex<Shared<K>>>,
    pending: Option<TimerHandle>,
}

impl<K> Debouncer<K>
where
    K: Clone + PartialEq + Send + std::fmt::Debug + 'static,
{
    pub fn new(timer: SettleTimer) -> Self {
        Self {
            timer,
            shared: Arc::new(Mutex::new(Shared {
                state: SettleState::Idle,
                generation: 0,
            })),
            pending: None,
        }
    }

    /// Current state (snapshot)
    pub fn state(&self) -> SettleState<K> {
        match self.shared.lock() {
            Ok(shared) => shared.state.clone(),
            Err(poisoned) => poisoned.into_inner().state.clone(),
        }
    }

    /// Observe `key`; schedules `action(key)` unless `key` is already current
    ///
    /// Returns whether a new timer was started.
    pub fn trigger<F>(&mut self, key: K, action: F) -> bool
    where
        F: FnOnce(&K) + Send + 'static,
    {
        let generation = {
            let mut shared = match self.shared.lock() {
                Ok(shared) => shared,
                Err(poisoned) => poisoned.into_inner(),
            };
            match &shared.state {
                SettleState::PendingFire(current) | SettleState::Fired(current)
                    if *current == key =>
                {
                    return false;
                }
                _ => {}
            }
            shared.generation += 1;
            shared.state = SettleState::PendingFire(key.clone());
            shared.generation
        };

        if let Some(previous) = self.pending.take() {
            debug!("Cancelling pending settle timer, now observing {:?}", key);
            previous.cancel();
        }

        let shared = Arc::clone(&self.shared);
        self.pending = self.timer.start(move || {
            let due = {
                let mut guard = match shared.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                let still_current = guard.generation == generation
                    && matches!(&guard.state, SettleState::PendingFire(k) if *k == key);
                if still_current {
                    guard.state = SettleState::Fired(key.clone());
                }
                still_current
            };
            if due {
                action(&key);
            }
        });

        if self.pending.is_none() {
            // No runtime: nothing will fire for this key
            if let Ok(mut shared) = self.shared.lock() {
                shared.state = SettleState::Idle;
            }
            return false;
        }
        true
    }

    /// Cancel any pending fire and return to Idle
    pub fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        let mut shared = match self.shared.lock() {
            Ok(shared) => shared,
            Err(poisoned) => poisoned.into_inner(),
        };
        shared.generation += 1;
        shared.state = SettleState::Idle;
    }
}
