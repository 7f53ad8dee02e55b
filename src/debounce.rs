//! Leading/trailing debounce driven by tokio timers.
//!
//! Timers use `tokio::time`, so tests can drive them with a paused clock.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::ArcadeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceOptions {
    #[serde(default)]
    pub leading: bool,
    #[serde(default = "default_trailing")]
    pub trailing: bool,
}

impl Default for DebounceOptions {
    fn default() -> Self {
        Self {
            leading: false,
            trailing: default_trailing(),
        }
    }
}

fn default_trailing() -> bool {
    true
}

struct State<A> {
    pending: Option<A>,
    timer: Option<JoinHandle<()>>,
    /// Bumped whenever a timer is replaced or stopped; a timer only fires if
    /// its generation is still current.
    generation: u64,
    /// A leading call already ran in the current burst.
    invoked: bool,
}

struct Inner<A> {
    func: Box<dyn Fn(A) + Send + Sync>,
    wait: Duration,
    options: DebounceOptions,
    runtime: Handle,
    state: Mutex<State<A>>,
}

impl<A: Send + 'static> Inner<A> {
    fn lock(&self) -> MutexGuard<'_, State<A>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn fire(&self, generation: u64) {
        let args = {
            let mut state = self.lock();
            if state.generation != generation {
                return;
            }
            state.timer = None;
            state.invoked = false;
            let pending = state.pending.take();
            if self.options.trailing {
                pending
            } else {
                None
            }
        };
        if let Some(args) = args {
            (self.func)(args);
        }
    }
}

/// A debounced function. Cloning shares the same timer and pending call.
pub struct Debounced<A: Send + 'static> {
    inner: Arc<Inner<A>>,
}

impl<A: Send + 'static> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Debounce `func` by `wait` on the current tokio runtime.
pub fn debounce<A, F>(
    func: F,
    wait: Duration,
    options: DebounceOptions,
) -> Result<Debounced<A>, ArcadeError>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    let runtime = Handle::try_current().map_err(|error| ArcadeError::NoRuntime(error.to_string()))?;
    Ok(Debounced::with_runtime(runtime, func, wait, options))
}

impl<A: Send + 'static> Debounced<A> {
    pub fn with_runtime<F>(runtime: Handle, func: F, wait: Duration, options: DebounceOptions) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                func: Box::new(func),
                wait,
                options,
                runtime,
                state: Mutex::new(State {
                    pending: None,
                    timer: None,
                    generation: 0,
                    invoked: false,
                }),
            }),
        }
    }

    /// Record `args` and restart the quiet period. With `leading`, the first
    /// call of a burst runs `func` before returning.
    pub fn call(&self, args: A) {
        let leading_args = {
            let mut state = self.inner.lock();
            state.pending = Some(args);
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.generation += 1;

            let generation = state.generation;
            let deadline = Instant::now() + self.inner.wait;
            let inner = self.inner.clone();
            state.timer = Some(self.inner.runtime.spawn(async move {
                tokio::time::sleep_until(deadline).await;
                inner.fire(generation);
            }));

            if self.inner.options.leading && !state.invoked {
                state.invoked = true;
                state.pending.take()
            } else {
                None
            }
        };

        if let Some(args) = leading_args {
            (self.inner.func)(args);
        }
    }

    /// Drop the pending call and reset without invoking.
    pub fn cancel(&self) {
        let mut state = self.inner.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.pending = None;
        state.invoked = false;
    }

    /// Run the pending trailing call now instead of waiting out the timer.
    pub fn flush(&self) {
        let args = {
            let mut state = self.inner.lock();
            let Some(timer) = state.timer.take() else {
                return;
            };
            timer.abort();
            state.generation += 1;
            state.invoked = false;
            let pending = state.pending.take();
            if self.inner.options.trailing {
                pending
            } else {
                None
            }
        };
        if let Some(args) = args {
            (self.inner.func)(args);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().timer.is_some()
    }
}
