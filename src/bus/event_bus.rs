use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::broadcast;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Slot<E> {
    id: u64,
    active: Arc<AtomicBool>,
    listener: Listener<E>,
}

impl<E> Clone for Slot<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: self.active.clone(),
            listener: self.listener.clone(),
        }
    }
}

struct Registry<E> {
    slots: Mutex<Vec<Slot<E>>>,
    next_id: AtomicU64,
}

impl<E> Registry<E> {
    fn slots(&self) -> MutexGuard<'_, Vec<Slot<E>>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove(&self, id: u64) {
        self.slots().retain(|slot| slot.id != id);
    }
}

/// In-memory publish/subscribe channel.
///
/// Delivery is synchronous: `publish` calls every listener that was
/// subscribed when the call started, in subscription order, before returning.
/// The subscriber list is only locked to take a snapshot, so listeners may
/// subscribe, unsubscribe or publish again from inside a callback.
pub struct EventBus<E: 'static> {
    registry: Arc<Registry<E>>,
}

impl<E: 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                slots: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Deliver `event` to every current listener. Returns how many listeners
    /// handled it without panicking.
    pub fn publish(&self, event: E) -> usize {
        let snapshot: Vec<Slot<E>> = self.registry.slots().clone();
        let mut delivered = 0;

        for slot in &snapshot {
            // Unsubscribed after the snapshot was taken.
            if !slot.active.load(Ordering::Acquire) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| (slot.listener)(&event))) {
                Ok(()) => delivered += 1,
                Err(panic) => {
                    tracing::warn!(
                        subscriber = slot.id,
                        "event listener panicked, continuing delivery: {}",
                        panic_message(panic.as_ref())
                    );
                }
            }
        }

        delivered
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is explicitly unsubscribed or the bus is cleared.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.registry.slots().push(Slot {
            id,
            active: active.clone(),
            listener: Arc::new(listener),
        });

        let registry: Weak<Registry<E>> = Arc::downgrade(&self.registry);
        Subscription {
            id,
            active,
            detach: Mutex::new(Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(id);
                }
            }))),
        }
    }

    /// Forward every event into a tokio broadcast channel for consumers that
    /// live in async tasks. Dropping the receiver does not detach the
    /// forwarder; unsubscribe the returned handle for that.
    pub fn tap(&self, capacity: usize) -> (broadcast::Receiver<E>, Subscription)
    where
        E: Clone + Send,
    {
        let (tx, rx) = broadcast::channel(capacity.max(1));
        let subscription = self.subscribe(move |event: &E| {
            // No live receivers is fine, the tap is best-effort.
            let _ = tx.send(event.clone());
        });
        (rx, subscription)
    }

    pub fn listener_count(&self) -> usize {
        self.registry.slots().len()
    }

    /// Drop every listener. Handles obtained earlier become inert.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.registry.slots());
        for slot in removed {
            slot.active.store(false, Ordering::Release);
        }
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle pairing a listener with its bus.
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] or convert it with
/// [`Subscription::into_guard`] to tie the listener to a scope.
#[must_use = "dropping a Subscription leaves the listener registered; call unsubscribe() or into_guard()"]
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    detach: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Remove the listener. Safe to call any number of times, including from
    /// inside the listener itself while a publish is running.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        let detach = self
            .detach
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(detach) = detach {
            detach();
        }
    }

    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard { inner: self }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Unsubscribes when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct SubscriptionGuard {
    inner: Subscription,
}

impl SubscriptionGuard {
    pub fn subscription(&self) -> &Subscription {
        &self.inner
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.inner.unsubscribe();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = panic.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}
