use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct ScopeState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Lifetime of a mounted UI surface. Work started inside the scope discards
/// its result once the scope is cancelled.
#[derive(Debug, Clone, Default)]
pub struct SurfaceScope {
    state: Arc<ScopeState>,
}

impl SurfaceScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::AcqRel) {
            self.state.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once the scope is cancelled.
    pub async fn cancelled(&self) {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Cancels the scope when dropped, i.e. when the surface unmounts.
    pub fn unmount_guard(&self) -> UnmountGuard {
        UnmountGuard {
            scope: self.clone(),
        }
    }
}

#[derive(Debug)]
pub struct UnmountGuard {
    scope: SurfaceScope,
}

impl Drop for UnmountGuard {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
