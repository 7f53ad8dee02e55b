use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, Subscription, SubscriptionGuard};

use super::dedup::DedupWatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackDifficulty {
    Novice,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTrack {
    pub world_slug: String,
    pub track_slug: String,
    pub label: String,
    pub difficulty: TrackDifficulty,
}

/// The currently selected track, shared by every layout surface.
///
/// `warp_to` is the single producer; each change is pushed to subscribers as
/// the new `Option<ActiveTrack>`.
pub struct TrackActivation {
    current: Mutex<Option<ActiveTrack>>,
    changes: EventBus<Option<ActiveTrack>>,
}

impl TrackActivation {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            changes: EventBus::new(),
        }
    }

    pub fn current(&self) -> Option<ActiveTrack> {
        self.lock().clone()
    }

    /// Activate `track` on every surface. Re-warping to the same track still
    /// notifies; deduplication is the consumer's job.
    pub fn warp_to(&self, track: ActiveTrack) {
        tracing::debug!(
            world = %track.world_slug,
            track = %track.track_slug,
            "warp to track"
        );
        *self.lock() = Some(track.clone());
        self.changes.publish(Some(track));
    }

    pub fn clear(&self) {
        *self.lock() = None;
        self.changes.publish(None);
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Option<ActiveTrack>) + Send + Sync + 'static,
    {
        self.changes.subscribe(listener)
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveTrack>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TrackActivation {
    fn default() -> Self {
        Self::new()
    }
}

/// Call `on_warp` exactly once per distinct `track_slug` the activation store
/// moves to. A track that is already active when the watcher attaches counts
/// as the first observation.
///
/// The watcher detaches when the returned guard is dropped, so a surface
/// holds the guard for as long as it is mounted.
pub fn track_warp<F>(activation: &TrackActivation, on_warp: F) -> SubscriptionGuard
where
    F: Fn(&ActiveTrack) + Send + Sync + 'static,
{
    let watcher = Arc::new(DedupWatcher::new(
        |track: &ActiveTrack| track.track_slug.clone(),
        on_warp,
    ));

    let listener = watcher.clone();
    let subscription = activation.subscribe(move |track| {
        listener.observe(track.as_ref());
    });

    watcher.observe(activation.current().as_ref());
    subscription.into_guard()
}
