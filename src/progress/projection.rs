use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::api::{ApiError, ArcadeClient, WorldProgressResponse};
use crate::bus::{emit_world_progress_updated, ArcadeBus};

use super::cache::TrackProgressCache;
use super::scope::SurfaceScope;

/// Where progress snapshots come from.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    async fn fetch_world_progress(&self) -> Result<WorldProgressResponse, ApiError>;
}

#[async_trait]
impl ProgressSource for ArcadeClient {
    async fn fetch_world_progress(&self) -> Result<WorldProgressResponse, ApiError> {
        ArcadeClient::fetch_world_progress(self).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Loaded { tracks: usize },
    /// This session was already bootstrapped; nothing was fetched.
    AlreadyLoaded,
    /// A newer refresh landed first; this snapshot was dropped.
    Superseded,
    /// The surface went away before the fetch resolved.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { tracks: usize },
    /// A refresh issued later already applied its snapshot.
    Stale,
}

#[derive(Debug, Clone, Copy)]
enum ApplyMode {
    Merge,
    Replace,
}

/// Mirrors the backend's per-track progress into a local cache.
///
/// Every fetch takes a ticket when it starts. A snapshot is written only if no
/// fetch with a later ticket has been written already, so overlapping
/// refreshes settle on the most recently issued one.
pub struct ProgressProjection {
    source: Arc<dyn ProgressSource>,
    cache: Arc<TrackProgressCache>,
    bus: Arc<ArcadeBus>,
    bootstrap_lock: tokio::sync::Mutex<()>,
    bootstrapped: AtomicBool,
    next_ticket: AtomicU64,
    applied_ticket: Mutex<u64>,
}

impl ProgressProjection {
    pub fn new(
        source: Arc<dyn ProgressSource>,
        cache: Arc<TrackProgressCache>,
        bus: Arc<ArcadeBus>,
    ) -> Self {
        Self {
            source,
            cache,
            bus,
            bootstrap_lock: tokio::sync::Mutex::new(()),
            bootstrapped: AtomicBool::new(false),
            next_ticket: AtomicU64::new(1),
            applied_ticket: Mutex::new(0),
        }
    }

    pub fn cache(&self) -> &Arc<TrackProgressCache> {
        &self.cache
    }

    pub fn progress(&self, track_slug: &str) -> f64 {
        self.cache.get(track_slug)
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::Acquire)
    }

    /// Load the full snapshot once per session. A failure leaves the cache
    /// untouched and the session un-bootstrapped.
    pub async fn bootstrap(&self) -> Result<BootstrapOutcome, ApiError> {
        self.bootstrap_inner(None).await
    }

    /// [`bootstrap`](Self::bootstrap) tied to a surface: if `scope` is
    /// cancelled before the snapshot arrives, nothing is written and errors
    /// are dropped.
    pub async fn bootstrap_in(&self, scope: &SurfaceScope) -> Result<BootstrapOutcome, ApiError> {
        tokio::select! {
            biased;
            _ = scope.cancelled() => Ok(BootstrapOutcome::Discarded),
            result = self.bootstrap_inner(Some(scope)) => result,
        }
    }

    async fn bootstrap_inner(
        &self,
        scope: Option<&SurfaceScope>,
    ) -> Result<BootstrapOutcome, ApiError> {
        let _guard = self.bootstrap_lock.lock().await;
        if self.is_bootstrapped() {
            return Ok(BootstrapOutcome::AlreadyLoaded);
        }

        let ticket = self.take_ticket();
        let result = self.source.fetch_world_progress().await;

        if scope.is_some_and(SurfaceScope::is_cancelled) {
            tracing::debug!(ticket, "surface unmounted, discarding world progress bootstrap");
            return Ok(BootstrapOutcome::Discarded);
        }

        let snapshot = result.map_err(|error| {
            tracing::warn!("failed to load world progress: {error}");
            error
        })?;

        let tracks = snapshot.tracks.len();
        let applied = self.apply(ticket, &snapshot, ApplyMode::Merge);
        self.bootstrapped.store(true, Ordering::Release);

        if !applied {
            return Ok(BootstrapOutcome::Superseded);
        }
        tracing::info!(tracks, "world progress bootstrapped");
        Ok(BootstrapOutcome::Loaded { tracks })
    }

    /// Fetch a fresh snapshot, replace the cache with it and announce
    /// `WorldProgressUpdated`.
    pub async fn refresh(
        &self,
        changed_track: Option<String>,
    ) -> Result<RefreshOutcome, ApiError> {
        let ticket = self.take_ticket();
        let snapshot = self.source.fetch_world_progress().await?;

        if !self.apply(ticket, &snapshot, ApplyMode::Replace) {
            tracing::debug!(ticket, "discarding stale world progress response");
            return Ok(RefreshOutcome::Stale);
        }

        emit_world_progress_updated(&self.bus, changed_track);
        Ok(RefreshOutcome::Applied {
            tracks: snapshot.tracks.len(),
        })
    }

    /// Fire-and-forget [`refresh`](Self::refresh). Failures are logged and
    /// never reach the caller.
    pub fn spawn_refresh(self: &Arc<Self>, changed_track: Option<String>) -> JoinHandle<()> {
        let projection = self.clone();
        tokio::spawn(async move {
            if let Err(error) = projection.refresh(changed_track).await {
                tracing::warn!("world progress refresh failed after quest completion: {error}");
            }
        })
    }

    fn take_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    fn apply(&self, ticket: u64, snapshot: &WorldProgressResponse, mode: ApplyMode) -> bool {
        let mut applied = self
            .applied_ticket
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if ticket <= *applied {
            return false;
        }
        match mode {
            ApplyMode::Merge => self.cache.merge(&snapshot.tracks),
            ApplyMode::Replace => self.cache.replace_all(&snapshot.tracks),
        }
        *applied = ticket;
        true
    }
}
