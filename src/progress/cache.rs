use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::api::TrackProgress;

/// Local per-track progress percentage, clamped to 0..=100 but otherwise
/// kept exactly as the backend reported it.
#[derive(Debug, Default)]
pub struct TrackProgressCache {
    tracks: RwLock<HashMap<String, f64>>,
}

impl TrackProgressCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, track_slug: impl Into<String>, progress: f64) {
        self.write().insert(track_slug.into(), clamp_progress(progress));
    }

    /// Unknown tracks read as 0.
    pub fn get(&self, track_slug: &str) -> f64 {
        self.read().get(track_slug).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, track_slug: &str) -> bool {
        self.read().contains_key(track_slug)
    }

    /// Write every record; later records for the same slug win.
    pub fn merge(&self, records: &[TrackProgress]) {
        let mut tracks = self.write();
        for record in records {
            tracks.insert(record.track_slug.clone(), clamp_progress(record.progress));
        }
    }

    /// Swap in a complete new set in one write.
    pub fn replace_all(&self, records: &[TrackProgress]) {
        let next: HashMap<String, f64> = records
            .iter()
            .map(|record| (record.track_slug.clone(), clamp_progress(record.progress)))
            .collect();
        *self.write() = next;
    }

    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.read()
            .iter()
            .map(|(slug, progress)| (slug.clone(), *progress))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, f64>> {
        self.tracks.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, f64>> {
        self.tracks.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Non-finite values read as 0.
pub(crate) fn clamp_progress(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}
