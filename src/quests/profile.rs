use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::api::ProfileSync;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileSnapshot {
    pub xp: Option<i64>,
    pub bosses_unlocked: Vec<String>,
}

/// Player flags the client mirrors from submission responses.
#[derive(Debug, Default)]
pub struct ProfileState {
    inner: RwLock<ProfileSnapshot>,
}

impl ProfileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        self.read().clone()
    }

    pub fn set_bosses_unlocked(&self, bosses: Vec<String>) {
        self.write().bosses_unlocked = bosses;
    }

    pub fn is_boss_unlocked(&self, boss_id: &str) -> bool {
        self.read().bosses_unlocked.iter().any(|id| id == boss_id)
    }

    /// Fields absent from `sync` keep their current value.
    pub fn apply_sync(&self, sync: &ProfileSync) {
        let mut profile = self.write();
        if let Some(xp) = sync.xp {
            profile.xp = Some(xp);
        }
        if let Some(bosses) = sync.flags.as_ref().and_then(|flags| flags.bosses_unlocked.as_ref()) {
            profile.bosses_unlocked = bosses.clone();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ProfileSnapshot> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProfileSnapshot> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
