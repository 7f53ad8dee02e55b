//! Bounded, newest-first feed of unlock notifications.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{QuestSummary, UnlockDescriptor, UnlockKind};
use crate::bus::{ArcadeBus, ArcadeEvent, Subscription};

pub const DEFAULT_FEED_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedKind {
    QuestUnlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub kind: FeedKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl FeedItem {
    fn from_unlock(unlock: &UnlockDescriptor, quest: &QuestSummary, timestamp: DateTime<Utc>) -> Self {
        let label = unlock.display_label();
        let message = match unlock.kind {
            UnlockKind::Boss => format!("Boss unlocked: {label} (from quest: {})", quest.title),
            UnlockKind::Layout => format!("Layout unlocked: {label} (from quest: {})", quest.title),
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: FeedKind::QuestUnlock,
            message,
            timestamp,
        }
    }
}

/// Listens for `QuestUnlocked` and keeps the most recent `capacity` items.
pub struct EventFeed {
    items: Arc<Mutex<Vec<FeedItem>>>,
    subscription: Subscription,
}

impl EventFeed {
    pub fn attach(bus: &ArcadeBus, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let items = Arc::new(Mutex::new(Vec::new()));
        let sink = items.clone();

        let subscription = bus.subscribe(move |event: &ArcadeEvent| {
            let ArcadeEvent::QuestUnlocked { quest, unlocks } = event else {
                return;
            };
            let timestamp = Utc::now();
            let mut fresh: Vec<FeedItem> = unlocks
                .iter()
                .map(|unlock| FeedItem::from_unlock(unlock, quest, timestamp))
                .collect();

            let mut items = lock(&sink);
            fresh.append(&mut items);
            fresh.truncate(capacity);
            *items = fresh;
        });

        tracing::debug!(subscriber = subscription.id(), capacity, "event feed attached");
        Self {
            items,
            subscription,
        }
    }

    /// Newest first.
    pub fn items(&self) -> Vec<FeedItem> {
        lock(&self.items).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }

    /// Stop listening. Items collected so far stay readable.
    pub fn detach(&self) {
        self.subscription.unsubscribe();
    }
}

impl Drop for EventFeed {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

fn lock(items: &Mutex<Vec<FeedItem>>) -> MutexGuard<'_, Vec<FeedItem>> {
    items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
