//! Domain events carried on the arcade bus and their channel names.

use serde::{Deserialize, Serialize};

use crate::api::{QuestSummary, UnlockDescriptor};

// ---------------------------------------------------------------------------
// Channel names
// ---------------------------------------------------------------------------

pub const QUEST_UPDATED_EVENT: &str = "quest:updated";
pub const QUEST_UNLOCKED_EVENT: &str = "quest:unlocked";
pub const WORLD_PROGRESS_UPDATED_EVENT: &str = "world-progress:updated";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ArcadeEvent {
    QuestUpdated {
        quest: QuestSummary,
    },
    QuestUnlocked {
        quest: QuestSummary,
        unlocks: Vec<UnlockDescriptor>,
    },
    WorldProgressUpdated {
        #[serde(default, rename = "trackSlug", skip_serializing_if = "Option::is_none")]
        track_slug: Option<String>,
    },
}

impl ArcadeEvent {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::QuestUpdated { .. } => "quest-updated",
            Self::QuestUnlocked { .. } => "quest-unlocked",
            Self::WorldProgressUpdated { .. } => "world-progress-updated",
        }
    }

    /// Name of the in-page channel this event travels on.
    pub const fn channel(&self) -> &'static str {
        match self {
            Self::QuestUpdated { .. } => QUEST_UPDATED_EVENT,
            Self::QuestUnlocked { .. } => QUEST_UNLOCKED_EVENT,
            Self::WorldProgressUpdated { .. } => WORLD_PROGRESS_UPDATED_EVENT,
        }
    }

    pub fn quest(&self) -> Option<&QuestSummary> {
        match self {
            Self::QuestUpdated { quest } | Self::QuestUnlocked { quest, .. } => Some(quest),
            Self::WorldProgressUpdated { .. } => None,
        }
    }
}
