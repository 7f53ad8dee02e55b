use crate::api::{QuestSummary, UnlockDescriptor};

use super::{ArcadeBus, ArcadeEvent};

pub fn broadcast_quest_update(bus: &ArcadeBus, quest: QuestSummary) {
    let delivered = bus.publish(ArcadeEvent::QuestUpdated { quest });
    tracing::debug!(delivered, "broadcast quest update");
}

/// Publish the unlocks produced by a quest. An empty list publishes nothing
/// and returns `false`.
pub fn broadcast_quest_unlocks(
    bus: &ArcadeBus,
    quest: QuestSummary,
    unlocks: Vec<UnlockDescriptor>,
) -> bool {
    if unlocks.is_empty() {
        return false;
    }
    let count = unlocks.len();
    let delivered = bus.publish(ArcadeEvent::QuestUnlocked { quest, unlocks });
    tracing::debug!(delivered, unlocks = count, "broadcast quest unlocks");
    true
}

pub fn emit_world_progress_updated(bus: &ArcadeBus, track_slug: Option<String>) {
    bus.publish(ArcadeEvent::WorldProgressUpdated { track_slug });
}
