//! Event system for propagating quest and progress signals across surfaces.
//!
//! The event bus provides:
//! - Synchronous publish-subscribe delivery in subscription order
//! - Listener isolation: a panicking listener never stops delivery to others
//! - An optional tokio broadcast tap for consumers living in async tasks
//!
//! # Architecture
//!
//! Events flow from a producer → EventBus → every subscribed listener:
//! - `EventBus`: typed listener registry, one instance per app
//! - `ArcadeEvent`: quest updated / quest unlocked / world progress updated
//! - `broadcast_*` helpers: the producer side used by the submission flow

mod broadcast;
mod event_bus;
mod event_types;

pub use broadcast::{broadcast_quest_unlocks, broadcast_quest_update, emit_world_progress_updated};
pub use event_bus::{EventBus, Subscription, SubscriptionGuard};
pub use event_types::{
    ArcadeEvent, QUEST_UNLOCKED_EVENT, QUEST_UPDATED_EVENT, WORLD_PROGRESS_UPDATED_EVENT,
};

pub type ArcadeBus = EventBus<ArcadeEvent>;
