//! REST client and wire types for the arcade backend.

mod client;
mod error;
mod types;

pub use client::ArcadeClient;
pub use error::ApiError;
pub use types::{
    DailyPracticePlan, PracticeDifficulty, PracticeItemType, PracticeItemView, ProfileFlags,
    ProfileSync, QuestState, QuestSubmitRequest, QuestSubmitResult, QuestSummary, TrackProgress,
    UnlockDescriptor, UnlockKind, WorldProgressResponse,
};
