//! Quest submission and the profile flags it keeps in sync.

mod profile;
mod submission;

pub use profile::{ProfileSnapshot, ProfileState};
pub use submission::QuestSubmission;
