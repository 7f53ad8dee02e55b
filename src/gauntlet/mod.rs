//! Daily practice gauntlet: picks a small, deterministic set of items for a
//! player from their practice candidates.
//!
//! The builder is pure. The same profile, date and candidates always yield
//! the same plan, in the same order.

mod builder;

pub use builder::{build_practice_plan, stable_seed, GauntletOptions, PracticeCandidate};
