//! EvalForge arcade client core.
//!
//! This crate is the glue between the arcade backend and the independently
//! mounted UI surfaces (Orion, Workshop, Cyberdeck). It handles:
//! - Cross-surface quest and progress signals over an in-process event bus
//! - "Warping" into a track exactly once per distinct track
//! - Mirroring backend progress snapshots into local per-track state
//! - The quest submission flow and the daily practice gauntlet
//!
//! # Architecture
//!
//! - `bus`: typed publish/subscribe with isolated, ordered delivery
//! - `warp`: once-per-key deduplication and the active track store
//! - `progress`: progress cache, bootstrap and refresh
//! - `debounce`: leading/trailing debouncer on tokio timers
//! - `api`: REST client and wire types
//! - `quests`: submission flow and profile flag sync
//! - `feed`: bounded unlock feed
//! - `gauntlet`: deterministic practice plan builder
//! - `app`: wires one instance of everything together

pub mod api;
pub mod app;
pub mod bus;
pub mod config;
pub mod debounce;
pub mod feed;
pub mod gauntlet;
pub mod progress;
pub mod quests;
pub mod warp;

#[cfg(test)]
mod testing;

pub use app::ArcadeApp;

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ArcadeError {
    #[error("{0}")]
    Api(#[from] api::ApiError),
    #[error("config error: {0}")]
    Config(String),
    #[error("no active quest selected")]
    NoActiveQuest,
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install the global tracing subscriber. `RUST_LOG` wins over the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("evalforge=debug,info")),
        )
        .try_init();
}
