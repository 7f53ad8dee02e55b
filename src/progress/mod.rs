//! Per-track progress mirrored from the backend.

mod cache;
mod projection;
mod scope;

pub use cache::TrackProgressCache;
pub use projection::{BootstrapOutcome, ProgressProjection, ProgressSource, RefreshOutcome};
pub use scope::{SurfaceScope, UnmountGuard};

#[cfg(test)]
mod tests;
