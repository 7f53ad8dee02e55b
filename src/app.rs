use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::{ArcadeClient, DailyPracticePlan, QuestSummary};
use crate::bus::{ArcadeBus, SubscriptionGuard};
use crate::config::ArcadeConfig;
use crate::feed::EventFeed;
use crate::gauntlet::{build_practice_plan, PracticeCandidate};
use crate::progress::{BootstrapOutcome, ProgressProjection, SurfaceScope, TrackProgressCache};
use crate::quests::{ProfileState, QuestSubmission};
use crate::warp::{track_warp, ActiveTrack, TrackActivation};
use crate::ArcadeError;

/// One arcade session: a single bus shared by every surface plus the state
/// hanging off it.
pub struct ArcadeApp {
    config: ArcadeConfig,
    bus: Arc<ArcadeBus>,
    client: Arc<ArcadeClient>,
    progress: Arc<ProgressProjection>,
    activation: TrackActivation,
    profile: Arc<ProfileState>,
    feed: EventFeed,
}

impl ArcadeApp {
    pub fn new(config: ArcadeConfig) -> Result<Self, ArcadeError> {
        config.validate()?;

        let bus = Arc::new(ArcadeBus::new());
        let client = Arc::new(ArcadeClient::new(&config.api)?);
        let progress = Arc::new(ProgressProjection::new(
            client.clone(),
            Arc::new(TrackProgressCache::new()),
            bus.clone(),
        ));
        let feed = EventFeed::attach(&bus, config.feed_capacity);

        tracing::debug!(base_url = client.base_url(), "arcade session ready");

        Ok(Self {
            config,
            bus,
            client,
            progress,
            activation: TrackActivation::new(),
            profile: Arc::new(ProfileState::new()),
            feed,
        })
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<ArcadeBus> {
        &self.bus
    }

    pub fn client(&self) -> &Arc<ArcadeClient> {
        &self.client
    }

    pub fn progress(&self) -> &Arc<ProgressProjection> {
        &self.progress
    }

    pub fn activation(&self) -> &TrackActivation {
        &self.activation
    }

    pub fn profile(&self) -> &Arc<ProfileState> {
        &self.profile
    }

    pub fn feed(&self) -> &EventFeed {
        &self.feed
    }

    /// Submission flow for `quest_slug`, wired to this session's bus,
    /// profile and progress.
    pub fn submission(&self, quest_slug: Option<&str>) -> QuestSubmission {
        let submission =
            QuestSubmission::new(self.client.clone(), self.bus.clone(), self.profile.clone())
                .with_progress(self.progress.clone());
        match quest_slug {
            Some(slug) => submission.for_quest(slug),
            None => submission,
        }
    }

    pub async fn bootstrap(&self) -> Result<BootstrapOutcome, ArcadeError> {
        Ok(self.progress.bootstrap().await?)
    }

    /// Bootstrap on behalf of a surface; the result is dropped if the surface
    /// unmounts first.
    pub async fn bootstrap_surface(&self, scope: &SurfaceScope) -> Result<BootstrapOutcome, ArcadeError> {
        Ok(self.progress.bootstrap_in(scope).await?)
    }

    pub async fn quests(&self, world_id: Option<&str>) -> Result<Vec<QuestSummary>, ArcadeError> {
        Ok(self.client.fetch_quests(world_id).await?)
    }

    pub async fn practice_today(&self) -> Result<DailyPracticePlan, ArcadeError> {
        let plan = self.client.fetch_practice_today().await?;
        tracing::debug!(
            date = %plan.date,
            items = plan.items.len(),
            trials_today = plan.today_trials_completed(),
            "fetched practice plan"
        );
        Ok(plan)
    }

    /// Build a plan locally with the configured gauntlet options.
    pub fn build_practice_plan(
        &self,
        profile_id: &str,
        date: NaiveDate,
        candidates: &[PracticeCandidate],
    ) -> DailyPracticePlan {
        build_practice_plan(profile_id, date, candidates, &self.config.gauntlet)
    }

    /// Follow track activations, once per distinct track, until the guard
    /// is dropped.
    pub fn on_warp<F>(&self, on_warp: F) -> SubscriptionGuard
    where
        F: Fn(&ActiveTrack) + Send + Sync + 'static,
    {
        track_warp(&self.activation, on_warp)
    }
}
