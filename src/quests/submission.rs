use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::{ArcadeClient, QuestSubmitRequest, QuestSubmitResult, QuestSummary};
use crate::bus::{broadcast_quest_unlocks, broadcast_quest_update, ArcadeBus};
use crate::progress::ProgressProjection;
use crate::ArcadeError;

use super::profile::ProfileState;

/// Submission flow for the quest currently open on a surface.
///
/// On success it publishes `QuestUpdated`, then `QuestUnlocked` when the
/// response carries unlocks, syncs profile flags and kicks off a background
/// progress refresh. On failure nothing is published.
pub struct QuestSubmission {
    quest_slug: Option<String>,
    default_language: Option<String>,
    client: Arc<ArcadeClient>,
    bus: Arc<ArcadeBus>,
    profile: Arc<ProfileState>,
    progress: Option<Arc<ProgressProjection>>,
    in_flight: AtomicBool,
    last_result: Mutex<Option<QuestSubmitResult>>,
    last_error: Mutex<Option<String>>,
}

impl QuestSubmission {
    pub fn new(client: Arc<ArcadeClient>, bus: Arc<ArcadeBus>, profile: Arc<ProfileState>) -> Self {
        Self {
            quest_slug: None,
            default_language: None,
            client,
            bus,
            profile,
            progress: None,
            in_flight: AtomicBool::new(false),
            last_result: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    pub fn for_quest(mut self, quest_slug: impl Into<String>) -> Self {
        self.quest_slug = Some(quest_slug.into());
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    pub fn with_progress(mut self, progress: Arc<ProgressProjection>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn quest_slug(&self) -> Option<&str> {
        self.quest_slug.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn last_result(&self) -> Option<QuestSubmitResult> {
        lock(&self.last_result).clone()
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    pub async fn submit(
        &self,
        code: &str,
        language: Option<&str>,
    ) -> Result<QuestSubmitResult, ArcadeError> {
        let Some(slug) = self.quest_slug.as_deref() else {
            *lock(&self.last_error) = Some(ArcadeError::NoActiveQuest.to_string());
            return Err(ArcadeError::NoActiveQuest);
        };

        let in_flight = InFlight::enter(&self.in_flight);
        *lock(&self.last_error) = None;

        let request = QuestSubmitRequest {
            code: code.to_string(),
            language: language
                .map(str::to_string)
                .or_else(|| self.default_language.clone()),
        };
        let outcome = self.client.submit_quest(slug, &request).await;
        drop(in_flight);

        let result = match outcome {
            Ok(result) => result,
            Err(error) => {
                tracing::error!(quest = slug, "quest submission failed: {error}");
                *lock(&self.last_error) = Some(error.to_string());
                return Err(error.into());
            }
        };

        tracing::debug!(
            quest = slug,
            score = result.score,
            passed = result.passed,
            unlocks = result.unlock_events.len(),
            "quest submitted"
        );
        *lock(&self.last_result) = Some(result.clone());

        broadcast_quest_update(&self.bus, result.quest.clone());
        broadcast_quest_unlocks(&self.bus, result.quest.clone(), result.unlock_events.clone());

        if let Some(profile) = result.profile.as_ref() {
            self.profile.apply_sync(profile);
        }

        if let Some(progress) = self.progress.as_ref() {
            progress.spawn_refresh(Some(result.quest.track_id.clone()));
        }

        Ok(result)
    }

    /// Accept the current quest and broadcast its new state.
    pub async fn accept(&self) -> Result<QuestSummary, ArcadeError> {
        let slug = self.quest_slug.as_deref().ok_or(ArcadeError::NoActiveQuest)?;
        let quest = self.client.accept_quest(slug).await?;
        broadcast_quest_update(&self.bus, quest.clone());
        Ok(quest)
    }
}

/// Marks a request as in flight until dropped, including when the
/// submitting future is cancelled mid-request.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
