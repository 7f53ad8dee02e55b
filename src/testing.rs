//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{
    ApiError, QuestState, QuestSummary, TrackProgress, UnlockDescriptor, UnlockKind,
    WorldProgressResponse,
};
use crate::progress::ProgressSource;

pub fn quest(slug: &str) -> QuestSummary {
    QuestSummary {
        id: 1,
        slug: slug.to_string(),
        world_id: "world-python".to_string(),
        track_id: "python-basics".to_string(),
        order_index: 1,
        title: format!("Quest {slug}"),
        short_description: String::new(),
        state: QuestState::Available,
        best_score: None,
        attempts: 0,
        unlocks_boss_id: None,
        unlocks_layout_id: None,
        base_xp_reward: 50,
        mastery_xp_bonus: 25,
    }
}

pub fn boss_unlock(id: &str, label: Option<&str>) -> UnlockDescriptor {
    UnlockDescriptor {
        kind: UnlockKind::Boss,
        id: id.to_string(),
        label: label.map(str::to_string),
    }
}

pub fn layout_unlock(id: &str) -> UnlockDescriptor {
    UnlockDescriptor {
        kind: UnlockKind::Layout,
        id: id.to_string(),
        label: None,
    }
}

pub fn snapshot(tracks: &[(&str, f64)]) -> WorldProgressResponse {
    WorldProgressResponse {
        tracks: tracks
            .iter()
            .map(|(slug, progress)| TrackProgress {
                world_slug: "world-python".to_string(),
                track_slug: slug.to_string(),
                label: slug.to_string(),
                progress: *progress,
                total_quests: 10,
                completed_quests: 0,
            })
            .collect(),
    }
}

/// Scripted progress backend: each fetch pops the next response, optionally
/// after a delay.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<(Duration, Result<WorldProgressResponse, ApiError>)>>,
    calls: Mutex<usize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(0),
        }
    }

    pub fn ok(self, response: WorldProgressResponse) -> Self {
        self.push(Duration::ZERO, Ok(response))
    }

    pub fn ok_after(self, delay: Duration, response: WorldProgressResponse) -> Self {
        self.push(delay, Ok(response))
    }

    pub fn fail(self, status: u16) -> Self {
        self.push(
            Duration::ZERO,
            Err(ApiError::Status {
                endpoint: "/api/worlds/progress".to_string(),
                status,
                detail: "scripted failure".to_string(),
            }),
        )
    }

    fn push(self, delay: Duration, response: Result<WorldProgressResponse, ApiError>) -> Self {
        self.responses.lock().unwrap().push_back((delay, response));
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ProgressSource for ScriptedSource {
    async fn fetch_world_progress(&self) -> Result<WorldProgressResponse, ApiError> {
        *self.calls.lock().unwrap() += 1;
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Err(ApiError::Request("no scripted response left".to_string())),
        }
    }
}
