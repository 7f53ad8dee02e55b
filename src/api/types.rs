use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestState {
    Locked,
    Available,
    InProgress,
    Completed,
    Mastered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestSummary {
    pub id: i64,
    pub slug: String,
    pub world_id: String,
    pub track_id: String,
    pub order_index: i32,
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    pub state: QuestState,
    #[serde(default)]
    pub best_score: Option<f64>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub unlocks_boss_id: Option<String>,
    #[serde(default)]
    pub unlocks_layout_id: Option<String>,
    #[serde(default)]
    pub base_xp_reward: i64,
    #[serde(default)]
    pub mastery_xp_bonus: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlockKind {
    Boss,
    Layout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockDescriptor {
    #[serde(rename = "type")]
    pub kind: UnlockKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl UnlockDescriptor {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestSubmitRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bosses_unlocked: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSync {
    #[serde(default)]
    pub xp: Option<i64>,
    #[serde(default)]
    pub flags: Option<ProfileFlags>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestSubmitResult {
    pub quest: QuestSummary,
    pub score: f64,
    pub passed: bool,
    #[serde(default)]
    pub xp_awarded: Option<i64>,
    #[serde(default)]
    pub unlock_events: Vec<UnlockDescriptor>,
    #[serde(default)]
    pub profile: Option<ProfileSync>,
}

impl QuestSubmitResult {
    pub fn bosses_unlocked(&self) -> Option<&[String]> {
        self.profile
            .as_ref()?
            .flags
            .as_ref()?
            .bosses_unlocked
            .as_deref()
    }
}

// ---------------------------------------------------------------------------
// World progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackProgress {
    #[serde(default)]
    pub world_slug: String,
    pub track_slug: String,
    #[serde(default)]
    pub label: String,
    pub progress: f64,
    #[serde(default)]
    pub total_quests: u32,
    #[serde(default)]
    pub completed_quests: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldProgressResponse {
    #[serde(default)]
    pub tracks: Vec<TrackProgress>,
}

// ---------------------------------------------------------------------------
// Practice gauntlet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeItemType {
    QuestReview,
    BossReview,
    ProjectMaintenance,
}

impl PracticeItemType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QuestReview => "quest_review",
            Self::BossReview => "boss_review",
            Self::ProjectMaintenance => "project_maintenance",
        }
    }
}

impl std::fmt::Display for PracticeItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeItemView {
    /// `"{item_type}:{identifier}"`, stable for a given candidate.
    pub id: String,
    pub item_type: PracticeItemType,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub world_slug: Option<String>,
    #[serde(default)]
    pub project_slug: Option<String>,
    pub difficulty: PracticeDifficulty,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub struggle_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPracticePlan {
    pub date: NaiveDate,
    #[serde(default = "default_plan_label")]
    pub label: String,
    #[serde(default)]
    pub items: Vec<PracticeItemView>,
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub today_quests_completed: u32,
    #[serde(default)]
    pub today_bosses_cleared: u32,
    #[serde(default)]
    pub streak_days: Option<u32>,
}

impl DailyPracticePlan {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            label: default_plan_label(),
            items: Vec::new(),
            completed_count: 0,
            total_count: 0,
            today_quests_completed: 0,
            today_bosses_cleared: 0,
            streak_days: None,
        }
    }

    pub fn item_ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    pub fn today_trials_completed(&self) -> u32 {
        self.today_quests_completed + self.today_bosses_cleared
    }
}

pub(crate) fn default_plan_label() -> String {
    "Practice Gauntlet".to_string()
}
