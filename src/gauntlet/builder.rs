use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::api::{DailyPracticePlan, PracticeDifficulty, PracticeItemType, PracticeItemView};

const MAX_STRUGGLE_PICKS: usize = 2;
const MAX_MAINTENANCE_PICKS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GauntletOptions {
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// When set, only candidates in one of these worlds are eligible.
    #[serde(default)]
    pub include_worlds: Option<BTreeSet<String>>,
    /// When set, only candidates in one of these projects are eligible.
    #[serde(default)]
    pub include_projects: Option<BTreeSet<String>>,
    #[serde(default = "default_struggle_threshold")]
    pub struggle_threshold: u8,
    #[serde(default = "default_maintenance_threshold")]
    pub maintenance_threshold: u8,
}

impl Default for GauntletOptions {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            include_worlds: None,
            include_projects: None,
            struggle_threshold: default_struggle_threshold(),
            maintenance_threshold: default_maintenance_threshold(),
        }
    }
}

impl GauntletOptions {
    /// A candidate outside the world filter still passes when its project is
    /// explicitly included, and the other way around.
    fn admits(&self, candidate: &PracticeCandidate) -> bool {
        let in_worlds = contains(&self.include_worlds, candidate.world_slug.as_deref());
        let in_projects = contains(&self.include_projects, candidate.project_slug.as_deref());

        if self.include_worlds.is_some() && !in_worlds && !in_projects {
            return false;
        }
        if self.include_projects.is_some() && !in_projects && !in_worlds {
            return false;
        }
        true
    }
}

fn contains(filter: &Option<BTreeSet<String>>, value: Option<&str>) -> bool {
    match (filter, value) {
        (Some(set), Some(value)) => set.contains(value),
        _ => false,
    }
}

/// Something the player could practice, aggregated from their quest, boss
/// and project history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeCandidate {
    pub item_type: PracticeItemType,
    /// Quest id, boss slug or project slug depending on `item_type`.
    pub identifier: String,
    #[serde(default)]
    pub world_slug: Option<String>,
    #[serde(default)]
    pub project_slug: Option<String>,
    /// 0-100 heuristic, higher means the player had a harder time.
    #[serde(default)]
    pub struggle_score: u8,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

impl PracticeCandidate {
    pub fn new(item_type: PracticeItemType, identifier: impl Into<String>) -> Self {
        Self {
            item_type,
            identifier: identifier.into(),
            world_slug: None,
            project_slug: None,
            struggle_score: 0,
            attempts: 0,
            last_run_at: None,
            label: String::new(),
            description: String::new(),
        }
    }

    fn key(&self) -> (PracticeItemType, &str) {
        (self.item_type, self.identifier.as_str())
    }

    fn to_view(&self) -> PracticeItemView {
        PracticeItemView {
            id: format!("{}:{}", self.item_type, self.identifier),
            item_type: self.item_type,
            label: if self.label.is_empty() {
                self.identifier.clone()
            } else {
                self.label.clone()
            },
            description: self.description.clone(),
            world_slug: self.world_slug.clone(),
            project_slug: self.project_slug.clone(),
            difficulty: difficulty_for(self.struggle_score),
            rationale: rationale_for(self).to_string(),
            struggle_score: self.struggle_score.min(100),
        }
    }
}

/// Seed derived from `"{profile_id}:{YYYY-MM-DD}"`: the first eight bytes of
/// its SHA-256 digest, big-endian.
pub fn stable_seed(profile_id: &str, date: NaiveDate) -> u64 {
    let digest = Sha256::digest(format!("{profile_id}:{}", date.format("%Y-%m-%d")).as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Build the day's plan for `profile_id`.
///
/// Up to two struggle picks, then up to two maintenance picks (highest
/// struggle score first, ties broken by the seeded RNG), then shuffled
/// unattempted items fill the remaining slots.
pub fn build_practice_plan(
    profile_id: &str,
    date: NaiveDate,
    candidates: &[PracticeCandidate],
    options: &GauntletOptions,
) -> DailyPracticePlan {
    if options.max_items == 0 {
        return DailyPracticePlan::empty(date);
    }

    let mut rng = StdRng::seed_from_u64(stable_seed(profile_id, date));

    let eligible: Vec<&PracticeCandidate> = candidates
        .iter()
        .filter(|candidate| options.admits(candidate))
        .collect();
    if eligible.is_empty() {
        tracing::debug!(profile_id, "no practice candidates match the gauntlet filters");
        return DailyPracticePlan::empty(date);
    }

    let mut struggle = Vec::new();
    let mut maintenance = Vec::new();
    let mut exploration = Vec::new();
    for candidate in dedupe(eligible) {
        if candidate.attempts == 0 {
            exploration.push(candidate);
        } else if candidate.struggle_score >= options.struggle_threshold {
            struggle.push(candidate);
        } else {
            // Attempted items under the maintenance threshold still count as
            // light maintenance.
            maintenance.push(candidate);
        }
    }

    let max_items = options.max_items;
    let mut selected = pick_with_priority(struggle, MAX_STRUGGLE_PICKS.min(max_items), &mut rng);

    let remaining = max_items.saturating_sub(selected.len());
    if remaining > 0 {
        selected.extend(pick_with_priority(
            maintenance,
            MAX_MAINTENANCE_PICKS.min(remaining),
            &mut rng,
        ));
    }

    let remaining = max_items.saturating_sub(selected.len());
    if remaining > 0 {
        exploration.shuffle(&mut rng);
        selected.extend(exploration.into_iter().take(remaining));
    }
    selected.truncate(max_items);

    let items: Vec<PracticeItemView> = selected.iter().map(|candidate| candidate.to_view()).collect();
    tracing::debug!(profile_id, %date, items = items.len(), "built practice plan");

    DailyPracticePlan {
        total_count: items.len() as u32,
        items,
        ..DailyPracticePlan::empty(date)
    }
}

/// Keep one candidate per `(item_type, identifier)`, the one with the highest
/// struggle score. First-seen order is preserved.
fn dedupe(candidates: Vec<&PracticeCandidate>) -> Vec<&PracticeCandidate> {
    let mut kept: Vec<&PracticeCandidate> = Vec::with_capacity(candidates.len());
    let mut positions: HashMap<(PracticeItemType, &str), usize> = HashMap::new();

    for candidate in candidates {
        match positions.get(&candidate.key()) {
            Some(&index) => {
                if candidate.struggle_score > kept[index].struggle_score {
                    kept[index] = candidate;
                }
            }
            None => {
                positions.insert(candidate.key(), kept.len());
                kept.push(candidate);
            }
        }
    }

    kept
}

fn pick_with_priority<'a>(
    mut candidates: Vec<&'a PracticeCandidate>,
    n: usize,
    rng: &mut StdRng,
) -> Vec<&'a PracticeCandidate> {
    if n == 0 || candidates.is_empty() {
        return Vec::new();
    }

    candidates.sort_by(|a, b| b.struggle_score.cmp(&a.struggle_score));

    let mut picked = Vec::with_capacity(n);
    for bucket in candidates.chunk_by_mut(|a, b| a.struggle_score == b.struggle_score) {
        bucket.shuffle(rng);
        let take = (n - picked.len()).min(bucket.len());
        picked.extend_from_slice(&bucket[..take]);
        if picked.len() >= n {
            break;
        }
    }
    picked
}

fn difficulty_for(struggle_score: u8) -> PracticeDifficulty {
    match struggle_score {
        70.. => PracticeDifficulty::Hard,
        40..=69 => PracticeDifficulty::Medium,
        _ => PracticeDifficulty::Easy,
    }
}

fn rationale_for(candidate: &PracticeCandidate) -> &'static str {
    if candidate.attempts == 0 {
        return "New challenge to expand your skills.";
    }
    match candidate.struggle_score {
        70.. => "You struggled with this recently. Time for a focused rematch.",
        40..=69 => "Solid practice target to keep this skill sharp.",
        _ => "Light warm-up to maintain familiarity.",
    }
}

fn default_max_items() -> usize {
    5
}

fn default_struggle_threshold() -> u8 {
    60
}

fn default_maintenance_threshold() -> u8 {
    20
}
