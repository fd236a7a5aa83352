//! Quest board interface and a reference quest log
//!
//! Settlement only reads objectives and reports deltas; applying them is the
//! quest log's job.

use serde::{Deserialize, Serialize};

use crate::core::types::{EnemyKind, QuestId};

/// A "defeat enemies of these kinds" objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestObjective {
    pub quest: QuestId,
    pub title: String,
    pub kinds: Vec<EnemyKind>,
    pub progress: u32,
    pub target: u32,
    /// Gold paid on completion
    pub reward: u32,
}

impl QuestObjective {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }

    pub fn matches(&self, kind: &EnemyKind) -> bool {
        self.kinds.contains(kind)
    }
}

/// Progress increment reported by settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDelta {
    pub quest: QuestId,
    pub defeated: EnemyKind,
    pub increment: u32,
}

/// Read-only view of quest state
pub trait QuestBoard {
    /// Objectives still open
    fn active_objectives(&self) -> Vec<&QuestObjective>;
}

/// Board with no quests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuests;

impl QuestBoard for NoQuests {
    fn active_objectives(&self) -> Vec<&QuestObjective> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestLog {
    objectives: Vec<QuestObjective>,
}

impl QuestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four region-clearing quests
    pub fn standard() -> Self {
        let quest = |id: &str, title: &str, kinds: [&str; 3], target, reward| QuestObjective {
            quest: QuestId::from(id),
            title: title.to_string(),
            kinds: kinds.into_iter().map(EnemyKind::from).collect(),
            progress: 0,
            target,
            reward,
        };
        Self {
            objectives: vec![
                quest(
                    "forest",
                    "Forest Cleanup",
                    ["wolf", "giant_spider", "black_bear"],
                    3,
                    100,
                ),
                quest(
                    "castle",
                    "Castle Exploration",
                    ["skeleton_warrior", "young_dragon", "ghost"],
                    1,
                    200,
                ),
                quest(
                    "volcano",
                    "Volcano Conquest",
                    ["fire_elemental", "lava_golem", "fire_dragon"],
                    2,
                    300,
                ),
                quest(
                    "ice",
                    "Ice Cave Expedition",
                    ["ice_elemental", "ice_penguin", "ice_bear"],
                    1,
                    250,
                ),
            ],
        }
    }

    pub fn add(&mut self, objective: QuestObjective) {
        self.objectives.push(objective);
    }

    pub fn get(&self, quest: &QuestId) -> Option<&QuestObjective> {
        self.objectives.iter().find(|o| &o.quest == quest)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestObjective> {
        self.objectives.iter()
    }

    /// Apply settlement deltas, returning quests completed by them
    ///
    /// Deltas for unknown or already completed quests are ignored.
    pub fn apply(&mut self, deltas: &[QuestDelta]) -> Vec<QuestId> {
        let mut completed = Vec::new();
        for delta in deltas {
            let Some(objective) = self.objectives.iter_mut().find(|o| o.quest == delta.quest)
            else {
                tracing::warn!(quest = %delta.quest, "delta for unknown quest");
                continue;
            };
            if objective.is_complete() {
                continue;
            }
            objective.progress = (objective.progress + delta.increment).min(objective.target);
            tracing::info!(
                quest = %objective.quest,
                progress = objective.progress,
                target = objective.target,
                "quest progress"
            );
            if objective.is_complete() {
                completed.push(objective.quest.clone());
            }
        }
        completed
    }
}

impl QuestBoard for QuestLog {
    fn active_objectives(&self) -> Vec<&QuestObjective> {
        self.objectives.iter().filter(|o| !o.is_complete()).collect()
    }
}
