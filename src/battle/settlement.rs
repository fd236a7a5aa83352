//! Outcome settlement
//!
//! Rewards are rolled once, when victory is detected, and travel inside
//! [`BattleResult::PlayerVictory`]. `settle` then applies them to the player
//! and reports quest deltas without touching quest state.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actor::{Enemy, Player};
use crate::battle::events::BattleOutcome;
use crate::combat::CombatContext;
use crate::content::{QuestBoard, QuestDelta};
use crate::core::types::{EnemyKind, ItemId, SkillId};
use crate::core::CombatConfig;

/// Spoils of a won battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub experience: u32,
    pub gold: u32,
    pub loot: Vec<ItemId>,
    /// Zero when the player has no pet
    pub pet_experience: u32,
}

/// How a battle ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    PlayerVictory(Rewards),
    PlayerDefeat,
    PlayerFled,
}

impl BattleResult {
    pub fn outcome(&self) -> BattleOutcome {
        match self {
            BattleResult::PlayerVictory(_) => BattleOutcome::PlayerVictory,
            BattleResult::PlayerDefeat => BattleOutcome::PlayerDefeat,
            BattleResult::PlayerFled => BattleOutcome::PlayerFled,
        }
    }

    pub fn rewards(&self) -> Option<&Rewards> {
        match self {
            BattleResult::PlayerVictory(rewards) => Some(rewards),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub outcome: BattleOutcome,
    pub experience_gained: u32,
    pub gold_gained: u32,
    pub leveled_up: bool,
    pub new_level: u32,
    pub skills_unlocked: Vec<SkillId>,
    pub loot_awarded: Vec<ItemId>,
    pub pet_experience_gained: u32,
    pub pet_leveled_up: bool,
    pub quest_deltas: Vec<QuestDelta>,
}

impl SettlementReport {
    fn empty(outcome: BattleOutcome, level: u32) -> Self {
        Self {
            outcome,
            experience_gained: 0,
            gold_gained: 0,
            leveled_up: false,
            new_level: level,
            skills_unlocked: Vec::new(),
            loot_awarded: Vec::new(),
            pet_experience_gained: 0,
            pet_leveled_up: false,
            quest_deltas: Vec::new(),
        }
    }
}

/// Experience for beating `enemy`, scaled by the level gap
///
/// Equal levels award exactly the enemy's value. Each level the enemy is
/// above the player adds `experience_level_step`, each level below removes it.
pub fn scaled_experience(
    base: u32,
    enemy_level: u32,
    player_level: u32,
    config: &CombatConfig,
) -> u32 {
    let diff = enemy_level as f64 - player_level as f64;
    let scale = (1.0 + diff * config.experience_level_step)
        .clamp(config.experience_scale_min, config.experience_scale_max);
    (base as f64 * scale).round() as u32
}

/// Gold before jitter: base times health and attack multipliers
pub fn base_gold(enemy: &Enemy, config: &CombatConfig) -> u32 {
    let health_mult = (enemy.health.max() as f64 / 50.0).max(1.0);
    let attack_mult = (enemy.attack as f64 / 20.0).max(1.0);
    (config.gold_base as f64 * health_mult * attack_mult) as u32
}

/// Roll experience, gold and loot for a victory
pub fn compute_rewards<R: Rng>(
    player: &Player,
    enemy: &Enemy,
    config: &CombatConfig,
    rng: &mut R,
) -> Rewards {
    let experience = scaled_experience(enemy.experience, enemy.level, player.level, config);

    let jitter = rng.gen_range(config.gold_jitter_min..=config.gold_jitter_max);
    let gold = (base_gold(enemy, config) as i64 + jitter as i64)
        .max(config.gold_floor as i64) as u32;

    let loot = enemy
        .loot
        .iter()
        .filter(|entry| rng.gen::<f64>() < entry.chance)
        .map(|entry| entry.item.clone())
        .collect();

    let pet_experience = if player.pet.is_some() {
        (experience as f64 * config.pet_experience_share) as u32
    } else {
        0
    };

    Rewards {
        experience,
        gold,
        loot,
        pet_experience,
    }
}

/// Open "defeat kind X" objectives matching the defeated enemy
pub fn quest_deltas(kind: &EnemyKind, quests: &dyn QuestBoard) -> Vec<QuestDelta> {
    quests
        .active_objectives()
        .into_iter()
        .filter(|objective| objective.matches(kind))
        .map(|objective| QuestDelta {
            quest: objective.quest.clone(),
            defeated: kind.clone(),
            increment: 1,
        })
        .collect()
}

/// Apply a finished battle's result to the player
pub fn settle(
    result: &BattleResult,
    player: &mut Player,
    enemy: &Enemy,
    ctx: &CombatContext<'_>,
    quests: &dyn QuestBoard,
) -> SettlementReport {
    let BattleResult::PlayerVictory(rewards) = result else {
        tracing::info!(outcome = ?result.outcome(), "battle settled without rewards");
        return SettlementReport::empty(result.outcome(), player.level);
    };

    let old_level = player.level;
    let leveled_up = player.gain_experience(rewards.experience, ctx.config);
    let skills_unlocked: Vec<SkillId> = (old_level + 1..=player.level)
        .flat_map(|level| ctx.skills.unlocked_at(level))
        .filter(|skill| player.learn_skill(skill.clone()))
        .collect();

    player.gold += rewards.gold;
    for item in &rewards.loot {
        player.inventory.add(item.clone(), 1);
    }

    let (pet_experience_gained, pet_leveled_up) = match player.pet.as_mut() {
        Some(pet) => (rewards.pet_experience, pet.gain_experience(rewards.pet_experience)),
        None => (0, false),
    };

    let report = SettlementReport {
        outcome: BattleOutcome::PlayerVictory,
        experience_gained: rewards.experience,
        gold_gained: rewards.gold,
        leveled_up,
        new_level: player.level,
        skills_unlocked,
        loot_awarded: rewards.loot.clone(),
        pet_experience_gained,
        pet_leveled_up,
        quest_deltas: quest_deltas(&enemy.kind, quests),
    };
    tracing::info!(
        experience = report.experience_gained,
        gold = report.gold_gained,
        level = report.new_level,
        quests = report.quest_deltas.len(),
        "victory settled"
    );
    report
}
