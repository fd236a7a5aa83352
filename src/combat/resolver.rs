//! Action resolution
//!
//! `resolve` validates an action against the actor's current state, then
//! applies it. Every random roll goes through the caller's `Rng`, so a seeded
//! generator reproduces a battle exactly. Validation failures leave both
//! actors untouched.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::combat::status::{self, StatusEffect, StatusKind};
use crate::content::{ItemCatalog, ItemEffect, SkillCatalog, SkillEffect};
use crate::core::types::{ItemId, SkillId};
use crate::core::{CombatConfig, CombatError, Result};

/// What an actor does with its turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Attack,
    Flee,
    UseItem(ItemId),
    UseSkill(SkillId),
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Attack => "attack",
            Action::Flee => "flee",
            Action::UseItem(_) => "item",
            Action::UseSkill(_) => "skill",
        }
    }
}

/// How an action played out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Hit { critical: bool },
    /// The target avoided the blow; no damage and no floor
    Dodged,
    Escaped,
    FleeFailed,
    ItemUsed(ItemId),
    SkillCast(SkillId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Name of the acting actor
    pub actor: String,
    pub action: Action,
    pub kind: OutcomeKind,
    /// Health actually removed from the target
    pub damage_dealt: u32,
    /// Health actually restored to the actor
    pub healing_done: u32,
    pub mana_restored: u32,
    pub mana_spent: u32,
    /// Statuses newly applied or refreshed, on the target or the actor
    pub effects_applied: Vec<StatusKind>,
    pub effects_cured: Vec<StatusKind>,
    pub message: String,
}

impl ActionOutcome {
    fn new(actor: &str, action: &Action, kind: OutcomeKind) -> Self {
        Self {
            actor: actor.to_string(),
            action: action.clone(),
            kind,
            damage_dealt: 0,
            healing_done: 0,
            mana_restored: 0,
            mana_spent: 0,
            effects_applied: Vec::new(),
            effects_cured: Vec::new(),
            message: String::new(),
        }
    }

    pub fn fled(&self) -> bool {
        self.kind == OutcomeKind::Escaped
    }

    pub fn critical(&self) -> bool {
        matches!(self.kind, OutcomeKind::Hit { critical: true })
    }

    pub fn dodged(&self) -> bool {
        self.kind == OutcomeKind::Dodged
    }
}

/// Read-only collaborators every resolution needs
#[derive(Clone, Copy)]
pub struct CombatContext<'a> {
    pub config: &'a CombatConfig,
    pub items: &'a dyn ItemCatalog,
    pub skills: &'a dyn SkillCatalog,
}

impl<'a> CombatContext<'a> {
    pub fn new(
        config: &'a CombatConfig,
        items: &'a dyn ItemCatalog,
        skills: &'a dyn SkillCatalog,
    ) -> Self {
        Self {
            config,
            items,
            skills,
        }
    }
}

/// Resolve one action by `actor` against `target`
pub fn resolve<A, T, R>(
    actor: &mut A,
    action: &Action,
    target: &mut T,
    ctx: &CombatContext<'_>,
    rng: &mut R,
) -> Result<ActionOutcome>
where
    A: Actor + ?Sized,
    T: Actor + ?Sized,
    R: Rng,
{
    if actor.is_defeated() {
        return Err(CombatError::InvalidAction(format!(
            "{} is defeated and cannot act",
            actor.name()
        )));
    }
    if let Some(kind) = actor.effects().prevents_action() {
        return Err(CombatError::InvalidAction(format!(
            "{} cannot act while under {}",
            actor.name(),
            kind.label()
        )));
    }
    if target.is_defeated() {
        return Err(CombatError::InvalidTarget(format!(
            "{} is already defeated",
            target.name()
        )));
    }

    let outcome = match action {
        Action::Attack => resolve_attack(actor, action, target, ctx.config, rng),
        Action::Flee => resolve_flee(actor, action, target, ctx.config, rng),
        Action::UseItem(item) => resolve_item(actor, action, item, ctx)?,
        Action::UseSkill(skill) => resolve_skill(actor, action, skill, target, ctx, rng)?,
    };

    tracing::debug!(
        actor = actor.name(),
        action = action.label(),
        damage = outcome.damage_dealt,
        healing = outcome.healing_done,
        "action resolved"
    );
    Ok(outcome)
}

/// Damage before variance and crits: attack minus defense, at least 1
pub fn base_attack_damage<A, T>(actor: &A, target: &T, config: &CombatConfig) -> u32
where
    A: Actor + ?Sized,
    T: Actor + ?Sized,
{
    actor
        .attack(config)
        .saturating_sub(target.defense())
        .max(1)
}

/// Flee probability after level difference
pub fn flee_chance<A, T>(actor: &A, target: &T, config: &CombatConfig) -> f64
where
    A: Actor + ?Sized,
    T: Actor + ?Sized,
{
    let level_diff = actor.level() as f64 - target.level() as f64;
    (config.flee_chance + level_diff * config.flee_level_step)
        .clamp(config.flee_chance_min, config.flee_chance_max)
}

/// Roll the target's dodge. Actors without a dodge chance never roll.
fn roll_dodge<T, R>(target: &T, config: &CombatConfig, rng: &mut R) -> bool
where
    T: Actor + ?Sized,
    R: Rng,
{
    let chance = target.dodge_chance(config);
    chance > 0.0 && rng.gen::<f64>() < chance
}

fn dodged_outcome(actor: &str, action: &Action, target: &str) -> ActionOutcome {
    let mut outcome = ActionOutcome::new(actor, action, OutcomeKind::Dodged);
    outcome.message = format!("{} dodges {}'s attack", target, actor);
    outcome
}

/// Scale by the configured variance, if any
fn roll_variance<R: Rng>(damage: f64, config: &CombatConfig, rng: &mut R) -> f64 {
    if config.damage_variance > 0.0 {
        let v = config.damage_variance;
        damage * rng.gen_range(1.0 - v..=1.0 + v)
    } else {
        damage
    }
}

fn resolve_attack<A, T, R>(
    actor: &mut A,
    action: &Action,
    target: &mut T,
    config: &CombatConfig,
    rng: &mut R,
) -> ActionOutcome
where
    A: Actor + ?Sized,
    T: Actor + ?Sized,
    R: Rng,
{
    if roll_dodge(target, config, rng) {
        return dodged_outcome(actor.name(), action, target.name());
    }

    let mut damage = roll_variance(base_attack_damage(actor, target, config) as f64, config, rng);

    let crit_chance = actor.crit_chance(config);
    let critical = crit_chance > 0.0 && rng.gen::<f64>() < crit_chance;
    if critical {
        damage *= config.crit_multiplier;
    }

    let damage = (damage.round() as u32).max(1);
    let dealt = target.apply_damage(damage);

    let mut outcome = ActionOutcome::new(actor.name(), action, OutcomeKind::Hit { critical });
    outcome.damage_dealt = dealt;
    outcome.message = if critical {
        format!(
            "Critical hit! {} strikes {} for {} damage",
            actor.name(),
            target.name(),
            dealt
        )
    } else {
        format!("{} attacks {} for {} damage", actor.name(), target.name(), dealt)
    };
    outcome
}

fn resolve_flee<A, T, R>(
    actor: &mut A,
    action: &Action,
    target: &mut T,
    config: &CombatConfig,
    rng: &mut R,
) -> ActionOutcome
where
    A: Actor + ?Sized,
    T: Actor + ?Sized,
    R: Rng,
{
    let chance = flee_chance(actor, target, config);
    let escaped = rng.gen::<f64>() < chance;

    let (kind, message) = if escaped {
        (
            OutcomeKind::Escaped,
            format!("{} escapes from {}", actor.name(), target.name()),
        )
    } else {
        (
            OutcomeKind::FleeFailed,
            format!("{} fails to escape from {}", actor.name(), target.name()),
        )
    };
    let mut outcome = ActionOutcome::new(actor.name(), action, kind);
    outcome.message = message;
    outcome
}

fn resolve_item<A>(
    actor: &mut A,
    action: &Action,
    item: &ItemId,
    ctx: &CombatContext<'_>,
) -> Result<ActionOutcome>
where
    A: Actor + ?Sized,
{
    let carried = actor
        .inventory()
        .ok_or_else(|| CombatError::InvalidAction(format!("{} carries no items", actor.name())))?
        .contains(item);
    if !carried {
        return Err(CombatError::InvalidAction(format!(
            "no {} in inventory",
            item
        )));
    }
    let def = ctx
        .items
        .item(item)
        .ok_or_else(|| CombatError::InvalidAction(format!("unknown item {}", item)))?;
    let effect = match (&def.effect, def.consumable) {
        (Some(effect), true) => effect.clone(),
        _ => {
            return Err(CombatError::InvalidAction(format!(
                "{} cannot be used in battle",
                def.name
            )))
        }
    };
    let item_name = def.name.clone();

    let mut outcome = ActionOutcome::new(actor.name(), action, OutcomeKind::ItemUsed(item.clone()));
    let detail = match effect {
        ItemEffect::Heal { amount } => {
            outcome.healing_done = actor.heal(amount);
            format!("restoring {} health", outcome.healing_done)
        }
        ItemEffect::RestoreMana { amount } => {
            outcome.mana_restored = actor.mana_mut().restore(amount);
            format!("restoring {} mana", outcome.mana_restored)
        }
        ItemEffect::Cure { kind: Some(kind) } => {
            if kind.is_harmful() && actor.effects_mut().remove(kind).is_some() {
                outcome.effects_cured.push(kind);
                format!("curing {}", kind.label())
            } else {
                "but nothing happens".to_string()
            }
        }
        ItemEffect::Cure { kind: None } => {
            outcome.effects_cured = actor.effects_mut().cure_harmful();
            if outcome.effects_cured.is_empty() {
                "but nothing happens".to_string()
            } else {
                format!("curing {}", join_labels(&outcome.effects_cured))
            }
        }
        ItemEffect::Buff {
            kind,
            duration,
            magnitude,
        } => {
            if status::apply(actor, StatusEffect::new(kind, duration, magnitude)).is_some() {
                outcome.effects_applied.push(kind);
                format!("gaining {}", kind.label())
            } else {
                "but nothing happens".to_string()
            }
        }
    };

    if let Some(inventory) = actor.inventory_mut() {
        inventory.remove_one(item);
    }
    outcome.message = format!("{} uses {}, {}", actor.name(), item_name, detail);
    Ok(outcome)
}

fn resolve_skill<A, T, R>(
    actor: &mut A,
    action: &Action,
    skill: &SkillId,
    target: &mut T,
    ctx: &CombatContext<'_>,
    rng: &mut R,
) -> Result<ActionOutcome>
where
    A: Actor + ?Sized,
    T: Actor + ?Sized,
    R: Rng,
{
    if !actor.skills().contains(skill) {
        return Err(CombatError::InvalidAction(format!(
            "{} does not know {}",
            actor.name(),
            skill
        )));
    }
    let def = ctx
        .skills
        .skill(skill)
        .ok_or_else(|| CombatError::InvalidAction(format!("unknown skill {}", skill)))?;
    let available = actor.mana().current();
    if available < def.cost {
        return Err(CombatError::InsufficientResource {
            resource: "mana",
            required: def.cost,
            available,
        });
    }
    actor.mana_mut().spend(def.cost);

    let mut outcome =
        ActionOutcome::new(actor.name(), action, OutcomeKind::SkillCast(skill.clone()));
    outcome.mana_spent = def.cost;

    outcome.message = match def.effect {
        SkillEffect::Damage {
            amount,
            spread,
            inflicts,
        } => {
            let damage = roll_spread(amount, spread, rng).max(1);
            outcome.damage_dealt = target.apply_damage(damage);
            let mut message = format!(
                "{} casts {} on {} for {} damage",
                actor.name(),
                def.name,
                target.name(),
                outcome.damage_dealt
            );
            if let Some(kind) = inflicts {
                let procs = rng.gen::<f64>() < ctx.config.status_proc_chance;
                if procs
                    && status::apply(
                        target,
                        StatusEffect::standard(kind, ctx.config.status_duration),
                    )
                    .is_some()
                {
                    outcome.effects_applied.push(kind);
                    message.push_str(&format!(" and inflicts {}", kind.label()));
                }
            }
            message
        }
        SkillEffect::Strike {
            multiplier,
            armor_pierce,
            unavoidable,
        } => {
            if !unavoidable && roll_dodge(target, ctx.config, rng) {
                outcome.kind = OutcomeKind::Dodged;
                format!("{} dodges {}'s {}", target.name(), actor.name(), def.name)
            } else {
                let damage = strike_damage(actor, target, multiplier, armor_pierce, ctx.config);
                let damage = roll_variance(damage, ctx.config, rng).round().max(1.0) as u32;
                outcome.damage_dealt = target.apply_damage(damage);
                format!(
                    "{} uses {} on {} for {} damage",
                    actor.name(),
                    def.name,
                    target.name(),
                    outcome.damage_dealt
                )
            }
        }
        SkillEffect::Heal { amount, spread } => {
            outcome.healing_done = actor.heal(roll_spread(amount, spread, rng));
            format!(
                "{} casts {}, restoring {} health",
                actor.name(),
                def.name,
                outcome.healing_done
            )
        }
        SkillEffect::Buff {
            kind,
            duration,
            magnitude,
        } => {
            if status::apply(actor, StatusEffect::new(kind, duration, magnitude)).is_some() {
                outcome.effects_applied.push(kind);
                format!("{} casts {}, gaining {}", actor.name(), def.name, kind.label())
            } else {
                format!("{} casts {}, but nothing happens", actor.name(), def.name)
            }
        }
    };
    Ok(outcome)
}

/// Attack-scaled damage with part of the target's defense ignored
pub fn strike_damage<A, T>(
    actor: &A,
    target: &T,
    multiplier: f64,
    armor_pierce: f64,
    config: &CombatConfig,
) -> f64
where
    A: Actor + ?Sized,
    T: Actor + ?Sized,
{
    let raw = actor.attack(config) as f64 * multiplier;
    let defense = target.defense() as f64 * (1.0 - armor_pierce.clamp(0.0, 1.0));
    (raw - defense).max(1.0)
}

/// Uniform roll in `amount ± spread`, never below zero
fn roll_spread<R: Rng>(amount: u32, spread: u32, rng: &mut R) -> u32 {
    if spread == 0 {
        return amount;
    }
    rng.gen_range(amount.saturating_sub(spread)..=amount + spread)
}

fn join_labels(kinds: &[StatusKind]) -> String {
    kinds
        .iter()
        .map(|k| k.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Enemy, Player};
    use crate::content::{ItemTable, SkillDef, SkillTable};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixed_config() -> CombatConfig {
        CombatConfig {
            damage_variance: 0.0,
            crit_chance: 0.0,
            dodge_chance: 0.0,
            ..CombatConfig::default()
        }
    }

    /// Every `gen::<f64>()` reads 0.0, every range roll reads its low end
    fn low_rolls() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every `gen::<f64>()` reads just under 1.0
    fn high_rolls() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_attack_subtracts_defense() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::with_stats("Hero", 20, 5, 2);
        let mut enemy = Enemy::new("slime", "Slime", 10, 3).with_defense(1);

        let outcome = resolve(&mut player, &Action::Attack, &mut enemy, &ctx, &mut low_rolls())
            .unwrap();
        assert_eq!(outcome.damage_dealt, 4);
        assert_eq!(enemy.health.current(), 6);
        assert!(!outcome.critical());
    }

    #[test]
    fn test_attack_floor_against_heavy_armor() {
        let config = CombatConfig::default();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut enemy = Enemy::new("golem", "Golem", 1000, 1).with_defense(500);
        let mut player = Player::with_stats("Hero", 20, 5, 0);

        for _ in 0..50 {
            let outcome =
                resolve(&mut player, &Action::Attack, &mut enemy, &ctx, &mut rng).unwrap();
            assert!(outcome.damage_dealt >= 1);
        }
    }

    #[test]
    fn test_player_crit_multiplies() {
        let config = CombatConfig {
            damage_variance: 0.0,
            crit_chance: 0.5,
            crit_multiplier: 1.5,
            ..CombatConfig::default()
        };
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::with_stats("Hero", 20, 10, 0);
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);

        let outcome = resolve(&mut player, &Action::Attack, &mut enemy, &ctx, &mut low_rolls())
            .unwrap();
        assert!(outcome.critical());
        assert_eq!(outcome.damage_dealt, 15);
    }

    #[test]
    fn test_player_dodges_enemy_attack() {
        let config = CombatConfig {
            damage_variance: 0.0,
            ..CombatConfig::default()
        };
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::with_stats("Hero", 50, 5, 0);
        let mut wolf = Enemy::new("wolf", "Wolf", 40, 15);

        let outcome = resolve(&mut wolf, &Action::Attack, &mut player, &ctx, &mut low_rolls())
            .unwrap();
        assert!(outcome.dodged());
        assert_eq!(outcome.damage_dealt, 0);
        assert!(player.health.is_full());

        let outcome = resolve(&mut wolf, &Action::Attack, &mut player, &ctx, &mut high_rolls())
            .unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Hit { critical: false });
        assert_eq!(player.health.current(), 35);
    }

    #[test]
    fn test_enemies_never_dodge() {
        let config = CombatConfig {
            dodge_chance: 1.0,
            ..fixed_config()
        };
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::with_stats("Hero", 50, 5, 0);
        let mut wolf = Enemy::new("wolf", "Wolf", 40, 15);

        let outcome = resolve(&mut player, &Action::Attack, &mut wolf, &ctx, &mut low_rolls())
            .unwrap();
        assert!(!outcome.dodged());
        assert_eq!(outcome.damage_dealt, 5);
    }

    #[test]
    fn test_unavoidable_strike_ignores_dodge() {
        let config = CombatConfig {
            dodge_chance: 1.0,
            ..fixed_config()
        };
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::with_stats("Hero", 100, 5, 4);
        let mut dragon = Enemy::new("fire_dragon", "Fire Dragon", 150, 20).with_skills(vec![
            SkillId::from("cleave"),
            SkillId::from("area_attack"),
        ]);

        let cleave = Action::UseSkill(SkillId::from("cleave"));
        let outcome = resolve(&mut dragon, &cleave, &mut player, &ctx, &mut low_rolls()).unwrap();
        assert!(outcome.dodged());
        assert!(player.health.is_full());

        let area = Action::UseSkill(SkillId::from("area_attack"));
        let outcome = resolve(&mut dragon, &area, &mut player, &ctx, &mut low_rolls()).unwrap();
        // 20 * 1.8 - 4
        assert_eq!(outcome.damage_dealt, 32);
        assert_eq!(outcome.kind, OutcomeKind::SkillCast(SkillId::from("area_attack")));
    }

    #[test]
    fn test_strike_pierces_part_of_defense() {
        let config = fixed_config();
        let player = Player::with_stats("Hero", 100, 5, 10);
        let dragon = Enemy::new("fire_dragon", "Fire Dragon", 150, 20);
        // 20 * 1.5 - 10 * 0.5
        assert_eq!(strike_damage(&dragon, &player, 1.5, 0.5, &config), 25.0);
        assert_eq!(strike_damage(&dragon, &player, 2.0, 1.0, &config), 40.0);
        assert_eq!(strike_damage(&dragon, &player, 0.1, 0.0, &config), 1.0);
    }

    #[test]
    fn test_flee_forced_success_and_failure() {
        let config = CombatConfig::default();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);

        let out = resolve(&mut player, &Action::Flee, &mut enemy, &ctx, &mut low_rolls()).unwrap();
        assert!(out.fled());
        let out = resolve(&mut player, &Action::Flee, &mut enemy, &ctx, &mut high_rolls()).unwrap();
        assert!(!out.fled());
        assert_eq!(out.kind, OutcomeKind::FleeFailed);
        assert!(enemy.health.is_full());
    }

    #[test]
    fn test_flee_chance_clamped_by_level_gap() {
        let config = CombatConfig::default();
        let player = Player::new("Hero");
        let dragon = Enemy::new("fire_dragon", "Fire Dragon", 150, 35).with_level(40);
        assert_eq!(flee_chance(&player, &dragon, &config), config.flee_chance_min);

        let rat = Enemy::new("rat", "Rat", 5, 1);
        assert!((flee_chance(&player, &rat, &config) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_bread_heals_and_is_consumed() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        player.health.drain(50);
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);

        let action = Action::UseItem(ItemId::from("bread"));
        let outcome = resolve(&mut player, &action, &mut enemy, &ctx, &mut low_rolls()).unwrap();
        assert_eq!(outcome.healing_done, 30);
        assert_eq!(player.health.current(), 80);
        assert!(!player.inventory.contains(&ItemId::from("bread")));

        let again = resolve(&mut player, &action, &mut enemy, &ctx, &mut low_rolls());
        assert!(matches!(again, Err(CombatError::InvalidAction(_))));
    }

    #[test]
    fn test_non_consumable_rejected_and_kept() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);

        let action = Action::UseItem(ItemId::from("wooden_sword"));
        let result = resolve(&mut player, &action, &mut enemy, &ctx, &mut low_rolls());
        assert!(matches!(result, Err(CombatError::InvalidAction(_))));
        assert!(player.inventory.contains(&ItemId::from("wooden_sword")));
    }

    #[test]
    fn test_panacea_cures_all_harmful() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        player.inventory.add(ItemId::from("panacea"), 1);
        player.effects.insert(StatusEffect::standard(StatusKind::Poison, 3));
        player.effects.insert(StatusEffect::standard(StatusKind::Burn, 3));
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);

        let action = Action::UseItem(ItemId::from("panacea"));
        let outcome = resolve(&mut player, &action, &mut enemy, &ctx, &mut low_rolls()).unwrap();
        assert_eq!(outcome.effects_cured, vec![StatusKind::Burn, StatusKind::Poison]);
        assert!(player.effects.is_empty());
    }

    #[test]
    fn test_skill_insufficient_mana_leaves_state() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        player.mana.drain(45);
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);

        let action = Action::UseSkill(SkillId::from("fireball"));
        let result = resolve(&mut player, &action, &mut enemy, &ctx, &mut low_rolls());
        assert_eq!(
            result,
            Err(CombatError::InsufficientResource {
                resource: "mana",
                required: 10,
                available: 5
            })
        );
        assert_eq!(player.mana.current(), 5);
        assert!(enemy.health.is_full());
    }

    #[test]
    fn test_fireball_spends_mana_and_burns() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        let mut enemy = Enemy::new("bear", "Black Bear", 80, 22).with_defense(50);

        let action = Action::UseSkill(SkillId::from("fireball"));
        let outcome = resolve(&mut player, &action, &mut enemy, &ctx, &mut low_rolls()).unwrap();
        // Low end of 30 ± 5, defense ignored
        assert_eq!(outcome.damage_dealt, 25);
        assert_eq!(outcome.mana_spent, 10);
        assert_eq!(player.mana.current(), 40);
        assert_eq!(outcome.effects_applied, vec![StatusKind::Burn]);
        assert!(enemy.effects.has(StatusKind::Burn));
    }

    #[test]
    fn test_buff_that_does_not_stick_is_not_reported() {
        let config = fixed_config();
        let items = ItemTable::standard();
        let mut skills = SkillTable::standard();
        skills.insert(SkillDef {
            id: SkillId::from("fizzle"),
            name: "Fizzle".to_string(),
            cost: 1,
            unlock_level: 0,
            cooldown: 0,
            effect: SkillEffect::Buff {
                kind: StatusKind::Shield,
                duration: 0,
                magnitude: 5,
            },
        });
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        player.skills.push(SkillId::from("fizzle"));
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);

        let action = Action::UseSkill(SkillId::from("fizzle"));
        let outcome = resolve(&mut player, &action, &mut enemy, &ctx, &mut low_rolls()).unwrap();
        assert!(outcome.effects_applied.is_empty());
        assert!(outcome.message.contains("nothing happens"));
        assert!(!player.effects.has(StatusKind::Shield));
    }

    #[test]
    fn test_unknown_skill_rejected() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);

        let action = Action::UseSkill(SkillId::from("lightning"));
        let result = resolve(&mut player, &action, &mut enemy, &ctx, &mut low_rolls());
        assert!(matches!(result, Err(CombatError::InvalidAction(_))));
        assert_eq!(player.mana.current(), 50);
    }

    #[test]
    fn test_stunned_actor_cannot_act() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        player.effects.insert(StatusEffect::standard(StatusKind::Stun, 1));
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);

        let result = resolve(&mut player, &Action::Attack, &mut enemy, &ctx, &mut low_rolls());
        assert!(matches!(result, Err(CombatError::InvalidAction(_))));
        assert!(enemy.health.is_full());
    }

    #[test]
    fn test_defeated_target_rejected() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut player = Player::new("Hero");
        let mut enemy = Enemy::new("wolf", "Wolf", 40, 15);
        enemy.apply_damage(40);

        let result = resolve(&mut player, &Action::Attack, &mut enemy, &ctx, &mut low_rolls());
        assert!(matches!(result, Err(CombatError::InvalidTarget(_))));
    }
}
