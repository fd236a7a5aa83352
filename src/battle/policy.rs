//! Enemy action selection
//!
//! Policies are swappable strategies behind [`EnemyPolicy`]. Each enemy
//! template names the policy it fights with.
//!
//! Bosses fight in three phases. A phase is reached when health falls to its
//! ratio threshold and is never left again. Entering a phase rescales attack
//! from the boss's starting value; entering the last one also heals.

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, Enemy, Player};
use crate::combat::{Action, CombatContext};
use crate::content::{SkillCatalog, SkillDef};
use crate::core::CombatConfig;

/// Chooses an enemy's action for the current turn
pub trait EnemyPolicy {
    fn name(&self) -> &'static str;

    /// Runs before `choose_action` on every turn the enemy gets to act
    ///
    /// Policies that change the enemy itself do it here and report the
    /// change for the battle log.
    fn before_turn(&mut self, _enemy: &mut Enemy, _config: &CombatConfig) -> Option<PhaseShift> {
        None
    }

    /// Must return an action; the session falls back to Attack if it fails
    fn choose_action(&mut self, enemy: &Enemy, player: &Player, ctx: &CombatContext<'_>)
        -> Action;
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BossPhase {
    #[default]
    Initial,
    Angered,
    Berserk,
}

impl BossPhase {
    /// Phase for a health ratio; at or below a threshold enters that phase
    pub fn for_ratio(ratio: f64, config: &CombatConfig) -> Self {
        if ratio > config.boss_phase_two_ratio {
            BossPhase::Initial
        } else if ratio > config.boss_phase_three_ratio {
            BossPhase::Angered
        } else {
            BossPhase::Berserk
        }
    }

    pub fn number(self) -> u8 {
        match self {
            BossPhase::Initial => 1,
            BossPhase::Angered => 2,
            BossPhase::Berserk => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BossPhase::Initial => "initial",
            BossPhase::Angered => "angered",
            BossPhase::Berserk => "berserk",
        }
    }

    fn attack_scale(self, config: &CombatConfig) -> f64 {
        match self {
            BossPhase::Initial => 1.0,
            BossPhase::Angered => config.boss_phase_two_attack,
            BossPhase::Berserk => config.boss_phase_three_attack,
        }
    }
}

/// What a phase change did to the enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseShift {
    pub phase: BossPhase,
    /// Attack after rescaling
    pub attack: u32,
    /// Health actually restored
    pub healed: u32,
}

/// Policy names as they appear in enemy data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Berserker,
    Survivor,
    Tactician,
    Boss,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn EnemyPolicy> {
        match self {
            PolicyKind::Berserker => Box::new(Berserker),
            PolicyKind::Survivor => Box::new(Survivor),
            PolicyKind::Tactician => Box::new(Tactician),
            PolicyKind::Boss => Box::new(Boss::new()),
        }
    }
}

/// Always attacks
#[derive(Debug, Clone, Copy, Default)]
pub struct Berserker;

impl EnemyPolicy for Berserker {
    fn name(&self) -> &'static str {
        "berserker"
    }

    fn choose_action(
        &mut self,
        _enemy: &Enemy,
        _player: &Player,
        _ctx: &CombatContext<'_>,
    ) -> Action {
        Action::Attack
    }
}

/// Heals when badly hurt, otherwise attacks
#[derive(Debug, Clone, Copy, Default)]
pub struct Survivor;

impl EnemyPolicy for Survivor {
    fn name(&self) -> &'static str {
        "survivor"
    }

    fn choose_action(
        &mut self,
        enemy: &Enemy,
        _player: &Player,
        ctx: &CombatContext<'_>,
    ) -> Action {
        heal_if_low(enemy, ctx).unwrap_or(Action::Attack)
    }
}

/// Survivor that also opens with status skills the player is not under
#[derive(Debug, Clone, Copy, Default)]
pub struct Tactician;

impl EnemyPolicy for Tactician {
    fn name(&self) -> &'static str {
        "tactician"
    }

    fn choose_action(&mut self, enemy: &Enemy, player: &Player, ctx: &CombatContext<'_>) -> Action {
        if let Some(action) = heal_if_low(enemy, ctx) {
            return action;
        }
        affordable_skills(enemy, ctx.skills)
            .find(|def| def.inflicts().is_some_and(|kind| !player.effects().has(kind)))
            .map(|def| Action::UseSkill(def.id.clone()))
            .unwrap_or(Action::Attack)
    }
}

/// Phased fighter that rotates through its special skills on a cooldown
#[derive(Debug, Clone, Default)]
pub struct Boss {
    phase: BossPhase,
    /// Attack before any phase scaling, captured on the first turn
    base_attack: Option<u32>,
    cooldown: u32,
    next_special: usize,
}

impl Boss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    /// Turns until the next special may be used
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }
}

impl EnemyPolicy for Boss {
    fn name(&self) -> &'static str {
        "boss"
    }

    fn before_turn(&mut self, enemy: &mut Enemy, config: &CombatConfig) -> Option<PhaseShift> {
        let base = *self.base_attack.get_or_insert(enemy.attack);
        self.cooldown = self.cooldown.saturating_sub(1);

        let reached = BossPhase::for_ratio(enemy.health.ratio(), config);
        if reached <= self.phase {
            return None;
        }
        self.phase = reached;
        enemy.attack = (base as f64 * reached.attack_scale(config)).round() as u32;

        let healed = if reached == BossPhase::Berserk {
            self.cooldown = 0;
            let amount = (enemy.health.max() as f64 * config.boss_enrage_heal) as u32;
            enemy.heal(amount)
        } else {
            self.cooldown = self.cooldown.saturating_sub(1);
            0
        };

        Some(PhaseShift {
            phase: reached,
            attack: enemy.attack,
            healed,
        })
    }

    fn choose_action(
        &mut self,
        enemy: &Enemy,
        _player: &Player,
        ctx: &CombatContext<'_>,
    ) -> Action {
        if self.cooldown > 0 {
            return Action::Attack;
        }
        let specials: Vec<&SkillDef> = affordable_skills(enemy, ctx.skills)
            .filter(|def| def.is_special())
            .collect();
        if specials.is_empty() {
            return Action::Attack;
        }
        let def = specials[self.next_special % specials.len()];
        self.next_special += 1;
        self.cooldown = def.cooldown;
        Action::UseSkill(def.id.clone())
    }
}

fn heal_if_low(enemy: &Enemy, ctx: &CombatContext<'_>) -> Option<Action> {
    if enemy.health.ratio() >= ctx.config.enemy_heal_threshold {
        return None;
    }
    affordable_skills(enemy, ctx.skills)
        .find(|def| def.heals())
        .map(|def| Action::UseSkill(def.id.clone()))
}

/// Known skills the enemy has the mana for, in the enemy's own order
fn affordable_skills<'a>(
    enemy: &'a Enemy,
    skills: &'a dyn SkillCatalog,
) -> impl Iterator<Item = &'a SkillDef> + 'a {
    let mana = enemy.mana.current();
    enemy
        .skills
        .iter()
        .filter_map(move |id| skills.skill(id))
        .filter(move |def| def.cost <= mana)
}
