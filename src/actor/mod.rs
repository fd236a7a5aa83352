//! Combat participants
//!
//! Player and Enemy both implement [`Actor`], the capability set the
//! resolver and the status engine work against.

pub mod enemy;
pub mod inventory;
pub mod pet;
pub mod player;

pub use enemy::{Enemy, LootEntry};
pub use inventory::{Inventory, ItemStack};
pub use pet::{Pet, PetBonus, PetSpecies};
pub use player::Player;

use serde::{Deserialize, Serialize};

use crate::combat::status::StatusEffects;
use crate::core::types::SkillId;
use crate::core::CombatConfig;

/// A bounded meter (health, mana)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    current: u32,
    max: u32,
}

impl Pool {
    /// Full meter
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Meter at a given level, clamped to max
    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    /// Fill ratio in [0, 1]; an empty-capacity meter reads as 0
    pub fn ratio(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f64 / self.max as f64
    }

    /// Remove up to `amount`, returning what was actually removed
    pub fn drain(&mut self, amount: u32) -> u32 {
        let drained = amount.min(self.current);
        self.current -= drained;
        drained
    }

    /// Add up to `amount` without exceeding max, returning what was added
    pub fn restore(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max - self.current);
        self.current += restored;
        restored
    }

    /// Spend exactly `amount` or nothing
    pub fn spend(&mut self, amount: u32) -> bool {
        if amount > self.current {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }
}

/// Read-only snapshot of an actor's numbers, for reports and policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorStats {
    pub name: String,
    pub level: u32,
    pub health: Pool,
    pub mana: Pool,
    pub attack: u32,
    pub defense: u32,
}

/// Capability set shared by every combat participant
pub trait Actor {
    fn name(&self) -> &str;
    fn level(&self) -> u32;
    fn health(&self) -> &Pool;
    fn health_mut(&mut self) -> &mut Pool;
    fn mana(&self) -> &Pool;
    fn mana_mut(&mut self) -> &mut Pool;
    fn base_attack(&self) -> u32;
    fn base_defense(&self) -> u32;
    fn effects(&self) -> &StatusEffects;
    fn effects_mut(&mut self) -> &mut StatusEffects;
    /// Skills this actor knows
    fn skills(&self) -> &[SkillId];

    /// Attack after companion bonuses
    fn attack(&self, _config: &CombatConfig) -> u32 {
        self.base_attack()
    }

    /// Defense including an active shield
    fn defense(&self) -> u32 {
        self.base_defense() + self.effects().defense_bonus()
    }

    fn crit_chance(&self, _config: &CombatConfig) -> f64 {
        0.0
    }

    /// Chance to avoid an incoming attack entirely
    fn dodge_chance(&self, _config: &CombatConfig) -> f64 {
        0.0
    }

    /// Only actors that carry items return an inventory
    fn inventory(&self) -> Option<&Inventory> {
        None
    }

    fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        None
    }

    /// Take damage, returning what was actually lost
    fn apply_damage(&mut self, amount: u32) -> u32 {
        self.health_mut().drain(amount)
    }

    fn heal(&mut self, amount: u32) -> u32 {
        self.health_mut().restore(amount)
    }

    fn is_defeated(&self) -> bool {
        self.health().is_empty()
    }

    fn stats(&self, config: &CombatConfig) -> ActorStats {
        ActorStats {
            name: self.name().to_string(),
            level: self.level(),
            health: *self.health(),
            mana: *self.mana(),
            attack: self.attack(config),
            defense: self.defense(),
        }
    }
}
