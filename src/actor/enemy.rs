//! Enemies: built from a template at battle start, dropped at battle end

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, Pool};
use crate::battle::policy::PolicyKind;
use crate::combat::status::StatusEffects;
use crate::core::types::{EnemyKind, ItemId, SkillId};
use crate::core::{CombatError, Result};

/// One roll on an enemy's loot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: ItemId,
    /// Drop probability in [0, 1]
    pub chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub name: String,
    pub level: u32,
    pub health: Pool,
    pub mana: Pool,
    pub attack: u32,
    pub defense: u32,
    /// Experience awarded at equal level
    pub experience: u32,
    pub loot: Vec<LootEntry>,
    pub skills: Vec<SkillId>,
    pub policy: PolicyKind,
    pub effects: StatusEffects,
}

impl Enemy {
    /// Level-1 enemy with no defense, mana, skills or loot
    pub fn new(kind: impl Into<String>, name: impl Into<String>, health: u32, attack: u32) -> Self {
        Self {
            kind: EnemyKind::new(kind),
            name: name.into(),
            level: 1,
            health: Pool::new(health),
            mana: Pool::new(0),
            attack,
            defense: 0,
            experience: 0,
            loot: Vec::new(),
            skills: Vec::new(),
            policy: PolicyKind::default(),
            effects: StatusEffects::new(),
        }
    }

    pub fn with_defense(mut self, defense: u32) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    pub fn with_mana(mut self, mana: u32) -> Self {
        self.mana = Pool::new(mana);
        self
    }

    pub fn with_skills(mut self, skills: Vec<SkillId>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_loot(mut self, loot: Vec<LootEntry>) -> Self {
        self.loot = loot;
        self
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Reject corrupted enemy data before a battle starts
    pub fn check_integrity(&self) -> Result<()> {
        if self.health.max() == 0 || self.health.is_empty() {
            return Err(CombatError::CombatIntegrity(format!(
                "{} ({}) has no health",
                self.name, self.kind
            )));
        }
        if self.level == 0 {
            return Err(CombatError::CombatIntegrity(format!(
                "{} ({}) has level 0",
                self.name, self.kind
            )));
        }
        if let Some(entry) = self.loot.iter().find(|e| !(0.0..=1.0).contains(&e.chance)) {
            return Err(CombatError::CombatIntegrity(format!(
                "{} ({}) drops {} with chance {}",
                self.name, self.kind, entry.item, entry.chance
            )));
        }
        Ok(())
    }
}

impl Actor for Enemy {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn health(&self) -> &Pool {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Pool {
        &mut self.health
    }

    fn mana(&self) -> &Pool {
        &self.mana
    }

    fn mana_mut(&mut self) -> &mut Pool {
        &mut self.mana
    }

    fn base_attack(&self) -> u32 {
        self.attack
    }

    fn base_defense(&self) -> u32 {
        self.defense
    }

    fn effects(&self) -> &StatusEffects {
        &self.effects
    }

    fn effects_mut(&mut self) -> &mut StatusEffects {
        &mut self.effects
    }

    fn skills(&self) -> &[SkillId] {
        &self.skills
    }
}
