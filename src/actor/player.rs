//! The player character as seen by combat
//!
//! The game owns the Player; a battle only borrows it.

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, Inventory, Pet, Pool};
use crate::combat::status::StatusEffects;
use crate::core::types::{ItemId, SkillId};
use crate::core::{CombatConfig, CombatError, Result};

pub const STARTING_HEALTH: u32 = 100;
pub const STARTING_MANA: u32 = 50;
pub const STARTING_ATTACK: u32 = 20;
pub const STARTING_GOLD: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub level: u32,
    pub experience: u32,
    pub gold: u32,
    pub health: Pool,
    pub mana: Pool,
    pub attack: u32,
    pub defense: u32,
    pub inventory: Inventory,
    pub skills: Vec<SkillId>,
    pub effects: StatusEffects,
    pub pet: Option<Pet>,
}

impl Player {
    /// Fresh level-1 adventurer with the starter kit
    pub fn new(name: impl Into<String>) -> Self {
        let mut inventory = Inventory::new();
        inventory.add(ItemId::from("wooden_sword"), 1);
        inventory.add(ItemId::from("bread"), 1);

        Self {
            name: name.into(),
            level: 1,
            experience: 0,
            gold: STARTING_GOLD,
            health: Pool::new(STARTING_HEALTH),
            mana: Pool::new(STARTING_MANA),
            attack: STARTING_ATTACK,
            defense: 0,
            inventory,
            skills: vec![SkillId::from("fireball"), SkillId::from("heal")],
            effects: StatusEffects::new(),
            pet: None,
        }
    }

    /// Bare player with explicit stats, no items, skills or pet
    pub fn with_stats(name: impl Into<String>, health: u32, attack: u32, defense: u32) -> Self {
        Self {
            name: name.into(),
            level: 1,
            experience: 0,
            gold: 0,
            health: Pool::new(health),
            mana: Pool::new(0),
            attack,
            defense,
            inventory: Inventory::new(),
            skills: Vec::new(),
            effects: StatusEffects::new(),
            pet: None,
        }
    }

    pub fn learn_skill(&mut self, skill: SkillId) -> bool {
        if self.skills.contains(&skill) {
            return false;
        }
        self.skills.push(skill);
        true
    }

    /// Add experience and run level-ups, returning whether any happened
    ///
    /// Each level consumes `experience_per_level` points, restores
    /// `level_up_heal` health and refills mana.
    pub fn gain_experience(&mut self, amount: u32, config: &CombatConfig) -> bool {
        self.experience += amount;
        let mut leveled = false;
        while self.experience >= config.experience_per_level {
            self.experience -= config.experience_per_level;
            self.level += 1;
            self.health.restore(config.level_up_heal);
            self.mana.refill();
            leveled = true;
            tracing::info!(player = %self.name, level = self.level, "player leveled up");
        }
        leveled
    }

    /// Reject states a battle cannot start from
    pub fn check_integrity(&self) -> Result<()> {
        if self.health.max() == 0 {
            return Err(CombatError::CombatIntegrity(format!(
                "{} has no maximum health",
                self.name
            )));
        }
        if self.health.is_empty() {
            return Err(CombatError::CombatIntegrity(format!(
                "{} cannot enter battle already defeated",
                self.name
            )));
        }
        if self.level == 0 {
            return Err(CombatError::CombatIntegrity(format!(
                "{} has level 0",
                self.name
            )));
        }
        Ok(())
    }
}

impl Actor for Player {
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

    fn attack(&self, config: &CombatConfig) -> u32 {
        let pet_bonus = self
            .pet
            .as_ref()
            .filter(|pet| pet.loyalty > config.pet_loyalty_threshold)
            .map_or(0, |pet| pet.bonus().attack);
        self.attack + pet_bonus
    }

    fn defense(&self) -> u32 {
        let pet_bonus = self.pet.as_ref().map_or(0, |pet| pet.bonus().defense);
        self.defense + pet_bonus + self.effects.defense_bonus()
    }

    fn crit_chance(&self, config: &CombatConfig) -> f64 {
        let pet_bonus = self.pet.as_ref().map_or(0.0, |pet| pet.bonus().crit_chance);
        config.crit_chance + pet_bonus
    }

    fn dodge_chance(&self, config: &CombatConfig) -> f64 {
        let pet_bonus = self.pet.as_ref().map_or(0.0, |pet| pet.bonus().dodge_chance);
        config.dodge_chance + pet_bonus
    }

    fn inventory(&self) -> Option<&Inventory> {
        Some(&self.inventory)
    }

    fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        Some(&mut self.inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::PetSpecies;
    use crate::combat::status::{StatusEffect, StatusKind};

    #[test]
    fn test_new_player_starter_kit() {
        let player = Player::new("Hero");
        assert_eq!(player.health.current(), STARTING_HEALTH);
        assert_eq!(player.mana.current(), STARTING_MANA);
        assert!(player.inventory.contains(&ItemId::from("bread")));
        assert!(player.skills.contains(&SkillId::from("fireball")));
        assert!(player.check_integrity().is_ok());
    }

    #[test]
    fn test_gain_experience_level_up() {
        let config = CombatConfig::default();
        let mut player = Player::new("Hero");
        player.health.drain(50);
        player.mana.drain(30);

        assert!(!player.gain_experience(60, &config));
        assert!(player.gain_experience(60, &config));
        assert_eq!(player.level, 2);
        assert_eq!(player.experience, 20);
        assert_eq!(player.health.current(), 70);
        assert!(player.mana.is_full());
    }

    #[test]
    fn test_multiple_level_ups_in_one_award() {
        let config = CombatConfig::default();
        let mut player = Player::new("Hero");
        assert!(player.gain_experience(250, &config));
        assert_eq!(player.level, 3);
        assert_eq!(player.experience, 50);
    }

    #[test]
    fn test_pet_attack_bonus_needs_loyalty() {
        let config = CombatConfig::default();
        let mut player = Player::new("Hero");
        player.pet = Some(Pet::new("Ash", PetSpecies::WolfPup));
        // Starting loyalty sits exactly on the threshold
        assert_eq!(player.attack(&config), STARTING_ATTACK);

        if let Some(pet) = player.pet.as_mut() {
            pet.loyalty = 60;
        }
        assert_eq!(player.attack(&config), STARTING_ATTACK + 5);
    }

    #[test]
    fn test_defense_stacks_pet_and_shield() {
        let mut player = Player::with_stats("Tank", 50, 5, 2);
        player.pet = Some(Pet::new("Bruno", PetSpecies::BearCub));
        player
            .effects
            .insert(StatusEffect::new(StatusKind::Shield, 2, 10));
        assert_eq!(player.defense(), 15);
    }

    #[test]
    fn test_dodge_chance_adds_hawk() {
        let config = CombatConfig::default();
        let mut player = Player::new("Hero");
        assert!((player.dodge_chance(&config) - 0.1).abs() < 1e-9);
        player.pet = Some(Pet::new("Kestrel", PetSpecies::Hawk));
        assert!((player.dodge_chance(&config) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_defeated_player_fails_integrity() {
        let mut player = Player::new("Hero");
        player.health.drain(STARTING_HEALTH);
        assert!(matches!(
            player.check_integrity(),
            Err(CombatError::CombatIntegrity(_))
        ));
    }
}
