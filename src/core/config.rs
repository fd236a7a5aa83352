//! Combat configuration with documented constants
//!
//! All tunable numbers are collected here with a note on what they drive.
//! Defaults match the shipped `data/combat.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::LoadError;

/// Configuration for combat resolution and settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    // === ATTACK ===
    /// Bounded variance applied to attack damage (0.15 = ±15%)
    ///
    /// Zero disables the variance roll entirely, which makes attacks
    /// fully deterministic when crits are also disabled.
    pub damage_variance: f64,

    /// Base chance for a player attack to crit
    pub crit_chance: f64,

    /// Damage multiplier on a crit
    pub crit_multiplier: f64,

    // === DEFENSE ===
    /// Base chance for the player to dodge an incoming enemy attack
    ///
    /// Pets may add to it. Zero disables the dodge roll.
    pub dodge_chance: f64,

    // === FLEE ===
    /// Flee chance when player and enemy are the same level
    pub flee_chance: f64,

    /// Flee chance gained per level the player has over the enemy
    /// (and lost per level under)
    pub flee_level_step: f64,

    /// Lower clamp for the final flee chance
    pub flee_chance_min: f64,

    /// Upper clamp for the final flee chance
    pub flee_chance_max: f64,

    // === STATUS EFFECTS ===
    /// Chance that a status-inflicting skill actually applies its status
    pub status_proc_chance: f64,

    /// Duration (turns) of statuses inflicted by skills
    pub status_duration: u32,

    // === PETS ===
    /// Pets only lend their attack bonus above this loyalty
    pub pet_loyalty_threshold: u32,

    /// Share of the player's experience award the active pet receives
    pub pet_experience_share: f64,

    // === ENEMY POLICY ===
    /// Health ratio under which defensive policies try to heal
    pub enemy_heal_threshold: f64,

    // === BOSSES ===
    /// Health ratio at or below which a boss enters phase 2
    pub boss_phase_two_ratio: f64,

    /// Health ratio at or below which a boss enters phase 3
    pub boss_phase_three_ratio: f64,

    /// Boss attack multiplier in phase 2, applied to its starting attack
    pub boss_phase_two_attack: f64,

    /// Boss attack multiplier in phase 3, applied to its starting attack
    pub boss_phase_three_attack: f64,

    /// Share of max health a boss recovers on entering phase 3
    pub boss_enrage_heal: f64,

    // === PROGRESSION ===
    /// Experience needed per player level
    pub experience_per_level: u32,

    /// Health restored on each player level-up
    pub level_up_heal: u32,

    /// Experience scale change per level of difference (enemy - player)
    pub experience_level_step: f64,

    /// Lower clamp for the experience scale
    pub experience_scale_min: f64,

    /// Upper clamp for the experience scale
    pub experience_scale_max: f64,

    // === GOLD ===
    /// Gold before the enemy-strength multipliers
    pub gold_base: u32,

    /// Random gold adjustment range, inclusive
    pub gold_jitter_min: i32,
    pub gold_jitter_max: i32,

    /// Minimum gold for any victory
    pub gold_floor: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            // Attack
            damage_variance: 0.15,
            crit_chance: 0.15,
            crit_multiplier: 1.5,

            // Defense
            dodge_chance: 0.1,

            // Flee
            flee_chance: 0.7,
            flee_level_step: 0.05,
            flee_chance_min: 0.05,
            flee_chance_max: 0.95,

            // Statuses
            status_proc_chance: 0.6,
            status_duration: 3,

            // Pets
            pet_loyalty_threshold: 50,
            pet_experience_share: 0.5,

            // Enemy policy
            enemy_heal_threshold: 0.3,

            // Bosses
            boss_phase_two_ratio: 0.66,
            boss_phase_three_ratio: 0.33,
            boss_phase_two_attack: 1.4,
            boss_phase_three_attack: 1.6,
            boss_enrage_heal: 0.1,

            // Progression
            experience_per_level: 100,
            level_up_heal: 20,
            experience_level_step: 0.1,
            experience_scale_min: 0.5,
            experience_scale_max: 2.0,

            // Gold
            gold_base: 15,
            gold_jitter_min: -5,
            gold_jitter_max: 10,
            gold_floor: 10,
        }
    }
}

impl CombatConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        let config: CombatConfig = toml::from_str(content)?;
        config.validate().map_err(LoadError::Invalid)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        let probabilities = [
            ("damage_variance", self.damage_variance),
            ("crit_chance", self.crit_chance),
            ("dodge_chance", self.dodge_chance),
            ("flee_chance", self.flee_chance),
            ("flee_chance_min", self.flee_chance_min),
            ("flee_chance_max", self.flee_chance_max),
            ("status_proc_chance", self.status_proc_chance),
            ("pet_experience_share", self.pet_experience_share),
            ("enemy_heal_threshold", self.enemy_heal_threshold),
            ("boss_phase_two_ratio", self.boss_phase_two_ratio),
            ("boss_phase_three_ratio", self.boss_phase_three_ratio),
            ("boss_enrage_heal", self.boss_enrage_heal),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} ({}) must be within [0, 1]", name, value));
            }
        }

        if self.flee_chance_min > self.flee_chance_max {
            return Err(format!(
                "flee_chance_min ({}) should be <= flee_chance_max ({})",
                self.flee_chance_min, self.flee_chance_max
            ));
        }

        if self.crit_multiplier < 1.0 {
            return Err(format!(
                "crit_multiplier ({}) should be >= 1.0",
                self.crit_multiplier
            ));
        }

        if self.boss_phase_three_ratio >= self.boss_phase_two_ratio {
            return Err(format!(
                "boss_phase_three_ratio ({}) should be < boss_phase_two_ratio ({})",
                self.boss_phase_three_ratio, self.boss_phase_two_ratio
            ));
        }

        if self.boss_phase_two_attack < 1.0 || self.boss_phase_three_attack < 1.0 {
            return Err("boss phase attack multipliers should be >= 1.0".into());
        }

        if self.status_duration == 0 {
            return Err("status_duration must be at least one turn".into());
        }

        if self.experience_per_level == 0 {
            return Err("experience_per_level must be positive".into());
        }

        if self.experience_scale_min > self.experience_scale_max {
            return Err(format!(
                "experience_scale_min ({}) should be <= experience_scale_max ({})",
                self.experience_scale_min, self.experience_scale_max
            ));
        }

        if self.gold_jitter_min > self.gold_jitter_max {
            return Err(format!(
                "gold_jitter_min ({}) should be <= gold_jitter_max ({})",
                self.gold_jitter_min, self.gold_jitter_max
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CombatConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CombatConfig::from_toml_str("flee_chance = 0.5\ncrit_chance = 0.0\n")
            .expect("partial config should parse");
        assert_eq!(config.flee_chance, 0.5);
        assert_eq!(config.crit_chance, 0.0);
        assert_eq!(config.status_duration, 3);
        assert_eq!(config.experience_per_level, 100);
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let err = CombatConfig::from_toml_str("status_proc_chance = 1.5").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }

    #[test]
    fn test_inverted_clamps_rejected() {
        let config = CombatConfig {
            flee_chance_min: 0.9,
            flee_chance_max: 0.2,
            ..CombatConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_boss_thresholds_must_descend() {
        let config = CombatConfig {
            boss_phase_two_ratio: 0.3,
            boss_phase_three_ratio: 0.5,
            ..CombatConfig::default()
        };
        assert!(config.validate().is_err());
        let err = CombatConfig::from_toml_str("dodge_chance = -0.1").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = CombatConfig::from_toml_str("flee_chance = \"high\"").unwrap_err();
        assert!(matches!(err, LoadError::Toml(_)));
    }
}
