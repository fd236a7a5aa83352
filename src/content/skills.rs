//! Skill definitions and the skill table

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::status::StatusKind;
use crate::core::types::SkillId;
use crate::core::LoadError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkillEffect {
    /// Hits the target for `amount ± spread`, ignoring defense
    Damage {
        amount: u32,
        #[serde(default)]
        spread: u32,
        #[serde(default)]
        inflicts: Option<StatusKind>,
    },
    /// Scales the caster's attack by `multiplier`, ignoring `armor_pierce`
    /// of the target's defense. Dodgeable unless `unavoidable`.
    Strike {
        multiplier: f64,
        #[serde(default)]
        armor_pierce: f64,
        #[serde(default)]
        unavoidable: bool,
    },
    /// Heals the caster for `amount ± spread`
    Heal {
        amount: u32,
        #[serde(default)]
        spread: u32,
    },
    /// Applies a status to the caster
    Buff {
        kind: StatusKind,
        duration: u32,
        magnitude: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: SkillId,
    pub name: String,
    /// Mana cost
    pub cost: u32,
    /// Player level at which the skill is learned; 0 marks enemy-only skills
    #[serde(default)]
    pub unlock_level: u32,
    /// Turns a boss waits before its next special after using this one
    #[serde(default)]
    pub cooldown: u32,
    pub effect: SkillEffect,
}

impl SkillDef {
    pub fn heals(&self) -> bool {
        matches!(self.effect, SkillEffect::Heal { .. })
    }

    /// Attack-scaled specials that bosses put on cooldown
    pub fn is_special(&self) -> bool {
        matches!(self.effect, SkillEffect::Strike { .. })
    }

    pub fn inflicts(&self) -> Option<StatusKind> {
        match self.effect {
            SkillEffect::Damage { inflicts, .. } => inflicts,
            _ => None,
        }
    }
}

/// Skill lookups; skills are never mutated by combat
pub trait SkillCatalog {
    fn skill(&self, id: &SkillId) -> Option<&SkillDef>;

    /// Skills a player learns on reaching `level`, sorted by id
    fn unlocked_at(&self, level: u32) -> Vec<SkillId>;
}

#[derive(Debug, Deserialize)]
struct SkillFile {
    #[serde(default)]
    skills: Vec<SkillDef>,
}

#[derive(Debug, Clone, Default)]
pub struct SkillTable {
    skills: AHashMap<SkillId, SkillDef>,
}

impl SkillTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        let file: SkillFile = toml::from_str(content)?;
        let mut table = Self::new();
        for def in file.skills {
            if table.skills.contains_key(&def.id) {
                return Err(LoadError::Invalid(format!("duplicate skill {}", def.id)));
            }
            if let SkillEffect::Buff { duration: 0, .. } = def.effect {
                return Err(LoadError::Invalid(format!(
                    "buff skill {} has zero duration",
                    def.id
                )));
            }
            if let SkillEffect::Strike {
                multiplier,
                armor_pierce,
                ..
            } = def.effect
            {
                if multiplier <= 0.0 || !(0.0..=1.0).contains(&armor_pierce) {
                    return Err(LoadError::Invalid(format!(
                        "strike skill {} needs a positive multiplier and armor_pierce in [0, 1]",
                        def.id
                    )));
                }
            }
            table.insert(def);
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Built-in skills, matching `data/skills.toml`
    pub fn standard() -> Self {
        let damage = |amount, inflicts| SkillEffect::Damage {
            amount,
            spread: 5,
            inflicts: Some(inflicts),
        };
        let defs = [
            ("fireball", "Fireball", 10, 1, damage(30, StatusKind::Burn)),
            ("frost_bolt", "Frost Bolt", 15, 3, damage(25, StatusKind::Freeze)),
            ("lightning", "Lightning", 20, 5, damage(40, StatusKind::Stun)),
            (
                "heal",
                "Heal",
                8,
                1,
                SkillEffect::Heal {
                    amount: 25,
                    spread: 5,
                },
            ),
            (
                "shield",
                "Shield",
                12,
                4,
                SkillEffect::Buff {
                    kind: StatusKind::Shield,
                    duration: 5,
                    magnitude: 10,
                },
            ),
            // Enemy-only
            (
                "mend",
                "Mend",
                5,
                0,
                SkillEffect::Heal {
                    amount: 15,
                    spread: 0,
                },
            ),
            (
                "venom_bite",
                "Venom Bite",
                6,
                0,
                SkillEffect::Damage {
                    amount: 8,
                    spread: 2,
                    inflicts: Some(StatusKind::Poison),
                },
            ),
            ("fire_breath", "Fire Breath", 10, 0, damage(20, StatusKind::Burn)),
        ];

        let strike = |multiplier, armor_pierce, unavoidable| SkillEffect::Strike {
            multiplier,
            armor_pierce,
            unavoidable,
        };
        // Boss specials: free to cast, gated by cooldown
        let specials = [
            ("cleave", "Cleave", 3, strike(1.5, 0.5, false)),
            ("area_attack", "Area Attack", 4, strike(1.8, 0.0, true)),
            ("shield_break", "Shield Break", 4, strike(2.0, 1.0, false)),
        ];

        let mut table = Self::new();
        for (id, name, cost, unlock_level, effect) in defs {
            table.insert(SkillDef {
                id: SkillId::from(id),
                name: name.to_string(),
                cost,
                unlock_level,
                cooldown: 0,
                effect,
            });
        }
        for (id, name, cooldown, effect) in specials {
            table.insert(SkillDef {
                id: SkillId::from(id),
                name: name.to_string(),
                cost: 0,
                unlock_level: 0,
                cooldown,
                effect,
            });
        }
        table
    }

    pub fn insert(&mut self, def: SkillDef) {
        self.skills.insert(def.id.clone(), def);
    }

    /// All ids, sorted
    pub fn ids(&self) -> Vec<SkillId> {
        let mut ids: Vec<SkillId> = self.skills.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl SkillCatalog for SkillTable {
    fn skill(&self, id: &SkillId) -> Option<&SkillDef> {
        self.skills.get(id)
    }

    fn unlocked_at(&self, level: u32) -> Vec<SkillId> {
        if level == 0 {
            return Vec::new();
        }
        let mut ids: Vec<SkillId> = self
            .skills
            .values()
            .filter(|def| def.unlock_level == level)
            .map(|def| def.id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_unlock_levels() {
        let table = SkillTable::standard();
        assert_eq!(
            table.unlocked_at(1),
            vec![SkillId::from("fireball"), SkillId::from("heal")]
        );
        assert_eq!(table.unlocked_at(3), vec![SkillId::from("frost_bolt")]);
        assert!(table.unlocked_at(2).is_empty());
        // Enemy-only skills are never handed out
        assert!(table.unlocked_at(0).is_empty());
    }

    #[test]
    fn test_inflicts_and_heals() {
        let table = SkillTable::standard();
        let lightning = table.skill(&SkillId::from("lightning")).unwrap();
        assert_eq!(lightning.inflicts(), Some(StatusKind::Stun));
        assert!(table.skill(&SkillId::from("mend")).unwrap().heals());
    }

    #[test]
    fn test_specials_carry_cooldowns() {
        let table = SkillTable::standard();
        let cleave = table.skill(&SkillId::from("cleave")).unwrap();
        assert!(cleave.is_special());
        assert_eq!(cleave.cooldown, 3);
        assert!(!table.skill(&SkillId::from("fireball")).unwrap().is_special());
    }

    #[test]
    fn test_strike_pierce_out_of_range_rejected() {
        let toml = r#"
            [[skills]]
            id = "skewer"
            name = "Skewer"
            cost = 0
            effect = { type = "strike", multiplier = 1.2, armor_pierce = 1.5 }
        "#;
        assert!(matches!(
            SkillTable::from_toml_str(toml),
            Err(LoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_duration_buff_rejected() {
        let toml = r#"
            [[skills]]
            id = "blink"
            name = "Blink"
            cost = 1
            effect = { type = "buff", kind = "shield", duration = 0, magnitude = 1 }
        "#;
        assert!(SkillTable::from_toml_str(toml).is_err());
    }
}
