//! Enemy templates and spawning

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::actor::{Enemy, LootEntry};
use crate::battle::policy::PolicyKind;
use crate::core::types::{EnemyKind, SkillId};
use crate::core::{CombatError, LoadError, Result};

/// Stat block an Enemy is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub kind: EnemyKind,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    pub health: u32,
    pub attack: u32,
    #[serde(default)]
    pub defense: u32,
    pub experience: u32,
    #[serde(default)]
    pub mana: u32,
    #[serde(default)]
    pub skills: Vec<SkillId>,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
    #[serde(default)]
    pub policy: PolicyKind,
}

fn default_level() -> u32 {
    1
}

impl EnemyTemplate {
    pub fn build(&self) -> Enemy {
        Enemy::new(self.kind.as_str(), self.name.clone(), self.health, self.attack)
            .with_level(self.level)
            .with_defense(self.defense)
            .with_experience(self.experience)
            .with_mana(self.mana)
            .with_skills(self.skills.clone())
            .with_loot(self.loot.clone())
            .with_policy(self.policy)
    }
}

/// Enemy data source consulted at battle start
pub trait EnemyCatalog {
    fn template(&self, kind: &EnemyKind) -> Option<&EnemyTemplate>;

    /// Build a fresh enemy, failing fast on unknown kinds or corrupt stats
    fn spawn(&self, kind: &EnemyKind) -> Result<Enemy> {
        let template = self
            .template(kind)
            .ok_or_else(|| CombatError::CombatIntegrity(format!("unknown enemy kind {}", kind)))?;
        let enemy = template.build();
        enemy.check_integrity()?;
        tracing::debug!(kind = %kind, name = %enemy.name, level = enemy.level, "enemy spawned");
        Ok(enemy)
    }
}

#[derive(Debug, Deserialize)]
struct EnemyFile {
    #[serde(default)]
    enemies: Vec<EnemyTemplate>,
}

#[derive(Debug, Clone, Default)]
pub struct EnemyTable {
    templates: AHashMap<EnemyKind, EnemyTemplate>,
}

impl EnemyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, LoadError> {
        let file: EnemyFile = toml::from_str(content)?;
        let mut table = Self::new();
        for template in file.enemies {
            if table.templates.contains_key(&template.kind) {
                return Err(LoadError::Invalid(format!(
                    "duplicate enemy {}",
                    template.kind
                )));
            }
            table.insert(template);
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> std::result::Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Built-in bestiary, matching `data/enemies.toml`
    pub fn standard() -> Self {
        // kind, name, level, health, attack, defense, experience
        let stats: [(&str, &str, u32, u32, u32, u32, u32); 15] = [
            ("wolf", "Wolf", 1, 40, 15, 1, 20),
            ("giant_spider", "Giant Spider", 1, 30, 12, 0, 20),
            ("black_bear", "Black Bear", 2, 80, 22, 3, 35),
            ("bat", "Bat", 1, 25, 10, 0, 20),
            ("goblin", "Goblin", 2, 50, 18, 2, 20),
            ("cave_dragon", "Cave Dragon", 5, 120, 28, 6, 67),
            ("skeleton_warrior", "Skeleton Warrior", 3, 60, 20, 4, 24),
            ("young_dragon", "Young Dragon", 4, 100, 25, 5, 50),
            ("ghost", "Ghost", 3, 45, 16, 0, 20),
            ("fire_elemental", "Fire Elemental", 5, 70, 24, 2, 33),
            ("lava_golem", "Lava Golem", 5, 90, 26, 8, 46),
            ("fire_dragon", "Fire Dragon", 7, 150, 35, 8, 105),
            ("ice_elemental", "Ice Elemental", 4, 65, 20, 2, 26),
            ("ice_penguin", "Ice Penguin", 3, 35, 14, 1, 20),
            ("ice_bear", "Ice Bear", 5, 110, 30, 5, 66),
        ];

        let mut table = Self::new();
        for (kind, name, level, health, attack, defense, experience) in stats {
            table.insert(EnemyTemplate {
                kind: EnemyKind::from(kind),
                name: name.to_string(),
                level,
                health,
                attack,
                defense,
                experience,
                mana: 0,
                skills: Vec::new(),
                loot: Vec::new(),
                policy: PolicyKind::Berserker,
            });
        }

        let loot = |item: &str, chance: f64| LootEntry {
            item: item.into(),
            chance,
        };
        table.customize("wolf", |t| t.loot = vec![loot("bread", 0.3)]);
        table.customize("giant_spider", |t| {
            t.mana = 18;
            t.skills = vec![SkillId::from("venom_bite")];
            t.policy = PolicyKind::Tactician;
            t.loot = vec![loot("antidote", 0.4)];
        });
        table.customize("goblin", |t| {
            t.mana = 15;
            t.skills = vec![SkillId::from("mend")];
            t.policy = PolicyKind::Survivor;
            t.loot = vec![loot("mystery_potion", 0.25), loot("bread", 0.5)];
        });
        table.customize("skeleton_warrior", |t| {
            t.loot = vec![loot("iron_tonic", 0.3)];
        });
        table.customize("young_dragon", |t| {
            t.mana = 20;
            t.skills = vec![SkillId::from("fire_breath"), SkillId::from("mend")];
            t.policy = PolicyKind::Tactician;
            t.loot = vec![loot("health_potion", 0.5)];
        });
        table.customize("cave_dragon", |t| {
            t.mana = 20;
            t.skills = vec![SkillId::from("fire_breath")];
            t.policy = PolicyKind::Tactician;
            t.loot = vec![loot("health_potion", 0.6)];
        });
        table.customize("fire_elemental", |t| {
            t.mana = 30;
            t.skills = vec![SkillId::from("fire_breath")];
            t.policy = PolicyKind::Tactician;
        });
        table.customize("lava_golem", |t| {
            t.mana = 15;
            t.skills = vec![SkillId::from("mend")];
            t.policy = PolicyKind::Survivor;
            t.loot = vec![loot("troll_draught", 0.3)];
        });
        table.customize("fire_dragon", |t| {
            t.mana = 40;
            t.skills = vec![
                SkillId::from("cleave"),
                SkillId::from("area_attack"),
                SkillId::from("shield_break"),
            ];
            t.policy = PolicyKind::Boss;
            t.loot = vec![loot("panacea", 0.5), loot("health_potion", 0.8)];
        });
        table.customize("ice_elemental", |t| {
            t.mana = 30;
            t.skills = vec![SkillId::from("frost_bolt")];
            t.policy = PolicyKind::Tactician;
        });
        table.customize("ice_bear", |t| {
            t.mana = 10;
            t.skills = vec![SkillId::from("mend")];
            t.policy = PolicyKind::Survivor;
            t.loot = vec![loot("health_potion", 0.4)];
        });
        table
    }

    fn customize(&mut self, kind: &str, edit: impl FnOnce(&mut EnemyTemplate)) {
        if let Some(template) = self.templates.get_mut(&EnemyKind::from(kind)) {
            edit(template);
        }
    }

    pub fn insert(&mut self, template: EnemyTemplate) {
        self.templates.insert(template.kind.clone(), template);
    }

    /// Known kinds, sorted
    pub fn kinds(&self) -> Vec<EnemyKind> {
        let mut kinds: Vec<EnemyKind> = self.templates.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl EnemyCatalog for EnemyTable {
    fn template(&self, kind: &EnemyKind) -> Option<&EnemyTemplate> {
        self.templates.get(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;

    #[test]
    fn test_spawn_builds_fresh_enemy() {
        let table = EnemyTable::standard();
        let wolf = table.spawn(&EnemyKind::from("wolf")).unwrap();
        assert_eq!(wolf.name, "Wolf");
        assert_eq!(wolf.health.current(), 40);
        assert_eq!(wolf.experience, 20);
        assert!(wolf.effects().is_empty());
    }

    #[test]
    fn test_spawn_unknown_kind_is_integrity_error() {
        let table = EnemyTable::standard();
        assert!(matches!(
            table.spawn(&EnemyKind::from("unicorn")),
            Err(CombatError::CombatIntegrity(_))
        ));
    }

    #[test]
    fn test_spawn_zero_health_template_fails() {
        let mut table = EnemyTable::new();
        table.insert(EnemyTemplate {
            kind: EnemyKind::from("husk"),
            name: "Husk".to_string(),
            level: 1,
            health: 0,
            attack: 1,
            defense: 0,
            experience: 1,
            mana: 0,
            skills: Vec::new(),
            loot: Vec::new(),
            policy: PolicyKind::Berserker,
        });
        assert!(table.spawn(&EnemyKind::from("husk")).is_err());
    }

    #[test]
    fn test_standard_bestiary_covers_every_region() {
        let table = EnemyTable::standard();
        assert_eq!(table.len(), 15);
        let goblin = table.template(&EnemyKind::from("goblin")).unwrap();
        assert_eq!(goblin.policy, PolicyKind::Survivor);
        let dragon = table.template(&EnemyKind::from("fire_dragon")).unwrap();
        assert_eq!(dragon.policy, PolicyKind::Boss);
    }
}
