//! Game data the combat core consumes through narrow interfaces
//!
//! Each table loads from TOML under `data/` and has a built-in `standard()`
//! copy of the shipped data.

pub mod bestiary;
pub mod items;
pub mod quest;
pub mod skills;

use std::path::Path;

pub use bestiary::{EnemyCatalog, EnemyTable, EnemyTemplate};
pub use items::{ItemCatalog, ItemDef, ItemEffect, ItemTable};
pub use quest::{NoQuests, QuestBoard, QuestDelta, QuestLog, QuestObjective};
pub use skills::{SkillCatalog, SkillDef, SkillEffect, SkillTable};

use crate::core::LoadError;

/// All three tables, loaded together
#[derive(Debug, Clone, Default)]
pub struct GameData {
    pub items: ItemTable,
    pub skills: SkillTable,
    pub enemies: EnemyTable,
}

impl GameData {
    pub fn standard() -> Self {
        Self {
            items: ItemTable::standard(),
            skills: SkillTable::standard(),
            enemies: EnemyTable::standard(),
        }
    }

    /// Load `items.toml`, `skills.toml` and `enemies.toml` from a directory
    pub fn load_dir(dir: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            items: ItemTable::load(&dir.join("items.toml"))?,
            skills: SkillTable::load(&dir.join("skills.toml"))?,
            enemies: EnemyTable::load(&dir.join("enemies.toml"))?,
        })
    }
}
