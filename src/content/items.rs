//! Item definitions and the item table

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::status::StatusKind;
use crate::core::types::ItemId;
use crate::core::LoadError;

/// What using an item does to its user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemEffect {
    Heal { amount: u32 },
    RestoreMana { amount: u32 },
    /// Remove one harmful status, or every harmful status when `kind` is absent
    Cure {
        #[serde(default)]
        kind: Option<StatusKind>,
    },
    /// Apply a status to the user
    Buff {
        kind: StatusKind,
        duration: u32,
        magnitude: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    #[serde(default = "default_consumable")]
    pub consumable: bool,
    #[serde(default)]
    pub effect: Option<ItemEffect>,
}

fn default_consumable() -> bool {
    true
}

/// Item lookups for the resolver
pub trait ItemCatalog {
    fn item(&self, id: &ItemId) -> Option<&ItemDef>;
}

#[derive(Debug, Deserialize)]
struct ItemFile {
    #[serde(default)]
    items: Vec<ItemDef>,
}

/// Item definitions keyed by id
#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    items: AHashMap<ItemId, ItemDef>,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `[[items]]` entries
    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        let file: ItemFile = toml::from_str(content)?;
        let mut table = Self::new();
        for def in file.items {
            if def.consumable && def.effect.is_none() {
                return Err(LoadError::Invalid(format!(
                    "consumable item {} has no effect",
                    def.id
                )));
            }
            if let Some(ItemEffect::Buff { duration: 0, .. }) = def.effect {
                return Err(LoadError::Invalid(format!(
                    "buff item {} has zero duration",
                    def.id
                )));
            }
            if table.items.contains_key(&def.id) {
                return Err(LoadError::Invalid(format!("duplicate item {}", def.id)));
            }
            table.insert(def);
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Built-in items, matching `data/items.toml`
    pub fn standard() -> Self {
        let mut table = Self::new();
        let consumables = [
            ("bread", "Bread", ItemEffect::Heal { amount: 30 }),
            ("health_potion", "Health Potion", ItemEffect::Heal { amount: 50 }),
            (
                "mystery_potion",
                "Mystery Potion",
                ItemEffect::RestoreMana { amount: 25 },
            ),
            (
                "antidote",
                "Antidote",
                ItemEffect::Cure {
                    kind: Some(StatusKind::Poison),
                },
            ),
            ("panacea", "Panacea", ItemEffect::Cure { kind: None }),
            (
                "iron_tonic",
                "Iron Tonic",
                ItemEffect::Buff {
                    kind: StatusKind::Shield,
                    duration: 3,
                    magnitude: 8,
                },
            ),
            (
                "troll_draught",
                "Troll Draught",
                ItemEffect::Buff {
                    kind: StatusKind::Regenerate,
                    duration: 4,
                    magnitude: 6,
                },
            ),
        ];
        for (id, name, effect) in consumables {
            table.insert(ItemDef {
                id: ItemId::from(id),
                name: name.to_string(),
                consumable: true,
                effect: Some(effect),
            });
        }
        table.insert(ItemDef {
            id: ItemId::from("wooden_sword"),
            name: "Wooden Sword".to_string(),
            consumable: false,
            effect: None,
        });
        table
    }

    pub fn insert(&mut self, def: ItemDef) {
        self.items.insert(def.id.clone(), def);
    }

    /// All ids, sorted
    pub fn ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.items.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemCatalog for ItemTable {
    fn item(&self, id: &ItemId) -> Option<&ItemDef> {
        self.items.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_has_starter_items() {
        let table = ItemTable::standard();
        let bread = table.item(&ItemId::from("bread")).unwrap();
        assert_eq!(bread.effect, Some(ItemEffect::Heal { amount: 30 }));
        let sword = table.item(&ItemId::from("wooden_sword")).unwrap();
        assert!(!sword.consumable);
    }

    #[test]
    fn test_parse_tagged_effects() {
        let toml = r#"
            [[items]]
            id = "salve"
            name = "Salve"
            effect = { type = "cure" }

            [[items]]
            id = "ward"
            name = "Ward"
            effect = { type = "buff", kind = "shield", duration = 2, magnitude = 4 }
        "#;
        let table = ItemTable::from_toml_str(toml).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.item(&ItemId::from("salve")).unwrap().effect,
            Some(ItemEffect::Cure { kind: None })
        );
    }

    #[test]
    fn test_consumable_without_effect_rejected() {
        let toml = r#"
            [[items]]
            id = "rock"
            name = "Rock"
        "#;
        assert!(matches!(
            ItemTable::from_toml_str(toml),
            Err(LoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_duration_buff_rejected() {
        let toml = r#"
            [[items]]
            id = "dud_ward"
            name = "Dud Ward"
            effect = { type = "buff", kind = "shield", duration = 0, magnitude = 4 }
        "#;
        assert!(matches!(
            ItemTable::from_toml_str(toml),
            Err(LoadError::Invalid(_))
        ));
    }
}
