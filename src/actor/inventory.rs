//! Player inventory: ordered item stacks

use serde::{Deserialize, Serialize};

use crate::core::types::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u32,
}

/// Item stacks in pickup order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    stacks: Vec<ItemStack>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: ItemId, count: u32) {
        if count == 0 {
            return;
        }
        match self.stacks.iter_mut().find(|s| s.item == item) {
            Some(stack) => stack.count += count,
            None => self.stacks.push(ItemStack { item, count }),
        }
    }

    /// Remove one unit; empty stacks disappear
    pub fn remove_one(&mut self, item: &ItemId) -> bool {
        let Some(idx) = self.stacks.iter().position(|s| &s.item == item) else {
            return false;
        };
        self.stacks[idx].count -= 1;
        if self.stacks[idx].count == 0 {
            self.stacks.remove(idx);
        }
        true
    }

    pub fn count(&self, item: &ItemId) -> u32 {
        self.stacks
            .iter()
            .find(|s| &s.item == item)
            .map_or(0, |s| s.count)
    }

    pub fn contains(&self, item: &ItemId) -> bool {
        self.count(item) > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.stacks.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}
