//! Skirmish - turn-based encounter engine for a single-player text adventure
//!
//! A battle borrows the player, owns a freshly spawned enemy, and alternates
//! turns until one side falls or the player escapes. Settlement then turns
//! the result into experience, gold, loot and quest progress.

pub mod actor;
pub mod battle;
pub mod combat;
pub mod content;
pub mod core;
