//! Combat rules: status effects and action resolution

pub mod resolver;
pub mod status;

pub use resolver::{resolve, Action, ActionOutcome, CombatContext, OutcomeKind};
pub use status::{ApplyOutcome, EffectTick, StatusEffect, StatusEffects, StatusKind, TurnModifier};
