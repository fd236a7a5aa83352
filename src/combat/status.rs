//! Status effect engine
//!
//! An actor holds at most one effect per kind. Reapplying a kind refreshes
//! its duration and magnitude instead of stacking. Effects tick once per
//! actor turn, before the actor acts, in the fixed order of
//! [`StatusKind::TICK_ORDER`].

use serde::{Deserialize, Serialize};

use crate::actor::Actor;

/// Kinds of timed effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Burn,
    Poison,
    Regenerate,
    Freeze,
    Stun,
    Shield,
}

impl StatusKind {
    /// Processing order for `tick`: damage first, then healing, then the
    /// turn-skipping effects. Shield only counts down.
    pub const TICK_ORDER: [StatusKind; 6] = [
        StatusKind::Burn,
        StatusKind::Poison,
        StatusKind::Regenerate,
        StatusKind::Freeze,
        StatusKind::Stun,
        StatusKind::Shield,
    ];

    /// Magnitude used when a skill or item does not specify one
    pub fn default_magnitude(self) -> u32 {
        match self {
            StatusKind::Burn => 5,
            StatusKind::Poison => 3,
            StatusKind::Regenerate => 5,
            StatusKind::Shield => 10,
            StatusKind::Freeze | StatusKind::Stun => 0,
        }
    }

    /// Does this effect take the actor's action away?
    pub fn skips_turn(self) -> bool {
        matches!(self, StatusKind::Freeze | StatusKind::Stun)
    }

    /// Harmful effects are the ones cures remove
    pub fn is_harmful(self) -> bool {
        !matches!(self, StatusKind::Regenerate | StatusKind::Shield)
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Burn => "burn",
            StatusKind::Poison => "poison",
            StatusKind::Regenerate => "regenerate",
            StatusKind::Freeze => "freeze",
            StatusKind::Stun => "stun",
            StatusKind::Shield => "shield",
        }
    }
}

/// A single active effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Turns left, always positive while the effect is held
    pub remaining: u32,
    /// Damage or healing per tick, or defense for Shield
    pub magnitude: u32,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, duration: u32, magnitude: u32) -> Self {
        Self {
            kind,
            remaining: duration,
            magnitude,
        }
    }

    /// Effect with the kind's default magnitude
    pub fn standard(kind: StatusKind, duration: u32) -> Self {
        Self::new(kind, duration, kind.default_magnitude())
    }
}

/// What `apply` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Added,
    Refreshed,
}

/// Active effects on one actor, at most one per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffects {
    active: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh. Zero-duration effects are ignored.
    pub fn insert(&mut self, effect: StatusEffect) -> Option<ApplyOutcome> {
        if effect.remaining == 0 {
            return None;
        }
        if let Some(existing) = self.active.iter_mut().find(|e| e.kind == effect.kind) {
            existing.remaining = effect.remaining;
            existing.magnitude = effect.magnitude;
            return Some(ApplyOutcome::Refreshed);
        }
        self.active.push(effect);
        Some(ApplyOutcome::Added)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.active.iter().find(|e| e.kind == kind)
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn remove(&mut self, kind: StatusKind) -> Option<StatusEffect> {
        let idx = self.active.iter().position(|e| e.kind == kind)?;
        Some(self.active.remove(idx))
    }

    /// Remove every harmful effect, returning the kinds removed in tick order
    pub fn cure_harmful(&mut self) -> Vec<StatusKind> {
        let cured: Vec<StatusKind> = StatusKind::TICK_ORDER
            .into_iter()
            .filter(|kind| kind.is_harmful() && self.has(*kind))
            .collect();
        self.active.retain(|e| !e.kind.is_harmful());
        cured
    }

    /// Any active effect that forbids acting
    pub fn prevents_action(&self) -> Option<StatusKind> {
        StatusKind::TICK_ORDER
            .into_iter()
            .find(|kind| kind.skips_turn() && self.has(*kind))
    }

    /// Extra defense from an active shield
    pub fn defense_bonus(&self) -> u32 {
        self.get(StatusKind::Shield).map_or(0, |e| e.magnitude)
    }

    /// Active effects in tick order
    pub fn ordered(&self) -> Vec<StatusEffect> {
        StatusKind::TICK_ORDER
            .into_iter()
            .filter_map(|kind| self.get(kind).copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Count every effect down by one turn and drop the expired ones
    fn count_down(&mut self) -> Vec<StatusKind> {
        for effect in &mut self.active {
            effect.remaining = effect.remaining.saturating_sub(1);
        }
        let expired: Vec<StatusKind> = StatusKind::TICK_ORDER
            .into_iter()
            .filter(|kind| self.get(*kind).is_some_and(|e| e.remaining == 0))
            .collect();
        self.active.retain(|e| e.remaining > 0);
        expired
    }
}

/// Per-effect impact recorded during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectTick {
    pub kind: StatusKind,
    /// Damage dealt or health restored (0 for Freeze/Stun/Shield)
    pub amount: u32,
}

/// Composite result of ticking an actor's effects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnModifier {
    /// The actor loses its action this turn
    pub skip_action: bool,
    /// First turn-skipping kind encountered, for reporting
    pub skipped_by: Option<StatusKind>,
    pub damage_taken: u32,
    pub healing: u32,
    pub ticks: Vec<EffectTick>,
    pub expired: Vec<StatusKind>,
}

/// Apply an effect to an actor. No-op on a defeated actor.
pub fn apply<A: Actor + ?Sized>(actor: &mut A, effect: StatusEffect) -> Option<ApplyOutcome> {
    if actor.is_defeated() {
        return None;
    }
    let outcome = actor.effects_mut().insert(effect);
    if let Some(outcome) = outcome {
        tracing::debug!(
            actor = actor.name(),
            status = effect.kind.label(),
            duration = effect.remaining,
            ?outcome,
            "status applied"
        );
    }
    outcome
}

/// Run one turn of effects on an actor, before it acts
///
/// Burn and Poison hit health directly, bypassing defense. Once they drop
/// the actor to zero, Regenerate no longer heals. The caller must check for
/// defeat afterwards.
pub fn tick<A: Actor + ?Sized>(actor: &mut A) -> TurnModifier {
    let mut modifier = TurnModifier::default();

    for effect in actor.effects().ordered() {
        let amount = match effect.kind {
            StatusKind::Burn | StatusKind::Poison => {
                let dealt = actor.apply_damage(effect.magnitude);
                modifier.damage_taken += dealt;
                dealt
            }
            // Healing cannot revive an actor a damage tick just dropped
            StatusKind::Regenerate if actor.is_defeated() => 0,
            StatusKind::Regenerate => {
                let restored = actor.heal(effect.magnitude);
                modifier.healing += restored;
                restored
            }
            StatusKind::Freeze | StatusKind::Stun => {
                modifier.skip_action = true;
                modifier.skipped_by.get_or_insert(effect.kind);
                0
            }
            StatusKind::Shield => 0,
        };
        modifier.ticks.push(EffectTick {
            kind: effect.kind,
            amount,
        });
    }

    modifier.expired = actor.effects_mut().count_down();

    if !modifier.ticks.is_empty() {
        tracing::debug!(
            actor = actor.name(),
            damage = modifier.damage_taken,
            healing = modifier.healing,
            skip = modifier.skip_action,
            "status tick"
        );
    }
    modifier
}
