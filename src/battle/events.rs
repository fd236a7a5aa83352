//! Structured battle events for the presentation layer
//!
//! The session never prints. It appends events to its log and the driver
//! loop hands new ones to a [`BattlePresenter`].

use serde::{Deserialize, Serialize};

use crate::actor::{ActorStats, ItemStack};
use crate::battle::policy::BossPhase;
use crate::combat::status::{StatusEffect, StatusKind};
use crate::combat::ActionOutcome;
use crate::core::types::{EnemyKind, SkillId, Turn};

/// Which combatant an event concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Enemy,
}

/// Terminal state of a battle, without rewards attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    PlayerVictory,
    PlayerDefeat,
    PlayerFled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleEventKind {
    BattleStarted { enemy: EnemyKind },
    TurnStarted,
    StatusTicked { side: Side, kind: StatusKind, amount: u32 },
    StatusExpired { side: Side, kind: StatusKind },
    TurnSkipped { side: Side, cause: StatusKind },
    ActionResolved { side: Side, outcome: ActionOutcome },
    /// Player action refused; the same turn is offered again
    ActionRejected { reason: String },
    /// Enemy policy picked an unusable action and attacked instead
    PolicyFallback { reason: String },
    /// A boss crossed into a new phase before acting
    PhaseChanged { phase: BossPhase, attack: u32, healed: u32 },
    BattleEnded { outcome: BattleOutcome },
}

/// Log entry for battle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub turn: Turn,
    pub kind: BattleEventKind,
    pub description: String,
}

/// Every event of one battle, in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: BattleEventKind, description: String, turn: Turn) {
        self.events.push(BattleEvent {
            turn,
            kind,
            description,
        });
    }

    /// Events appended at or after `cursor`
    pub fn since(&self, cursor: usize) -> &[BattleEvent] {
        self.events.get(cursor..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count_where(&self, pred: impl Fn(&BattleEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }
}

/// Everything the player needs to see before choosing an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptView {
    pub turn: Turn,
    pub player: ActorStats,
    pub enemy: ActorStats,
    pub player_effects: Vec<StatusEffect>,
    pub enemy_effects: Vec<StatusEffect>,
    pub items: Vec<ItemStack>,
    pub skills: Vec<SkillId>,
}

/// Receives events and prompts; owns all rendering
pub trait BattlePresenter {
    fn present(&mut self, event: &BattleEvent);

    fn prompt(&mut self, _view: &PromptView) {}
}

/// Presenter that records what it was shown
impl BattlePresenter for BattleEventLog {
    fn present(&mut self, event: &BattleEvent) {
        self.events.push(event.clone());
    }
}

/// Presenter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPresenter;

impl BattlePresenter for SilentPresenter {
    fn present(&mut self, _event: &BattleEvent) {}
}
