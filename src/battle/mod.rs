//! Battle orchestration
//!
//! - `session`: the turn state machine and driver loop
//! - `policy`: enemy action selection
//! - `settlement`: rewards and quest deltas
//! - `events`: what the presentation layer gets to see
//! - `command`: where player actions come from

pub mod command;
pub mod events;
pub mod policy;
pub mod session;
pub mod settlement;

pub use command::{parse_action, ActionSource, LineActions, RepeatAction, ScriptedActions};
pub use events::{
    BattleEvent, BattleEventKind, BattleEventLog, BattleOutcome, BattlePresenter, PromptView,
    Side, SilentPresenter,
};
pub use policy::{
    Berserker, Boss, BossPhase, EnemyPolicy, PhaseShift, PolicyKind, Survivor, Tactician,
};
pub use session::{start_battle, BattlePhase, BattleSession, BattleStats};
pub use settlement::{settle, BattleResult, Rewards, SettlementReport};
