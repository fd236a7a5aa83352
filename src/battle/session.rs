//! Battle session: the turn-sequencing state machine
//!
//! A cycle is: player status tick, player action, enemy status tick, enemy
//! action. End conditions are checked after every tick and every resolution,
//! in the order defeat, victory, escape. A frozen or stunned player skips
//! straight to the enemy half; otherwise the session parks in
//! `AwaitingPlayerAction` until [`BattleSession::submit_player_action`] is
//! called.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorStats, Enemy, Player};
use crate::battle::command::ActionSource;
use crate::battle::events::{
    BattleEventKind, BattleEventLog, BattleOutcome, BattlePresenter, PromptView, Side,
};
use crate::battle::policy::EnemyPolicy;
use crate::battle::settlement::{self, BattleResult, SettlementReport};
use crate::combat::resolver::{self, Action, ActionOutcome, CombatContext};
use crate::combat::status::{self, StatusEffects, TurnModifier};
use crate::content::QuestBoard;
use crate::core::types::{BattleId, Turn};
use crate::core::{CombatError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattlePhase {
    AwaitingPlayerAction,
    ResolvingPlayerAction,
    AwaitingEnemyAction,
    ResolvingEnemyAction,
    CheckingEndCondition,
    BattleEnded,
}

/// Snapshot returned by [`BattleSession::get_battle_stats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleStats {
    pub id: BattleId,
    pub turns: Turn,
    pub player_actions: u32,
    pub enemy_actions: u32,
    pub phase: BattlePhase,
    pub result: Option<BattleResult>,
    pub report: Option<SettlementReport>,
    pub player: ActorStats,
    pub enemy: ActorStats,
}

/// Start a battle with the enemy's own policy
pub fn start_battle<'a, R: Rng>(
    player: &'a mut Player,
    enemy: Enemy,
    ctx: CombatContext<'a>,
    rng: &'a mut R,
) -> Result<BattleSession<'a, R>> {
    let policy = enemy.policy.build();
    BattleSession::start(player, enemy, policy, ctx, rng)
}

/// One encounter. Borrows the player, owns the enemy.
pub struct BattleSession<'a, R: Rng> {
    id: BattleId,
    player: &'a mut Player,
    enemy: Enemy,
    ctx: CombatContext<'a>,
    rng: &'a mut R,
    policy: Box<dyn EnemyPolicy>,
    phase: BattlePhase,
    turn: Turn,
    player_actions: u32,
    enemy_actions: u32,
    fled: bool,
    result: Option<BattleResult>,
    report: Option<SettlementReport>,
    log: BattleEventLog,
}

impl<'a, R: Rng> BattleSession<'a, R> {
    /// Validate both actors and run up to the first player prompt
    ///
    /// Corrupt actor data fails with `CombatIntegrity` before any state
    /// changes.
    pub fn start(
        player: &'a mut Player,
        enemy: Enemy,
        policy: Box<dyn EnemyPolicy>,
        ctx: CombatContext<'a>,
        rng: &'a mut R,
    ) -> Result<Self> {
        player.check_integrity()?;
        enemy.check_integrity()?;

        let mut session = Self {
            id: BattleId::new(),
            player,
            enemy,
            ctx,
            rng,
            policy,
            phase: BattlePhase::CheckingEndCondition,
            turn: 0,
            player_actions: 0,
            enemy_actions: 0,
            fled: false,
            result: None,
            report: None,
            log: BattleEventLog::new(),
        };

        tracing::info!(
            battle = %session.id,
            player = %session.player.name,
            enemy = %session.enemy.kind,
            policy = session.policy.name(),
            "battle started"
        );
        let description = format!("A wild {} appears!", session.enemy.name);
        session.emit(
            BattleEventKind::BattleStarted {
                enemy: session.enemy.kind.clone(),
            },
            description,
        );
        session.open_cycle();
        Ok(session)
    }

    pub fn id(&self) -> BattleId {
        self.id
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn is_over(&self) -> bool {
        self.phase == BattlePhase::BattleEnded
    }

    pub fn player(&self) -> &Player {
        &*self.player
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    pub fn log(&self) -> &BattleEventLog {
        &self.log
    }

    /// What the player sees at the prompt
    pub fn prompt_view(&self) -> PromptView {
        PromptView {
            turn: self.turn,
            player: self.player.stats(self.ctx.config),
            enemy: self.enemy.stats(self.ctx.config),
            player_effects: self.player.effects.ordered(),
            enemy_effects: self.enemy.effects.ordered(),
            items: self.player.inventory.iter().cloned().collect(),
            skills: self.player.skills.clone(),
        }
    }

    /// Resolve the player's action, then run the enemy half of the cycle
    ///
    /// Recoverable errors leave the session in `AwaitingPlayerAction` with
    /// the turn unconsumed.
    pub fn submit_player_action(&mut self, action: Action) -> Result<ActionOutcome> {
        if self.phase != BattlePhase::AwaitingPlayerAction {
            return Err(CombatError::InvalidAction(format!(
                "not awaiting a player action (phase {:?})",
                self.phase
            )));
        }

        self.phase = BattlePhase::ResolvingPlayerAction;
        let resolved = resolver::resolve(
            &mut *self.player,
            &action,
            &mut self.enemy,
            &self.ctx,
            &mut *self.rng,
        );
        let outcome = match resolved {
            Ok(outcome) => outcome,
            Err(err) => {
                self.phase = BattlePhase::AwaitingPlayerAction;
                self.reject(&err);
                return Err(err);
            }
        };

        self.player_actions += 1;
        if outcome.fled() {
            self.fled = true;
        }
        self.emit(
            BattleEventKind::ActionResolved {
                side: Side::Player,
                outcome: outcome.clone(),
            },
            outcome.message.clone(),
        );

        if self.check_end() {
            return Ok(outcome);
        }
        self.enemy_half();
        if !self.is_over() {
            self.open_cycle();
        }
        Ok(outcome)
    }

    /// Record a refused player action without advancing anything
    pub fn reject(&mut self, err: &CombatError) {
        tracing::info!(battle = %self.id, turn = self.turn, %err, "player action rejected");
        self.emit(
            BattleEventKind::ActionRejected {
                reason: err.to_string(),
            },
            err.to_string(),
        );
    }

    /// Drive the battle to its end
    ///
    /// Malformed or refused actions are shown to the presenter and
    /// re-prompted. Only `InputClosed` (or another unrecoverable error)
    /// leaves early.
    pub fn run<S, P>(&mut self, source: &mut S, presenter: &mut P) -> Result<BattleResult>
    where
        S: ActionSource + ?Sized,
        P: BattlePresenter + ?Sized,
    {
        let mut cursor = 0;
        loop {
            for event in self.log.since(cursor) {
                presenter.present(event);
            }
            cursor = self.log.len();

            if let Some(result) = &self.result {
                return Ok(result.clone());
            }

            let view = self.prompt_view();
            presenter.prompt(&view);
            let action = match source.next_action(&view) {
                Ok(action) => action,
                Err(err) if err.is_recoverable() => {
                    self.reject(&err);
                    continue;
                }
                Err(err) => {
                    tracing::warn!(battle = %self.id, %err, "battle aborted");
                    return Err(err);
                }
            };

            match self.submit_player_action(action) {
                Ok(_) => {}
                Err(err) if err.is_recoverable() => {}
                Err(err) => return Err(err),
            }
        }
    }

    /// Apply the result to the player once; later calls return the same report
    pub fn settle(&mut self, quests: &dyn QuestBoard) -> Result<&SettlementReport> {
        let Some(result) = &self.result else {
            return Err(CombatError::InvalidAction(
                "battle is still in progress".to_string(),
            ));
        };
        if self.report.is_none() {
            let report =
                settlement::settle(result, &mut *self.player, &self.enemy, &self.ctx, quests);
            self.report = Some(report);
        }
        self.report
            .as_ref()
            .ok_or_else(|| CombatError::CombatIntegrity("settlement report missing".to_string()))
    }

    pub fn report(&self) -> Option<&SettlementReport> {
        self.report.as_ref()
    }

    pub fn get_battle_stats(&self) -> BattleStats {
        BattleStats {
            id: self.id,
            turns: self.turn,
            player_actions: self.player_actions,
            enemy_actions: self.enemy_actions,
            phase: self.phase,
            result: self.result.clone(),
            report: self.report.clone(),
            player: self.player.stats(self.ctx.config),
            enemy: self.enemy.stats(self.ctx.config),
        }
    }

    /// Start turns until the player can act or the battle ends
    fn open_cycle(&mut self) {
        while !self.is_over() {
            self.turn += 1;
            let turn = self.turn;
            self.emit(BattleEventKind::TurnStarted, format!("Turn {}", turn));

            let modifier = status::tick(&mut *self.player);
            self.report_tick(Side::Player, &modifier);
            if self.check_end() {
                return;
            }

            if let Some(cause) = modifier.skipped_by {
                let description =
                    format!("{} is under {} and loses the turn", self.player.name, cause.label());
                self.emit(
                    BattleEventKind::TurnSkipped {
                        side: Side::Player,
                        cause,
                    },
                    description,
                );
                self.enemy_half();
                continue;
            }

            self.phase = BattlePhase::AwaitingPlayerAction;
            tracing::debug!(battle = %self.id, turn, "awaiting player action");
            return;
        }
    }

    fn enemy_half(&mut self) {
        self.phase = BattlePhase::AwaitingEnemyAction;
        let modifier = status::tick(&mut self.enemy);
        self.report_tick(Side::Enemy, &modifier);
        if self.check_end() {
            return;
        }
        if let Some(cause) = modifier.skipped_by {
            let description =
                format!("{} is under {} and loses the turn", self.enemy.name, cause.label());
            self.emit(
                BattleEventKind::TurnSkipped {
                    side: Side::Enemy,
                    cause,
                },
                description,
            );
            return;
        }

        if let Some(shift) = self.policy.before_turn(&mut self.enemy, self.ctx.config) {
            tracing::info!(
                battle = %self.id,
                phase = shift.phase.label(),
                attack = shift.attack,
                healed = shift.healed,
                "enemy phase changed"
            );
            let mut description = format!(
                "{} enters its {} phase (attack {})",
                self.enemy.name,
                shift.phase.label(),
                shift.attack
            );
            if shift.healed > 0 {
                description.push_str(&format!(" and recovers {} health", shift.healed));
            }
            self.emit(
                BattleEventKind::PhaseChanged {
                    phase: shift.phase,
                    attack: shift.attack,
                    healed: shift.healed,
                },
                description,
            );
        }

        let chosen = self.policy.choose_action(&self.enemy, &*self.player, &self.ctx);
        self.phase = BattlePhase::ResolvingEnemyAction;
        let outcome = match self.resolve_enemy(&chosen) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    battle = %self.id,
                    policy = self.policy.name(),
                    action = chosen.label(),
                    %err,
                    "enemy action failed, attacking instead"
                );
                self.emit(
                    BattleEventKind::PolicyFallback {
                        reason: err.to_string(),
                    },
                    format!("{} hesitates ({})", self.enemy.name, err),
                );
                match self.resolve_enemy(&Action::Attack) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        tracing::warn!(battle = %self.id, %err, "enemy fallback attack failed");
                        self.check_end();
                        return;
                    }
                }
            }
        };

        self.enemy_actions += 1;
        self.emit(
            BattleEventKind::ActionResolved {
                side: Side::Enemy,
                outcome: outcome.clone(),
            },
            outcome.message.clone(),
        );
        self.check_end();
    }

    fn resolve_enemy(&mut self, action: &Action) -> Result<ActionOutcome> {
        if matches!(action, Action::Flee | Action::UseItem(_)) {
            return Err(CombatError::InvalidAction(format!(
                "{} cannot {}",
                self.enemy.name,
                action.label()
            )));
        }
        resolver::resolve(
            &mut self.enemy,
            action,
            &mut *self.player,
            &self.ctx,
            &mut *self.rng,
        )
    }

    fn report_tick(&mut self, side: Side, modifier: &TurnModifier) {
        let name = match side {
            Side::Player => self.player.name.clone(),
            Side::Enemy => self.enemy.name.clone(),
        };
        for tick in modifier.ticks.iter().filter(|t| t.amount > 0) {
            let description = if tick.kind.is_harmful() {
                format!("{} takes {} {} damage", name, tick.amount, tick.kind.label())
            } else {
                format!("{} regenerates {} health", name, tick.amount)
            };
            self.emit(
                BattleEventKind::StatusTicked {
                    side,
                    kind: tick.kind,
                    amount: tick.amount,
                },
                description,
            );
        }
        for kind in &modifier.expired {
            self.emit(
                BattleEventKind::StatusExpired { side, kind: *kind },
                format!("{}'s {} wears off", name, kind.label()),
            );
        }
    }

    /// Terminal check, in order: player defeated, enemy defeated, player fled
    fn check_end(&mut self) -> bool {
        self.phase = BattlePhase::CheckingEndCondition;
        let result = if self.player.is_defeated() {
            BattleResult::PlayerDefeat
        } else if self.enemy.is_defeated() {
            BattleResult::PlayerVictory(settlement::compute_rewards(
                &*self.player,
                &self.enemy,
                self.ctx.config,
                &mut *self.rng,
            ))
        } else if self.fled {
            BattleResult::PlayerFled
        } else {
            return false;
        };
        self.finish(result);
        true
    }

    fn finish(&mut self, result: BattleResult) {
        let outcome = result.outcome();
        self.phase = BattlePhase::BattleEnded;
        // Statuses do not outlive the encounter
        self.player.effects = StatusEffects::new();

        tracing::info!(
            battle = %self.id,
            turns = self.turn,
            ?outcome,
            "battle ended"
        );
        let description = match outcome {
            BattleOutcome::PlayerVictory => format!("{} is defeated!", self.enemy.name),
            BattleOutcome::PlayerDefeat => format!("{} has fallen...", self.player.name),
            BattleOutcome::PlayerFled => format!("{} got away", self.player.name),
        };
        self.emit(BattleEventKind::BattleEnded { outcome }, description);
        self.result = Some(result);
    }

    fn emit(&mut self, kind: BattleEventKind, description: String) {
        self.log.push(kind, description, self.turn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::command::ScriptedActions;
    use crate::battle::policy::Berserker;
    use crate::combat::status::{StatusEffect, StatusKind};
    use crate::content::{ItemTable, NoQuests, SkillTable};
    use crate::core::types::SkillId;
    use crate::core::CombatConfig;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixed_config() -> CombatConfig {
        CombatConfig {
            damage_variance: 0.0,
            crit_chance: 0.0,
            dodge_chance: 0.0,
            ..CombatConfig::default()
        }
    }

    #[test]
    fn test_start_parks_awaiting_player() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut player = Player::new("Hero");

        let session =
            start_battle(&mut player, Enemy::new("wolf", "Wolf", 40, 15), ctx, &mut rng).unwrap();
        assert_eq!(session.phase(), BattlePhase::AwaitingPlayerAction);
        assert_eq!(session.turn(), 1);
        assert!(session.result().is_none());
    }

    #[test]
    fn test_start_rejects_corrupt_enemy() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut player = Player::new("Hero");

        let enemy = Enemy::new("husk", "Husk", 0, 1);
        let result = start_battle(&mut player, enemy, ctx, &mut rng);
        assert!(matches!(result, Err(CombatError::CombatIntegrity(_))));
    }

    #[test]
    fn test_frozen_player_skips_to_enemy() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut rng = StepRng::new(0, 0);
        let mut player = Player::with_stats("Hero", 50, 5, 0);
        player
            .effects
            .insert(StatusEffect::standard(StatusKind::Freeze, 1));

        let session = BattleSession::start(
            &mut player,
            Enemy::new("wolf", "Wolf", 40, 4),
            Box::new(Berserker),
            ctx,
            &mut rng,
        )
        .unwrap();
        // Turn 1 was skipped and the wolf bit once; turn 2 is the player's
        assert_eq!(session.turn(), 2);
        assert_eq!(session.player().health.current(), 46);
        assert_eq!(session.get_battle_stats().player_actions, 0);
        assert_eq!(session.get_battle_stats().enemy_actions, 1);
        assert_eq!(
            session
                .log()
                .count_where(|k| matches!(
                    k,
                    BattleEventKind::TurnSkipped {
                        side: Side::Player,
                        ..
                    }
                )),
            1
        );
    }

    #[test]
    fn test_rejected_action_keeps_turn() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut rng = StepRng::new(0, 0);
        let mut player = Player::new("Hero");

        let mut session =
            start_battle(&mut player, Enemy::new("wolf", "Wolf", 40, 15), ctx, &mut rng).unwrap();
        let err = session
            .submit_player_action(Action::UseSkill(SkillId::from("lightning")))
            .unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(session.phase(), BattlePhase::AwaitingPlayerAction);
        assert_eq!(session.turn(), 1);
        assert!(session.enemy().health.is_full());
    }

    #[test]
    fn test_submit_after_end_rejected() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut rng = StepRng::new(0, 0);
        let mut player = Player::with_stats("Hero", 20, 50, 0);

        let mut session =
            start_battle(&mut player, Enemy::new("bat", "Bat", 10, 1), ctx, &mut rng).unwrap();
        session.submit_player_action(Action::Attack).unwrap();
        assert!(session.is_over());
        assert!(session.submit_player_action(Action::Attack).is_err());
    }

    #[test]
    fn test_settle_before_end_is_error() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut rng = StepRng::new(0, 0);
        let mut player = Player::new("Hero");

        let mut session =
            start_battle(&mut player, Enemy::new("wolf", "Wolf", 40, 15), ctx, &mut rng).unwrap();
        assert!(session.settle(&NoQuests).is_err());
    }

    #[test]
    fn test_run_reports_input_closed() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut rng = StepRng::new(0, 0);
        let mut player = Player::with_stats("Hero", 500, 1, 0);

        let mut session =
            start_battle(&mut player, Enemy::new("ogre", "Ogre", 500, 1), ctx, &mut rng).unwrap();
        let mut source = ScriptedActions::new([Action::Attack, Action::Attack]);
        let mut shown = BattleEventLog::new();
        let result = session.run(&mut source, &mut shown);
        assert_eq!(result, Err(CombatError::InputClosed));
        assert_eq!(session.get_battle_stats().player_actions, 2);
        assert_eq!(shown.len(), session.log().len());
    }

    #[test]
    fn test_player_statuses_cleared_at_end() {
        let config = fixed_config();
        let (items, skills) = (ItemTable::standard(), SkillTable::standard());
        let ctx = CombatContext::new(&config, &items, &skills);
        let mut rng = StepRng::new(0, 0);
        let mut player = Player::with_stats("Hero", 50, 50, 0);
        player
            .effects
            .insert(StatusEffect::standard(StatusKind::Poison, 3));

        {
            let mut session =
                start_battle(&mut player, Enemy::new("bat", "Bat", 10, 1), ctx, &mut rng).unwrap();
            session.submit_player_action(Action::Attack).unwrap();
            assert!(session.is_over());
        }
        assert!(player.effects.is_empty());
    }
}
