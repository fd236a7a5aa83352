//! Player action sources
//!
//! Text commands accepted at the prompt:
//!
//! | input                        | action          |
//! |------------------------------|-----------------|
//! | `1`, `attack`                | Attack          |
//! | `2`, `flee`                  | Flee            |
//! | `3 <item>`, `item <item>`    | UseItem(item)   |
//! | `4 <skill>`, `skill <skill>` | UseSkill(skill) |

use std::collections::VecDeque;
use std::io::BufRead;

use crate::battle::events::PromptView;
use crate::combat::Action;
use crate::core::types::{ItemId, SkillId};
use crate::core::{CombatError, Result};

/// Supplies the player's next action
///
/// Recoverable errors re-prompt; `InputClosed` ends the driver loop.
pub trait ActionSource {
    fn next_action(&mut self, view: &PromptView) -> Result<Action>;
}

/// Parse one line of player input
pub fn parse_action(input: &str) -> Result<Action> {
    let mut parts = input.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err(CombatError::InvalidAction("empty command".to_string()));
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(CombatError::InvalidAction(format!(
            "too many arguments in '{}'",
            input.trim()
        )));
    }

    match (verb.to_ascii_lowercase().as_str(), arg) {
        ("1" | "attack", None) => Ok(Action::Attack),
        ("2" | "flee", None) => Ok(Action::Flee),
        ("3" | "item", Some(item)) => Ok(Action::UseItem(ItemId::new(item))),
        ("4" | "skill", Some(skill)) => Ok(Action::UseSkill(SkillId::new(skill))),
        ("3" | "item" | "4" | "skill", None) => Err(CombatError::InvalidAction(format!(
            "'{}' needs a name",
            verb
        ))),
        ("1" | "attack" | "2" | "flee", Some(_)) => Err(CombatError::InvalidAction(format!(
            "'{}' takes no argument",
            verb
        ))),
        _ => Err(CombatError::InvalidAction(format!(
            "unknown command '{}'",
            input.trim()
        ))),
    }
}

/// Reads commands line by line, e.g. from stdin
pub struct LineActions<B: BufRead> {
    reader: B,
}

impl<B: BufRead> LineActions<B> {
    pub fn new(reader: B) -> Self {
        Self { reader }
    }
}

impl<B: BufRead> ActionSource for LineActions<B> {
    fn next_action(&mut self, _view: &PromptView) -> Result<Action> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Err(CombatError::InputClosed),
            Ok(_) => parse_action(&line),
            Err(err) => {
                tracing::warn!(%err, "failed to read player input");
                Err(CombatError::InputClosed)
            }
        }
    }
}

/// Replays a fixed list of actions, then reports closed input
#[derive(Debug, Clone, Default)]
pub struct ScriptedActions {
    queue: VecDeque<Action>,
}

impl ScriptedActions {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            queue: actions.into_iter().collect(),
        }
    }

    /// The same action forever
    pub fn repeat(action: Action) -> RepeatAction {
        RepeatAction(action)
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl ActionSource for ScriptedActions {
    fn next_action(&mut self, _view: &PromptView) -> Result<Action> {
        self.queue.pop_front().ok_or(CombatError::InputClosed)
    }
}

#[derive(Debug, Clone)]
pub struct RepeatAction(pub Action);

impl ActionSource for RepeatAction {
    fn next_action(&mut self, _view: &PromptView) -> Result<Action> {
        Ok(self.0.clone())
    }
}
