//! Typed hooks around world actions
//!
//! Observers register closures that run before or after move, attack,
//! interact and remove. A `before` hook may cancel the action. Hooks see the
//! registry read-only and may post messages.

use serde::{Deserialize, Serialize};

use crate::core::types::Cell;
use crate::engine::messages::MessageLog;
use crate::world::registry::{ObjectKey, ObjectRegistry};

/// Action a hook is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Move,
    Attack,
    Interact,
    Remove,
}

/// Description of one action passed to hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub action: Action,
    /// Who performs the action
    pub actor: Option<ObjectKey>,
    /// What the action lands on
    pub subject: Option<ObjectKey>,
    /// Target cell
    pub cell: Cell,
}

impl ActionEvent {
    pub fn new(action: Action, cell: Cell) -> Self {
        Self {
            action,
            actor: None,
            subject: None,
            cell,
        }
    }

    pub fn with_actor(mut self, actor: ObjectKey) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_subject(mut self, subject: Option<ObjectKey>) -> Self {
        self.subject = subject;
        self
    }
}

/// What a hook may touch
pub struct HookContext<'a> {
    pub registry: &'a ObjectRegistry,
    pub messages: &'a mut MessageLog,
}

/// Returned by `before` hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookFlow {
    Continue,
    Cancel,
}

type BeforeHook = Box<dyn FnMut(&ActionEvent, &mut HookContext<'_>) -> HookFlow>;
type AfterHook = Box<dyn FnMut(&ActionEvent, &mut HookContext<'_>)>;

/// Registered hooks, run in registration order
#[derive(Default)]
pub struct HookRegistry {
    before: Vec<(Action, BeforeHook)>,
    after: Vec<(Action, AfterHook)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before<F>(&mut self, action: Action, hook: F)
    where
        F: FnMut(&ActionEvent, &mut HookContext<'_>) -> HookFlow + 'static,
    {
        self.before.push((action, Box::new(hook)));
    }

    pub fn on_after<F>(&mut self, action: Action, hook: F)
    where
        F: FnMut(&ActionEvent, &mut HookContext<'_>) + 'static,
    {
        self.after.push((action, Box::new(hook)));
    }

    /// Run `before` hooks; stops at the first cancel
    pub fn run_before(&mut self, event: &ActionEvent, ctx: &mut HookContext<'_>) -> HookFlow {
        for (action, hook) in self.before.iter_mut() {
            if *action == event.action && hook(event, ctx) == HookFlow::Cancel {
                tracing::debug!("{:?} cancelled by hook", event.action);
                return HookFlow::Cancel;
            }
        }
        HookFlow::Continue
    }

    pub fn run_after(&mut self, event: &ActionEvent, ctx: &mut HookContext<'_>) {
        for (action, hook) in self.after.iter_mut() {
            if *action == event.action {
                hook(event, ctx);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as Counter;
    use std::rc::Rc;

    #[test]
    fn test_hooks_filter_by_action() {
        let mut hooks = HookRegistry::new();
        let calls = Rc::new(Counter::new(0));
        let seen = Rc::clone(&calls);
        hooks.on_after(Action::Remove, move |_, _| seen.set(seen.get() + 1));

        let registry = ObjectRegistry::new();
        let mut messages = MessageLog::default();
        let mut ctx = HookContext {
            registry: &registry,
            messages: &mut messages,
        };

        hooks.run_after(&ActionEvent::new(Action::Move, Cell::new(0, 0)), &mut ctx);
        hooks.run_after(&ActionEvent::new(Action::Remove, Cell::new(0, 0)), &mut ctx);

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_before_hook_cancels() {
        let mut hooks = HookRegistry::new();
        hooks.on_before(Action::Move, |event, _| {
            if event.cell.x < 0 {
                HookFlow::Cancel
            } else {
                HookFlow::Continue
            }
        });

        let registry = ObjectRegistry::new();
        let mut messages = MessageLog::default();
        let mut ctx = HookContext {
            registry: &registry,
            messages: &mut messages,
        };

        let blocked = ActionEvent::new(Action::Move, Cell::new(-1, 0));
        let allowed = ActionEvent::new(Action::Move, Cell::new(1, 0));
        assert_eq!(hooks.run_before(&blocked, &mut ctx), HookFlow::Cancel);
        assert_eq!(hooks.run_before(&allowed, &mut ctx), HookFlow::Continue);
    }

    #[test]
    fn test_hooks_can_post_messages() {
        let mut hooks = HookRegistry::new();
        hooks.on_after(Action::Attack, |_, ctx| ctx.messages.push("HOOK", "attacked"));

        let registry = ObjectRegistry::new();
        let mut messages = MessageLog::default();
        {
            let mut ctx = HookContext {
                registry: &registry,
                messages: &mut messages,
            };
            hooks.run_after(&ActionEvent::new(Action::Attack, Cell::new(0, 0)), &mut ctx);
        }

        assert_eq!(messages.latest().unwrap().text, "attacked");
    }
}
