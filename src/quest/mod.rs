//! Quest tracking
//!
//! A quest is a list of success parts, each naming an object (`focus`) and
//! the action that has to land on it. The book watches attack and interact
//! events through `before` hooks; when the last part of an active quest is
//! met, the quest completes and the next inactive one is activated.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::compositing::sink::PresentationSink;
use crate::engine::hooks::{Action, ActionEvent, HookFlow};
use crate::engine::messages::MessageLog;
use crate::engine::world::World;
use crate::world::registry::ObjectRegistry;

/// Sender used for quest notifications
pub const QUEST_SENDER: &str = "QUEST";

/// One condition of a quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestPart {
    /// Id of the object the action must land on
    pub focus: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activated: bool,
    /// Remaining conditions
    #[serde(default)]
    pub success: Vec<QuestPart>,
}

impl Quest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            activated: false,
            success: Vec::new(),
        }
    }

    pub fn with_part(mut self, focus: impl Into<String>, action: Action) -> Self {
        self.success.push(QuestPart {
            focus: focus.into(),
            action,
        });
        self
    }

    pub fn is_done(&self) -> bool {
        self.success.is_empty()
    }
}

/// Active, pending and finished quests
#[derive(Debug, Clone, Default)]
pub struct QuestBook {
    active: Vec<Quest>,
    inactive: Vec<Quest>,
    completed: Vec<String>,
}

impl QuestBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add quests, sorted by their `activated` flag
    pub fn load(&mut self, quests: &[Quest]) {
        for quest in quests {
            if quest.activated {
                self.active.push(quest.clone());
            } else {
                self.inactive.push(quest.clone());
            }
        }
        tracing::debug!(
            "Quest book: {} active, {} inactive",
            self.active.len(),
            self.inactive.len()
        );
    }

    /// Move a pending quest to the active list and announce it
    pub fn activate(&mut self, name: &str, messages: &mut MessageLog) -> bool {
        let Some(index) = self.inactive.iter().position(|q| q.name == name) else {
            return false;
        };
        let mut quest = self.inactive.remove(index);
        quest.activated = true;
        messages.push(QUEST_SENDER, format!("New quest: \"{}\"", quest.name));
        if !quest.description.is_empty() {
            messages.push(QUEST_SENDER, quest.description.clone());
        }
        self.active.push(quest);
        true
    }

    /// Activate the first pending quest when nothing is active yet
    pub fn activate_first(&mut self, messages: &mut MessageLog) -> bool {
        if !self.active.is_empty() {
            return false;
        }
        match self.inactive.first().map(|q| q.name.clone()) {
            Some(name) => self.activate(&name, messages),
            None => false,
        }
    }

    /// Put an active quest back on the pending list
    pub fn deactivate(&mut self, name: &str) -> bool {
        let Some(index) = self.active.iter().position(|q| q.name == name) else {
            return false;
        };
        let mut quest = self.active.remove(index);
        quest.activated = false;
        self.inactive.push(quest);
        true
    }

    /// Check an action against the active quests
    ///
    /// At most one success part is consumed per event. Returns whether a
    /// quest was completed.
    pub fn observe(
        &mut self,
        event: &ActionEvent,
        registry: &ObjectRegistry,
        messages: &mut MessageLog,
    ) -> bool {
        let matched = self.active.iter().enumerate().find_map(|(quest_index, quest)| {
            quest
                .success
                .iter()
                .position(|part| {
                    part.action == event.action
                        && registry
                            .find_by_id(&part.focus)
                            .is_some_and(|(_, object)| object.covers(event.cell))
                })
                .map(|part_index| (quest_index, part_index))
        });
        let Some((quest_index, part_index)) = matched else {
            return false;
        };

        let part = self.active[quest_index].success.remove(part_index);
        tracing::debug!(
            "Quest {}: {:?} on {} done",
            self.active[quest_index].name,
            part.action,
            part.focus
        );
        self.complete_finished(messages)
    }

    fn complete_finished(&mut self, messages: &mut MessageLog) -> bool {
        let Some(index) = self.active.iter().position(Quest::is_done) else {
            return false;
        };
        let quest = self.active.remove(index);
        messages.push(
            QUEST_SENDER,
            format!("Congratulations! You completed \"{}\"", quest.name),
        );
        self.completed.push(quest.name);

        match self.inactive.first().map(|q| q.name.clone()) {
            Some(next) => {
                self.activate(&next, messages);
            }
            None if self.active.is_empty() => {
                messages.push(QUEST_SENDER, "Congratulations! You completed all quests.");
            }
            None => {}
        }
        true
    }

    pub fn active(&self) -> &[Quest] {
        &self.active
    }

    pub fn inactive(&self) -> &[Quest] {
        &self.inactive
    }

    /// Names of finished quests in completion order
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn is_finished(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty() && !self.completed.is_empty()
    }

    /// Observe attacks and interactions in `world` before they happen
    pub fn attach<S: PresentationSink>(book: &Rc<RefCell<QuestBook>>, world: &mut World<S>) {
        for action in [Action::Attack, Action::Interact] {
            let book = Rc::clone(book);
            world.hooks_mut().on_before(action, move |event, ctx| {
                book.borrow_mut().observe(event, ctx.registry, ctx.messages);
                HookFlow::Continue
            });
        }
    }
}
