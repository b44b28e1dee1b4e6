//! Player-driven movement, attacks and interaction

use crate::compositing::sink::PresentationSink;
use crate::core::types::{Category, Cell, Direction};
use crate::engine::hooks::{Action, ActionEvent, HookFlow};
use crate::engine::world::World;
use crate::world::objects::EventKind;
use crate::world::registry::ObjectKey;

/// Sender used for item pickup messages
pub const ITEM_SENDER: &str = "ITEM";

/// Result of an attack
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttackOutcome {
    /// Target that was hit, if any
    pub target: Option<ObjectKey>,
    /// Attack event message fired on the target
    pub message: Option<String>,
    /// The target was a victim and got removed
    pub destroyed: bool,
}

/// Result of an interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractOutcome {
    Nothing,
    /// A dialog event fired with this text
    Dialog(String),
    /// An item with this model name was picked up
    Collected(String),
}

/// Drives the player character through the world
#[derive(Debug, Clone)]
pub struct PlayerController {
    key: ObjectKey,
    facing: Option<Direction>,
}

impl PlayerController {
    pub fn new(key: ObjectKey) -> Self {
        Self { key, facing: None }
    }

    /// Controller for the configured player character
    pub fn for_world<S: PresentationSink>(world: &World<S>) -> Self {
        Self::new(world.player_key())
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Last direction the player moved or acted in
    pub fn facing(&self) -> Option<Direction> {
        self.facing
    }

    pub fn position<S: PresentationSink>(&self, world: &World<S>) -> Option<Cell> {
        world.object(&self.key).map(|o| o.position)
    }

    /// Step one cell
    ///
    /// Blocked cells stop the player without turning it. Steps off the edge
    /// turn the player but leave it in place.
    pub fn step<S: PresentationSink>(&mut self, world: &mut World<S>, direction: Direction) -> bool {
        let Some(position) = self.position(world) else {
            return false;
        };
        let target = position.step(direction);
        if world.is_blocked(target) {
            tracing::debug!("Player step {:?} blocked at {}", direction, target);
            return false;
        }
        self.facing = Some(direction);

        let target = world.world_size().clamp(target);
        if target == position {
            return false;
        }
        world.move_object(&self.key, target)
    }

    fn target_cell<S: PresentationSink>(
        &mut self,
        world: &World<S>,
        direction: Option<Direction>,
    ) -> Option<Cell> {
        let direction = direction.or(self.facing)?;
        self.facing = Some(direction);
        Some(self.position(world)?.step(direction))
    }

    /// Attack the cell in `direction`, or the facing cell
    pub fn attack<S: PresentationSink>(
        &mut self,
        world: &mut World<S>,
        direction: Option<Direction>,
    ) -> AttackOutcome {
        let Some(cell) = self.target_cell(world, direction) else {
            return AttackOutcome::default();
        };
        let target = world
            .registry()
            .object_at(cell)
            .filter(|(key, _)| *key != self.key)
            .map(|(key, object)| (key, object.victim, object.display_name().to_string()));

        let event = ActionEvent::new(Action::Attack, cell)
            .with_actor(self.key.clone())
            .with_subject(target.as_ref().map(|(key, _, _)| key.clone()));
        if world.run_before(&event) == HookFlow::Cancel {
            return AttackOutcome::default();
        }

        let mut outcome = AttackOutcome::default();
        if let Some((key, victim, sender)) = target {
            if let Some(fired) = world.fire_event(&key, EventKind::Attack) {
                world.messages_mut().push(sender, fired.message.clone());
                outcome.message = Some(fired.message);
            }
            if victim {
                outcome.destroyed = world.remove_object(&key);
            }
            outcome.target = Some(key);
        }

        world.run_after(&event);
        outcome
    }

    /// Talk to or pick up whatever is in `direction`, or the facing cell
    ///
    /// Objects with events fire their next dialog event. Items without
    /// events are collected and removed.
    pub fn interact<S: PresentationSink>(
        &mut self,
        world: &mut World<S>,
        direction: Option<Direction>,
    ) -> InteractOutcome {
        let Some(cell) = self.target_cell(world, direction) else {
            return InteractOutcome::Nothing;
        };
        let target = world
            .registry()
            .object_at(cell)
            .filter(|(key, _)| *key != self.key)
            .map(|(key, object)| {
                let model = object.model.as_ref().map(|m| m.name.clone()).unwrap_or_default();
                (
                    key,
                    !object.events.is_empty(),
                    object.category == Category::Item,
                    model,
                    object.display_name().to_string(),
                )
            });

        let event = ActionEvent::new(Action::Interact, cell)
            .with_actor(self.key.clone())
            .with_subject(target.as_ref().map(|(key, ..)| key.clone()));
        if world.run_before(&event) == HookFlow::Cancel {
            return InteractOutcome::Nothing;
        }

        let outcome = match target {
            Some((key, true, _, _, sender)) => match world.fire_event(&key, EventKind::Dialog) {
                Some(fired) => {
                    world.messages_mut().push(sender, fired.message.clone());
                    InteractOutcome::Dialog(fired.message)
                }
                None => InteractOutcome::Nothing,
            },
            Some((key, false, true, model, _)) => {
                world
                    .messages_mut()
                    .push(ITEM_SENDER, format!("You successfully collected {}!", model));
                world.remove_object(&key);
                InteractOutcome::Collected(model)
            }
            _ => InteractOutcome::Nothing,
        };

        world.run_after(&event);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositing::sink::RecordingSink;
    use crate::core::config::EngineConfig;
    use crate::core::types::GridSize;
    use crate::world::level::LevelObject;
    use crate::world::model::{ModelCatalog, ModelDescriptor};
    use crate::world::objects::ObjectEvent;

    fn world() -> World<RecordingSink> {
        let mut catalog = ModelCatalog::new();
        catalog.insert(ModelDescriptor::new("hero", Category::Character, GridSize::new(1, 1), true));
        catalog.insert(ModelDescriptor::new("guard", Category::Character, GridSize::new(1, 1), true));
        catalog.insert(ModelDescriptor::new("wall", Category::Object, GridSize::new(1, 1), true));
        catalog.insert(ModelDescriptor::new("key", Category::Item, GridSize::new(1, 1), false));
        let config = EngineConfig {
            world_size: GridSize::new(5, 5),
            ..Default::default()
        };
        let mut world = World::new(config, catalog, RecordingSink::new()).unwrap();
        world.load_objects(&[LevelObject::new("hero", Cell::new(2, 2)).with_id("player")]);
        world
    }

    #[test]
    fn test_step_moves_and_faces() {
        let mut world = world();
        let mut player = PlayerController::for_world(&world);

        assert!(player.step(&mut world, Direction::Right));

        assert_eq!(player.position(&world), Some(Cell::new(3, 2)));
        assert_eq!(player.facing(), Some(Direction::Right));
    }

    #[test]
    fn test_step_into_wall_is_refused() {
        let mut world = world();
        world.load_objects(&[LevelObject::new("wall", Cell::new(2, 1))]);
        let mut player = PlayerController::for_world(&world);

        assert!(!player.step(&mut world, Direction::Up));

        assert_eq!(player.position(&world), Some(Cell::new(2, 2)));
        assert_eq!(player.facing(), None);
    }

    #[test]
    fn test_step_off_edge_stays_put() {
        let mut world = world();
        let mut player = PlayerController::for_world(&world);
        player.step(&mut world, Direction::Down);
        player.step(&mut world, Direction::Down);

        assert!(!player.step(&mut world, Direction::Down));

        assert_eq!(player.position(&world), Some(Cell::new(2, 4)));
        assert_eq!(player.facing(), Some(Direction::Down));
    }

    #[test]
    fn test_attack_victim_removes_it() {
        let mut world = world();
        world.load_objects(&[LevelObject::new("guard", Cell::new(3, 2))
            .with_id("guard")
            .with_events(vec![ObjectEvent::new(EventKind::Attack, "Argh!")])
            .as_victim()]);
        let mut player = PlayerController::for_world(&world);

        let outcome = player.attack(&mut world, Some(Direction::Right));

        assert_eq!(outcome.message.as_deref(), Some("Argh!"));
        assert!(outcome.destroyed);
        assert!(world.object(&ObjectKey::character("guard")).is_none());
        assert!(!world.is_blocked(Cell::new(3, 2)));
        assert_eq!(world.messages().latest().unwrap().sender, "guard");
    }

    #[test]
    fn test_attack_without_facing_does_nothing() {
        let mut world = world();
        let mut player = PlayerController::for_world(&world);
        assert_eq!(player.attack(&mut world, None), AttackOutcome::default());
    }

    #[test]
    fn test_interact_dialog_cycles() {
        let mut world = world();
        world.load_objects(&[LevelObject::new("guard", Cell::new(2, 1))
            .with_id("guard")
            .with_events(vec![
                ObjectEvent::new(EventKind::Dialog, "Halt."),
                ObjectEvent::new(EventKind::Dialog, "Move along."),
            ])]);
        let mut player = PlayerController::for_world(&world);

        let first = player.interact(&mut world, Some(Direction::Up));
        let second = player.interact(&mut world, None);
        let third = player.interact(&mut world, None);

        assert_eq!(first, InteractOutcome::Dialog("Halt.".into()));
        assert_eq!(second, InteractOutcome::Dialog("Move along.".into()));
        assert_eq!(third, InteractOutcome::Dialog("Halt.".into()));
    }

    #[test]
    fn test_interact_collects_item() {
        let mut world = world();
        world.load_objects(&[LevelObject::new("key", Cell::new(1, 2)).with_id("key-1")]);
        let mut player = PlayerController::for_world(&world);

        let outcome = player.interact(&mut world, Some(Direction::Left));

        assert_eq!(outcome, InteractOutcome::Collected("key".into()));
        assert!(world.object(&ObjectKey::object("key-1")).is_none());
        let message = world.messages().latest().unwrap();
        assert_eq!(message.sender, ITEM_SENDER);
        assert_eq!(message.text, "You successfully collected key!");
    }

    #[test]
    fn test_interact_cancelled_by_hook() {
        let mut world = world();
        world.load_objects(&[LevelObject::new("key", Cell::new(1, 2)).with_id("key-1")]);
        world
            .hooks_mut()
            .on_before(Action::Interact, |_, _| HookFlow::Cancel);
        let mut player = PlayerController::for_world(&world);

        assert_eq!(player.interact(&mut world, Some(Direction::Left)), InteractOutcome::Nothing);
        assert!(world.object(&ObjectKey::object("key-1")).is_some());
    }
}
