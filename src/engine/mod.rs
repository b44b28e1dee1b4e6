//! World orchestration, hooks, messages and the player controller

pub mod hooks;
pub mod messages;
pub mod player;
pub mod world;

pub use hooks::{Action, ActionEvent, HookContext, HookFlow, HookRegistry};
pub use messages::{Message, MessageLog};
pub use player::{AttackOutcome, InteractOutcome, PlayerController};
pub use world::{LoadSummary, World, WorldBuilder};
