//! Live world objects
//!
//! A `WorldObject` is one placed instance of a model. Its lifecycle state is
//! only moved by the world and the compositing pipeline.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::compositing::sink::PresentationHandle;
use crate::core::types::{Category, Cell, Footprint, LifecycleState};
use crate::world::model::ModelDescriptor;

/// Kind of interaction an event answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Dialog,
    Attack,
    #[serde(other)]
    Other,
}

/// One entry of an object's interaction script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub message: String,
}

impl ObjectEvent {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Pixel position handed to the sink, derived from the cell and tile size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub left: i64,
    pub top: i64,
}

/// A placed instance of a model
#[derive(Debug, Clone)]
pub struct WorldObject {
    pub id: String,
    /// Unique per spawn, even when an id string is reused
    pub instance: Uuid,
    pub category: Category,
    pub position: Cell,
    /// `None` only for malformed entries; the pipeline skips them
    pub model: Option<Arc<ModelDescriptor>>,
    /// Display name used as message sender
    pub name: Option<String>,
    pub animation: Option<String>,
    /// Current 1-based animation frame
    pub frame: u32,
    /// Time spent in the current animation
    pub animation_clock: u64,
    pub events: Vec<ObjectEvent>,
    event_cursor: usize,
    /// Destroyed when attacked
    pub victim: bool,
    /// Attached by the sink on create
    pub handle: Option<PresentationHandle>,
    pub screen: ScreenPoint,
    /// Offset of the current frame inside the model's sprite sheet
    pub sprite: ScreenPoint,
    state: LifecycleState,
}

impl WorldObject {
    pub fn new(id: impl Into<String>, model: Arc<ModelDescriptor>, position: Cell) -> Self {
        let animation = model.default_animation.clone();
        Self {
            id: id.into(),
            instance: Uuid::new_v4(),
            category: model.kind,
            position,
            model: Some(model),
            name: None,
            animation,
            frame: 1,
            animation_clock: 0,
            events: Vec::new(),
            event_cursor: 0,
            victim: false,
            handle: None,
            screen: ScreenPoint::default(),
            sprite: ScreenPoint::default(),
            state: LifecycleState::Fresh,
        }
    }

    /// Object without a model; the compositing pipeline never dispatches it
    pub fn unmodeled(id: impl Into<String>, category: Category, position: Cell) -> Self {
        Self {
            id: id.into(),
            instance: Uuid::new_v4(),
            category,
            position,
            model: None,
            name: None,
            animation: None,
            frame: 1,
            animation_clock: 0,
            events: Vec::new(),
            event_cursor: 0,
            victim: false,
            handle: None,
            screen: ScreenPoint::default(),
            sprite: ScreenPoint::default(),
            state: LifecycleState::Fresh,
        }
    }

    pub fn with_events(mut self, events: Vec<ObjectEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn with_victim(mut self, victim: bool) -> Self {
        self.victim = victim;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: LifecycleState) {
        self.state = state;
    }

    /// Covered cells, if the object has a model
    pub fn footprint(&self) -> Option<Footprint> {
        self.model.as_ref().map(|m| m.footprint_at(self.position))
    }

    pub fn covers(&self, cell: Cell) -> bool {
        self.footprint().is_some_and(|fp| fp.contains(cell))
    }

    /// Whether the object belongs in the occupancy map
    pub fn is_blocking(&self) -> bool {
        !self.category.is_terrain() && self.model.as_ref().is_some_and(|m| m.blocking)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn event_cursor(&self) -> usize {
        self.event_cursor
    }

    /// Fire the current event if it is of `kind`
    ///
    /// The cursor wraps to the first event once it runs past the end. It only
    /// advances when the current event matched.
    pub fn fire_event(&mut self, kind: EventKind) -> Option<ObjectEvent> {
        if self.events.is_empty() {
            return None;
        }
        if self.event_cursor >= self.events.len() {
            self.event_cursor = 0;
        }
        let event = &self.events[self.event_cursor];
        if event.kind != kind {
            return None;
        }
        let fired = event.clone();
        self.event_cursor += 1;
        Some(fired)
    }
}
