//! JSON schema types for level data
//!
//! A level names its size and lists the objects to place. Object entries
//! refer to models by name; the world resolves them against its catalog.

use serde::{Deserialize, Serialize};

use crate::core::types::{Cell, GridSize};
use crate::quest::Quest;
use crate::world::objects::ObjectEvent;

/// Root structure of a level file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LevelData {
    #[serde(default)]
    pub name: Option<String>,
    /// World dimensions in cells
    pub size: GridSize,
    /// Objects in placement order
    #[serde(default)]
    pub objects: Vec<LevelObject>,
    #[serde(default)]
    pub quests: Vec<Quest>,
}

/// A single placed object
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LevelObject {
    /// Generated as `<category>-<n>` when absent
    #[serde(default)]
    pub id: Option<String>,
    /// Model name in the catalog
    pub model: String,
    pub position: Cell,
    #[serde(default)]
    pub name: Option<String>,
    /// Overrides the model's default animation
    #[serde(default)]
    pub animation: Option<String>,
    #[serde(default)]
    pub events: Vec<ObjectEvent>,
    #[serde(default)]
    pub victim: bool,
}

impl LevelObject {
    pub fn new(model: impl Into<String>, position: Cell) -> Self {
        Self {
            id: None,
            model: model.into(),
            position,
            name: None,
            animation: None,
            events: Vec::new(),
            victim: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_events(mut self, events: Vec<ObjectEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn as_victim(mut self) -> Self {
        self.victim = true;
        self
    }
}
