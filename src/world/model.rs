//! Model descriptors and the catalog that serves them
//!
//! A model is the shared, immutable definition of an object type: its size
//! in cells, whether it blocks movement, its category and sprite animations.
//! Objects hold an `Arc` to their model; nothing in the runtime mutates one.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::types::{Category, Cell, Footprint, GridSize};

/// Sprite animation played by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    /// Frame count in the sprite row
    pub frames: u32,
    /// Length of one full cycle in milliseconds
    pub duration: u64,
    /// 1-based sprite row
    #[serde(default = "default_spritemap")]
    pub spritemap: u32,
    #[serde(default)]
    pub repeat: bool,
}

fn default_spritemap() -> u32 {
    1
}

impl Animation {
    /// 1-based frame shown `elapsed_ms` after the animation started
    ///
    /// Returns `None` once a non-repeating animation has run past its last frame.
    pub fn frame_at(&self, elapsed_ms: u64) -> Option<u32> {
        if self.frames == 0 || self.duration == 0 {
            return None;
        }
        if !self.repeat && elapsed_ms >= self.duration {
            return None;
        }
        let within_cycle = elapsed_ms % self.duration;
        let frame = (within_cycle * self.frames as u64 / self.duration) as u32 + 1;
        Some(frame.min(self.frames))
    }

    /// Pixel offset of a frame inside the sprite sheet
    pub fn sprite_offset(&self, frame: u32, size: GridSize, tile_size: u32) -> (i64, i64) {
        let tile = tile_size as i64;
        (
            -((frame.saturating_sub(1)) as i64 * size.x as i64 * tile),
            -((self.spritemap.saturating_sub(1)) as i64 * size.y as i64 * tile),
        )
    }
}

/// Shared definition of an object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Category,
    #[serde(default)]
    pub size: GridSize,
    #[serde(default)]
    pub blocking: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub animations: BTreeMap<String, Animation>,
    #[serde(default, rename = "defaultAnimation", alias = "default_animation")]
    pub default_animation: Option<String>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, kind: Category, size: GridSize, blocking: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            blocking,
            image: None,
            animations: BTreeMap::new(),
            default_animation: None,
        }
    }

    pub fn with_animation(mut self, name: impl Into<String>, animation: Animation) -> Self {
        self.animations.insert(name.into(), animation);
        self
    }

    /// Cells covered when the model's top-left corner sits at `position`
    pub fn footprint_at(&self, position: Cell) -> Footprint {
        Footprint::new(position, self.size)
    }
}

/// Lookup of models by name
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: AHashMap<String, Arc<ModelDescriptor>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a model, returning the shared handle
    pub fn insert(&mut self, model: ModelDescriptor) -> Arc<ModelDescriptor> {
        let model = Arc::new(model);
        self.models.insert(model.name.clone(), Arc::clone(&model));
        model
    }

    pub fn get(&self, name: &str) -> Option<Arc<ModelDescriptor>> {
        self.models.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Prefix every model image with a base path
    pub fn rebase_images(&mut self, base: &str) {
        for model in self.models.values_mut() {
            if let Some(image) = &model.image {
                let rebased = format!("{}/{}", base.trim_end_matches('/'), image);
                Arc::make_mut(model).image = Some(rebased);
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FromIterator<ModelDescriptor> for ModelCatalog {
    fn from_iter<I: IntoIterator<Item = ModelDescriptor>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for model in iter {
            catalog.insert(model);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk() -> Animation {
        Animation {
            frames: 4,
            duration: 1000,
            spritemap: 2,
            repeat: true,
        }
    }

    #[test]
    fn test_frame_at_cycles() {
        let anim = walk();
        assert_eq!(anim.frame_at(0), Some(1));
        assert_eq!(anim.frame_at(249), Some(1));
        assert_eq!(anim.frame_at(250), Some(2));
        assert_eq!(anim.frame_at(999), Some(4));
        assert_eq!(anim.frame_at(1000), Some(1));
    }

    #[test]
    fn test_non_repeating_animation_ends() {
        let anim = Animation {
            repeat: false,
            ..walk()
        };
        assert_eq!(anim.frame_at(500), Some(3));
        assert_eq!(anim.frame_at(1000), None);
    }

    #[test]
    fn test_degenerate_animation_has_no_frames() {
        let anim = Animation {
            frames: 0,
            ..walk()
        };
        assert_eq!(anim.frame_at(10), None);
    }

    #[test]
    fn test_sprite_offset() {
        let anim = walk();
        let offset = anim.sprite_offset(3, GridSize::new(2, 1), 30);
        assert_eq!(offset, (-120, -30));
    }

    #[test]
    fn test_deserialize_model() {
        let json = r#"{
            "name": "house",
            "type": "object",
            "size": { "x": 3, "y": 2 },
            "blocking": true,
            "image": "house.png",
            "defaultAnimation": "smoke",
            "animations": {
                "smoke": { "frames": 5, "duration": 1000, "repeat": true }
            }
        }"#;
        let model: ModelDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(model.kind, Category::Object);
        assert_eq!(model.size, GridSize::new(3, 2));
        assert!(model.blocking);
        assert_eq!(model.animations["smoke"].spritemap, 1);
        assert_eq!(model.default_animation.as_deref(), Some("smoke"));
    }

    #[test]
    fn test_model_defaults_to_single_cell() {
        let model: ModelDescriptor =
            serde_json::from_str(r#"{ "name": "flower", "type": "terrain" }"#).unwrap();
        assert_eq!(model.size, GridSize::new(1, 1));
        assert!(!model.blocking);
    }

    #[test]
    fn test_catalog_shares_models() {
        let mut catalog = ModelCatalog::new();
        catalog.insert(ModelDescriptor::new("rock", Category::Object, GridSize::new(1, 1), true));

        let a = catalog.get("rock").unwrap();
        let b = catalog.get("rock").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(catalog.get("tree").is_none());
    }

    #[test]
    fn test_rebase_images() {
        let mut model = ModelDescriptor::new("rock", Category::Object, GridSize::new(1, 1), true);
        model.image = Some("rock.png".into());
        let mut catalog: ModelCatalog = std::iter::once(model).collect();

        catalog.rebase_images("assets/models/");

        assert_eq!(
            catalog.get("rock").unwrap().image.as_deref(),
            Some("assets/models/rock.png")
        );
    }
}
