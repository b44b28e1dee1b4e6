//! Three-way compositing of object batches
//!
//! Each object in a batch is classified on its own:
//! - `Removed` goes to the remove group (removal wins over everything)
//! - `Fresh`, or settled without a handle, goes to the create group
//! - `Dirty`, or settled with a handle, goes to the update group
//!
//! Objects without a model are skipped. Non-empty groups are dispatched
//! once each, creates before updates before removes, and every dispatched
//! object is settled afterwards.

use crate::compositing::sink::PresentationSink;
use crate::core::types::LifecycleState;
use crate::world::objects::{ScreenPoint, WorldObject};

/// Group an object falls into for one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOp {
    Create,
    Update,
    Remove,
}

/// Classify an object, or `None` if it must be skipped
pub fn classify(object: &WorldObject) -> Option<CompositeOp> {
    object.model.as_ref()?;
    let op = match object.state() {
        LifecycleState::Removed => CompositeOp::Remove,
        LifecycleState::Fresh => CompositeOp::Create,
        LifecycleState::Dirty => CompositeOp::Update,
        LifecycleState::Settled if object.handle.is_some() => CompositeOp::Update,
        LifecycleState::Settled => CompositeOp::Create,
    };
    Some(op)
}

/// Counts from one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositeSummary {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub skipped: usize,
}

impl CompositeSummary {
    pub fn dispatched(&self) -> usize {
        self.created + self.updated + self.removed
    }
}

impl std::ops::AddAssign for CompositeSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.created += rhs.created;
        self.updated += rhs.updated;
        self.removed += rhs.removed;
        self.skipped += rhs.skipped;
    }
}

/// Stateless batch classifier and dispatcher
#[derive(Debug, Clone, Copy)]
pub struct CompositingPipeline {
    tile_size: u32,
}

impl Default for CompositingPipeline {
    fn default() -> Self {
        Self::new(30)
    }
}

impl CompositingPipeline {
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn screen_point(&self, object: &WorldObject) -> ScreenPoint {
        let tile = self.tile_size as i64;
        ScreenPoint {
            left: object.position.x as i64 * tile,
            top: object.position.y as i64 * tile,
        }
    }

    /// Sheet offset of the playing frame; the first frame otherwise
    fn sprite_point(&self, object: &WorldObject) -> ScreenPoint {
        let Some(model) = &object.model else {
            return ScreenPoint::default();
        };
        let animation = object
            .animation
            .as_ref()
            .and_then(|name| model.animations.get(name));
        match animation {
            Some(animation) => {
                let (left, top) = animation.sprite_offset(object.frame, model.size, self.tile_size);
                ScreenPoint { left, top }
            }
            None => ScreenPoint::default(),
        }
    }

    /// Classify and dispatch a batch
    pub fn execute<S: PresentationSink + ?Sized>(
        &self,
        sink: &mut S,
        objects: &mut [&mut WorldObject],
    ) -> CompositeSummary {
        let mut create: Vec<&mut WorldObject> = Vec::new();
        let mut update: Vec<&mut WorldObject> = Vec::new();
        let mut remove: Vec<&mut WorldObject> = Vec::new();
        let mut summary = CompositeSummary::default();

        for object in objects.iter_mut() {
            let object: &mut WorldObject = object;
            let Some(op) = classify(object) else {
                tracing::debug!("Skipping object {} without a model", object.id);
                summary.skipped += 1;
                continue;
            };
            object.screen = self.screen_point(object);
            object.sprite = self.sprite_point(object);
            match op {
                CompositeOp::Create => create.push(object),
                CompositeOp::Update => update.push(object),
                CompositeOp::Remove => remove.push(object),
            }
        }

        summary.created = create.len();
        summary.updated = update.len();
        summary.removed = remove.len();

        if !create.is_empty() {
            sink.create(&mut create);
        }
        if !update.is_empty() {
            sink.update(&mut update);
        }
        if !remove.is_empty() {
            sink.remove(&mut remove);
        }

        for object in create.into_iter().chain(update) {
            object.set_state(LifecycleState::Settled);
        }

        summary
    }

    /// Single-object pass
    pub fn execute_one<S: PresentationSink + ?Sized>(
        &self,
        sink: &mut S,
        object: &mut WorldObject,
    ) -> CompositeSummary {
        self.execute(sink, &mut [object])
    }
}
