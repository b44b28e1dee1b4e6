//! Presentation sink boundary
//!
//! The sink turns create/update/remove batches into visible output. The
//! runtime never reaches into it beyond these three calls.

use uuid::Uuid;

use crate::core::types::Cell;
use crate::world::objects::{ScreenPoint, WorldObject};

/// Opaque token a sink attaches to an object it has presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresentationHandle(pub u64);

/// Consumer of compositing batches
///
/// Every call receives the whole group at once so the sink can amortize
/// its own per-batch cost.
pub trait PresentationSink {
    /// Present objects for the first time; may attach a handle to each
    fn create(&mut self, objects: &mut [&mut WorldObject]);

    /// Refresh objects that were presented before
    fn update(&mut self, objects: &mut [&mut WorldObject]);

    /// Take objects off the presentation
    fn remove(&mut self, objects: &mut [&mut WorldObject]);
}

impl<S: PresentationSink + ?Sized> PresentationSink for Box<S> {
    fn create(&mut self, objects: &mut [&mut WorldObject]) {
        (**self).create(objects);
    }

    fn update(&mut self, objects: &mut [&mut WorldObject]) {
        (**self).update(objects);
    }

    fn remove(&mut self, objects: &mut [&mut WorldObject]) {
        (**self).remove(objects);
    }
}

/// Which sink call a batch went to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkOp {
    Create,
    Update,
    Remove,
}

/// What a sink saw of one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedObject {
    pub id: String,
    pub instance: Uuid,
    pub position: Cell,
    pub screen: ScreenPoint,
    pub sprite: ScreenPoint,
    pub model: Option<String>,
    pub image: Option<String>,
    pub handle: Option<PresentationHandle>,
}

impl PresentedObject {
    fn capture(object: &WorldObject) -> Self {
        Self {
            id: object.id.clone(),
            instance: object.instance,
            position: object.position,
            screen: object.screen,
            sprite: object.sprite,
            model: object.model.as_ref().map(|m| m.name.clone()),
            image: object.model.as_ref().and_then(|m| m.image.clone()),
            handle: object.handle,
        }
    }
}

/// One batched sink call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkCall {
    pub op: SinkOp,
    pub objects: Vec<PresentedObject>,
}

impl SinkCall {
    pub fn ids(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.id.as_str()).collect()
    }
}

/// Headless sink that records every batch and hands out sequential handles
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Vec<SinkCall>,
    next_handle: u64,
    live: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    /// Calls of one kind, in dispatch order
    pub fn calls_of(&self, op: SinkOp) -> impl Iterator<Item = &SinkCall> {
        self.calls.iter().filter(move |c| c.op == op)
    }

    pub fn last_call(&self) -> Option<&SinkCall> {
        self.calls.last()
    }

    /// Objects currently presented
    pub fn live(&self) -> usize {
        self.live
    }

    /// Forget recorded calls, keeping handle numbering
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, op: SinkOp, objects: &[&mut WorldObject]) {
        self.calls.push(SinkCall {
            op,
            objects: objects.iter().map(|o| PresentedObject::capture(o)).collect(),
        });
    }
}

impl PresentationSink for RecordingSink {
    fn create(&mut self, objects: &mut [&mut WorldObject]) {
        for object in objects.iter_mut() {
            self.next_handle += 1;
            object.handle = Some(PresentationHandle(self.next_handle));
        }
        self.live += objects.len();
        self.record(SinkOp::Create, objects);
    }

    fn update(&mut self, objects: &mut [&mut WorldObject]) {
        self.record(SinkOp::Update, objects);
    }

    fn remove(&mut self, objects: &mut [&mut WorldObject]) {
        self.record(SinkOp::Remove, objects);
        for object in objects.iter_mut() {
            if object.handle.take().is_some() {
                self.live = self.live.saturating_sub(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Category, GridSize};
    use crate::world::model::ModelDescriptor;
    use std::sync::Arc;

    fn object(id: &str) -> WorldObject {
        let model = Arc::new(ModelDescriptor::new("rock", Category::Object, GridSize::new(1, 1), true));
        WorldObject::new(id, model, Cell::new(0, 0))
    }

    #[test]
    fn test_create_attaches_handles() {
        let mut sink = RecordingSink::new();
        let mut a = object("a");
        let mut b = object("b");

        sink.create(&mut [&mut a, &mut b]);

        assert_eq!(a.handle, Some(PresentationHandle(1)));
        assert_eq!(b.handle, Some(PresentationHandle(2)));
        assert_eq!(sink.live(), 2);
        assert_eq!(sink.calls()[0].ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_detaches_handles() {
        let mut sink = RecordingSink::new();
        let mut a = object("a");
        sink.create(&mut [&mut a]);

        sink.remove(&mut [&mut a]);

        assert!(a.handle.is_none());
        assert_eq!(sink.live(), 0);
        let removed = sink.calls_of(SinkOp::Remove).next().unwrap();
        assert_eq!(removed.objects[0].handle, Some(PresentationHandle(1)));
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let mut sink: Box<RecordingSink> = Box::new(RecordingSink::new());
        let mut a = object("a");
        PresentationSink::update(&mut sink, &mut [&mut a]);
        assert_eq!(sink.calls().len(), 1);
        assert_eq!(sink.calls()[0].op, SinkOp::Update);
    }
}
