//! World objects, their models and the registry that owns them

pub mod level;
pub mod loader;
pub mod model;
pub mod objects;
pub mod registry;

pub use level::{LevelData, LevelObject};
pub use model::{Animation, ModelCatalog, ModelDescriptor};
pub use objects::{EventKind, ObjectEvent, ScreenPoint, WorldObject};
pub use registry::{Insertion, ObjectKey, ObjectRegistry, Partition};
