pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use types::{Category, Cell, Direction, Footprint, GridSize, LifecycleState};
