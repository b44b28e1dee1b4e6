//! Grid occupancy and path searches

pub mod occupancy;
pub mod pathfinding;

pub use occupancy::{OccupancyMap, OccupancyPolicy};
pub use pathfinding::{
    find_path, DistanceMetric, FullConnectivity, PathStrategy, PathStrategyKind, VelocityBiased,
};
