//! Tileworld - tile-grid game runtime core
//!
//! Objects live on a rectangular grid of cells. The runtime keeps an
//! occupancy map of blocking cells, finds paths across it, and reconciles
//! object state against a presentation sink in create/update/remove batches.

pub mod compositing;
pub mod core;
pub mod engine;
pub mod quest;
pub mod spatial;
pub mod world;
