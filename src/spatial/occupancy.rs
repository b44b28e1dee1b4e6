//! Occupancy ("hitmap") index of blocked grid cells
//!
//! A pure spatial index: it knows nothing about objects, categories or the
//! player. Callers decide which footprints get marked.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Cell, Footprint};

/// How overlapping blockers are tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyPolicy {
    /// Marking sets a cell, clearing unsets it regardless of other blockers
    #[default]
    Overwrite,
    /// Each mark adds a blocker; a cell stays blocked until every blocker cleared it
    Counted,
}

/// Sparse map from cell to blocking state
#[derive(Debug, Clone, Default)]
pub struct OccupancyMap {
    cells: AHashMap<Cell, u32>,
    policy: OccupancyPolicy,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: OccupancyPolicy) -> Self {
        Self {
            cells: AHashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> OccupancyPolicy {
        self.policy
    }

    /// Set every cell of the footprint to `blocking`
    ///
    /// Zero-size footprints are ignored.
    pub fn mark(&mut self, footprint: Footprint, blocking: bool) {
        if footprint.is_empty() {
            return;
        }
        for cell in footprint.cells() {
            self.set(cell, blocking);
        }
    }

    pub fn clear(&mut self, footprint: Footprint) {
        self.mark(footprint, false);
    }

    /// Set a single cell
    pub fn set(&mut self, cell: Cell, blocking: bool) {
        match (self.policy, blocking) {
            (OccupancyPolicy::Overwrite, true) => {
                self.cells.insert(cell, 1);
            }
            (OccupancyPolicy::Overwrite, false) => {
                self.cells.remove(&cell);
            }
            (OccupancyPolicy::Counted, true) => {
                *self.cells.entry(cell).or_insert(0) += 1;
            }
            (OccupancyPolicy::Counted, false) => {
                if let Some(count) = self.cells.get_mut(&cell) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        self.cells.remove(&cell);
                    }
                }
            }
        }
    }

    #[inline]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.cells.get(&cell).is_some_and(|&count| count > 0)
    }

    /// Number of blockers covering a cell (0 or 1 under `Overwrite`)
    pub fn blockers(&self, cell: Cell) -> u32 {
        self.cells.get(&cell).copied().unwrap_or(0)
    }

    pub fn blocked_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.keys().copied()
    }

    /// Drop every entry
    pub fn reset(&mut self) {
        self.cells.clear();
    }

    /// Number of blocked cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
