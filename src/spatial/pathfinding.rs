//! A* pathfinding over the tile grid
//!
//! Two strategies share the [`PathStrategy`] seam:
//! - [`VelocityBiased`]: only expands cells that lead toward the goal and
//!   slides to the opposite neighbor when the preferred one is blocked.
//!   Cheap, straight-leaning movement for NPCs. This is the default.
//! - [`FullConnectivity`]: textbook A* over all four neighbors.
//!
//! Both return the cells from start to goal inclusive, or an empty path
//! when start equals goal or no path exists.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::types::{Cell, Direction, GridSize};
use crate::spatial::occupancy::OccupancyMap;

/// Distance used for both the accumulated cost and the heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Manhattan,
    Chebyshev,
}

impl DistanceMetric {
    #[inline]
    pub fn distance(self, a: Cell, b: Cell) -> u32 {
        match self {
            DistanceMetric::Manhattan => a.manhattan(&b),
            DistanceMetric::Chebyshev => a.chebyshev(&b),
        }
    }
}

/// Selects a strategy from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStrategyKind {
    #[default]
    VelocityBiased,
    FullConnectivity,
}

impl PathStrategyKind {
    pub fn build(self, metric: DistanceMetric) -> Box<dyn PathStrategy> {
        match self {
            PathStrategyKind::VelocityBiased => Box::new(VelocityBiased::new(metric)),
            PathStrategyKind::FullConnectivity => Box::new(FullConnectivity::new(metric)),
        }
    }
}

/// A pathfinding algorithm over a read-only occupancy map
pub trait PathStrategy {
    /// Cells from `start` to `goal` inclusive; empty if none
    fn find_path(&self, start: Cell, goal: Cell, map: &OccupancyMap, world_size: GridSize)
        -> Vec<Cell>;

    fn name(&self) -> &'static str;
}

/// Find a path with the default velocity-biased strategy and Manhattan metric
pub fn find_path(start: Cell, goal: Cell, map: &OccupancyMap, world_size: GridSize) -> Vec<Cell> {
    VelocityBiased::default().find_path(start, goal, map, world_size)
}

#[inline]
fn is_passable(cell: Cell, map: &OccupancyMap, world_size: GridSize) -> bool {
    world_size.contains(cell) && !map.is_blocked(cell)
}

/// Entry in the node arena; parents are arena indices
#[derive(Debug, Clone)]
struct SearchNode {
    cell: Cell,
    parent: Option<usize>,
    g: u32,
    f: u32,
}

fn reconstruct(nodes: &[SearchNode], mut current: usize) -> Vec<Cell> {
    let mut path = vec![nodes[current].cell];
    while let Some(parent) = nodes[current].parent {
        path.push(nodes[parent].cell);
        current = parent;
    }
    path.reverse();
    path
}

/// Goal-directed A* with at most two successors per expansion
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityBiased {
    metric: DistanceMetric,
}

impl VelocityBiased {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    /// Pick the neighbor along one axis
    ///
    /// `toward_negative` and `toward_positive` are the decreasing and
    /// increasing neighbors on that axis.
    fn axis_successor(
        velocity: i32,
        toward_negative: Cell,
        toward_positive: Cell,
        passable: impl Fn(Cell) -> bool,
    ) -> Option<Cell> {
        let (preferred, fallback) = match velocity.cmp(&0) {
            Ordering::Less => (toward_negative, toward_positive),
            Ordering::Greater => (toward_positive, toward_negative),
            Ordering::Equal => return None,
        };
        if passable(preferred) {
            Some(preferred)
        } else if passable(fallback) {
            Some(fallback)
        } else {
            None
        }
    }

    /// Vertical candidate first, then horizontal
    fn successors(
        cell: Cell,
        velocity: Cell,
        map: &OccupancyMap,
        world_size: GridSize,
    ) -> [Option<Cell>; 2] {
        let passable = |c: Cell| is_passable(c, map, world_size);
        [
            Self::axis_successor(
                velocity.y,
                cell.step(Direction::Up),
                cell.step(Direction::Down),
                passable,
            ),
            Self::axis_successor(
                velocity.x,
                cell.step(Direction::Left),
                cell.step(Direction::Right),
                passable,
            ),
        ]
    }
}

impl PathStrategy for VelocityBiased {
    fn find_path(
        &self,
        start: Cell,
        goal: Cell,
        map: &OccupancyMap,
        world_size: GridSize,
    ) -> Vec<Cell> {
        if start == goal || !world_size.contains(start) || !world_size.contains(goal) {
            return Vec::new();
        }

        let columns = world_size.x;
        let goal_key = goal.linear_index(columns);
        // Fixed for the whole search
        let velocity = goal - start;

        let mut nodes = vec![SearchNode {
            cell: start,
            parent: None,
            g: 0,
            f: self.metric.distance(start, goal),
        }];
        let mut open: Vec<usize> = vec![0];
        let mut visited: AHashSet<i64> = AHashSet::new();
        visited.insert(start.linear_index(columns));

        while !open.is_empty() {
            // Linear scan; ties go to the earliest inserted node
            let Some(slot) = open
                .iter()
                .enumerate()
                .min_by_key(|&(_, &index)| nodes[index].f)
                .map(|(slot, _)| slot)
            else {
                break;
            };
            let current = open.remove(slot);
            let cell = nodes[current].cell;

            if cell.linear_index(columns) == goal_key {
                return reconstruct(&nodes, current);
            }

            for next in Self::successors(cell, velocity, map, world_size)
                .into_iter()
                .flatten()
            {
                if !visited.insert(next.linear_index(columns)) {
                    continue;
                }
                let g = nodes[current].g + self.metric.distance(cell, next);
                nodes.push(SearchNode {
                    cell: next,
                    parent: Some(current),
                    g,
                    f: g + self.metric.distance(next, goal),
                });
                open.push(nodes.len() - 1);
            }
        }

        Vec::new()
    }

    fn name(&self) -> &'static str {
        "velocity-biased"
    }
}

/// Node in the binary-heap open set
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeapNode {
    cell: Cell,
    f_cost: u32,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other.f_cost.cmp(&self.f_cost)
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over every passable 4-neighbor
#[derive(Debug, Clone, Copy, Default)]
pub struct FullConnectivity {
    metric: DistanceMetric,
}

impl FullConnectivity {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }
}

impl PathStrategy for FullConnectivity {
    fn find_path(
        &self,
        start: Cell,
        goal: Cell,
        map: &OccupancyMap,
        world_size: GridSize,
    ) -> Vec<Cell> {
        if start == goal || !world_size.contains(start) || !world_size.contains(goal) {
            return Vec::new();
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: AHashMap<Cell, Cell> = AHashMap::new();
        let mut g_scores: AHashMap<Cell, u32> = AHashMap::new();

        g_scores.insert(start, 0);
        open_set.push(HeapNode {
            cell: start,
            f_cost: self.metric.distance(start, goal),
        });

        while let Some(current) = open_set.pop() {
            if current.cell == goal {
                let mut path = vec![goal];
                let mut cursor = goal;
                while let Some(&prev) = came_from.get(&cursor) {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                return path;
            }

            let current_g = g_scores.get(&current.cell).copied().unwrap_or(u32::MAX);

            for direction in Direction::ALL {
                let neighbor = current.cell.step(direction);
                if !is_passable(neighbor, map, world_size) {
                    continue;
                }

                let tentative_g = current_g.saturating_add(1);
                let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(u32::MAX);

                if tentative_g < neighbor_g {
                    came_from.insert(neighbor, current.cell);
                    g_scores.insert(neighbor, tentative_g);
                    open_set.push(HeapNode {
                        cell: neighbor,
                        f_cost: tentative_g + self.metric.distance(neighbor, goal),
                    });
                }
            }
        }

        Vec::new()
    }

    fn name(&self) -> &'static str {
        "full-connectivity"
    }
}
