//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::EngineError;

/// One tile coordinate on the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Neighbor one tile away in the given direction
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Row-major index used as the node key during path searches
    #[inline]
    pub fn linear_index(&self, columns: i32) -> i64 {
        self.x as i64 + self.y as i64 * columns as i64
    }
}

impl std::ops::Add for Cell {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Cell {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Parses `"x,y"`
impl FromStr for Cell {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| EngineError::InvalidCell(s.to_string()))?;
        let x = x
            .trim()
            .parse()
            .map_err(|_| EngineError::InvalidCell(s.to_string()))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| EngineError::InvalidCell(s.to_string()))?;
        Ok(Self::new(x, y))
    }
}

/// Extent in cells, used both for world dimensions and model sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub x: i32,
    pub y: i32,
}

impl GridSize {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True if either axis is zero or negative
    pub fn is_degenerate(&self) -> bool {
        self.x <= 0 || self.y <= 0
    }

    pub fn area(&self) -> usize {
        if self.is_degenerate() {
            0
        } else {
            self.x as usize * self.y as usize
        }
    }

    /// Check whether a cell lies inside a world of this size
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.x && cell.y < self.y
    }

    /// Pull a cell onto the nearest in-bounds edge cell
    pub fn clamp(&self, cell: Cell) -> Cell {
        Cell::new(
            cell.x.min(self.x - 1).max(0),
            cell.y.min(self.y - 1).max(0),
        )
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Rectangle of cells covered by an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// Top-left cell
    pub position: Cell,
    pub size: GridSize,
}

impl Footprint {
    pub fn new(position: Cell, size: GridSize) -> Self {
        Self { position, size }
    }

    pub fn single(position: Cell) -> Self {
        Self::new(position, GridSize::new(1, 1))
    }

    /// Zero-size footprints cover nothing
    pub fn is_empty(&self) -> bool {
        self.size.is_degenerate()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        !self.is_empty()
            && cell.x >= self.position.x
            && cell.y >= self.position.y
            && cell.x < self.position.x + self.size.x
            && cell.y < self.position.y + self.size.y
    }

    /// Every covered cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let origin = self.position;
        let (width, height) = if self.is_empty() {
            (0, 0)
        } else {
            (self.size.x, self.size.y)
        };
        (0..height).flat_map(move |dy| (0..width).map(move |dx| Cell::new(origin.x + dx, origin.y + dy)))
    }
}

/// Cardinal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "top")]
    Up,
    Right,
    #[serde(alias = "bottom")]
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

/// Object category, taken from the model's `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Character,
    Item,
    Object,
    Terrain,
}

impl Category {
    /// Terrain is rendered only and never collides
    pub fn is_terrain(self) -> bool {
        matches!(self, Category::Terrain)
    }
}

/// Compositing lifecycle of a world object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Never presented
    #[default]
    Fresh,
    /// Presented, with pending changes
    Dirty,
    /// Presented and in sync with the sink
    Settled,
    /// Deleted; the next pass removes it from the sink
    Removed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, -4);
        assert_eq!(a.manhattan(&b), 7);
        assert_eq!(b.manhattan(&a), 7);
        assert_eq!(a.chebyshev(&b), 4);
    }

    #[test]
    fn test_step_directions() {
        let c = Cell::new(5, 5);
        assert_eq!(c.step(Direction::Up), Cell::new(5, 4));
        assert_eq!(c.step(Direction::Right), Cell::new(6, 5));
        assert_eq!(c.step(Direction::Down), Cell::new(5, 6));
        assert_eq!(c.step(Direction::Left), Cell::new(4, 5));
    }

    #[test]
    fn test_linear_index_is_row_major() {
        assert_eq!(Cell::new(3, 0).linear_index(10), 3);
        assert_eq!(Cell::new(0, 1).linear_index(10), 10);
        assert_eq!(Cell::new(4, 2).linear_index(10), 24);
    }

    #[test]
    fn test_clamp_to_edges() {
        let size = GridSize::new(10, 8);
        assert_eq!(size.clamp(Cell::new(-3, 4)), Cell::new(0, 4));
        assert_eq!(size.clamp(Cell::new(25, 30)), Cell::new(9, 7));
        assert_eq!(size.clamp(Cell::new(2, 2)), Cell::new(2, 2));
    }

    #[test]
    fn test_contains_bounds() {
        let size = GridSize::new(4, 4);
        assert!(size.contains(Cell::new(0, 0)));
        assert!(size.contains(Cell::new(3, 3)));
        assert!(!size.contains(Cell::new(4, 0)));
        assert!(!size.contains(Cell::new(0, -1)));
    }

    #[test]
    fn test_footprint_cells() {
        let fp = Footprint::new(Cell::new(2, 3), GridSize::new(2, 3));
        let cells: Vec<_> = fp.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Cell::new(2, 3));
        assert_eq!(cells[5], Cell::new(3, 5));
        assert!(fp.contains(Cell::new(3, 4)));
        assert!(!fp.contains(Cell::new(4, 4)));
    }

    #[test]
    fn test_zero_size_footprint_is_empty() {
        let fp = Footprint::new(Cell::new(1, 1), GridSize::new(0, 3));
        assert!(fp.is_empty());
        assert_eq!(fp.cells().count(), 0);
        assert!(!fp.contains(Cell::new(1, 1)));
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!("3,4".parse::<Cell>().unwrap(), Cell::new(3, 4));
        assert_eq!(" -1 , 7 ".parse::<Cell>().unwrap(), Cell::new(-1, 7));
        assert!("3;4".parse::<Cell>().is_err());
        assert!("a,4".parse::<Cell>().is_err());
    }

    #[test]
    fn test_direction_aliases() {
        let up: Direction = serde_json::from_str("\"top\"").unwrap();
        let down: Direction = serde_json::from_str("\"bottom\"").unwrap();
        assert_eq!(up, Direction::Up);
        assert_eq!(down, Direction::Down);
    }
}
