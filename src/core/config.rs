//! Engine configuration
//!
//! Every tunable the runtime reads lives here. Values can be built in code
//! or loaded from a TOML file; missing keys fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{EngineError, Result};
use crate::core::types::GridSize;
use crate::spatial::occupancy::OccupancyPolicy;
use crate::spatial::pathfinding::{DistanceMetric, PathStrategyKind};

/// Configuration for a [`World`](crate::engine::World)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === GRID ===
    /// World dimensions in cells
    ///
    /// Replaced by the level's own size on `load_level`.
    pub world_size: GridSize,

    /// Pixel edge length of one tile
    ///
    /// Only used to compute the screen offsets handed to the sink.
    pub tile_size: u32,

    // === OCCUPANCY ===
    /// Id of the character that never contributes occupancy
    pub player_id: String,

    /// How overlapping blockers are tracked
    pub occupancy_policy: OccupancyPolicy,

    // === PATHFINDING ===
    pub path_strategy: PathStrategyKind,
    pub distance_metric: DistanceMetric,

    // === MESSAGES ===
    /// Maximum number of entries kept in the message log
    pub message_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_size: GridSize::new(20, 10),
            tile_size: 30,
            player_id: "player".to_string(),
            occupancy_policy: OccupancyPolicy::default(),
            path_strategy: PathStrategyKind::default(),
            distance_metric: DistanceMetric::default(),
            message_capacity: 50,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.world_size.is_degenerate() {
            return Err(EngineError::InvalidConfig(format!(
                "world_size must be positive on both axes, got {}x{}",
                self.world_size.x, self.world_size.y
            )));
        }

        if self.tile_size == 0 {
            return Err(EngineError::InvalidConfig("tile_size must be > 0".into()));
        }

        if self.player_id.is_empty() {
            return Err(EngineError::InvalidConfig("player_id must not be empty".into()));
        }

        if self.message_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "message_capacity must be > 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world_size, GridSize::new(20, 10));
        assert_eq!(config.player_id, "player");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            tile_size = 16
            occupancy_policy = "counted"

            [world_size]
            x = 40
            y = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.tile_size, 16);
        assert_eq!(config.world_size, GridSize::new(40, 30));
        assert_eq!(config.occupancy_policy, OccupancyPolicy::Counted);
        assert_eq!(config.player_id, "player");
        assert_eq!(config.path_strategy, PathStrategyKind::VelocityBiased);
    }

    #[test]
    fn test_rejects_degenerate_world() {
        let result = EngineConfig::from_toml_str("[world_size]\nx = 0\ny = 5\n");
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_empty_player_id() {
        let config = EngineConfig {
            player_id: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = EngineConfig::from_toml_str("tile_size = \"big\"");
        assert!(matches!(result, Err(EngineError::TomlError(_))));
    }
}
