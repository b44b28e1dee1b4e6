//! Load model catalogs and levels from JSON
//!
//! These are setup-time operations: unlike the steady-state world API they
//! report failures as [`EngineError`].

use std::path::Path;

use crate::core::error::{EngineError, Result};
use crate::world::level::LevelData;
use crate::world::model::{ModelCatalog, ModelDescriptor};

/// Parse a JSON array of models into a catalog
pub fn catalog_from_json(json: &str) -> Result<ModelCatalog> {
    let models: Vec<ModelDescriptor> = serde_json::from_str(json)?;
    let catalog: ModelCatalog = models.into_iter().collect();
    tracing::debug!("Loaded {} models", catalog.len());
    Ok(catalog)
}

/// Load a model catalog from a JSON file on disk
pub fn load_catalog(path: &Path) -> Result<ModelCatalog> {
    let content = std::fs::read_to_string(path)?;
    catalog_from_json(&content)
}

/// Parse a level from JSON
pub fn level_from_json(json: &str) -> Result<LevelData> {
    let level: LevelData = serde_json::from_str(json)?;
    if level.size.is_degenerate() {
        return Err(EngineError::InvalidConfig(format!(
            "level size must be positive on both axes, got {}x{}",
            level.size.x, level.size.y
        )));
    }
    Ok(level)
}

/// Load a level from a JSON file on disk
pub fn load_level(path: &Path) -> Result<LevelData> {
    let content = std::fs::read_to_string(path)?;
    level_from_json(&content)
}

/// Check that every model a level refers to exists
///
/// Returns the names of the missing models; an empty list means the level
/// resolves completely.
pub fn missing_models(level: &LevelData, catalog: &ModelCatalog) -> Vec<String> {
    let mut missing: Vec<String> = level
        .objects
        .iter()
        .filter(|o| !catalog.contains(&o.model))
        .map(|o| o.model.clone())
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

/// Fail with [`EngineError::ModelNotFound`] if the level refers to unknown models
pub fn require_models(level: &LevelData, catalog: &ModelCatalog) -> Result<()> {
    let missing = missing_models(level, catalog);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(EngineError::ModelNotFound(missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Category, GridSize};

    const MODELS: &str = r#"[
        { "name": "hero", "type": "character", "blocking": true },
        { "name": "tree", "type": "object", "size": { "x": 1, "y": 2 }, "blocking": true },
        { "name": "grass", "type": "terrain" }
    ]"#;

    #[test]
    fn test_catalog_from_json() {
        let catalog = catalog_from_json(MODELS).unwrap();
        assert_eq!(catalog.len(), 3);
        let tree = catalog.get("tree").unwrap();
        assert_eq!(tree.kind, Category::Object);
        assert_eq!(tree.size, GridSize::new(1, 2));
    }

    #[test]
    fn test_catalog_rejects_malformed_json() {
        let result = catalog_from_json(r#"[{ "name": "x" }]"#);
        assert!(matches!(result, Err(EngineError::SerdeError(_))));
    }

    #[test]
    fn test_level_rejects_zero_size() {
        let result = level_from_json(r#"{ "size": { "x": 0, "y": 4 } }"#);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_models() {
        let catalog = catalog_from_json(MODELS).unwrap();
        let level = level_from_json(
            r#"{
                "size": { "x": 5, "y": 5 },
                "objects": [
                    { "model": "hero", "position": { "x": 0, "y": 0 } },
                    { "model": "dragon", "position": { "x": 1, "y": 0 } },
                    { "model": "dragon", "position": { "x": 2, "y": 0 } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(missing_models(&level, &catalog), vec!["dragon".to_string()]);
    }

    #[test]
    fn test_load_catalog_missing_file_is_io_error() {
        let result = load_catalog(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(EngineError::IoError(_))));
    }

    #[test]
    fn test_require_models_names_missing() {
        let catalog = catalog_from_json(MODELS).unwrap();
        let level = level_from_json(
            r#"{ "size": { "x": 4, "y": 4 }, "objects": [
                { "model": "dragon", "position": { "x": 0, "y": 0 } },
                { "model": "tree", "position": { "x": 1, "y": 0 } },
                { "model": "cart", "position": { "x": 2, "y": 0 } }
            ] }"#,
        )
        .unwrap();

        match require_models(&level, &catalog) {
            Err(EngineError::ModelNotFound(names)) => assert_eq!(names, "cart, dragon"),
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
    }
}
