//! Piece Catalog
//!
//! The list of buildable pieces, loaded from and saved to JSON. This is the
//! serialized anchor data both the runtime and the `snap_inspect` authoring
//! tool work on.
//!
//! ```json
//! { "pieces": [ { "name": "Foundation", "category": "Foundation", "anchors": [ ... ] } ] }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::definition::PieceDefinition;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read or write catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("piece #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("duplicate piece name '{0}'")]
    DuplicateName(String),
    #[error("piece '{piece}' anchor #{index} has a non-finite position")]
    NonFiniteAnchor { piece: String, index: usize },
    #[error("piece '{piece}' has a negative {resource} cost")]
    NegativeCost { piece: String, resource: String },
    #[error("no piece named '{0}'")]
    UnknownPiece(String),
}

#[derive(Serialize, Deserialize)]
struct CatalogFile {
    pieces: Vec<PieceDefinition>,
}

/// Ordered, validated set of piece definitions.
#[derive(Debug, Clone, Default)]
pub struct PieceCatalog {
    pieces: Vec<Arc<PieceDefinition>>,
}

impl PieceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: Vec<PieceDefinition>) -> Result<Self, CatalogError> {
        validate(&definitions)?;
        for def in &definitions {
            if def.anchors.is_empty() {
                warn!(piece = %def.name, "[Catalog] Piece has no anchors, it can only be placed freely");
            }
            for (index, anchor) in def.anchors.iter().enumerate() {
                if anchor.lock_rotation && !(anchor.rotation_step > 0.0) {
                    warn!(piece = %def.name, index, step = anchor.rotation_step, "[Catalog] Locked anchor has no usable rotation step, yaw will not be quantized");
                }
            }
        }
        Ok(Self {
            pieces: definitions.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_definitions(file.pieces)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let catalog = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        info!(path = %path.display(), pieces = catalog.len(), "[Catalog] Loaded");
        Ok(catalog)
    }

    pub fn to_json_string(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            pieces: self.pieces.iter().map(|p| PieceDefinition::clone(p)).collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<PieceDefinition>> {
        self.pieces.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.pieces.iter().position(|p| p.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&Arc<PieceDefinition>> {
        self.index_of(name).and_then(|i| self.pieces.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PieceDefinition>> {
        self.pieces.iter()
    }

    /// Append a definition, re-validating the whole catalog.
    pub fn push(&mut self, definition: PieceDefinition) -> Result<(), CatalogError> {
        let mut all: Vec<PieceDefinition> = self.pieces.iter().map(|p| PieceDefinition::clone(p)).collect();
        all.push(definition);
        validate(&all)?;
        self.pieces = all.into_iter().map(Arc::new).collect();
        Ok(())
    }

    /// Edit one definition in place. Pieces already placed keep the old one.
    pub fn update<F>(&mut self, name: &str, edit: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut PieceDefinition),
    {
        let index = self
            .index_of(name)
            .ok_or_else(|| CatalogError::UnknownPiece(name.to_string()))?;
        let mut edited = PieceDefinition::clone(&self.pieces[index]);
        edit(&mut edited);

        let mut all: Vec<PieceDefinition> = self.pieces.iter().map(|p| PieceDefinition::clone(p)).collect();
        all[index] = edited;
        validate(&all)?;
        self.pieces = all.into_iter().map(Arc::new).collect();
        Ok(())
    }
}

fn validate(definitions: &[PieceDefinition]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for (index, def) in definitions.iter().enumerate() {
        if def.name.trim().is_empty() {
            return Err(CatalogError::EmptyName { index });
        }
        if !seen.insert(def.name.as_str()) {
            return Err(CatalogError::DuplicateName(def.name.clone()));
        }
        if let Some(index) = def
            .anchors
            .iter()
            .position(|a| !a.local_position.is_finite() || !a.local_rotation.is_finite())
        {
            return Err(CatalogError::NonFiniteAnchor {
                piece: def.name.clone(),
                index,
            });
        }
        if let Some(req) = def.requirements.iter().find(|r| r.amount < 0) {
            return Err(CatalogError::NegativeCost {
                piece: def.name.clone(),
                resource: req.resource.name().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::building::PieceCategory;
    use crate::game::economy::{ResourceRequirement, ResourceType};
    use crate::game::snap::{Anchor, SnapDirection, SnapType};

    const SAMPLE: &str = r#"{
        "pieces": [
            {
                "name": "Foundation",
                "category": "Foundation",
                "requirements": [ { "resource": "Stone", "amount": 10 } ],
                "anchors": [
                    { "point_type": "FoundationTopEdge", "direction": "Up", "local_position": [0.0, 0.5, 1.0] }
                ]
            },
            { "name": "Wall", "category": "Wall" }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let catalog = PieceCatalog::from_json_str(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.index_of("Wall"), Some(1));
        let foundation = catalog.find("Foundation").unwrap();
        assert_eq!(foundation.anchors[0].point_type, SnapType::FoundationTopEdge);
        assert_eq!(foundation.requirements[0].resource, ResourceType::Stone);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let defs = vec![
            PieceDefinition::new("Wall", PieceCategory::Wall),
            PieceDefinition::new("Wall", PieceCategory::Wall),
        ];
        assert!(matches!(
            PieceCatalog::from_definitions(defs),
            Err(CatalogError::DuplicateName(name)) if name == "Wall"
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let defs = vec![PieceDefinition::new("  ", PieceCategory::Wall)];
        assert!(matches!(
            PieceCatalog::from_definitions(defs),
            Err(CatalogError::EmptyName { index: 0 })
        ));
    }

    #[test]
    fn test_negative_cost_rejected() {
        let defs = vec![PieceDefinition::new("Wall", PieceCategory::Wall)
            .with_cost(ResourceRequirement::new(ResourceType::Wood, -1))];
        assert!(matches!(
            PieceCatalog::from_definitions(defs),
            Err(CatalogError::NegativeCost { .. })
        ));
    }

    #[test]
    fn test_non_finite_anchor_rejected() {
        let defs = vec![PieceDefinition::new("Wall", PieceCategory::Wall)
            .with_anchor(Anchor::new(SnapType::WallTop, SnapDirection::Up).at(glam::Vec3::new(f32::NAN, 0.0, 0.0)))];
        assert!(matches!(
            PieceCatalog::from_definitions(defs),
            Err(CatalogError::NonFiniteAnchor { index: 0, .. })
        ));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(PieceCatalog::from_json_str("{"), Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_update_and_push() {
        let mut catalog = PieceCatalog::from_json_str(SAMPLE).unwrap();
        catalog
            .update("Wall", |def| def.anchors.push(Anchor::new(SnapType::WallBottom, SnapDirection::Down)))
            .unwrap();
        assert_eq!(catalog.find("Wall").unwrap().anchors.len(), 1);

        assert!(matches!(
            catalog.update("Roof", |_| {}),
            Err(CatalogError::UnknownPiece(_))
        ));
        assert!(catalog.push(PieceDefinition::new("Wall", PieceCategory::Wall)).is_err());
        catalog.push(PieceDefinition::new("Roof", PieceCategory::Roof)).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pieces.json");

        let catalog = PieceCatalog::from_json_str(SAMPLE).unwrap();
        catalog.save(&path).unwrap();
        let loaded = PieceCatalog::load(&path).unwrap();

        assert_eq!(loaded.len(), catalog.len());
        assert_eq!(**loaded.find("Foundation").unwrap(), **catalog.find("Foundation").unwrap());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PieceCatalog::load(dir.path().join("missing.json")),
            Err(CatalogError::Io(_))
        ));
    }
}
