//! Chunk manager settings, loadable from JSON

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::voxel::{VisibilityPolicy, VoxelGrid};

/// How chunk terrain is turned into quads
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshMode {
    /// One quad per visible face, with view caps
    #[default]
    PerVoxel,
    /// Coplanar faces merged into rectangles
    Greedy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub mesh_mode: MeshMode,
    /// Cull and remesh chunks on the rayon pool
    pub parallel_update: bool,
    pub policy: VisibilityPolicy,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            mesh_mode: MeshMode::PerVoxel,
            parallel_update: true,
            policy: VisibilityPolicy::default(),
        }
    }
}

impl ChunkConfig {
    /// Install the configured policy on `grid` and rebuild its visible faces
    pub fn apply_policy(&self, grid: &mut VoxelGrid) {
        if *grid.policy() != self.policy {
            grid.set_policy(self.policy);
            grid.compute_all_visible_faces();
        }
    }

    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chunks.json");
        let config = ChunkConfig {
            mesh_mode: MeshMode::Greedy,
            parallel_update: false,
            policy: VisibilityPolicy { water_opaque: false, ..Default::default() },
        };

        config.save_sync(&path).unwrap();
        assert_eq!(ChunkConfig::load_sync(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        std::fs::write(&path, r#"{ "mesh_mode": "greedy" }"#).unwrap();

        let config = ChunkConfig::load_sync(&path).unwrap();
        assert_eq!(config.mesh_mode, MeshMode::Greedy);
        assert!(config.parallel_update);
        assert_eq!(config.policy, VisibilityPolicy::default());
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        std::fs::write(&path, "{ mesh_mode").unwrap();

        assert!(matches!(ChunkConfig::load_sync(&path), Err(Error::Config(_))));
        assert!(matches!(
            ChunkConfig::load_sync(&dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
