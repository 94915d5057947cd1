//! Scene and catalogue files.
//!
//! A scene names the spawning configuration, the terrain, the placed
//! spawners and the connected players. The catalogue is a JSON array of
//! templates, re-read on every rebuild.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use engine_component::SpawnerComponent;
use engine_math::{IVec3, Vec3};
use engine_spawning::{CatalogueError, SpawnConfig, Template, TemplateCatalogue};
use serde::Deserialize;

use crate::clock::DEFAULT_DAY_LENGTH_MS;

/// A spawner placed in the scene.
#[derive(Debug, Clone, Deserialize)]
pub struct SpawnerPlacement {
    pub position: Vec3,
    pub spawner: SpawnerComponent,
    /// Items the spawner starts with, for templates that consume one.
    #[serde(default)]
    pub items: BTreeMap<String, u32>,
}

/// A player connected at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerPlacement {
    pub position: Vec3,
}

/// One block differing from the flat terrain.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockOverride {
    pub cell: IVec3,
    pub uri: String,
}

/// Everything the host needs to build a world.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub spawning: SpawnConfig,
    pub ground_level: i32,
    pub day_length_ms: u64,
    pub blocks: Vec<BlockOverride>,
    pub spawners: Vec<SpawnerPlacement>,
    pub players: Vec<PlayerPlacement>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spawning: SpawnConfig::default(),
            ground_level: 0,
            day_length_ms: DEFAULT_DAY_LENGTH_MS,
            blocks: Vec::new(),
            spawners: Vec::new(),
            players: Vec::new(),
        }
    }
}

impl SceneConfig {
    /// Read a scene from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scene {}", path.display()))
    }
}

/// Templates read from a JSON file on every listing.
#[derive(Debug, Clone)]
pub struct JsonCatalogue {
    path: PathBuf,
}

impl JsonCatalogue {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateCatalogue for JsonCatalogue {
    fn list_spawnable(&self) -> Result<Vec<Template>, CatalogueError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|err| CatalogueError::Unavailable(format!("{}: {err}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|err| CatalogueError::Malformed(format!("{}: {err}", self.path.display())))
    }
}
