//! Content factory for building duel content from data files.

use std::path::{Path, PathBuf};

use duel_core::{RulesConfig, StatusDefinition, StatusRegistry};

use crate::catalog::builtin_registry;
use crate::heroes::HeroTable;
use crate::loaders::{ConfigLoader, HeroLoader, LoadResult, StatusLoader};

/// Content factory that loads all duel content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── statuses.ron
/// └── heroes.ron
/// ```
///
/// Every file is optional: a missing file falls back to the built-in content.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Data shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load rules configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<RulesConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(RulesConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load extra status definitions from `statuses.ron`.
    pub fn load_statuses(&self) -> LoadResult<Vec<StatusDefinition>> {
        let path = self.data_dir.join("statuses.ron");
        if !path.exists() {
            return Ok(Vec::new());
        }
        StatusLoader::load(&path)
    }

    /// Built-in statuses overlaid with `statuses.ron`.
    pub fn build_registry(&self) -> LoadResult<StatusRegistry> {
        let mut registry = builtin_registry();
        for definition in self.load_statuses()? {
            registry.define_status(definition);
        }
        Ok(registry)
    }

    /// Load the hero table from `heroes.ron`.
    pub fn load_heroes(&self) -> LoadResult<HeroTable> {
        let path = self.data_dir.join("heroes.ron");
        if !path.exists() {
            return Ok(HeroTable::builtin());
        }
        HeroLoader::load(&path)
    }
}
