//! Hero table loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::heroes::{HeroSpec, HeroTable};
use crate::loaders::{LoadResult, read_file};

/// Hero catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroCatalog {
    pub heroes: Vec<HeroSpec>,
}

/// Loader for hero tables from RON files.
pub struct HeroLoader;

impl HeroLoader {
    /// Load a hero table from a RON file.
    pub fn load(path: &Path) -> LoadResult<HeroTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<HeroTable> {
        let catalog: HeroCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse hero catalog RON: {}", e))?;

        for hero in &catalog.heroes {
            if hero.profile.max_hp <= 0 {
                anyhow::bail!("Hero {} has non-positive max_hp", hero.profile.id);
            }
        }

        Ok(HeroTable::new(catalog.heroes))
    }
}
