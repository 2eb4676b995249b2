//! Content loaders for reading duel data from files.
//!
//! Status definitions and hero tables come from RON, rules configuration from
//! TOML. Every loader returns [`LoadResult`] and names the offending file in
//! its error.

pub mod config;
pub mod factory;
pub mod heroes;
pub mod statuses;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use heroes::{HeroCatalog, HeroLoader};
pub use statuses::{ModifierSpec, SpendSpec, StatusCatalog, StatusLoader, StatusSpec};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
