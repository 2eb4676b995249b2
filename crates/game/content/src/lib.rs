//! Duel content: built-in statuses, hero tables and data loaders.
//!
//! This crate houses static duel content and provides loaders for RON/TOML data files:
//! - Built-in status catalog (chi, evasive, burn, poison, icewall, fury)
//! - Hero tables implementing `HeroOracle` (data-driven via RON)
//! - Extra or overriding status definitions (data-driven via RON)
//! - Rules configuration (data-driven via TOML)
//!
//! Content is consumed by the runtime and the simulator and never appears in
//! combat state.

pub mod catalog;
pub mod heroes;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{builtin_registry, builtin_statuses, per_stack_modifier};
pub use heroes::{DefenseOption, HeroSpec, HeroTable};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, HeroLoader, StatusLoader};
