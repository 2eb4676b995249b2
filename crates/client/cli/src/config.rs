//! Simulator configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use duel_core::{HeroId, Side};

/// What to simulate and where to write logs.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub seed: Option<u64>,
    pub max_turns: u32,
    pub player: HeroId,
    pub ai: HeroId,
    pub first: Side,
    pub turn_pause: Duration,
    pub data_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_turns: 200,
            player: HeroId::new("monk"),
            ai: HeroId::new("pyromancer"),
            first: Side::Player,
            turn_pause: Duration::ZERO,
            data_dir: None,
            log_dir: None,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SIM_SEED` - Dice seed (default: random, logged at startup)
    /// - `SIM_MAX_TURNS` - Turn limit before the duel is called off (default: 200)
    /// - `SIM_PLAYER` / `SIM_AI` - Hero ids for each seat (default: monk / pyromancer)
    /// - `SIM_FIRST` - `player` or `ai` (default: player)
    /// - `SIM_TURN_PAUSE_MS` - Pause between turns so cues can play (default: 0)
    /// - `SIM_DATA_DIR` - Content directory (default: bundled content)
    /// - `SIM_LOG_DIR` - Also write logs to `duel-sim.log` in this directory
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.seed = read_env::<u64>("SIM_SEED");
        if let Some(max_turns) = read_env::<u32>("SIM_MAX_TURNS") {
            config.max_turns = max_turns.max(1);
        }
        if let Ok(player) = env::var("SIM_PLAYER") {
            config.player = HeroId::new(player);
        }
        if let Ok(ai) = env::var("SIM_AI") {
            config.ai = HeroId::new(ai);
        }
        if let Some(first) = read_env::<Side>("SIM_FIRST") {
            config.first = first;
        }
        if let Some(millis) = read_env::<u64>("SIM_TURN_PAUSE_MS") {
            config.turn_pause = Duration::from_millis(millis);
        }

        config.data_dir = env::var("SIM_DATA_DIR").ok().map(PathBuf::from);
        config.log_dir = env::var("SIM_LOG_DIR").ok().map(PathBuf::from);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
