//! Narrow interfaces to collaborators outside the rules.
//!
//! Hero data, dice randomness and telemetry are consumed through these traits
//! so the rules stay pure and can be driven by fixed inputs in tests.
mod dice;
mod hero;
mod stats;

pub use dice::{Combo, DiceRoll, DiceRoller, HoldMask};
pub use hero::{AbilityProfile, DefenseProfile, HeroOracle, HeroProfile, StatusApplication};
pub use stats::{HpDelta, TurnRecord, TurnStatsSink};
