//! Errors surfaced by the duel runtime.
//!
//! Rules-level gating never reaches this type: a failed spend is a `None`
//! inside the core. What ends up here is misconfiguration and misuse of the
//! runtime itself.
use duel_core::{HeroId, Side};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("tokio scheduler requires a running tokio runtime")]
    NoTokioRuntime,

    #[error("hero {hero} is not known to the hero oracle")]
    UnknownHero { hero: HeroId },

    #[error("duel is already over: {winner} won")]
    DuelOver { winner: Side },
}
