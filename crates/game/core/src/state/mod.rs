//! Duel state owned by the turn controller.
//!
//! The rules layer never mutates these values in place. Resolution functions
//! take them by reference and hand back fresh copies.
mod combatant;
mod common;
mod turn;

pub use combatant::{CombatantState, HeroId};
pub use common::{Side, TurnId};
pub use turn::{TurnPhase, TurnState};
