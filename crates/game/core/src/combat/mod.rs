//! Combat resolution.
//!
//! Pure functions folding status spends into damage and block, then
//! committing the result to fresh combatant values.
//!
//! # Core Functions
//!
//! - `plan_offense`: attacker spends in the attack roll
//! - `DefensePlanner::plan`: defender spends in the defense roll
//! - `resolve_attack`: damage, block, reflect, heal and effect events

pub mod damage;
pub mod defense;
pub mod events;
pub mod resolution;

pub use damage::{apply_damage, apply_heal, mitigated_damage, retaliation};
pub use defense::{
    DefensePlan, DefensePlanner, DefenseResolution, SpendRequest, StatusDefensePlanner,
};
pub use events::EffectEvent;
pub use resolution::{
    AttackInput, AttackResolution, CombatSummary, OffensePlan, plan_offense, resolve_attack,
};
