//! Deterministic duel rules shared by the runtime and offline tools.
//!
//! `duel-core` defines the status engine (registry, behaviors, stack
//! runtime), pending defense buffs and attack resolution. Every operation is
//! a pure value transformation: state goes in by reference and fresh values
//! come back, so the caller decides what to commit. Collaborators outside the
//! rules (hero data, dice, telemetry, lifecycle observers) are reached through
//! the traits in [`env`] and [`lifecycle`].
pub mod buffs;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod state;
pub mod status;

pub use buffs::{
    BuffTrigger, DefenseBuffGrant, GrantContext, GrantTarget, PendingDefenseBuff, UsablePhase,
    apply_ready_defense_buffs, build_pending_defense_buffs_from_grants,
    partition_pending_defense_buffs,
};
pub use combat::{
    AttackInput, AttackResolution, CombatSummary, DefensePlanner, DefenseResolution, EffectEvent,
    SpendRequest, StatusDefensePlanner, plan_offense, resolve_attack,
};
pub use config::RulesConfig;
pub use env::{
    AbilityProfile, DefenseProfile, DiceRoll, DiceRoller, HeroOracle, HeroProfile, HoldMask,
    TurnRecord, TurnStatsSink,
};
pub use error::{ErrorSeverity, RulesError, RulesErrorKind};
pub use lifecycle::{LifecycleSink, SinkError, SinkFailure, SinkFailures, StatusLifecycleEvent};
pub use state::{CombatantState, HeroId, Side, TurnId, TurnPhase, TurnState};
pub use status::{
    SpendContext, SpendPhase, SpendResult, StatusDefinition, StatusId, StatusRegistry,
    StatusRuntime, StatusStacks, TickPrompt,
};
