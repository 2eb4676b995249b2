//! Status effects: definitions, behaviors, the registry and the pure stack
//! operations over them.
mod behavior;
mod definition;
mod id;
mod phase;
mod registry;
mod runtime;
mod stacks;
mod summary;

pub use behavior::{
    BonusPool, DamageOverTime, PreDefenseReaction, StatusBehavior, builtin_behaviors,
};
pub use definition::{
    BehaviorConfig, BonusPoolConfig, CleanseRule, DamageOverTimeConfig, ModifyContext, ModifyHook,
    ModifyResult, ReactionConfig, SpendContext, SpendHook, SpendResult, SpendRule,
    StatusDefinition, TickHook, TickOutcome,
};
pub use id::{ActivationMode, BehaviorId, Polarity, StatusId};
pub use phase::{PhaseSet, SpendPhase};
pub use registry::StatusRegistry;
pub use runtime::{
    CleanseOutcome, ModifierOutcome, SpendManyOutcome, SpendOutcome, SpendProgress, StatusRuntime,
    TickEntry, TickPrompt, TickReport,
};
pub use stacks::StatusStacks;
pub use summary::{SpendTotals, StatusSpendSummary};
