//! Defense buffs granted now and applied at a later timing window.
mod grant;
mod pending;

pub use grant::{DefenseBuffGrant, GrantContext, GrantTarget, UsablePhase};
pub use pending::{
    AppliedBuffs, BuffId, BuffPartition, BuffTrigger, PendingDefenseBuff,
    apply_ready_defense_buffs, build_pending_defense_buffs_from_grants,
    partition_pending_defense_buffs,
};
