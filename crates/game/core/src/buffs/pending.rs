use std::fmt;

use crate::lifecycle::StatusLifecycleEvent;
use crate::state::{Side, TurnId};
use crate::status::{StatusId, StatusRuntime, StatusStacks};

use super::grant::{DefenseBuffGrant, GrantContext, UsablePhase};

/// Identifier of a pending buff: the creating turn plus its index in the batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffId {
    pub turn_id: TurnId,
    pub index: u16,
}

impl fmt::Display for BuffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/buff#{}", self.turn_id, self.index)
    }
}

/// A grant recorded now and applied when its usable phase comes around.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingDefenseBuff {
    pub id: BuffId,
    pub owner: Side,
    pub status: StatusId,
    pub amount: u32,
    pub usable_phase: UsablePhase,
    pub stack_cap: Option<u32>,
    /// Last round in which the buff may still fire.
    pub expires_at_round: Option<u32>,
    pub created_round: u32,
    pub created_turn_id: TurnId,
    pub source: Option<String>,
}

impl PendingDefenseBuff {
    /// Whether the buff fires under `trigger`.
    ///
    /// `NextTurn` buffs additionally require a turn other than the creating
    /// one, so a buff granted mid-turn cannot be consumed in that same turn.
    pub fn is_ready(&self, trigger: &BuffTrigger) -> bool {
        if self.owner != trigger.owner || self.usable_phase != trigger.phase {
            return false;
        }
        match self.usable_phase {
            UsablePhase::NextTurn => trigger.turn_id != self.created_turn_id,
            _ => true,
        }
    }

    /// Whether the buff can no longer fire at `round`.
    pub fn is_expired(&self, round: u32) -> bool {
        self.expires_at_round.is_some_and(|last| round > last)
    }

    /// Stack count after applying this buff on top of `current`.
    ///
    /// The buff cap limits how far this buff pushes the count but never
    /// removes stacks the owner already holds.
    pub fn target_stacks(&self, current: u32) -> u32 {
        let raised = current.saturating_add(self.amount);
        match self.stack_cap {
            Some(cap) => raised.min(cap).max(current),
            None => raised,
        }
    }
}

/// The moment pending buffs are checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffTrigger {
    pub phase: UsablePhase,
    pub owner: Side,
    pub round: u32,
    pub turn_id: TurnId,
}

/// Pending buffs split by what happens to them under a trigger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuffPartition {
    pub ready: Vec<PendingDefenseBuff>,
    pub pending: Vec<PendingDefenseBuff>,
    pub expired: Vec<PendingDefenseBuff>,
}

/// Turns grants into pending buffs, skipping grants marked immediate.
pub fn build_pending_defense_buffs_from_grants(
    grants: &[DefenseBuffGrant],
    context: &GrantContext,
) -> Vec<PendingDefenseBuff> {
    grants
        .iter()
        .filter(|grant| !grant.is_immediate())
        .enumerate()
        .map(|(index, grant)| {
            let lifetime = grant.expires_after_rounds.or(context.default_lifetime);
            PendingDefenseBuff {
                id: BuffId {
                    turn_id: context.turn_id,
                    index: u16::try_from(index).unwrap_or(u16::MAX),
                },
                owner: context.resolve_owner(grant.target),
                status: grant.status.clone(),
                amount: grant.amount,
                usable_phase: grant.usable_phase,
                stack_cap: grant.stack_cap,
                expires_at_round: lifetime.map(|rounds| context.round.saturating_add(rounds)),
                created_round: context.round,
                created_turn_id: context.turn_id,
                source: context.source.clone(),
            }
        })
        .collect()
}

/// Splits `buffs` into those firing under `trigger`, those still waiting and
/// those past their expiry. Relative order is kept within each group.
pub fn partition_pending_defense_buffs(
    buffs: Vec<PendingDefenseBuff>,
    trigger: &BuffTrigger,
) -> BuffPartition {
    let mut partition = BuffPartition::default();
    for buff in buffs {
        if buff.is_expired(trigger.round) {
            partition.expired.push(buff);
        } else if buff.is_ready(trigger) {
            partition.ready.push(buff);
        } else {
            partition.pending.push(buff);
        }
    }
    partition
}

/// Result of committing ready buffs to a stack map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppliedBuffs {
    pub stacks: StatusStacks,
    /// Each applied buff with the owner's stack count afterwards.
    pub applied: Vec<(PendingDefenseBuff, u32)>,
}

/// Applies each ready buff to `stacks`, respecting the buff cap and the
/// definition's max stacks. Buffs for unknown statuses apply nothing.
pub fn apply_ready_defense_buffs(
    runtime: &StatusRuntime<'_>,
    stacks: &StatusStacks,
    ready: Vec<PendingDefenseBuff>,
) -> AppliedBuffs {
    let mut current = stacks.clone();
    let mut applied = Vec::with_capacity(ready.len());

    for buff in ready {
        let id = buff.status.as_str();
        let target = buff.target_stacks(current.get(id));
        current = runtime.set_stacks(&current, id, i64::from(target));
        let stacks_after = current.get(id);

        runtime.publish(StatusLifecycleEvent::BuffActivated {
            buff: buff.clone(),
            stacks_after,
        });
        applied.push((buff, stacks_after));
    }

    AppliedBuffs {
        stacks: current,
        applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffs::GrantTarget;
    use crate::state::TurnState;
    use crate::status::{StatusDefinition, StatusRegistry};

    fn trigger(phase: UsablePhase, owner: Side, turn: &TurnState) -> BuffTrigger {
        BuffTrigger {
            phase,
            owner,
            round: turn.round,
            turn_id: turn.turn_id,
        }
    }

    #[test]
    fn immediate_grants_are_skipped_and_owners_resolved() {
        let turn = TurnState::new(Side::Player);
        let grants = [
            DefenseBuffGrant::new("icewall", 2, UsablePhase::NextTurn),
            DefenseBuffGrant::new("chi", 1, UsablePhase::Immediate),
            DefenseBuffGrant::new("burn", 1, UsablePhase::TurnStart).targeting(GrantTarget::Opponent),
        ];

        let buffs = build_pending_defense_buffs_from_grants(&grants, &GrantContext::for_defense(&turn));

        assert_eq!(buffs.len(), 2);
        assert_eq!(buffs[0].owner, Side::Ai);
        assert_eq!(buffs[1].owner, Side::Player);
        assert_eq!(buffs[0].created_turn_id, turn.turn_id);
        assert_ne!(buffs[0].id, buffs[1].id);
    }

    #[test]
    fn next_turn_buff_waits_for_a_different_turn() {
        let turn = TurnState::new(Side::Player);
        let grants = [DefenseBuffGrant::new("icewall", 1, UsablePhase::NextTurn)];
        let buffs =
            build_pending_defense_buffs_from_grants(&grants, &GrantContext::for_attack(&turn));

        let same_turn = partition_pending_defense_buffs(
            buffs.clone(),
            &trigger(UsablePhase::NextTurn, Side::Player, &turn),
        );
        assert!(same_turn.ready.is_empty());
        assert_eq!(same_turn.pending.len(), 1);

        let later = turn.advance().advance();
        let next = partition_pending_defense_buffs(
            buffs,
            &trigger(UsablePhase::NextTurn, Side::Player, &later),
        );
        assert_eq!(next.ready.len(), 1);
    }

    #[test]
    fn other_phases_fire_on_match_regardless_of_turn() {
        let turn = TurnState::new(Side::Ai);
        let grants = [DefenseBuffGrant::new("evasive", 1, UsablePhase::NextDefenseCommit)];
        let buffs =
            build_pending_defense_buffs_from_grants(&grants, &GrantContext::for_attack(&turn));

        let wrong_owner = partition_pending_defense_buffs(
            buffs.clone(),
            &trigger(UsablePhase::NextDefenseCommit, Side::Player, &turn),
        );
        assert!(wrong_owner.ready.is_empty());

        let same_turn = partition_pending_defense_buffs(
            buffs,
            &trigger(UsablePhase::NextDefenseCommit, Side::Ai, &turn),
        );
        assert_eq!(same_turn.ready.len(), 1);
    }

    #[test]
    fn expired_buffs_are_reported_separately() {
        let turn = TurnState::new(Side::Player);
        let grants = [DefenseBuffGrant::new("icewall", 1, UsablePhase::TurnStart).expiring_after(1)];
        let buffs =
            build_pending_defense_buffs_from_grants(&grants, &GrantContext::for_attack(&turn));
        assert_eq!(buffs[0].expires_at_round, Some(2));

        let late = BuffTrigger {
            phase: UsablePhase::TurnStart,
            owner: Side::Player,
            round: 3,
            turn_id: TurnId(9),
        };
        let partition = partition_pending_defense_buffs(buffs, &late);
        assert_eq!(partition.expired.len(), 1);
        assert!(partition.ready.is_empty());
    }

    #[test]
    fn applying_respects_buff_cap_and_definition_max() {
        let mut registry = StatusRegistry::new();
        registry.define_status(StatusDefinition::new("icewall", "Ice Wall").with_max_stacks(4));
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "icewall", 2);

        let turn = TurnState::new(Side::Player);
        let grants = [
            DefenseBuffGrant::new("icewall", 5, UsablePhase::TurnStart).with_stack_cap(3),
            DefenseBuffGrant::new("icewall", 5, UsablePhase::TurnStart),
        ];
        let buffs =
            build_pending_defense_buffs_from_grants(&grants, &GrantContext::for_attack(&turn));

        let capped = apply_ready_defense_buffs(&runtime, &stacks, vec![buffs[0].clone()]);
        assert_eq!(capped.stacks.get("icewall"), 3);

        let maxed = apply_ready_defense_buffs(&runtime, &capped.stacks, vec![buffs[1].clone()]);
        assert_eq!(maxed.stacks.get("icewall"), 4);
        assert_eq!(maxed.applied[0].1, 4);
    }

    #[test]
    fn buff_cap_never_removes_held_stacks() {
        let buff = PendingDefenseBuff {
            id: BuffId {
                turn_id: TurnId::FIRST,
                index: 0,
            },
            owner: Side::Player,
            status: "icewall".into(),
            amount: 1,
            usable_phase: UsablePhase::TurnStart,
            stack_cap: Some(2),
            expires_at_round: None,
            created_round: 1,
            created_turn_id: TurnId::FIRST,
            source: None,
        };
        assert_eq!(buff.target_stacks(3), 3);
        assert_eq!(buff.target_stacks(1), 2);
    }
}
