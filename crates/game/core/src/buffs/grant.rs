use crate::state::{Side, TurnId, TurnState};
use crate::status::StatusId;

/// Timing window in which a granted buff becomes usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum UsablePhase {
    /// The owner's next turn, never the turn that created it.
    NextTurn,
    /// The next time the owner commits a defense.
    NextDefenseCommit,
    /// The start of any turn.
    TurnStart,
    /// Applied inline by the caller; never queued.
    Immediate,
}

/// Whose stacks a grant lands on, relative to the granting side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum GrantTarget {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    SelfSide,
    Opponent,
}

/// A status grant produced by an ability or defense, before it is queued.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseBuffGrant {
    pub status: StatusId,
    pub amount: u32,
    pub usable_phase: UsablePhase,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: GrantTarget,
    /// Stack ceiling this grant may push the owner to.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stack_cap: Option<u32>,
    /// Rounds the buff survives after creation without firing.
    #[cfg_attr(feature = "serde", serde(default))]
    pub expires_after_rounds: Option<u32>,
}

impl DefenseBuffGrant {
    pub fn new(status: impl Into<StatusId>, amount: u32, usable_phase: UsablePhase) -> Self {
        Self {
            status: status.into(),
            amount,
            usable_phase,
            target: GrantTarget::SelfSide,
            stack_cap: None,
            expires_after_rounds: None,
        }
    }

    #[must_use]
    pub fn targeting(mut self, target: GrantTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_stack_cap(mut self, cap: u32) -> Self {
        self.stack_cap = Some(cap);
        self
    }

    #[must_use]
    pub fn expiring_after(mut self, rounds: u32) -> Self {
        self.expires_after_rounds = Some(rounds);
        self
    }

    /// Grants marked immediate are applied inline and never queued.
    #[inline]
    pub fn is_immediate(&self) -> bool {
        self.usable_phase == UsablePhase::Immediate
    }
}

/// Where and when a batch of grants was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrantContext {
    /// Side the `self` target resolves to.
    pub self_side: Side,
    pub round: u32,
    pub turn_id: TurnId,
    pub source: Option<String>,
    /// Expiry in rounds applied to grants that declare none.
    pub default_lifetime: Option<u32>,
}

impl GrantContext {
    /// Grants produced by the defender's committed defense.
    pub fn for_defense(turn: &TurnState) -> Self {
        Self::for_side(turn.defender(), turn)
    }

    /// Grants produced by the attacker's committed ability.
    pub fn for_attack(turn: &TurnState) -> Self {
        Self::for_side(turn.active, turn)
    }

    pub fn for_side(self_side: Side, turn: &TurnState) -> Self {
        Self {
            self_side,
            round: turn.round,
            turn_id: turn.turn_id,
            source: None,
            default_lifetime: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_default_lifetime(mut self, rounds: Option<u32>) -> Self {
        self.default_lifetime = rounds;
        self
    }

    /// Side a grant with `target` lands on.
    #[inline]
    pub fn resolve_owner(&self, target: GrantTarget) -> Side {
        match target {
            GrantTarget::SelfSide => self.self_side,
            GrantTarget::Opponent => self.self_side.opposite(),
        }
    }
}
