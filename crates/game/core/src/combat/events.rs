use crate::state::{Side, TurnPhase};

/// Discrete effect produced by resolving an attack, in emission order.
///
/// The turn controller schedules presentation and the turn handover from
/// these; the rules attach no timing to them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum EffectEvent {
    Hit { target: Side, amount: i32 },
    Reflect { target: Side, amount: i32 },
    Retaliate { target: Side, amount: i32 },
    Heal { target: Side, amount: i32 },
    /// Resolution is over; `next` acts after the handover.
    #[cfg_attr(feature = "serde", serde(rename = "TURN_END"))]
    TurnEnd { next: Side, prev_phase: TurnPhase },
}

impl EffectEvent {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Hit { .. } => "hit",
            Self::Reflect { .. } => "reflect",
            Self::Retaliate { .. } => "retaliate",
            Self::Heal { .. } => "heal",
            Self::TurnEnd { .. } => "TURN_END",
        }
    }

    /// Side the effect lands on, if any.
    pub const fn target(&self) -> Option<Side> {
        match self {
            Self::Hit { target, .. }
            | Self::Reflect { target, .. }
            | Self::Retaliate { target, .. }
            | Self::Heal { target, .. } => Some(*target),
            Self::TurnEnd { .. } => None,
        }
    }
}
