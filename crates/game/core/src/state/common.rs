use std::fmt;

/// One of the two seats in a duel.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    /// The human-controlled seat.
    Player,
    /// The decision-hook-controlled seat.
    Ai,
}

impl Side {
    /// Returns the other seat.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Player => Self::Ai,
            Self::Ai => Self::Player,
        }
    }

    /// Both seats in a fixed order.
    pub const ALL: [Side; 2] = [Side::Player, Side::Ai];
}

/// Monotonically increasing identifier of a single turn.
///
/// Every call to [`TurnState::advance`](super::TurnState::advance) hands out a
/// fresh id, so two turns never share one even when the round number repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnId(pub u64);

impl TurnId {
    pub const FIRST: Self = Self(1);

    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn#{}", self.0)
    }
}
