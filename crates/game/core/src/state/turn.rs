use super::{Side, TurnId};

/// Coarse phase of the active side's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "camelCase")]
pub enum TurnPhase {
    /// Statuses tick and turn-start buffs fire.
    Upkeep,
    /// Dice are thrown and held.
    Roll,
    /// The attacker commits an ability and spends offensive statuses.
    Attack,
    /// The defender commits a defense and spends reactive statuses.
    Defense,
    /// Resolution finished, waiting for the controller to hand over.
    End,
}

/// Turn bookkeeping owned by the turn controller.
///
/// The rules layer only reads it; [`advance`](Self::advance) returns a new value
/// rather than mutating so callers commit the handover explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// 1-based round counter. A round ends once both sides have acted.
    pub round: u32,

    /// Identifier of the turn currently in progress.
    pub turn_id: TurnId,

    /// Side taking the current turn.
    pub active: Side,

    /// Seat that opened the duel; used to detect round boundaries.
    pub first: Side,

    pub phase: TurnPhase,
}

impl TurnState {
    /// Creates the opening turn of a duel.
    pub fn new(first: Side) -> Self {
        Self {
            round: 1,
            turn_id: TurnId::FIRST,
            active: first,
            first,
            phase: TurnPhase::Upkeep,
        }
    }

    /// Returns the state for the next side's turn.
    pub fn advance(&self) -> Self {
        let active = self.active.opposite();
        let round = if active == self.first {
            self.round + 1
        } else {
            self.round
        };

        Self {
            round,
            turn_id: self.turn_id.next(),
            active,
            first: self.first,
            phase: TurnPhase::Upkeep,
        }
    }

    /// Returns a copy positioned at `phase`.
    pub fn at_phase(&self, phase: TurnPhase) -> Self {
        Self {
            phase,
            ..self.clone()
        }
    }

    /// The side defending against the active side.
    #[inline]
    pub fn defender(&self) -> Side {
        self.active.opposite()
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new(Side::Player)
    }
}
