/// Combat phase in which a status spend is attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum SpendPhase {
    /// The attacker has committed an ability and may boost its damage.
    AttackRoll,
    /// The defender has rolled defense and may boost block or react.
    DefenseRoll,
    /// Start of the holder's turn, before dice are thrown.
    Upkeep,
    /// After damage has been computed but before it is committed.
    Resolution,
}

impl SpendPhase {
    /// The single-phase set matching this phase.
    pub const fn flag(self) -> PhaseSet {
        match self {
            Self::AttackRoll => PhaseSet::ATTACK_ROLL,
            Self::DefenseRoll => PhaseSet::DEFENSE_ROLL,
            Self::Upkeep => PhaseSet::UPKEEP,
            Self::Resolution => PhaseSet::RESOLUTION,
        }
    }
}

bitflags::bitflags! {
    /// Set of phases in which a spend rule may fire.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PhaseSet: u8 {
        const ATTACK_ROLL = 1 << 0;
        const DEFENSE_ROLL = 1 << 1;
        const UPKEEP = 1 << 2;
        const RESOLUTION = 1 << 3;

        /// Both roll phases.
        const ROLLS = Self::ATTACK_ROLL.bits() | Self::DEFENSE_ROLL.bits();
    }
}

impl PhaseSet {
    /// Returns true if spending is allowed in `phase`.
    #[inline]
    pub const fn allows(self, phase: SpendPhase) -> bool {
        self.contains(phase.flag())
    }
}

impl From<SpendPhase> for PhaseSet {
    fn from(phase: SpendPhase) -> Self {
        phase.flag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_set_covers_both_roll_phases_only() {
        assert!(PhaseSet::ROLLS.allows(SpendPhase::AttackRoll));
        assert!(PhaseSet::ROLLS.allows(SpendPhase::DefenseRoll));
        assert!(!PhaseSet::ROLLS.allows(SpendPhase::Upkeep));
        assert!(!PhaseSet::ROLLS.allows(SpendPhase::Resolution));
    }

    #[test]
    fn phase_names_render_in_camel_case() {
        assert_eq!(SpendPhase::AttackRoll.to_string(), "attackRoll");
        assert_eq!(SpendPhase::DefenseRoll.to_string(), "defenseRoll");
    }
}
