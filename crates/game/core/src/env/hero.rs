//! Hero and ability data served to the rules.

use crate::buffs::DefenseBuffGrant;
use crate::state::HeroId;
use crate::status::StatusId;

use super::dice::{Combo, DiceRoll, HoldMask};

/// Static description of a hero.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroProfile {
    pub id: HeroId,
    pub name: String,
    pub max_hp: i32,
    /// Statuses the hero starts the duel with.
    #[cfg_attr(feature = "serde", serde(default))]
    pub starting_statuses: Vec<(StatusId, u32)>,
}

/// Status stacks an ability inflicts on its target when it lands.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusApplication {
    pub status: StatusId,
    pub stacks: u32,
}

/// Offensive ability unlocked by a dice combo.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityProfile {
    pub id: String,
    pub name: String,
    pub combo: Combo,
    pub base_damage: i32,
    /// Statuses applied to the defender on hit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub inflicts: Vec<StatusApplication>,
    /// Buffs granted by committing this ability.
    #[cfg_attr(feature = "serde", serde(default))]
    pub grants: Vec<DefenseBuffGrant>,
}

/// Base values of a committed defense before status spends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefenseProfile {
    pub name: String,
    pub base_block: i32,
    pub reflect: i32,
    pub heal: i32,
    /// Percent of dealt damage returned to the attacker.
    pub retaliate_percent: u32,
    pub grants: Vec<DefenseBuffGrant>,
}

/// Read-only hero lookup plus the AI dice-holding hook.
pub trait HeroOracle: Send + Sync {
    fn hero(&self, id: &HeroId) -> Option<HeroProfile>;

    /// Best offensive ability the roll unlocks, if any.
    fn ability_for(&self, id: &HeroId, roll: &DiceRoll) -> Option<AbilityProfile>;

    /// Defense the hero mounts with `roll`.
    fn defense_for(&self, id: &HeroId, roll: &DiceRoll) -> DefenseProfile;

    /// Dice the AI keeps before the next reroll.
    fn hold_decision(&self, _id: &HeroId, _roll: &DiceRoll, _rolls_left: u8) -> HoldMask {
        HoldMask::NONE
    }
}
