use crate::status::StatusStacks;

use super::Side;

/// Identifier of a hero definition served by a [`HeroOracle`](crate::env::HeroOracle).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct HeroId(pub String);

impl HeroId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for HeroId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the rules need to know about one side of the duel.
///
/// Combatants are values: every rules call returns an updated copy and the
/// caller commits it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantState {
    pub side: Side,
    pub hero: HeroId,
    pub hp: i32,
    pub max_hp: i32,
    pub stacks: StatusStacks,
}

impl CombatantState {
    pub fn new(side: Side, hero: HeroId, max_hp: i32) -> Self {
        Self {
            side,
            hero,
            hp: max_hp,
            max_hp,
            stacks: StatusStacks::new(),
        }
    }

    #[must_use]
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self
    }

    #[must_use]
    pub fn with_stacks(mut self, stacks: StatusStacks) -> Self {
        self.stacks = stacks;
        self
    }

    /// A side is defeated once its HP reaches zero.
    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }
}
