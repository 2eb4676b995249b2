//! Hero table backing [`HeroOracle`].

use std::collections::HashMap;

use duel_core::buffs::{DefenseBuffGrant, UsablePhase};
use duel_core::env::{Combo, StatusApplication};
use duel_core::{
    AbilityProfile, DefenseProfile, DiceRoll, HeroId, HeroOracle, HeroProfile, HoldMask,
};

use crate::catalog;

/// Defense unlocked by a combo.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseOption {
    pub combo: Combo,
    pub profile: DefenseProfile,
}

/// Everything the table knows about one hero.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroSpec {
    pub profile: HeroProfile,
    pub abilities: Vec<AbilityProfile>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub defenses: Vec<DefenseOption>,
    /// Face the AI holds on to when nothing else stands out.
    #[cfg_attr(feature = "serde", serde(default))]
    pub favored_face: Option<u8>,
}

/// Read-only table of heroes keyed by id.
#[derive(Clone, Debug, Default)]
pub struct HeroTable {
    heroes: HashMap<HeroId, HeroSpec>,
}

impl HeroTable {
    pub fn new(specs: impl IntoIterator<Item = HeroSpec>) -> Self {
        Self {
            heroes: specs
                .into_iter()
                .map(|spec| (spec.profile.id.clone(), spec))
                .collect(),
        }
    }

    /// The two heroes shipped with the simulator.
    pub fn builtin() -> Self {
        Self::new([monk(), pyromancer()])
    }

    pub fn spec(&self, id: &HeroId) -> Option<&HeroSpec> {
        self.heroes.get(id)
    }

    /// Hero ids in sorted order.
    pub fn ids(&self) -> Vec<HeroId> {
        let mut ids: Vec<_> = self.heroes.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}

impl HeroOracle for HeroTable {
    fn hero(&self, id: &HeroId) -> Option<HeroProfile> {
        self.heroes.get(id).map(|spec| spec.profile.clone())
    }

    /// Highest-damage ability the roll unlocks; ties go to the first listed.
    fn ability_for(&self, id: &HeroId, roll: &DiceRoll) -> Option<AbilityProfile> {
        let spec = self.heroes.get(id)?;
        spec.abilities
            .iter()
            .filter(|ability| ability.combo.matches(roll))
            .fold(None::<&AbilityProfile>, |best, ability| match best {
                Some(current) if current.base_damage >= ability.base_damage => Some(current),
                _ => Some(ability),
            })
            .cloned()
    }

    /// Strongest matching defense by block, falling back to a block equal to
    /// the number of sixes rolled.
    fn defense_for(&self, id: &HeroId, roll: &DiceRoll) -> DefenseProfile {
        let matched = self.heroes.get(id).and_then(|spec| {
            spec.defenses
                .iter()
                .filter(|option| option.combo.matches(roll))
                .max_by_key(|option| option.profile.base_block)
        });

        match matched {
            Some(option) => option.profile.clone(),
            None => DefenseProfile {
                name: "Brace".to_string(),
                base_block: i32::try_from(roll.count_of(6)).unwrap_or(0),
                ..DefenseProfile::default()
            },
        }
    }

    /// Holds the largest group of equal faces, preferring the hero's favored
    /// face on ties. Holds nothing on the last roll.
    fn hold_decision(&self, id: &HeroId, roll: &DiceRoll, rolls_left: u8) -> HoldMask {
        if rolls_left == 0 || roll.is_empty() {
            return HoldMask::NONE;
        }
        let favored = self.heroes.get(id).and_then(|spec| spec.favored_face);

        let target = roll
            .faces()
            .iter()
            .copied()
            .max_by_key(|&face| (roll.count_of(face), Some(face) == favored, face))
            .unwrap_or(0);

        roll.faces()
            .iter()
            .enumerate()
            .filter(|&(_, &face)| face == target)
            .fold(HoldMask::NONE, |mask, (index, _)| mask.with(index))
    }
}

fn monk() -> HeroSpec {
    HeroSpec {
        profile: HeroProfile {
            id: HeroId::new("monk"),
            name: "Monk".to_string(),
            max_hp: 50,
            starting_statuses: vec![(catalog::CHI, 2)],
        },
        abilities: vec![
            AbilityProfile {
                id: "palm-strike".to_string(),
                name: "Palm Strike".to_string(),
                combo: Combo::Any,
                base_damage: 3,
                inflicts: Vec::new(),
                grants: Vec::new(),
            },
            AbilityProfile {
                id: "flowing-fist".to_string(),
                name: "Flowing Fist".to_string(),
                combo: Combo::Straight(4),
                base_damage: 7,
                inflicts: Vec::new(),
                grants: vec![DefenseBuffGrant::new(catalog::EVASIVE, 1, UsablePhase::NextDefenseCommit)],
            },
            AbilityProfile {
                id: "inner-peace".to_string(),
                name: "Inner Peace".to_string(),
                combo: Combo::OfAKind(4),
                base_damage: 10,
                inflicts: Vec::new(),
                grants: vec![
                    DefenseBuffGrant::new(catalog::CHI, 2, UsablePhase::NextTurn).with_stack_cap(4),
                ],
            },
        ],
        defenses: vec![DefenseOption {
            combo: Combo::OfAKind(3),
            profile: DefenseProfile {
                name: "Iron Stance".to_string(),
                base_block: 4,
                reflect: 1,
                ..DefenseProfile::default()
            },
        }],
        favored_face: Some(6),
    }
}

fn pyromancer() -> HeroSpec {
    HeroSpec {
        profile: HeroProfile {
            id: HeroId::new("pyromancer"),
            name: "Pyromancer".to_string(),
            max_hp: 50,
            starting_statuses: vec![(catalog::FURY, 1)],
        },
        abilities: vec![
            AbilityProfile {
                id: "ember".to_string(),
                name: "Ember".to_string(),
                combo: Combo::Any,
                base_damage: 2,
                inflicts: vec![StatusApplication {
                    status: catalog::BURN,
                    stacks: 1,
                }],
                grants: Vec::new(),
            },
            AbilityProfile {
                id: "fireball".to_string(),
                name: "Fireball".to_string(),
                combo: Combo::Face { face: 6, count: 3 },
                base_damage: 8,
                inflicts: vec![StatusApplication {
                    status: catalog::BURN,
                    stacks: 2,
                }],
                grants: Vec::new(),
            },
        ],
        defenses: vec![DefenseOption {
            combo: Combo::Straight(3),
            profile: DefenseProfile {
                name: "Flame Ward".to_string(),
                base_block: 3,
                heal: 2,
                retaliate_percent: 50,
                grants: vec![DefenseBuffGrant::new(catalog::ICEWALL, 1, UsablePhase::TurnStart)
                    .expiring_after(2)],
                ..DefenseProfile::default()
            },
        }],
        favored_face: Some(6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_matching_ability_wins() {
        let table = HeroTable::builtin();
        let monk = HeroId::new("monk");

        let straight = DiceRoll::from_faces(&[1, 2, 3, 4, 6]);
        assert_eq!(table.ability_for(&monk, &straight).unwrap().id, "flowing-fist");

        let junk = DiceRoll::from_faces(&[1, 1, 3, 5, 6]);
        assert_eq!(table.ability_for(&monk, &junk).unwrap().id, "palm-strike");
        assert!(table.ability_for(&HeroId::new("nobody"), &junk).is_none());
    }

    #[test]
    fn defense_falls_back_to_sixes() {
        let table = HeroTable::builtin();
        let roll = DiceRoll::from_faces(&[6, 6, 2, 3, 4]);
        let defense = table.defense_for(&HeroId::new("pyromancer"), &roll);
        assert_eq!(defense.base_block, 3);

        let plain = DiceRoll::from_faces(&[6, 6, 1, 1, 4]);
        let fallback = table.defense_for(&HeroId::new("pyromancer"), &plain);
        assert_eq!(fallback.name, "Brace");
        assert_eq!(fallback.base_block, 2);
    }

    #[test]
    fn hold_keeps_the_largest_group() {
        let table = HeroTable::builtin();
        let roll = DiceRoll::from_faces(&[2, 5, 2, 6, 1]);
        let hold = table.hold_decision(&HeroId::new("monk"), &roll, 2);

        assert!(hold.holds(0));
        assert!(hold.holds(2));
        assert_eq!(hold.count(), 2);
        assert_eq!(table.hold_decision(&HeroId::new("monk"), &roll, 0), HoldMask::NONE);
    }

    #[test]
    fn favored_face_breaks_ties() {
        let table = HeroTable::builtin();
        let roll = DiceRoll::from_faces(&[3, 6, 3, 6, 1]);
        let hold = table.hold_decision(&HeroId::new("monk"), &roll, 1);

        assert!(hold.holds(1));
        assert!(hold.holds(3));
        assert!(!hold.holds(0));
    }
}
