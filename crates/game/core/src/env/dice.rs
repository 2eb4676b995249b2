//! Dice values and the injected roller.
//!
//! The rules never roll dice themselves. A [`DiceRoller`] supplied by the
//! caller produces face values; everything downstream works on the resulting
//! [`DiceRoll`].

use arrayvec::ArrayVec;

use crate::config::RulesConfig;

/// Side-effecting die source injected by the caller.
pub trait DiceRoller {
    /// Returns a face in `1..=sides`.
    fn roll_die(&mut self, sides: u8) -> u8;
}

impl<F> DiceRoller for F
where
    F: FnMut(u8) -> u8,
{
    fn roll_die(&mut self, sides: u8) -> u8 {
        self(sides)
    }
}

/// Which dice survive a reroll, one bit per die position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoldMask(pub u8);

impl HoldMask {
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn holds(self, index: usize) -> bool {
        index < 8 && self.0 & (1 << index) != 0
    }

    #[must_use]
    pub const fn with(self, index: usize) -> Self {
        if index < 8 {
            Self(self.0 | (1 << index))
        } else {
            self
        }
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

/// Face values of one throw.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceRoll {
    faces: ArrayVec<u8, { RulesConfig::MAX_DICE }>,
}

impl DiceRoll {
    /// Builds a roll from already-thrown faces; extra faces are ignored.
    pub fn from_faces(faces: &[u8]) -> Self {
        Self {
            faces: faces.iter().copied().take(RulesConfig::MAX_DICE).collect(),
        }
    }

    /// Throws `count` fresh dice.
    pub fn roll(roller: &mut dyn DiceRoller, count: usize, sides: u8) -> Self {
        let count = count.min(RulesConfig::MAX_DICE);
        Self {
            faces: (0..count).map(|_| roller.roll_die(sides)).collect(),
        }
    }

    /// Rerolls every die not covered by `hold`.
    pub fn reroll(&self, hold: HoldMask, roller: &mut dyn DiceRoller, sides: u8) -> Self {
        Self {
            faces: self
                .faces
                .iter()
                .enumerate()
                .map(|(index, &face)| {
                    if hold.holds(index) {
                        face
                    } else {
                        roller.roll_die(sides)
                    }
                })
                .collect(),
        }
    }

    pub fn faces(&self) -> &[u8] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn sum(&self) -> u32 {
        self.faces.iter().map(|&face| u32::from(face)).sum()
    }

    /// How many dice show `face`.
    pub fn count_of(&self, face: u8) -> usize {
        self.faces.iter().filter(|&&f| f == face).count()
    }

    /// Size of the largest group of equal faces.
    pub fn max_of_a_kind(&self) -> usize {
        self.faces
            .iter()
            .map(|&face| self.count_of(face))
            .max()
            .unwrap_or(0)
    }

    /// Length of the longest run of consecutive distinct faces.
    pub fn longest_straight(&self) -> usize {
        let mut distinct: Vec<u8> = self.faces.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        let mut best = 0;
        let mut run = 0;
        let mut previous: Option<u8> = None;
        for face in distinct {
            run = match previous {
                Some(p) if face == p + 1 => run + 1,
                _ => 1,
            };
            best = best.max(run);
            previous = Some(face);
        }
        best
    }
}

/// Dice pattern an ability requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Combo {
    /// At least `n` dice showing the same face.
    OfAKind(u8),
    /// At least `n` consecutive faces.
    Straight(u8),
    /// At least `count` dice showing `face`.
    Face { face: u8, count: u8 },
    /// Any throw qualifies.
    Any,
}

impl Combo {
    pub fn matches(&self, roll: &DiceRoll) -> bool {
        match *self {
            Self::OfAKind(n) => roll.max_of_a_kind() >= usize::from(n),
            Self::Straight(n) => roll.longest_straight() >= usize::from(n),
            Self::Face { face, count } => roll.count_of(face) >= usize::from(count),
            Self::Any => true,
        }
    }
}
