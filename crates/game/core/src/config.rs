/// Rules configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    /// Hit points each combatant starts a duel with.
    pub starting_hp: i32,

    /// Number of dice thrown per roll.
    pub dice_count: usize,

    /// Faces per die.
    pub dice_sides: u8,

    /// Rolls (initial throw plus rerolls) available in the roll phase.
    pub rolls_per_turn: u8,

    /// Rounds a pending defense buff survives when its grant sets no expiry.
    /// `None` keeps such buffs until they fire.
    pub pending_buff_lifetime: Option<u32>,
}

impl RulesConfig {
    // ===== compile-time constants =====
    /// Upper bound on dice in a single roll.
    pub const MAX_DICE: usize = 6;
    /// Priority applied to passive modifiers that do not declare one.
    pub const DEFAULT_PRIORITY: i32 = 100;
    /// Decay applied by damage-over-time statuses without an explicit decay.
    pub const DEFAULT_DOT_DECAY: u32 = 1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STARTING_HP: i32 = 50;
    pub const DEFAULT_DICE_COUNT: usize = 5;
    pub const DEFAULT_DICE_SIDES: u8 = 6;
    pub const DEFAULT_ROLLS_PER_TURN: u8 = 3;

    pub fn new() -> Self {
        Self {
            starting_hp: Self::DEFAULT_STARTING_HP,
            dice_count: Self::DEFAULT_DICE_COUNT,
            dice_sides: Self::DEFAULT_DICE_SIDES,
            rolls_per_turn: Self::DEFAULT_ROLLS_PER_TURN,
            pending_buff_lifetime: None,
        }
    }

    pub fn with_starting_hp(starting_hp: i32) -> Self {
        Self {
            starting_hp,
            ..Self::new()
        }
    }

    /// Dice count clamped to what a [`DiceRoll`](crate::env::DiceRoll) can hold.
    pub fn effective_dice_count(&self) -> usize {
        self.dice_count.clamp(1, Self::MAX_DICE)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}
