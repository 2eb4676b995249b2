//! Per-turn telemetry handed to an external stats sink.

use crate::state::{Side, TurnId};

/// Structured record of one resolved turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnRecord {
    pub round: u32,
    pub turn_id: TurnId,
    pub attacker: Option<Side>,
    pub ability: Option<String>,
    /// Damage dealt by upkeep ticks before the attack.
    pub tick_damage: u32,
    pub base_damage: i32,
    pub bonus_damage: i32,
    pub base_block: i32,
    pub bonus_block: i32,
    pub damage_dealt: i32,
    pub reflected: i32,
    pub retaliated: i32,
    pub healed: i32,
    pub negated: bool,
    pub attacker_hp: HpDelta,
    pub defender_hp: HpDelta,
}

/// HP before and after a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HpDelta {
    pub before: i32,
    pub after: i32,
}

impl HpDelta {
    pub const fn change(&self) -> i32 {
        self.after - self.before
    }
}

/// Fire-and-forget consumer of turn records.
pub trait TurnStatsSink: Send + Sync {
    fn record_turn(&self, record: &TurnRecord);
}
