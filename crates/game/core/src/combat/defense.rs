//! Defense planning contract.
//!
//! Resolution only consumes a [`DefenseResolution`]. How the defender arrives
//! at one is up to a [`DefensePlanner`]; [`StatusDefensePlanner`] is the
//! straightforward planner that spends the requested statuses in order.

use crate::env::DefenseProfile;
use crate::state::CombatantState;
use crate::status::{
    SpendContext, SpendPhase, SpendTotals, StatusId, StatusRuntime, StatusSpendSummary,
};

/// Defender's side of an attack, ready for resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseResolution {
    pub base_block: i32,
    pub reflect: i32,
    pub heal: i32,
    pub retaliate_percent: u32,
    /// Defender status spends, in the order they were made.
    pub spends: Vec<StatusSpendSummary>,
}

impl DefenseResolution {
    pub fn from_profile(profile: &DefenseProfile) -> Self {
        Self {
            base_block: profile.base_block,
            reflect: profile.reflect,
            heal: profile.heal,
            retaliate_percent: profile.retaliate_percent,
            spends: Vec::new(),
        }
    }

    pub fn totals(&self) -> SpendTotals {
        SpendTotals::from_summaries(&self.spends)
    }
}

/// A request to spend a status up to `attempts` times.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpendRequest {
    pub status: StatusId,
    pub attempts: u32,
    /// Rolls for roll-gated spends, one per attempt.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rolls: Vec<u32>,
}

impl SpendRequest {
    pub fn new(status: impl Into<StatusId>, attempts: u32) -> Self {
        Self {
            status: status.into(),
            attempts,
            rolls: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = u32>) -> Self {
        self.rolls = rolls.into_iter().collect();
        self
    }

    fn roll(&self, attempt: u32) -> Option<u32> {
        self.rolls.get(attempt as usize).copied()
    }
}

/// What a planner hands back: the resolution plus the defender after spends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefensePlan {
    pub resolution: DefenseResolution,
    pub defender: CombatantState,
}

/// Produces the defender's resolution before an attack resolves.
pub trait DefensePlanner {
    fn plan(
        &self,
        defender: &CombatantState,
        incoming_damage: i32,
        base: DefenseResolution,
        requests: &[SpendRequest],
    ) -> DefensePlan;
}

/// Spends each requested status in the defense roll, in request order.
///
/// Roll-gated requests resolve before block math, so their context carries
/// only the roll. Nothing is spent against an attack that deals no damage.
#[derive(Clone, Copy)]
pub struct StatusDefensePlanner<'a> {
    runtime: StatusRuntime<'a>,
}

impl<'a> StatusDefensePlanner<'a> {
    pub fn new(runtime: StatusRuntime<'a>) -> Self {
        Self { runtime }
    }
}

impl DefensePlanner for StatusDefensePlanner<'_> {
    fn plan(
        &self,
        defender: &CombatantState,
        incoming_damage: i32,
        mut base: DefenseResolution,
        requests: &[SpendRequest],
    ) -> DefensePlan {
        let mut stacks = defender.stacks.clone();
        if incoming_damage > 0 {
            let runtime = self.runtime.for_side(defender.side);
            for request in requests {
                let initial = match request.roll(0) {
                    Some(roll) => SpendContext::new().with_roll(roll),
                    None => SpendContext::new().with_base_block(base.base_block),
                };
                let outcome = runtime.spend_status_many(
                    &stacks,
                    request.status.as_str(),
                    request.attempts,
                    SpendPhase::DefenseRoll,
                    |progress| {
                        let mut context = progress.initial.clone();
                        context.roll = request.roll(progress.attempt);
                        context.accumulated_block = progress.accumulated_block;
                        context
                    },
                    &initial,
                );
                if let Some(outcome) = outcome {
                    stacks = outcome.stacks;
                    base.spends.push(outcome.summary);
                }
            }
        }

        DefensePlan {
            resolution: base,
            defender: defender.clone().with_stacks(stacks),
        }
    }
}
