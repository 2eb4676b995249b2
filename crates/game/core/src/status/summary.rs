//! Aggregated spend results.

use super::definition::SpendResult;
use super::{SpendPhase, StatusId};

/// Everything a batch of spends of one status produced.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSpendSummary {
    pub status: StatusId,
    pub phase: SpendPhase,
    pub stacks_spent: u32,
    pub results: Vec<SpendResult>,
    pub bonus_damage: i32,
    pub bonus_block: i32,
    pub negate_incoming: bool,
    /// Spends whose effect succeeded.
    pub successes: u32,
    pub logs: Vec<String>,
}

impl StatusSpendSummary {
    pub fn new(status: StatusId, phase: SpendPhase) -> Self {
        Self {
            status,
            phase,
            stacks_spent: 0,
            results: Vec::new(),
            bonus_damage: 0,
            bonus_block: 0,
            negate_incoming: false,
            successes: 0,
            logs: Vec::new(),
        }
    }

    /// Folds one spend into the summary.
    pub fn record(&mut self, cost: u32, result: SpendResult) {
        self.stacks_spent += cost;
        self.bonus_damage += result.bonus_damage;
        self.bonus_block += result.bonus_block;
        self.negate_incoming |= result.negate_incoming;
        if result.success {
            self.successes += 1;
        }
        if let Some(log) = &result.log {
            self.logs.push(log.clone());
        }
        self.results.push(result);
    }

    /// Appends another summary's spends.
    pub fn merge(&mut self, other: StatusSpendSummary) {
        self.stacks_spent += other.stacks_spent;
        self.bonus_damage += other.bonus_damage;
        self.bonus_block += other.bonus_block;
        self.negate_incoming |= other.negate_incoming;
        self.successes += other.successes;
        self.results.extend(other.results);
        self.logs.extend(other.logs);
    }

    /// Number of spends that went through, successful or not.
    pub fn attempts(&self) -> usize {
        self.results.len()
    }
}

/// Totals across a ledger of spend summaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpendTotals {
    pub bonus_damage: i32,
    pub bonus_block: i32,
    pub negate_incoming: bool,
}

impl SpendTotals {
    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a StatusSpendSummary>) -> Self {
        summaries
            .into_iter()
            .fold(Self::default(), |totals, summary| Self {
                bonus_damage: totals.bonus_damage + summary.bonus_damage,
                bonus_block: totals.bonus_block + summary.bonus_block,
                negate_incoming: totals.negate_incoming || summary.negate_incoming,
            })
    }
}
