//! Reusable status math strategies.
//!
//! A definition names a behavior and hands it a [`BehaviorConfig`]; the
//! behavior supplies the default spend and tick math. Inline hooks on the
//! definition take precedence, so a behavior is only consulted when the
//! definition does not implement the capability itself.

use std::sync::Arc;

use super::definition::{
    BehaviorConfig, SpendContext, SpendResult, StatusDefinition, TickOutcome,
};
use super::{BehaviorId, SpendPhase};

/// A named strategy a status definition can delegate to.
///
/// Both capabilities are optional; the defaults return `None`, which the
/// runtime treats as "no effect".
pub trait StatusBehavior: Send + Sync {
    /// Name the behavior is registered under.
    fn id(&self) -> BehaviorId;

    fn apply_spend(
        &self,
        _definition: &StatusDefinition,
        _config: &BehaviorConfig,
        _context: &SpendContext,
        _phase: SpendPhase,
    ) -> Option<SpendResult> {
        None
    }

    fn apply_tick(
        &self,
        _definition: &StatusDefinition,
        _config: &BehaviorConfig,
        _stacks: u32,
    ) -> Option<TickOutcome> {
        None
    }
}

/// Behaviors every registry starts with.
pub fn builtin_behaviors() -> Vec<Arc<dyn StatusBehavior>> {
    vec![
        Arc::new(BonusPool),
        Arc::new(PreDefenseReaction),
        Arc::new(DamageOverTime),
    ]
}

// ============================================================================
// bonus-pool
// ============================================================================

/// Flat bonus damage on attack, flat bonus block on defense.
#[derive(Debug, Clone, Copy, Default)]
pub struct BonusPool;

impl StatusBehavior for BonusPool {
    fn id(&self) -> BehaviorId {
        BehaviorId::BONUS_POOL
    }

    fn apply_spend(
        &self,
        definition: &StatusDefinition,
        config: &BehaviorConfig,
        _context: &SpendContext,
        phase: SpendPhase,
    ) -> Option<SpendResult> {
        let BehaviorConfig::BonusPool(pool) = config else {
            return None;
        };

        match phase {
            SpendPhase::AttackRoll => {
                let damage = pool.attack_damage.filter(|&d| d != 0)?;
                Some(
                    SpendResult::succeeded()
                        .with_bonus_damage(damage)
                        .with_log(format!("{}: +{} damage", definition.name, damage)),
                )
            }
            SpendPhase::DefenseRoll => {
                let block = pool.defense_block.filter(|&b| b != 0)?;
                Some(
                    SpendResult::succeeded()
                        .with_bonus_block(block)
                        .with_log(format!("{}: +{} block", definition.name, block)),
                )
            }
            SpendPhase::Upkeep | SpendPhase::Resolution => None,
        }
    }
}

// ============================================================================
// pre-defense-reaction
// ============================================================================

/// Roll-gated reaction resolved before defense math.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreDefenseReaction;

impl StatusBehavior for PreDefenseReaction {
    fn id(&self) -> BehaviorId {
        BehaviorId::PRE_DEFENSE_REACTION
    }

    fn apply_spend(
        &self,
        definition: &StatusDefinition,
        config: &BehaviorConfig,
        context: &SpendContext,
        _phase: SpendPhase,
    ) -> Option<SpendResult> {
        let BehaviorConfig::PreDefenseReaction(reaction) = config else {
            return None;
        };
        let roll = context.roll?;

        if roll >= reaction.threshold {
            let mut result = SpendResult::succeeded().with_bonus_block(reaction.success_block);
            if reaction.negate_on_success {
                result = result.negating();
            }
            let effect = if reaction.negate_on_success {
                "incoming damage negated"
            } else {
                "reaction succeeded"
            };
            Some(result.with_log(format!(
                "{}: rolled {} (needed {}), {}",
                definition.name, roll, reaction.threshold, effect
            )))
        } else {
            Some(
                SpendResult::failed(format!(
                    "{}: rolled {} (needed {}), no effect",
                    definition.name, roll, reaction.threshold
                ))
                .with_bonus_block(reaction.fail_block),
            )
        }
    }
}

// ============================================================================
// damage-over-time
// ============================================================================

/// Tiered damage per tick with stack decay.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamageOverTime;

impl StatusBehavior for DamageOverTime {
    fn id(&self) -> BehaviorId {
        BehaviorId::DAMAGE_OVER_TIME
    }

    fn apply_tick(
        &self,
        definition: &StatusDefinition,
        config: &BehaviorConfig,
        stacks: u32,
    ) -> Option<TickOutcome> {
        let BehaviorConfig::DamageOverTime(dot) = config else {
            return None;
        };
        if stacks == 0 {
            return None;
        }

        let tier = (stacks as usize).min(dot.tiers.len());
        let damage = tier
            .checked_sub(1)
            .and_then(|index| dot.tiers.get(index))
            .copied()
            .unwrap_or(0);
        let next_stacks = stacks.saturating_sub(dot.effective_decay());
        let prompt = damage > 0 && next_stacks > 0 && dot.prompt_on_damage != Some(false);

        Some(TickOutcome {
            damage,
            next_stacks,
            prompt,
            log: Some(format!(
                "{}: {} damage ({} -> {} stacks)",
                definition.name, damage, stacks, next_stacks
            )),
        })
    }
}
