//! Built-in status catalog.
//!
//! These are the statuses every duel knows about. Data files can add more or
//! override these by id.

use duel_core::status::{
    BehaviorConfig, BehaviorId, BonusPoolConfig, DamageOverTimeConfig, ModifyContext,
    ModifyResult, PhaseSet, ReactionConfig, SpendRule,
};
use duel_core::{StatusDefinition, StatusId, StatusRegistry};

pub const CHI: StatusId = StatusId::from_static("chi");
pub const EVASIVE: StatusId = StatusId::from_static("evasive");
pub const BURN: StatusId = StatusId::from_static("burn");
pub const POISON: StatusId = StatusId::from_static("poison");
pub const ICEWALL: StatusId = StatusId::from_static("icewall");
pub const FURY: StatusId = StatusId::from_static("fury");

/// Builds a passive modifier adding a flat amount per held stack.
///
/// Damage bonuses only apply while there is damage to boost, block bonuses
/// only while there is block.
pub fn per_stack_modifier(
    name: impl Into<String>,
    damage_per_stack: i32,
    block_per_stack: i32,
) -> impl Fn(&ModifyContext, u32) -> Option<ModifyResult> + Send + Sync + 'static {
    let name = name.into();
    move |context, stacks| {
        let stacks = i32::try_from(stacks).unwrap_or(i32::MAX);
        let damage = (damage_per_stack != 0 && context.base_damage > 0)
            .then(|| context.base_damage.saturating_add(damage_per_stack.saturating_mul(stacks)));
        let block = (block_per_stack != 0 && context.base_block > 0)
            .then(|| context.base_block.saturating_add(block_per_stack.saturating_mul(stacks)));
        if damage.is_none() && block.is_none() {
            return None;
        }

        let log = match (damage, block) {
            (Some(d), Some(b)) => format!("{name}: damage {d}, block {b}"),
            (Some(d), None) => format!("{name}: damage {} -> {d}", context.base_damage),
            (None, Some(b)) => format!("{name}: block {} -> {b}", context.base_block),
            (None, None) => String::new(),
        };
        Some(ModifyResult {
            base_damage: damage,
            base_block: block,
            log: Some(log),
        })
    }
}

/// Definitions of the built-in statuses, in registration order.
pub fn builtin_statuses() -> Vec<StatusDefinition> {
    vec![
        StatusDefinition::new(CHI, "Chi")
            .with_behavior(
                BehaviorId::BONUS_POOL,
                BehaviorConfig::BonusPool(BonusPoolConfig {
                    attack_damage: Some(1),
                    defense_block: Some(1),
                }),
            )
            .with_spend(SpendRule::new(1, PhaseSet::ROLLS))
            .with_max_stacks(6),
        StatusDefinition::new(EVASIVE, "Evasive")
            .with_behavior(
                BehaviorId::PRE_DEFENSE_REACTION,
                BehaviorConfig::PreDefenseReaction(ReactionConfig {
                    threshold: 5,
                    negate_on_success: true,
                    success_block: 0,
                    fail_block: 0,
                }),
            )
            .with_spend(SpendRule::new(1, PhaseSet::DEFENSE_ROLL).requiring_roll())
            .with_max_stacks(3),
        StatusDefinition::new(BURN, "Burn")
            .negative()
            .passive()
            .with_behavior(
                BehaviorId::DAMAGE_OVER_TIME,
                BehaviorConfig::DamageOverTime(DamageOverTimeConfig {
                    tiers: vec![2, 3, 4],
                    decay: Some(1),
                    prompt_on_damage: None,
                }),
            )
            .with_cleanse(4)
            .with_max_stacks(3),
        StatusDefinition::new(POISON, "Poison")
            .negative()
            .passive()
            .with_behavior(
                BehaviorId::DAMAGE_OVER_TIME,
                BehaviorConfig::DamageOverTime(DamageOverTimeConfig {
                    tiers: vec![1, 2, 3],
                    decay: Some(1),
                    prompt_on_damage: Some(false),
                }),
            )
            .with_max_stacks(5),
        StatusDefinition::new(ICEWALL, "Ice Wall")
            .with_behavior(
                BehaviorId::BONUS_POOL,
                BehaviorConfig::BonusPool(BonusPoolConfig {
                    attack_damage: None,
                    defense_block: Some(1),
                }),
            )
            .with_spend(SpendRule::new(1, PhaseSet::DEFENSE_ROLL))
            .with_max_stacks(4),
        StatusDefinition::new(FURY, "Fury")
            .passive()
            .with_priority(50)
            .with_modify(per_stack_modifier("Fury", 1, 0))
            .with_max_stacks(3),
    ]
}

/// A registry holding the built-in behaviors and statuses.
pub fn builtin_registry() -> StatusRegistry {
    let mut registry = StatusRegistry::new();
    for definition in builtin_statuses() {
        registry.define_status(definition);
    }
    registry
}
