//! Status definitions and the values flowing through their hooks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::RulesConfig;

use super::{ActivationMode, BehaviorId, PhaseSet, Polarity, SpendPhase, StatusId};

/// Inline spend implementation; overrides the behavior's `apply_spend`.
pub type SpendHook =
    Arc<dyn Fn(&StatusDefinition, &SpendContext, SpendPhase) -> Option<SpendResult> + Send + Sync>;

/// Inline tick implementation; overrides the behavior's `apply_tick`.
pub type TickHook = Arc<dyn Fn(&StatusDefinition, u32) -> Option<TickOutcome> + Send + Sync>;

/// Passive modifier applied to damage/block math while the status is held.
pub type ModifyHook = Arc<dyn Fn(&ModifyContext, u32) -> Option<ModifyResult> + Send + Sync>;

// ============================================================================
// Spend
// ============================================================================

/// Inputs visible to a spend attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpendContext {
    /// Damage of the ability being boosted, if the caller knows it.
    pub base_damage: Option<i32>,
    /// Block of the defense being boosted, if the caller knows it.
    pub base_block: Option<i32>,
    /// Die value supplied for roll-gated spends.
    pub roll: Option<u32>,
    /// Bonus damage accumulated by earlier spends in the same batch.
    pub accumulated_damage: i32,
    /// Bonus block accumulated by earlier spends in the same batch.
    pub accumulated_block: i32,
}

impl SpendContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_damage(mut self, damage: i32) -> Self {
        self.base_damage = Some(damage);
        self
    }

    #[must_use]
    pub fn with_base_block(mut self, block: i32) -> Self {
        self.base_block = Some(block);
        self
    }

    #[must_use]
    pub fn with_roll(mut self, roll: u32) -> Self {
        self.roll = Some(roll);
        self
    }
}

/// What a single spend produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpendResult {
    pub bonus_damage: i32,
    pub bonus_block: i32,
    pub negate_incoming: bool,
    /// False for spends that went through but whose effect failed, e.g. a
    /// reaction roll under its threshold. The stack is consumed either way.
    pub success: bool,
    pub log: Option<String>,
}

impl SpendResult {
    /// A successful spend with no bonuses attached yet.
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// A spend that consumed stacks but had no effect.
    pub fn failed(log: impl Into<String>) -> Self {
        Self {
            success: false,
            log: Some(log.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bonus_damage(mut self, damage: i32) -> Self {
        self.bonus_damage = damage;
        self
    }

    #[must_use]
    pub fn with_bonus_block(mut self, block: i32) -> Self {
        self.bonus_block = block;
        self
    }

    #[must_use]
    pub fn negating(mut self) -> Self {
        self.negate_incoming = true;
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: impl Into<String>) -> Self {
        self.log = Some(log.into());
        self
    }
}

/// Gating and cost of spending a status.
#[derive(Clone)]
pub struct SpendRule {
    /// Stacks consumed per spend.
    pub cost: u32,
    /// Phases in which the spend may fire.
    pub phases: PhaseSet,
    /// Whether the spend context must carry a roll.
    pub requires_roll: bool,
    /// Inline implementation; falls back to the behavior when absent.
    pub apply: Option<SpendHook>,
}

impl SpendRule {
    pub fn new(cost: u32, phases: PhaseSet) -> Self {
        Self {
            cost,
            phases,
            requires_roll: false,
            apply: None,
        }
    }

    #[must_use]
    pub fn requiring_roll(mut self) -> Self {
        self.requires_roll = true;
        self
    }

    #[must_use]
    pub fn with_apply<F>(mut self, apply: F) -> Self
    where
        F: Fn(&StatusDefinition, &SpendContext, SpendPhase) -> Option<SpendResult>
            + Send
            + Sync
            + 'static,
    {
        self.apply = Some(Arc::new(apply));
        self
    }
}

impl fmt::Debug for SpendRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpendRule")
            .field("cost", &self.cost)
            .field("phases", &self.phases)
            .field("requires_roll", &self.requires_roll)
            .field("apply", &self.apply.is_some())
            .finish()
    }
}

// ============================================================================
// Tick
// ============================================================================

/// Result of ticking one status at a turn boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickOutcome {
    pub damage: u32,
    pub next_stacks: u32,
    /// Ask the holder for a follow-up decision (e.g. a cleanse roll).
    pub prompt: bool,
    pub log: Option<String>,
}

/// Roll a holder may make to shed a status after it ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CleanseRule {
    /// Minimum die value that removes every stack.
    pub threshold: u32,
}

// ============================================================================
// Passive modifiers
// ============================================================================

/// Running damage/block values threaded through passive modifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifyContext {
    pub base_damage: i32,
    pub base_block: i32,
    pub phase: Option<SpendPhase>,
}

/// Partial update produced by a modifier; absent fields keep their value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifyResult {
    pub base_damage: Option<i32>,
    pub base_block: Option<i32>,
    pub log: Option<String>,
}

// ============================================================================
// Behavior config
// ============================================================================

/// Config for the `bonus-pool` behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BonusPoolConfig {
    /// Flat damage added per spend in the attack roll.
    pub attack_damage: Option<i32>,
    /// Flat block added per spend in the defense roll.
    pub defense_block: Option<i32>,
}

/// Config for the `pre-defense-reaction` behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReactionConfig {
    /// Minimum roll that counts as a success.
    pub threshold: u32,
    /// Negate the incoming attack on success.
    pub negate_on_success: bool,
    pub success_block: i32,
    pub fail_block: i32,
}

/// Config for the `damage-over-time` behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageOverTimeConfig {
    /// Damage per stack tier; stack count `n` deals `tiers[min(n, len) - 1]`.
    pub tiers: Vec<u32>,
    /// Stacks removed per tick, defaults to one.
    pub decay: Option<u32>,
    /// Set to `Some(false)` to suppress the post-damage prompt.
    pub prompt_on_damage: Option<bool>,
}

impl DamageOverTimeConfig {
    pub fn effective_decay(&self) -> u32 {
        self.decay.unwrap_or(RulesConfig::DEFAULT_DOT_DECAY)
    }
}

/// Opaque configuration handed to a status's behavior.
///
/// Built-in behaviors read their own variant and are inert when handed a
/// different one. Custom behaviors read free-form `Params`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorConfig {
    #[default]
    None,
    BonusPool(BonusPoolConfig),
    PreDefenseReaction(ReactionConfig),
    DamageOverTime(DamageOverTimeConfig),
    Params(BTreeMap<String, i64>),
}

// ============================================================================
// Definition
// ============================================================================

/// Declarative description of a status. Immutable once registered.
#[derive(Clone)]
pub struct StatusDefinition {
    pub id: StatusId,
    pub name: String,
    pub polarity: Polarity,
    pub activation: ActivationMode,
    pub behavior: Option<BehaviorId>,
    pub config: BehaviorConfig,
    pub spend: Option<SpendRule>,
    pub tick: Option<TickHook>,
    pub modify: Option<ModifyHook>,
    pub cleanse: Option<CleanseRule>,
    /// Stack cap; `None` is unbounded.
    pub max_stacks: Option<u32>,
    /// Modifier ordering; lower runs first. `None` means the default.
    pub priority: Option<i32>,
}

impl StatusDefinition {
    /// Creates a positive, active status with no behavior attached.
    pub fn new(id: impl Into<StatusId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            polarity: Polarity::Positive,
            activation: ActivationMode::Active,
            behavior: None,
            config: BehaviorConfig::None,
            spend: None,
            tick: None,
            modify: None,
            cleanse: None,
            max_stacks: None,
            priority: None,
        }
    }

    #[must_use]
    pub fn negative(mut self) -> Self {
        self.polarity = Polarity::Negative;
        self
    }

    #[must_use]
    pub fn passive(mut self) -> Self {
        self.activation = ActivationMode::Passive;
        self
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: BehaviorId, config: BehaviorConfig) -> Self {
        self.behavior = Some(behavior);
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_spend(mut self, rule: SpendRule) -> Self {
        self.spend = Some(rule);
        self
    }

    #[must_use]
    pub fn with_tick<F>(mut self, tick: F) -> Self
    where
        F: Fn(&StatusDefinition, u32) -> Option<TickOutcome> + Send + Sync + 'static,
    {
        self.tick = Some(Arc::new(tick));
        self
    }

    #[must_use]
    pub fn with_modify<F>(mut self, modify: F) -> Self
    where
        F: Fn(&ModifyContext, u32) -> Option<ModifyResult> + Send + Sync + 'static,
    {
        self.modify = Some(Arc::new(modify));
        self
    }

    #[must_use]
    pub fn with_cleanse(mut self, threshold: u32) -> Self {
        self.cleanse = Some(CleanseRule { threshold });
        self
    }

    #[must_use]
    pub fn with_max_stacks(mut self, max: u32) -> Self {
        self.max_stacks = Some(max);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Priority used to order passive modifiers.
    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(RulesConfig::DEFAULT_PRIORITY)
    }

    /// Clamps a requested stack count into `[0, max_stacks]`.
    pub fn clamp_stacks(&self, requested: i64) -> u32 {
        let upper = self.max_stacks.map_or(i64::from(u32::MAX), i64::from);
        requested.clamp(0, upper) as u32
    }
}

impl fmt::Debug for StatusDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("polarity", &self.polarity)
            .field("activation", &self.activation)
            .field("behavior", &self.behavior)
            .field("config", &self.config)
            .field("spend", &self.spend)
            .field("tick", &self.tick.is_some())
            .field("modify", &self.modify.is_some())
            .field("cleanse", &self.cleanse)
            .field("max_stacks", &self.max_stacks)
            .field("priority", &self.priority)
            .finish()
    }
}
