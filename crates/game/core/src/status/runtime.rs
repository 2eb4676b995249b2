//! Pure operations over [`StatusStacks`].
//!
//! Every operation takes the current stack map by reference and returns a new
//! one; nothing is mutated in place. Unknown status ids are inert: they are
//! skipped, deal no damage and produce no log.

use crate::lifecycle::{LifecycleSink, SinkFailures, StatusLifecycleEvent};
use crate::state::Side;

use super::definition::{ModifyContext, SpendContext, SpendResult, StatusDefinition, TickOutcome};
use super::summary::StatusSpendSummary;
use super::{SpendPhase, StatusId, StatusRegistry, StatusStacks};

// ============================================================================
// Outcome types
// ============================================================================

/// Follow-up decision requested by a tick, resolved by a later call to
/// [`StatusRuntime::resolve_cleanse_prompt`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickPrompt {
    pub status: StatusId,
    /// Stacks still held after the tick.
    pub stacks: u32,
    /// Roll needed to cleanse, when the definition declares a cleanse rule.
    pub threshold: Option<u32>,
}

/// Per-status detail of a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickEntry {
    pub status: StatusId,
    pub before: u32,
    pub after: u32,
    pub damage: u32,
}

/// Result of ticking every held status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub stacks: StatusStacks,
    pub damage: u32,
    pub entries: Vec<TickEntry>,
    pub logs: Vec<String>,
    pub prompts: Vec<TickPrompt>,
}

/// A spend that went through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendOutcome {
    pub stacks: StatusStacks,
    pub result: SpendResult,
}

/// Running totals handed to the context builder between repeated spends.
#[derive(Clone, Copy, Debug)]
pub struct SpendProgress<'a> {
    /// Zero-based index of the attempt about to be made.
    pub attempt: u32,
    pub accumulated_damage: i32,
    pub accumulated_block: i32,
    /// Roll used by the previous attempt.
    pub previous_roll: Option<u32>,
    pub initial: &'a SpendContext,
}

/// Result of a batch of spends of one status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendManyOutcome {
    pub stacks: StatusStacks,
    pub summary: StatusSpendSummary,
}

/// Result of folding passive modifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifierOutcome {
    pub context: ModifyContext,
    pub logs: Vec<String>,
}

/// Result of resolving a cleanse prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanseOutcome {
    pub stacks: StatusStacks,
    pub cleansed: bool,
    pub log: String,
}

// ============================================================================
// Runtime
// ============================================================================

/// Read-only view over a [`StatusRegistry`] exposing the stack operations.
///
/// Optionally reports every transition to a [`LifecycleSink`] tagged with the
/// owning side. Reporting never changes the result.
#[derive(Clone, Copy)]
pub struct StatusRuntime<'a> {
    registry: &'a StatusRegistry,
    sink: Option<(&'a dyn LifecycleSink, &'a SinkFailures)>,
    owner: Option<Side>,
}

impl<'a> StatusRuntime<'a> {
    pub fn new(registry: &'a StatusRegistry) -> Self {
        Self {
            registry,
            sink: None,
            owner: None,
        }
    }

    /// Reports transitions to `sink`; events it rejects are kept in `failures`.
    #[must_use]
    pub fn with_lifecycle(
        mut self,
        sink: &'a dyn LifecycleSink,
        failures: &'a SinkFailures,
    ) -> Self {
        self.sink = Some((sink, failures));
        self
    }

    /// Tags reported transitions with `side`.
    #[must_use]
    pub fn for_side(mut self, side: Side) -> Self {
        self.owner = Some(side);
        self
    }

    pub fn registry(&self) -> &'a StatusRegistry {
        self.registry
    }

    pub(crate) fn publish(&self, event: StatusLifecycleEvent) {
        if let Some((sink, failures)) = self.sink {
            failures.publish(sink, &event);
        }
    }

    // ------------------------------------------------------------------------
    // Stack primitives
    // ------------------------------------------------------------------------

    pub fn get_stacks(&self, stacks: &StatusStacks, id: &str) -> u32 {
        stacks.get(id)
    }

    /// Adds `delta` stacks (negative removes), clamped to the definition cap.
    pub fn add_stacks(&self, stacks: &StatusStacks, id: &str, delta: i64) -> StatusStacks {
        let current = i64::from(stacks.get(id));
        self.write_stacks(stacks, id, current.saturating_add(delta))
    }

    /// Sets the stack count, clamped to `[0, max_stacks]`.
    pub fn set_stacks(&self, stacks: &StatusStacks, id: &str, count: i64) -> StatusStacks {
        self.write_stacks(stacks, id, count)
    }

    /// Clamps every known status to its definition cap.
    ///
    /// For maps that did not come from this runtime, such as deserialized
    /// snapshots. Unknown ids are left as they are. Publishes nothing.
    pub fn normalize_stacks(&self, stacks: &StatusStacks) -> StatusStacks {
        stacks.iter().fold(stacks.clone(), |normalized, (id, count)| {
            match self.registry.get_status(id.as_str()) {
                Some(definition) => {
                    normalized.with_count(id, definition.clamp_stacks(i64::from(count)))
                }
                None => normalized,
            }
        })
    }

    fn write_stacks(&self, stacks: &StatusStacks, id: &str, requested: i64) -> StatusStacks {
        let Some(definition) = self.registry.get_status(id) else {
            return stacks.clone();
        };

        let before = stacks.get(id);
        let after = definition.clamp_stacks(requested);
        if before != after {
            self.publish(StatusLifecycleEvent::StacksChanged {
                owner: self.owner,
                status: definition.id.clone(),
                before,
                after,
            });
        }
        stacks.with_count(&definition.id, after)
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    fn tick_source(&self, definition: &StatusDefinition, stacks: u32) -> Option<TickOutcome> {
        if let Some(tick) = &definition.tick {
            return tick(definition, stacks);
        }
        self.registry
            .behavior_for(definition)
            .and_then(|behavior| behavior.apply_tick(definition, &definition.config, stacks))
    }

    /// Ticks every held status once for a turn boundary.
    pub fn tick_statuses(&self, stacks: &StatusStacks) -> TickReport {
        let mut report = TickReport {
            stacks: stacks.clone(),
            ..TickReport::default()
        };

        for (id, before) in stacks.iter() {
            let Some(definition) = self.registry.get_status(id.as_str()) else {
                continue;
            };
            let Some(outcome) = self.tick_source(definition, before) else {
                continue;
            };

            let after = definition.clamp_stacks(i64::from(outcome.next_stacks));
            report.stacks = report.stacks.with_count(&definition.id, after);
            report.damage += outcome.damage;
            report.entries.push(TickEntry {
                status: definition.id.clone(),
                before,
                after,
                damage: outcome.damage,
            });
            if let Some(log) = outcome.log {
                report.logs.push(log);
            }

            self.publish(StatusLifecycleEvent::Ticked {
                owner: self.owner,
                status: definition.id.clone(),
                damage: outcome.damage,
                before,
                after,
            });

            if outcome.prompt && after > 0 {
                let prompt = TickPrompt {
                    status: definition.id.clone(),
                    stacks: after,
                    threshold: definition.cleanse.map(|rule| rule.threshold),
                };
                self.publish(StatusLifecycleEvent::PromptRaised {
                    owner: self.owner,
                    prompt: prompt.clone(),
                });
                report.prompts.push(prompt);
            }
        }

        report
    }

    /// Resolves a prompt raised by [`tick_statuses`](Self::tick_statuses).
    ///
    /// Returns `None` when the status has no cleanse rule or is no longer held.
    /// A roll at or above the threshold removes every stack.
    pub fn resolve_cleanse_prompt(
        &self,
        stacks: &StatusStacks,
        prompt: &TickPrompt,
        roll: u32,
    ) -> Option<CleanseOutcome> {
        let definition = self.registry.get_status(prompt.status.as_str())?;
        let rule = definition.cleanse?;
        if !stacks.contains(definition.id.as_str()) {
            return None;
        }

        let cleansed = roll >= rule.threshold;
        self.publish(StatusLifecycleEvent::CleanseResolved {
            owner: self.owner,
            status: definition.id.clone(),
            roll,
            cleansed,
        });

        if cleansed {
            Some(CleanseOutcome {
                stacks: stacks.with_count(&definition.id, 0),
                cleansed,
                log: format!(
                    "{}: cleansed with {} (needed {})",
                    definition.name, roll, rule.threshold
                ),
            })
        } else {
            Some(CleanseOutcome {
                stacks: stacks.clone(),
                cleansed,
                log: format!(
                    "{}: cleanse failed with {} (needed {})",
                    definition.name, roll, rule.threshold
                ),
            })
        }
    }

    // ------------------------------------------------------------------------
    // Spend
    // ------------------------------------------------------------------------

    /// Attempts a single spend of `id` in `phase`.
    ///
    /// Returns `None` without touching the stacks when any gate fails, in
    /// order: no spend rule, phase not allowed, required roll missing,
    /// non-positive base damage in the attack roll, non-positive base block in
    /// the defense roll, not enough stacks. A `None` from the spend
    /// implementation also fails the spend.
    pub fn spend_status(
        &self,
        stacks: &StatusStacks,
        id: &str,
        phase: SpendPhase,
        context: &SpendContext,
    ) -> Option<SpendOutcome> {
        let definition = self.registry.get_status(id)?;
        let rule = definition.spend.as_ref()?;

        if !rule.phases.allows(phase) {
            return None;
        }
        if rule.requires_roll && context.roll.is_none() {
            return None;
        }
        if phase == SpendPhase::AttackRoll && context.base_damage.is_some_and(|d| d <= 0) {
            return None;
        }
        if phase == SpendPhase::DefenseRoll && context.base_block.is_some_and(|b| b <= 0) {
            return None;
        }

        let current = stacks.get(id);
        if current < rule.cost {
            return None;
        }

        let result = match &rule.apply {
            Some(apply) => apply(definition, context, phase),
            None => self.registry.behavior_for(definition).and_then(|behavior| {
                behavior.apply_spend(definition, &definition.config, context, phase)
            }),
        }?;

        let remaining = current - rule.cost;
        self.publish(StatusLifecycleEvent::Spent {
            owner: self.owner,
            status: definition.id.clone(),
            phase,
            cost: rule.cost,
            stacks_after: remaining,
            result: result.clone(),
        });

        Some(SpendOutcome {
            stacks: stacks.with_count(&definition.id, remaining),
            result,
        })
    }

    /// Spends `id` up to `attempts` times.
    ///
    /// The first attempt uses `initial`; each later attempt asks `build` for a
    /// context given the bonuses accumulated so far and the previous roll.
    /// Stops at the first spend that does not go through, and after a spend
    /// whose effect failed. Returns `None` when no spend went through.
    pub fn spend_status_many<F>(
        &self,
        stacks: &StatusStacks,
        id: &str,
        attempts: u32,
        phase: SpendPhase,
        mut build: F,
        initial: &SpendContext,
    ) -> Option<SpendManyOutcome>
    where
        F: FnMut(&SpendProgress<'_>) -> SpendContext,
    {
        let definition = self.registry.get_status(id)?;
        let mut summary = StatusSpendSummary::new(definition.id.clone(), phase);
        let mut current = stacks.clone();
        let mut context = initial.clone();

        for attempt in 0..attempts {
            if attempt > 0 {
                context = build(&SpendProgress {
                    attempt,
                    accumulated_damage: summary.bonus_damage,
                    accumulated_block: summary.bonus_block,
                    previous_roll: context.roll,
                    initial,
                });
            }

            let Some(outcome) = self.spend_status(&current, id, phase, &context) else {
                break;
            };
            let cost = stacks_delta(&current, &outcome.stacks, id);
            let effect_failed = !outcome.result.success;
            current = outcome.stacks;
            summary.record(cost, outcome.result);

            if effect_failed {
                break;
            }
        }

        if summary.results.is_empty() {
            return None;
        }

        Some(SpendManyOutcome {
            stacks: current,
            summary,
        })
    }

    /// Like [`spend_status`](Self::spend_status) but treats a gated spend as
    /// caller misuse. For harnesses whose setup guarantees the spend.
    pub fn require_spend(
        &self,
        stacks: &StatusStacks,
        id: &str,
        phase: SpendPhase,
        context: &SpendContext,
    ) -> Result<SpendOutcome, crate::RulesError> {
        let definition = self
            .registry
            .get_status(id)
            .ok_or_else(|| crate::RulesError::UnknownStatus(StatusId::from(id)))?;

        self.spend_status(stacks, id, phase, context)
            .ok_or_else(|| crate::RulesError::SpendUnavailable {
                status: definition.id.clone(),
                phase,
            })
    }

    // ------------------------------------------------------------------------
    // Passive modifiers
    // ------------------------------------------------------------------------

    /// Folds every held passive modifier into `context`.
    ///
    /// Modifiers run in ascending priority; ties keep registration order.
    /// Only the fields a modifier returns replace the running values.
    pub fn apply_modifiers(&self, stacks: &StatusStacks, context: ModifyContext) -> ModifierOutcome {
        let mut active: Vec<(i32, usize, &StatusDefinition, u32)> = stacks
            .iter()
            .filter_map(|(id, count)| {
                let definition = self.registry.get_status(id.as_str())?;
                definition.modify.as_ref()?;
                let position = self.registry.registration_index(id.as_str())?;
                Some((definition.effective_priority(), position, definition.as_ref(), count))
            })
            .collect();
        active.sort_by_key(|&(priority, position, _, _)| (priority, position));

        let mut outcome = ModifierOutcome {
            context,
            logs: Vec::new(),
        };
        for (_, _, definition, count) in active {
            let Some(modify) = &definition.modify else {
                continue;
            };
            let Some(result) = modify(&outcome.context, count) else {
                continue;
            };

            if let Some(damage) = result.base_damage {
                outcome.context.base_damage = damage;
            }
            if let Some(block) = result.base_block {
                outcome.context.base_block = block;
            }
            if let Some(log) = result.log {
                outcome.logs.push(log);
            }
        }

        outcome
    }
}

fn stacks_delta(before: &StatusStacks, after: &StatusStacks, id: &str) -> u32 {
    before.get(id).saturating_sub(after.get(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::definition::{
        BehaviorConfig, BonusPoolConfig, DamageOverTimeConfig, ModifyResult, ReactionConfig,
        SpendRule,
    };
    use crate::status::{BehaviorId, PhaseSet};
    use proptest::prelude::*;

    fn fixture() -> StatusRegistry {
        let mut registry = StatusRegistry::new();
        registry.define_status(
            StatusDefinition::new("chi", "Chi")
                .with_behavior(
                    BehaviorId::BONUS_POOL,
                    BehaviorConfig::BonusPool(BonusPoolConfig {
                        attack_damage: Some(1),
                        defense_block: Some(1),
                    }),
                )
                .with_spend(SpendRule::new(1, PhaseSet::ROLLS))
                .with_max_stacks(6),
        );
        registry.define_status(
            StatusDefinition::new("evasive", "Evasive")
                .with_behavior(
                    BehaviorId::PRE_DEFENSE_REACTION,
                    BehaviorConfig::PreDefenseReaction(ReactionConfig {
                        threshold: 5,
                        negate_on_success: true,
                        ..ReactionConfig::default()
                    }),
                )
                .with_spend(SpendRule::new(1, PhaseSet::DEFENSE_ROLL).requiring_roll())
                .with_max_stacks(3),
        );
        registry.define_status(
            StatusDefinition::new("burn", "Burn")
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
        );
        registry
    }

    fn with_modifiers(registry: &mut StatusRegistry) {
        registry.define_status(
            StatusDefinition::new("high", "High")
                .passive()
                .with_priority(50)
                .with_modify(|ctx, _| {
                    Some(ModifyResult {
                        base_damage: Some(ctx.base_damage + 3),
                        base_block: None,
                        log: Some(format!("high applied at damage {}", ctx.base_damage)),
                    })
                }),
        );
        registry.define_status(
            StatusDefinition::new("low", "Low")
                .passive()
                .with_priority(5)
                .with_modify(|ctx, _| {
                    Some(ModifyResult {
                        base_damage: Some(ctx.base_damage + 2),
                        base_block: None,
                        log: Some(format!("low applied at damage {}", ctx.base_damage)),
                    })
                }),
        );
    }

    proptest! {
        #[test]
        fn set_stacks_clamps_into_cap(n in -20i64..40) {
            let registry = fixture();
            let runtime = registry.runtime();
            let stacks = runtime.set_stacks(&StatusStacks::new(), "chi", n);

            let expected = n.clamp(0, 6) as u32;
            prop_assert_eq!(stacks.get("chi"), expected);
            prop_assert_eq!(stacks.contains("chi"), expected > 0);
        }
    }

    #[test]
    fn add_stacks_drops_key_at_zero() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.add_stacks(&StatusStacks::new(), "chi", 2);
        let cleared = runtime.add_stacks(&stacks, "chi", -5);

        assert_eq!(stacks.get("chi"), 2);
        assert!(!cleared.contains("chi"));
        assert!(cleared.is_empty());
    }

    #[test]
    fn normalize_caps_loaded_counts() {
        let registry = fixture();
        let loaded = StatusStacks::from(std::collections::BTreeMap::from([
            (StatusId::from("chi"), 9),
            (StatusId::from("burn"), 0),
            (StatusId::from("ghost"), 4),
        ]));

        let stacks = registry.runtime().normalize_stacks(&loaded);
        assert_eq!(stacks.get("chi"), 6);
        assert!(!stacks.contains("burn"));
        assert_eq!(stacks.get("ghost"), 4);
    }

    #[test]
    fn mutators_leave_previous_snapshot_intact() {
        let registry = fixture();
        let runtime = registry.runtime();
        let before = runtime.set_stacks(&StatusStacks::new(), "chi", 3);
        let after = runtime.add_stacks(&before, "chi", 1);

        assert_eq!(before.get("chi"), 3);
        assert_eq!(after.get("chi"), 4);
    }

    #[test]
    fn unknown_status_is_inert() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.add_stacks(&StatusStacks::new(), "ghost", 3);

        assert!(stacks.is_empty());
        assert!(
            runtime
                .spend_status(&stacks, "ghost", SpendPhase::AttackRoll, &SpendContext::new())
                .is_none()
        );
    }

    #[test]
    fn burn_ticks_down_through_its_tiers() {
        let registry = fixture();
        let runtime = registry.runtime();
        let mut stacks = runtime.set_stacks(&StatusStacks::new(), "burn", 3);

        let mut damages = Vec::new();
        for _ in 0..3 {
            let report = runtime.tick_statuses(&stacks);
            damages.push(report.damage);
            stacks = report.stacks;
        }

        assert_eq!(damages, [4, 3, 2]);
        assert_eq!(stacks.get("burn"), 0);
        assert!(stacks.is_empty());
    }

    #[test]
    fn tick_prompts_only_for_surviving_stacks() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "burn", 2);

        let report = runtime.tick_statuses(&stacks);
        assert_eq!(report.prompts.len(), 1);
        assert_eq!(report.prompts[0].stacks, 1);
        assert_eq!(report.prompts[0].threshold, Some(4));

        let last = runtime.tick_statuses(&report.stacks);
        assert!(last.prompts.is_empty());
    }

    #[test]
    fn statuses_without_tick_source_keep_their_stacks() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "chi", 2);

        let report = runtime.tick_statuses(&stacks);
        assert_eq!(report.damage, 0);
        assert_eq!(report.stacks.get("chi"), 2);
        assert!(report.entries.is_empty());
    }

    #[test]
    fn cleanse_prompt_resolution() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "burn", 3);
        let report = runtime.tick_statuses(&stacks);
        let prompt = &report.prompts[0];

        let failed = runtime
            .resolve_cleanse_prompt(&report.stacks, prompt, 3)
            .unwrap();
        assert!(!failed.cleansed);
        assert_eq!(failed.stacks.get("burn"), 2);

        let cleansed = runtime
            .resolve_cleanse_prompt(&report.stacks, prompt, 4)
            .unwrap();
        assert!(cleansed.cleansed);
        assert!(!cleansed.stacks.contains("burn"));
    }

    #[test]
    fn chi_spend_adds_damage_and_consumes_one_stack() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "chi", 2);

        let outcome = runtime
            .spend_status(
                &stacks,
                "chi",
                SpendPhase::AttackRoll,
                &SpendContext::new().with_base_damage(3),
            )
            .unwrap();

        assert_eq!(outcome.result.bonus_damage, 1);
        assert_eq!(outcome.stacks.get("chi"), 1);
        assert_eq!(stacks.get("chi"), 2);
    }

    #[test]
    fn spend_gates_reject_without_mutation() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "chi", 1);

        let zero_damage = SpendContext::new().with_base_damage(0);
        assert!(
            runtime
                .spend_status(&stacks, "chi", SpendPhase::AttackRoll, &zero_damage)
                .is_none()
        );

        let zero_block = SpendContext::new().with_base_block(0);
        assert!(
            runtime
                .spend_status(&stacks, "chi", SpendPhase::DefenseRoll, &zero_block)
                .is_none()
        );

        assert!(
            runtime
                .spend_status(&stacks, "chi", SpendPhase::Upkeep, &SpendContext::new())
                .is_none()
        );
        assert!(
            runtime
                .spend_status(
                    &StatusStacks::new(),
                    "chi",
                    SpendPhase::AttackRoll,
                    &SpendContext::new()
                )
                .is_none()
        );
    }

    #[test]
    fn evasive_reaction_sequence() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "evasive", 1);

        let no_roll = runtime.spend_status(
            &stacks,
            "evasive",
            SpendPhase::DefenseRoll,
            &SpendContext::new(),
        );
        assert!(no_roll.is_none());

        let low = runtime
            .spend_status(
                &stacks,
                "evasive",
                SpendPhase::DefenseRoll,
                &SpendContext::new().with_roll(3),
            )
            .unwrap();
        assert!(!low.result.success);
        assert!(!low.stacks.contains("evasive"));

        let replenished = runtime.set_stacks(&low.stacks, "evasive", 1);
        let high = runtime
            .spend_status(
                &replenished,
                "evasive",
                SpendPhase::DefenseRoll,
                &SpendContext::new().with_roll(5),
            )
            .unwrap();
        assert!(high.result.success);
        assert!(high.result.negate_incoming);
    }

    #[test]
    fn inline_spend_overrides_behavior() {
        let mut registry = fixture();
        registry.define_status(
            StatusDefinition::new("chi", "Chi")
                .with_behavior(
                    BehaviorId::BONUS_POOL,
                    BehaviorConfig::BonusPool(BonusPoolConfig {
                        attack_damage: Some(1),
                        defense_block: None,
                    }),
                )
                .with_spend(
                    SpendRule::new(1, PhaseSet::ATTACK_ROLL)
                        .with_apply(|_, _, _| Some(SpendResult::succeeded().with_bonus_damage(5))),
                ),
        );
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "chi", 1);

        let outcome = runtime
            .spend_status(&stacks, "chi", SpendPhase::AttackRoll, &SpendContext::new())
            .unwrap();
        assert_eq!(outcome.result.bonus_damage, 5);
    }

    #[test]
    fn spend_many_accumulates_until_stacks_run_out() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "chi", 3);
        let initial = SpendContext::new().with_base_damage(10);

        let mut seen = Vec::new();
        let outcome = runtime
            .spend_status_many(
                &stacks,
                "chi",
                5,
                SpendPhase::AttackRoll,
                |progress| {
                    seen.push(progress.accumulated_damage);
                    progress.initial.clone()
                },
                &initial,
            )
            .unwrap();

        assert_eq!(outcome.summary.stacks_spent, 3);
        assert_eq!(outcome.summary.bonus_damage, 3);
        assert_eq!(outcome.summary.successes, 3);
        assert_eq!(outcome.summary.logs.len(), 3);
        assert!(outcome.stacks.is_empty());
        assert_eq!(seen, [1, 2, 3]);
    }

    #[test]
    fn spend_many_returns_none_when_nothing_spent() {
        let registry = fixture();
        let runtime = registry.runtime();

        let outcome = runtime.spend_status_many(
            &StatusStacks::new(),
            "chi",
            3,
            SpendPhase::AttackRoll,
            |progress| progress.initial.clone(),
            &SpendContext::new(),
        );
        assert!(outcome.is_none());
    }

    #[test]
    fn spend_many_stops_after_failed_reaction() {
        let registry = fixture();
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "evasive", 3);

        let outcome = runtime
            .spend_status_many(
                &stacks,
                "evasive",
                3,
                SpendPhase::DefenseRoll,
                |progress| SpendContext::new().with_roll(progress.previous_roll.unwrap_or(0)),
                &SpendContext::new().with_roll(2),
            )
            .unwrap();

        assert_eq!(outcome.summary.stacks_spent, 1);
        assert_eq!(outcome.summary.successes, 0);
        assert_eq!(outcome.stacks.get("evasive"), 2);
    }

    #[test]
    fn require_spend_reports_misuse() {
        let registry = fixture();
        let runtime = registry.runtime();

        let err = runtime
            .require_spend(
                &StatusStacks::new(),
                "evasive",
                SpendPhase::DefenseRoll,
                &SpendContext::new().with_roll(6),
            )
            .unwrap_err();
        assert!(matches!(err, crate::RulesError::SpendUnavailable { .. }));
    }

    #[test]
    fn modifiers_fold_in_priority_order() {
        let mut registry = fixture();
        with_modifiers(&mut registry);
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "high", 1);
        let stacks = runtime.set_stacks(&stacks, "low", 1);

        let outcome = runtime.apply_modifiers(
            &stacks,
            ModifyContext {
                base_damage: 10,
                ..ModifyContext::default()
            },
        );

        assert_eq!(outcome.context.base_damage, 15);
        assert_eq!(
            outcome.logs,
            ["low applied at damage 10", "high applied at damage 12"]
        );
    }

    #[test]
    fn equal_priorities_follow_registration_order() {
        let mut registry = StatusRegistry::new();
        for (id, bump) in [("zeta", 1), ("alpha", 10)] {
            registry.define_status(StatusDefinition::new(id, id).passive().with_modify(
                move |ctx, _| {
                    Some(ModifyResult {
                        base_damage: Some(ctx.base_damage * bump + 1),
                        base_block: None,
                        log: Some(id.to_string()),
                    })
                },
            ));
        }
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "alpha", 1);
        let stacks = runtime.set_stacks(&stacks, "zeta", 1);

        let outcome = runtime.apply_modifiers(&stacks, ModifyContext::default());
        assert_eq!(outcome.logs, ["zeta", "alpha"]);
        assert_eq!(outcome.context.base_damage, 11);
    }

    #[test]
    fn modifier_returning_nothing_changes_nothing() {
        let mut registry = StatusRegistry::new();
        registry.define_status(
            StatusDefinition::new("idle", "Idle")
                .passive()
                .with_modify(|_, _| None),
        );
        registry.define_status(
            StatusDefinition::new("ward", "Ward")
                .passive()
                .with_modify(|ctx, stacks| {
                    Some(ModifyResult {
                        base_damage: None,
                        base_block: Some(ctx.base_block + stacks as i32),
                        log: None,
                    })
                }),
        );
        let runtime = registry.runtime();
        let stacks = runtime.set_stacks(&StatusStacks::new(), "idle", 1);
        let stacks = runtime.set_stacks(&stacks, "ward", 2);

        let outcome = runtime.apply_modifiers(
            &stacks,
            ModifyContext {
                base_damage: 7,
                base_block: 3,
                phase: None,
            },
        );
        assert_eq!(outcome.context.base_damage, 7);
        assert_eq!(outcome.context.base_block, 5);
        assert!(outcome.logs.is_empty());
    }
}
