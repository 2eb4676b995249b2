use std::sync::Mutex;

use duel_core::combat::{DefensePlan, SpendRequest};
use duel_core::status::{
    BehaviorConfig, BehaviorId, BonusPoolConfig, DamageOverTimeConfig, ModifyContext,
    ModifyResult, PhaseSet, ReactionConfig, SpendRule,
};
use duel_core::{
    AttackInput, BuffTrigger, CombatantState, DefenseBuffGrant, DefensePlanner, DefenseResolution,
    GrantContext, HeroId, LifecycleSink, Side, SinkError, SinkFailures, StatusDefinition, StatusLifecycleEvent,
    StatusRegistry, StatusStacks, StatusDefensePlanner, TurnPhase, TurnState, UsablePhase,
    apply_ready_defense_buffs, build_pending_defense_buffs_from_grants,
    partition_pending_defense_buffs, plan_offense, resolve_attack,
};

fn registry() -> StatusRegistry {
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
        StatusDefinition::new("icewall", "Ice Wall")
            .with_behavior(
                BehaviorId::BONUS_POOL,
                BehaviorConfig::BonusPool(BonusPoolConfig {
                    attack_damage: None,
                    defense_block: Some(1),
                }),
            )
            .with_spend(SpendRule::new(1, PhaseSet::DEFENSE_ROLL))
            .with_max_stacks(4),
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
    registry.define_status(
        StatusDefinition::new("fury", "Fury")
            .passive()
            .with_priority(50)
            .with_modify(|ctx, stacks| {
                Some(ModifyResult {
                    base_damage: Some(ctx.base_damage + stacks as i32),
                    base_block: None,
                    log: Some(format!("fury +{stacks}")),
                })
            })
            .with_max_stacks(3),
    );
    registry
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<StatusLifecycleEvent>>,
}

impl RecordingSink {
    fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(StatusLifecycleEvent::kind)
            .collect()
    }
}

impl LifecycleSink for RecordingSink {
    fn publish(&self, event: &StatusLifecycleEvent) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[test]
fn chi_against_icewall_with_reflect() {
    let registry = registry();
    let runtime = registry.runtime();
    let turn = TurnState::new(Side::Player).at_phase(TurnPhase::Defense);

    let attacker = CombatantState::new(Side::Player, HeroId::new("monk"), 50)
        .with_stacks(runtime.set_stacks(&StatusStacks::new(), "chi", 3));
    let defender = CombatantState::new(Side::Ai, HeroId::new("frost"), 50)
        .with_stacks(runtime.set_stacks(&StatusStacks::new(), "icewall", 2));

    let offense = plan_offense(&runtime, &attacker, 10, &[SpendRequest::new("chi", 3)]);
    assert_eq!(offense.spends[0].bonus_damage, 3);
    assert!(offense.attacker.stacks.is_empty());

    let base = DefenseResolution {
        base_block: 5,
        reflect: 2,
        ..DefenseResolution::default()
    };
    let DefensePlan {
        resolution: defense,
        defender,
    } = StatusDefensePlanner::new(runtime).plan(
        &defender,
        13,
        base,
        &[SpendRequest::new("icewall", 2)],
    );
    assert_eq!(defense.totals().bonus_block, 2);

    let resolution = resolve_attack(&AttackInput {
        turn: &turn,
        attacker: &offense.attacker,
        defender: &defender,
        base_damage: 10,
        attack_spends: &offense.spends,
        defense: &defense,
    });

    assert_eq!(resolution.summary.damage_dealt, 6);
    assert_eq!(resolution.summary.blocked, 7);
    assert_eq!(resolution.summary.reflected, 2);
    assert_eq!(resolution.attacker.hp, 48);
    assert_eq!(resolution.defender.hp, 44);
    assert!(!resolution.summary.attacker_defeated);
    assert!(!resolution.summary.defender_defeated);
}

#[test]
fn evasive_negates_the_whole_attack() {
    let registry = registry();
    let runtime = registry.runtime();
    let turn = TurnState::new(Side::Ai);

    let attacker = CombatantState::new(Side::Ai, HeroId::new("pyro"), 50);
    let defender = CombatantState::new(Side::Player, HeroId::new("monk"), 50)
        .with_stacks(runtime.set_stacks(&StatusStacks::new(), "evasive", 1));

    let plan = StatusDefensePlanner::new(runtime).plan(
        &defender,
        12,
        DefenseResolution::default(),
        &[SpendRequest::new("evasive", 1).with_rolls([6])],
    );
    assert!(plan.resolution.totals().negate_incoming);
    assert!(plan.defender.stacks.is_empty());

    let resolution = resolve_attack(&AttackInput {
        turn: &turn,
        attacker: &attacker,
        defender: &plan.defender,
        base_damage: 12,
        attack_spends: &[],
        defense: &plan.resolution,
    });
    assert_eq!(resolution.summary.damage_dealt, 0);
    assert_eq!(resolution.defender.hp, 50);
}

#[test]
fn passive_modifiers_feed_base_damage() {
    let registry = registry();
    let runtime = registry.runtime();
    let stacks = runtime.set_stacks(&StatusStacks::new(), "fury", 2);

    let outcome = runtime.apply_modifiers(
        &stacks,
        ModifyContext {
            base_damage: 8,
            ..ModifyContext::default()
        },
    );
    assert_eq!(outcome.context.base_damage, 10);
    assert_eq!(outcome.logs, ["fury +2"]);
}

#[test]
fn granted_buff_lands_on_the_owners_next_turn() {
    let registry = registry();
    let sink = RecordingSink::default();
    let failures = SinkFailures::new();
    let runtime = registry
        .runtime()
        .with_lifecycle(&sink, &failures)
        .for_side(Side::Ai);

    let turn = TurnState::new(Side::Player);
    let grants = [DefenseBuffGrant::new("icewall", 2, UsablePhase::NextTurn)];
    let pending = build_pending_defense_buffs_from_grants(&grants, &GrantContext::for_defense(&turn));
    assert_eq!(pending[0].owner, Side::Ai);

    let ai_turn = turn.advance();
    let partition = partition_pending_defense_buffs(
        pending,
        &BuffTrigger {
            phase: UsablePhase::NextTurn,
            owner: ai_turn.active,
            round: ai_turn.round,
            turn_id: ai_turn.turn_id,
        },
    );
    assert_eq!(partition.ready.len(), 1);

    let applied = apply_ready_defense_buffs(&runtime, &StatusStacks::new(), partition.ready);
    assert_eq!(applied.stacks.get("icewall"), 2);
    assert_eq!(sink.kinds(), ["stacks_changed", "buff_activated"]);
}

#[test]
fn burn_ticks_and_reports_to_the_sink() {
    let registry = registry();
    let sink = RecordingSink::default();
    let failures = SinkFailures::new();
    let runtime = registry.runtime().with_lifecycle(&sink, &failures);
    let stacks = registry.runtime().set_stacks(&StatusStacks::new(), "burn", 2);

    let report = runtime.tick_statuses(&stacks);
    assert_eq!(report.damage, 3);
    assert_eq!(report.prompts.len(), 1);

    let cleanse = runtime
        .resolve_cleanse_prompt(&report.stacks, &report.prompts[0], 6)
        .unwrap();
    assert!(cleanse.cleansed);
    assert_eq!(sink.kinds(), ["ticked", "prompt_raised", "cleanse_resolved"]);
    assert!(failures.is_empty());
}

struct ClosedSink;

impl LifecycleSink for ClosedSink {
    fn publish(&self, _event: &StatusLifecycleEvent) -> Result<(), SinkError> {
        Err(SinkError::new("receiver gone"))
    }
}

#[test]
fn rejected_events_are_kept_for_the_caller() {
    let registry = registry();
    let failures = SinkFailures::new();
    let runtime = registry.runtime().with_lifecycle(&ClosedSink, &failures);

    let stacks = runtime.set_stacks(&StatusStacks::new(), "burn", 2);
    let report = runtime.tick_statuses(&stacks);

    // The computation is unaffected by the sink refusing every event.
    assert_eq!(stacks.get("burn"), 2);
    assert_eq!(report.damage, 3);

    let kinds: Vec<_> = failures.take().iter().map(|failure| failure.event).collect();
    assert_eq!(kinds, ["stacks_changed", "ticked", "prompt_raised"]);
    assert!(failures.is_empty());
}
