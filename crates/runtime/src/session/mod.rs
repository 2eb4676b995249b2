//! Turn controller for a two-seat duel.
//!
//! The rules crate resolves one step at a time and hands values back. The
//! session owns the state between steps and sequences a full turn:
//!
//! 1. Upkeep: the active side's statuses tick, cleanse prompts are rolled,
//!    `nextTurn` and `turnStart` buffs fire.
//! 2. Roll: dice are thrown and rerolled under the hero oracle's hold hook.
//! 3. Attack: passive modifiers shape the ability damage, then offensive
//!    statuses are spent.
//! 4. Defense: `nextDefenseCommit` buffs fire, the defender rolls a defense,
//!    modifiers shape its block and defensive statuses are spent.
//! 5. Resolution, inflicted statuses and new grants.
//! 6. Cues, turn record, and the handover on `TURN_END`.

mod policy;
mod presenter;

use std::sync::Arc;

use duel_core::buffs::{
    BuffTrigger, DefenseBuffGrant, GrantContext, PendingDefenseBuff, UsablePhase,
    apply_ready_defense_buffs, build_pending_defense_buffs_from_grants,
    partition_pending_defense_buffs,
};
use duel_core::combat::{
    AttackInput, DefensePlanner, DefenseResolution, EffectEvent, StatusDefensePlanner,
    apply_damage, plan_offense, resolve_attack,
};
use duel_core::env::HpDelta;
use duel_core::status::ModifyContext;
use duel_core::{
    AbilityProfile, CombatantState, DiceRoll, DiceRoller, HeroId, HeroOracle, RulesConfig, Side,
    SinkFailure, SinkFailures, SpendPhase, StatusLifecycleEvent, StatusRegistry, StatusRuntime,
    StatusStacks, TurnPhase, TurnRecord, TurnState, TurnStatsSink,
};
use tracing::{debug, info, warn};

use crate::cue::CueQueue;
use crate::error::{Result, RuntimeError};
use crate::events::{CombatEvent, Event, EventBus};
use crate::lifecycle::{LifecycleHub, SinkDisposer};

pub use policy::spend_requests;
pub use presenter::{ability_cue, effect_cue, status_cue, tick_cue, turn_cue};

/// What happened during one [`DuelSession::play_turn`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub record: TurnRecord,
    pub attack_roll: Option<DiceRoll>,
    pub defense_roll: Option<DiceRoll>,
    pub ability: Option<AbilityProfile>,
    pub effects: Vec<EffectEvent>,
    /// Status logs from ticks, cleanses, modifiers and spends, in order.
    pub logs: Vec<String>,
    /// Lifecycle events a sink rejected during the turn.
    pub sink_failures: Vec<SinkFailure>,
    pub winner: Option<Side>,
}

/// Builder for [`DuelSession`].
pub struct DuelSessionBuilder {
    registry: Arc<StatusRegistry>,
    oracle: Arc<dyn HeroOracle>,
    rules: RulesConfig,
    hub: LifecycleHub,
    stats: Vec<Arc<dyn TurnStatsSink>>,
    cues: Option<CueQueue>,
    bus: Option<EventBus>,
}

impl DuelSessionBuilder {
    pub fn rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Hub that receives every status lifecycle event of the duel.
    pub fn lifecycle(mut self, hub: LifecycleHub) -> Self {
        self.hub = hub;
        self
    }

    pub fn stats_sink(mut self, sink: Arc<dyn TurnStatsSink>) -> Self {
        self.stats.push(sink);
        self
    }

    pub fn cues(mut self, queue: CueQueue) -> Self {
        self.cues = Some(queue);
        self
    }

    /// Publishes status, combat and turn events to `bus` as well.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Seats both heroes at full HP with their starting statuses.
    pub fn build(self, player: HeroId, ai: HeroId, first: Side) -> Result<DuelSession> {
        let failures = Arc::new(SinkFailures::new());
        let runtime = self.registry.runtime().with_lifecycle(&self.hub, &failures);
        let player = seat(self.oracle.as_ref(), &runtime, Side::Player, player, &self.rules)?;
        let ai = seat(self.oracle.as_ref(), &runtime, Side::Ai, ai, &self.rules)?;

        let mut stats = self.stats;
        let bus_sink = self.bus.as_ref().map(|bus| {
            stats.push(Arc::new(bus.clone()));
            self.hub.register(Arc::new(bus.clone()))
        });

        info!(
            target: "runtime::duel",
            player = %player.hero,
            ai = %ai.hero,
            %first,
            "duel started"
        );

        Ok(DuelSession {
            registry: self.registry,
            oracle: self.oracle,
            rules: self.rules,
            hub: self.hub,
            failures,
            stats,
            cues: self.cues,
            bus: self.bus,
            bus_sink,
            turn: TurnState::new(first),
            combatants: [player, ai],
            pending: Vec::new(),
            winner: None,
        })
    }
}

fn seat(
    oracle: &dyn HeroOracle,
    runtime: &StatusRuntime<'_>,
    side: Side,
    hero: HeroId,
    rules: &RulesConfig,
) -> Result<CombatantState> {
    let profile = oracle
        .hero(&hero)
        .ok_or_else(|| RuntimeError::UnknownHero { hero: hero.clone() })?;
    let max_hp = if profile.max_hp > 0 {
        profile.max_hp
    } else {
        rules.starting_hp
    };

    let runtime = runtime.for_side(side);
    let stacks = profile
        .starting_statuses
        .iter()
        .fold(StatusStacks::new(), |stacks, (status, count)| {
            runtime.add_stacks(&stacks, status.as_str(), i64::from(*count))
        });

    Ok(CombatantState::new(side, hero, max_hp).with_stacks(stacks))
}

/// A running duel between the player seat and the AI seat.
pub struct DuelSession {
    registry: Arc<StatusRegistry>,
    oracle: Arc<dyn HeroOracle>,
    rules: RulesConfig,
    hub: LifecycleHub,
    failures: Arc<SinkFailures>,
    stats: Vec<Arc<dyn TurnStatsSink>>,
    cues: Option<CueQueue>,
    bus: Option<EventBus>,
    bus_sink: Option<SinkDisposer>,
    turn: TurnState,
    combatants: [CombatantState; 2],
    pending: Vec<PendingDefenseBuff>,
    winner: Option<Side>,
}

const fn seat_index(side: Side) -> usize {
    match side {
        Side::Player => 0,
        Side::Ai => 1,
    }
}

impl DuelSession {
    pub fn builder(registry: Arc<StatusRegistry>, oracle: Arc<dyn HeroOracle>) -> DuelSessionBuilder {
        DuelSessionBuilder {
            registry,
            oracle,
            rules: RulesConfig::default(),
            hub: LifecycleHub::new(),
            stats: Vec::new(),
            cues: None,
            bus: None,
        }
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn combatant(&self, side: Side) -> &CombatantState {
        &self.combatants[seat_index(side)]
    }

    fn combatant_mut(&mut self, side: Side) -> &mut CombatantState {
        &mut self.combatants[seat_index(side)]
    }

    /// Buffs granted but not yet fired or expired.
    pub fn pending_buffs(&self) -> &[PendingDefenseBuff] {
        &self.pending
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn lifecycle(&self) -> &LifecycleHub {
        &self.hub
    }

    /// Plays the active side's turn and hands over to the other side.
    pub fn play_turn(&mut self, dice: &mut dyn DiceRoller) -> Result<TurnReport> {
        if let Some(winner) = self.winner {
            return Err(RuntimeError::DuelOver { winner });
        }

        let registry = Arc::clone(&self.registry);
        let hub = self.hub.clone();
        let failures = Arc::clone(&self.failures);
        let runtime = registry.runtime().with_lifecycle(&hub, &failures);

        let turn = self.turn.clone();
        let active = turn.active;
        let defender_side = turn.defender();
        let sides = self.rules.dice_sides;
        let count = self.rules.effective_dice_count();

        let attacker_before = self.combatant(active).hp;
        let defender_before = self.combatant(defender_side).hp;
        let mut record = TurnRecord {
            round: turn.round,
            turn_id: turn.turn_id,
            attacker: Some(active),
            ..TurnRecord::default()
        };
        let mut logs = Vec::new();

        // ===== upkeep =====
        record.tick_damage = self.upkeep(&runtime, &turn, dice, &mut logs);
        if self.combatant(active).is_defeated() {
            record.attacker_hp = HpDelta {
                before: attacker_before,
                after: self.combatant(active).hp,
            };
            record.defender_hp = HpDelta {
                before: defender_before,
                after: defender_before,
            };
            return Ok(self.finish(turn, record, None, None, None, Vec::new(), logs, Some(defender_side)));
        }

        // ===== roll =====
        let hero = self.combatant(active).hero.clone();
        let mut roll = DiceRoll::roll(dice, count, sides);
        for rolls_left in (1..self.rules.rolls_per_turn).rev() {
            let hold = self.oracle.hold_decision(&hero, &roll, rolls_left);
            if usize::try_from(hold.count()).unwrap_or(usize::MAX) >= roll.len() {
                break;
            }
            roll = roll.reroll(hold, dice, sides);
        }

        // ===== attack =====
        let ability = self.oracle.ability_for(&hero, &roll);
        let attacker = self.combatant(active).clone();
        let attacker_runtime = runtime.for_side(active);
        let modified = attacker_runtime.apply_modifiers(
            &attacker.stacks,
            ModifyContext {
                base_damage: ability.as_ref().map_or(0, |ability| ability.base_damage),
                base_block: 0,
                phase: Some(SpendPhase::AttackRoll),
            },
        );
        logs.extend(modified.logs);
        let base_damage = modified.context.base_damage;

        let requests =
            spend_requests(&registry, &attacker.stacks, SpendPhase::AttackRoll, dice, sides);
        let offense = plan_offense(&runtime, &attacker, base_damage, &requests);
        logs.extend(offense.spends.iter().flat_map(|spend| spend.logs.iter().cloned()));

        // ===== defense =====
        let defender_runtime = runtime.for_side(defender_side);
        let mut defender = self.combatant(defender_side).clone();
        defender.stacks = self.fire_buffs(
            &defender_runtime,
            defender.stacks,
            UsablePhase::NextDefenseCommit,
            &turn,
            defender_side,
        );

        let defense_roll = DiceRoll::roll(dice, count, sides);
        let profile = self.oracle.defense_for(&defender.hero, &defense_roll);
        let mut base = DefenseResolution::from_profile(&profile);
        let shaped = defender_runtime.apply_modifiers(
            &defender.stacks,
            ModifyContext {
                base_damage: 0,
                base_block: base.base_block,
                phase: Some(SpendPhase::DefenseRoll),
            },
        );
        logs.extend(shaped.logs);
        base.base_block = shaped.context.base_block;

        let incoming = offense
            .spends
            .iter()
            .fold(base_damage, |total, spend| total.saturating_add(spend.bonus_damage));
        let requests =
            spend_requests(&registry, &defender.stacks, SpendPhase::DefenseRoll, dice, sides);
        let plan = StatusDefensePlanner::new(runtime).plan(&defender, incoming, base, &requests);
        logs.extend(
            plan.resolution
                .spends
                .iter()
                .flat_map(|spend| spend.logs.iter().cloned()),
        );

        // ===== resolution =====
        let resolving = turn.at_phase(TurnPhase::Defense);
        let resolution = resolve_attack(&AttackInput {
            turn: &resolving,
            attacker: &offense.attacker,
            defender: &plan.defender,
            base_damage,
            attack_spends: &offense.spends,
            defense: &plan.resolution,
        });
        let summary = resolution.summary.clone();

        let mut defender = resolution.defender;
        if summary.damage_dealt > 0
            && let Some(ability) = &ability
        {
            for application in &ability.inflicts {
                defender.stacks = defender_runtime.add_stacks(
                    &defender.stacks,
                    application.status.as_str(),
                    i64::from(application.stacks),
                );
                if let Some(queue) = &self.cues {
                    let stacks = defender.stacks.get(application.status.as_str());
                    queue.enqueue(status_cue(defender_side, &application.status, stacks));
                }
            }
        }
        *self.combatant_mut(active) = resolution.attacker;
        *self.combatant_mut(defender_side) = defender;

        if let Some(ability) = &ability {
            self.queue_grants(
                &runtime,
                &ability.grants,
                GrantContext::for_attack(&turn).with_source(ability.id.clone()),
            );
        }
        self.queue_grants(
            &runtime,
            &profile.grants,
            GrantContext::for_defense(&turn).with_source(profile.name.clone()),
        );

        // ===== presentation & telemetry =====
        if let Some(queue) = &self.cues
            && let Some(ability) = &ability
        {
            queue.enqueue(ability_cue(active, ability));
        }
        for event in &resolution.events {
            if let Some(queue) = &self.cues
                && let Some(cue) = effect_cue(event)
            {
                queue.enqueue(cue);
            }
        }

        record.ability = ability.as_ref().map(|ability| ability.name.clone());
        record.base_damage = summary.base_damage;
        record.bonus_damage = summary.bonus_damage;
        record.base_block = summary.base_block;
        record.bonus_block = summary.bonus_block;
        record.damage_dealt = summary.damage_dealt;
        record.reflected = summary.reflected;
        record.retaliated = summary.retaliated;
        record.healed = summary.healed;
        record.negated = summary.negated;
        record.attacker_hp = HpDelta {
            before: attacker_before,
            after: self.combatant(active).hp,
        };
        record.defender_hp = HpDelta {
            before: defender_before,
            after: self.combatant(defender_side).hp,
        };

        let winner = if summary.defender_defeated {
            Some(active)
        } else if summary.attacker_defeated {
            Some(defender_side)
        } else {
            None
        };

        Ok(self.finish(
            turn,
            record,
            Some(roll),
            Some(defense_roll),
            ability,
            resolution.events,
            logs,
            winner,
        ))
    }

    /// Ticks the active side, rolls its cleanse prompts and fires its
    /// turn-start buffs. Returns the tick damage taken.
    fn upkeep(
        &mut self,
        runtime: &StatusRuntime<'_>,
        turn: &TurnState,
        dice: &mut dyn DiceRoller,
        logs: &mut Vec<String>,
    ) -> u32 {
        let side = turn.active;
        let runtime = runtime.for_side(side);
        let mut combatant = self.combatant(side).clone();

        let report = runtime.tick_statuses(&combatant.stacks);
        logs.extend(report.logs.iter().cloned());
        let mut stacks = report.stacks;

        for prompt in &report.prompts {
            let roll = u32::from(dice.roll_die(self.rules.dice_sides));
            if let Some(outcome) = runtime.resolve_cleanse_prompt(&stacks, prompt, roll) {
                logs.push(outcome.log);
                stacks = outcome.stacks;
            }
        }

        let damage = i32::try_from(report.damage).unwrap_or(i32::MAX);
        combatant.hp = apply_damage(combatant.hp, damage);

        stacks = self.fire_buffs(&runtime, stacks, UsablePhase::NextTurn, turn, side);
        stacks = self.fire_buffs(&runtime, stacks, UsablePhase::TurnStart, turn, side);
        combatant.stacks = stacks;

        if report.damage > 0 {
            debug!(target: "runtime::duel", %side, damage = report.damage, hp = combatant.hp, "upkeep damage");
            if let Some(queue) = &self.cues {
                queue.enqueue(tick_cue(side, report.damage));
            }
        }
        *self.combatant_mut(side) = combatant;
        report.damage
    }

    /// Fires pending buffs matching `phase` for `owner` and drops expired ones.
    fn fire_buffs(
        &mut self,
        runtime: &StatusRuntime<'_>,
        stacks: StatusStacks,
        phase: UsablePhase,
        turn: &TurnState,
        owner: Side,
    ) -> StatusStacks {
        let trigger = BuffTrigger {
            phase,
            owner,
            round: turn.round,
            turn_id: turn.turn_id,
        };
        let partition = partition_pending_defense_buffs(std::mem::take(&mut self.pending), &trigger);
        self.pending = partition.pending;

        for buff in partition.expired {
            debug!(target: "runtime::duel", buff = %buff.id, status = %buff.status, "buff expired");
            self.failures
                .publish(&self.hub, &StatusLifecycleEvent::BuffExpired { buff });
        }
        if partition.ready.is_empty() {
            return stacks;
        }

        let applied = apply_ready_defense_buffs(runtime, &stacks, partition.ready);
        if let Some(queue) = &self.cues {
            for (buff, stacks_after) in &applied.applied {
                queue.enqueue(status_cue(owner, &buff.status, *stacks_after));
            }
        }
        applied.stacks
    }

    /// Applies immediate grants now and queues the rest as pending buffs.
    fn queue_grants(
        &mut self,
        runtime: &StatusRuntime<'_>,
        grants: &[DefenseBuffGrant],
        context: GrantContext,
    ) {
        let context = context.with_default_lifetime(self.rules.pending_buff_lifetime);

        for grant in grants.iter().filter(|grant| grant.is_immediate()) {
            let owner = context.resolve_owner(grant.target);
            let combatant = self.combatant_mut(owner);
            let current = combatant.stacks.get(grant.status.as_str());
            let raised = current.saturating_add(grant.amount);
            let target = grant
                .stack_cap
                .map_or(raised, |cap| raised.min(cap).max(current));
            combatant.stacks = runtime.for_side(owner).set_stacks(
                &combatant.stacks,
                grant.status.as_str(),
                i64::from(target),
            );
        }

        for buff in build_pending_defense_buffs_from_grants(grants, &context) {
            debug!(
                target: "runtime::duel",
                buff = %buff.id,
                owner = %buff.owner,
                status = %buff.status,
                phase = %buff.usable_phase,
                "buff queued"
            );
            self.failures
                .publish(&self.hub, &StatusLifecycleEvent::BuffQueued { buff: buff.clone() });
            self.pending.push(buff);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &mut self,
        turn: TurnState,
        record: TurnRecord,
        attack_roll: Option<DiceRoll>,
        defense_roll: Option<DiceRoll>,
        ability: Option<AbilityProfile>,
        effects: Vec<EffectEvent>,
        logs: Vec<String>,
        winner: Option<Side>,
    ) -> TurnReport {
        for sink in &self.stats {
            sink.record_turn(&record);
        }
        let sink_failures = self.failures.take();
        for failure in &sink_failures {
            warn!(
                target: "runtime::lifecycle",
                turn = %turn.turn_id,
                event = failure.event,
                error = %failure.error,
                "lifecycle sink rejected event"
            );
        }
        if let Some(bus) = &self.bus {
            for event in &effects {
                bus.publish(Event::Combat(CombatEvent::Effect {
                    turn: turn.turn_id,
                    event: event.clone(),
                }));
            }
        }

        match winner {
            Some(winner) => {
                info!(target: "runtime::duel", %winner, round = turn.round, "duel finished");
                self.winner = Some(winner);
                if let Some(bus) = &self.bus {
                    bus.publish(Event::Combat(CombatEvent::DuelFinished {
                        winner,
                        round: turn.round,
                    }));
                }
            }
            None => {
                self.turn = turn.advance();
                if let Some(queue) = &self.cues {
                    queue.enqueue(turn_cue(self.turn.active, self.turn.round));
                }
            }
        }

        TurnReport {
            record,
            attack_roll,
            defense_roll,
            ability,
            effects,
            logs,
            sink_failures,
            winner,
        }
    }
}

impl Drop for DuelSession {
    fn drop(&mut self) {
        if let Some(disposer) = self.bus_sink.take() {
            disposer.dispose();
        }
    }
}
