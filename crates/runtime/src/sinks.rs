//! Ready-made lifecycle and stats sinks.

use duel_core::{
    LifecycleSink, SinkError, StatusLifecycleEvent, TurnRecord, TurnStatsSink,
};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Forwards lifecycle events to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLifecycleSink;

impl LifecycleSink for TracingLifecycleSink {
    fn publish(&self, event: &StatusLifecycleEvent) -> Result<(), SinkError> {
        match event {
            StatusLifecycleEvent::StacksChanged {
                owner,
                status,
                before,
                after,
            } => debug!(target: "runtime::status", ?owner, %status, before, after, "stacks changed"),
            StatusLifecycleEvent::Spent {
                owner,
                status,
                phase,
                cost,
                stacks_after,
                result,
            } => debug!(
                target: "runtime::status",
                ?owner,
                %status,
                %phase,
                cost,
                stacks_after,
                success = result.success,
                bonus_damage = result.bonus_damage,
                bonus_block = result.bonus_block,
                "status spent"
            ),
            StatusLifecycleEvent::Ticked {
                owner,
                status,
                damage,
                before,
                after,
            } => debug!(target: "runtime::status", ?owner, %status, damage, before, after, "status ticked"),
            StatusLifecycleEvent::PromptRaised { owner, prompt } => debug!(
                target: "runtime::status",
                ?owner,
                status = %prompt.status,
                stacks = prompt.stacks,
                threshold = ?prompt.threshold,
                "prompt raised"
            ),
            StatusLifecycleEvent::CleanseResolved {
                owner,
                status,
                roll,
                cleansed,
            } => debug!(target: "runtime::status", ?owner, %status, roll, cleansed, "cleanse resolved"),
            StatusLifecycleEvent::BuffQueued { buff } => debug!(
                target: "runtime::status",
                buff = %buff.id,
                owner = %buff.owner,
                status = %buff.status,
                amount = buff.amount,
                phase = %buff.usable_phase,
                "buff queued"
            ),
            StatusLifecycleEvent::BuffActivated { buff, stacks_after } => debug!(
                target: "runtime::status",
                buff = %buff.id,
                owner = %buff.owner,
                status = %buff.status,
                stacks_after,
                "buff activated"
            ),
            StatusLifecycleEvent::BuffExpired { buff } => debug!(
                target: "runtime::status",
                buff = %buff.id,
                owner = %buff.owner,
                status = %buff.status,
                "buff expired"
            ),
        }
        Ok(())
    }
}

/// Logs each turn record at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingStatsSink;

impl TurnStatsSink for TracingStatsSink {
    fn record_turn(&self, record: &TurnRecord) {
        info!(
            target: "runtime::stats",
            round = record.round,
            turn = %record.turn_id,
            attacker = ?record.attacker,
            ability = record.ability.as_deref().unwrap_or("-"),
            tick_damage = record.tick_damage,
            attack = record.base_damage + record.bonus_damage,
            block = record.base_block + record.bonus_block,
            dealt = record.damage_dealt,
            reflected = record.reflected,
            retaliated = record.retaliated,
            healed = record.healed,
            negated = record.negated,
            attacker_hp = record.attacker_hp.after,
            defender_hp = record.defender_hp.after,
            "turn resolved"
        );
    }
}

/// Keeps every event and turn record it receives, for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<StatusLifecycleEvent>>,
    turns: Mutex<Vec<TurnRecord>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<StatusLifecycleEvent> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .iter()
            .map(StatusLifecycleEvent::kind)
            .collect()
    }

    pub fn turns(&self) -> Vec<TurnRecord> {
        self.turns.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
        self.turns.lock().clear();
    }
}

impl LifecycleSink for RecordingSink {
    fn publish(&self, event: &StatusLifecycleEvent) -> Result<(), SinkError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

impl TurnStatsSink for RecordingSink {
    fn record_turn(&self, record: &TurnRecord) {
        self.turns.lock().push(record.clone());
    }
}
