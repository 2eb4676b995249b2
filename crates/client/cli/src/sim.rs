//! Seats two heroes, plays the duel with seeded dice and tallies what the
//! runtime published along the way.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use duel_content::ContentFactory;
use duel_core::Side;
use duel_runtime::{
    CueQueue, DuelSession, Event, EventBus, LifecycleHub, RecordingSink, RuntimeConfig, Topic,
    TracingLifecycleSink, TracingStatsSink,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::config::SimConfig;

pub struct Simulator {
    config: SimConfig,
    runtime: RuntimeConfig,
}

impl Simulator {
    pub fn new(config: SimConfig, runtime: RuntimeConfig) -> Self {
        Self { config, runtime }
    }

    /// Plays one duel to the end (or the turn limit) and returns a summary.
    pub async fn run(self) -> Result<Value> {
        let factory = match &self.config.data_dir {
            Some(dir) => ContentFactory::new(dir),
            None => ContentFactory::bundled(),
        };
        let registry = Arc::new(factory.build_registry()?);
        let heroes = Arc::new(factory.load_heroes()?);
        let rules = factory.load_config()?;
        info!(
            target: "sim",
            data_dir = %factory.data_dir().display(),
            statuses = registry.len(),
            heroes = heroes.len(),
            "content loaded"
        );

        let bus = EventBus::from_config(&self.runtime.event_bus);
        let tallies = [Topic::Status, Topic::Combat, Topic::Cue]
            .map(|topic| (topic, tokio::spawn(tally(bus.subscribe(topic)))));

        // Cues other than the turn banner wait while the seats swap.
        let handover = Arc::new(AtomicBool::new(false));
        let queue = CueQueue::tokio(self.runtime.cue.clone())?;
        queue.set_listener(Arc::new(bus.clone()));
        {
            let handover = Arc::clone(&handover);
            queue.set_deferral(move || handover.load(Ordering::Acquire));
        }

        let hub = LifecycleHub::new();
        let tracing_sink = hub.register(Arc::new(TracingLifecycleSink));
        let recorder = Arc::new(RecordingSink::default());

        let mut session = DuelSession::builder(registry, heroes.clone())
            .rules(rules)
            .lifecycle(hub)
            .stats_sink(Arc::new(TracingStatsSink))
            .stats_sink(recorder.clone())
            .cues(queue.clone())
            .event_bus(bus.clone())
            .build(
                self.config.player.clone(),
                self.config.ai.clone(),
                self.config.first,
            )
            .with_context(|| format!("known heroes: {:?}", heroes.ids()))?;

        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!(target: "sim", seed, player = %self.config.player, ai = %self.config.ai, "dice seeded");
        let mut rng = StdRng::seed_from_u64(seed);
        let mut dice = |sides: u8| rng.random_range(1..=sides.max(1));

        let mut turns = 0;
        while !session.is_over() && turns < self.config.max_turns {
            let report = session.play_turn(&mut dice)?;
            turns += 1;
            for line in &report.logs {
                debug!(target: "sim", turn = turns, "{line}");
            }

            if report.winner.is_none() && !self.config.turn_pause.is_zero() {
                handover.store(true, Ordering::Release);
                tokio::time::sleep(self.config.turn_pause).await;
                handover.store(false, Ordering::Release);
                queue.poke();
            }
        }
        if !session.is_over() {
            warn!(target: "sim", turns, "turn limit reached without a winner");
        }

        let winner = session.winner();
        let round = session.turn().round;
        let hp: BTreeMap<String, i32> = Side::ALL
            .iter()
            .map(|&side| (side.to_string(), session.combatant(side).hp))
            .collect();

        // Release every bus sender so the tally tasks see the channels close.
        drop(session);
        queue.clear();
        queue.clear_listener();
        tracing_sink.dispose();
        drop(bus);

        let mut events = BTreeMap::new();
        for (topic, handle) in tallies {
            let counts = handle.await.context("event tally task failed")?;
            events.insert(format!("{topic:?}").to_lowercase(), counts);
        }

        Ok(json!({
            "seed": seed,
            "player": self.config.player,
            "ai": self.config.ai,
            "winner": winner,
            "round": round,
            "turns": turns,
            "hp": hp,
            "events": events,
            "records": recorder.turns(),
        }))
    }
}

/// Counts events on one topic by kind until every sender is gone.
async fn tally(mut receiver: broadcast::Receiver<Event>) -> BTreeMap<&'static str, u64> {
    let mut counts = BTreeMap::new();
    loop {
        match receiver.recv().await {
            Ok(event) => *counts.entry(event.kind()).or_default() += 1,
            Err(RecvError::Lagged(missed)) => *counts.entry("lagged").or_default() += missed,
            Err(RecvError::Closed) => break,
        }
    }
    counts
}
