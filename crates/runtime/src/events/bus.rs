//! Topic-based event bus implementation.

use duel_core::combat::EffectEvent;
use duel_core::{
    LifecycleSink, Side, SinkError, StatusLifecycleEvent, TurnId, TurnRecord, TurnStatsSink,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::config::EventBusConfig;
use crate::cue::{CueEvent, CueListener};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Status lifecycle transitions (stacks, spends, ticks, buffs)
    Status,
    /// Effects and per-turn records
    Combat,
    /// Presentation cue queue transitions
    Cue,
}

/// Combat-side events published by the duel session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    Effect { turn: TurnId, event: EffectEvent },
    TurnRecorded(TurnRecord),
    DuelFinished { winner: Side, round: u32 },
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Status(StatusLifecycleEvent),
    Combat(CombatEvent),
    Cue(CueEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Status(_) => Topic::Status,
            Event::Combat(_) => Topic::Combat,
            Event::Cue(_) => Topic::Cue,
        }
    }

    /// Short name of the wrapped event, for tallies and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Status(event) => event.kind(),
            Event::Combat(CombatEvent::Effect { event, .. }) => event.kind(),
            Event::Combat(CombatEvent::TurnRecorded(_)) => "turn_recorded",
            Event::Combat(CombatEvent::DuelFinished { .. }) => "duel_finished",
            Event::Cue(event) => event.kind(),
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing is best-effort: an event on a topic
/// nobody listens to is discarded.
#[derive(Clone)]
pub struct EventBus {
    status: broadcast::Sender<Event>,
    combat: broadcast::Sender<Event>,
    cue: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::from_config(&EventBusConfig::default())
    }

    pub fn from_config(config: &EventBusConfig) -> Self {
        Self::with_capacity(config.capacity)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            status: broadcast::channel(capacity).0,
            combat: broadcast::channel(capacity).0,
            cue: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Status => &self.status,
            Topic::Combat => &self.combat,
            Topic::Cue => &self.cue,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleSink for EventBus {
    fn publish(&self, event: &StatusLifecycleEvent) -> Result<(), SinkError> {
        EventBus::publish(self, Event::Status(event.clone()));
        Ok(())
    }
}

impl TurnStatsSink for EventBus {
    fn record_turn(&self, record: &TurnRecord) {
        self.publish(Event::Combat(CombatEvent::TurnRecorded(record.clone())));
    }
}

impl CueListener for EventBus {
    fn on_cue_event(&self, event: &CueEvent) {
        self.publish(Event::Cue(event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::StatusId;

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut status = bus.subscribe(Topic::Status);
        let mut combat = bus.subscribe(Topic::Combat);

        LifecycleSink::publish(
            &bus,
            &StatusLifecycleEvent::StacksChanged {
                owner: Some(Side::Player),
                status: StatusId::from("chi"),
                before: 0,
                after: 1,
            },
        )
        .unwrap();
        bus.record_turn(&TurnRecord::default());

        assert_eq!(status.recv().await.unwrap().topic(), Topic::Status);
        assert_eq!(combat.recv().await.unwrap().topic(), Topic::Combat);
        assert!(status.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::Combat(CombatEvent::DuelFinished {
            winner: Side::Ai,
            round: 3,
        }));
    }

    #[test]
    fn events_serialize_with_their_topic_variant() {
        let event = Event::Combat(CombatEvent::Effect {
            turn: TurnId::FIRST,
            event: EffectEvent::Hit {
                target: Side::Ai,
                amount: 6,
            },
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with("{\"Combat\""));
        assert!(json.contains("\"type\":\"hit\""));
    }
}
