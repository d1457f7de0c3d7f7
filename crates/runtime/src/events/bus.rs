//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{ActionEvent, BattleEvent, BuffNotice, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Battle creation and end
    Battle,
    /// Turn management events
    Turn,
    /// Resolved actions
    Action,
    /// Buff applications, ticks and removals
    Buff,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Battle(BattleEvent),
    Turn(TurnEvent),
    Action(Box<ActionEvent>),
    Buff(BuffNotice),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Battle(_) => Topic::Battle,
            Event::Turn(_) => Topic::Turn,
            Event::Action(_) => Topic::Action,
            Event::Buff(_) => Topic::Buff,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Cloning shares the underlying channels.
#[derive(Clone)]
pub struct EventBus {
    battle: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
    action: broadcast::Sender<Event>,
    buff: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            battle: broadcast::channel(capacity).0,
            turn: broadcast::channel(capacity).0,
            action: broadcast::channel(capacity).0,
            buff: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Battle => &self.battle,
            Topic::Turn => &self.turn,
            Topic::Action => &self.action,
            Topic::Buff => &self.buff,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", "No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.sender(topic).receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::new();
        let mut battles = bus.subscribe(Topic::Battle);
        let mut turns = bus.subscribe(Topic::Turn);

        bus.publish(Event::Battle(BattleEvent::Created {
            battle_id: "b1".into(),
            participants: 2,
            seed: 7,
        }));

        match battles.recv().await {
            Ok(Event::Battle(BattleEvent::Created { battle_id, .. })) => assert_eq!(battle_id, "b1"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(turns.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::with_capacity(0);
        bus.publish(Event::Turn(TurnEvent::Skipped {
            battle_id: "b1".into(),
            actor: "hero".into(),
            turn: 1,
        }));
        assert_eq!(bus.subscriber_count(Topic::Turn), 0);
    }
}
