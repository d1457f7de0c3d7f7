//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Publishing is best-effort: a battle never waits on,
//! or fails because of, a slow or absent subscriber.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{ActionEvent, BattleEvent, BuffNotice, TurnEvent};
