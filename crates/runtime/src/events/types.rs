//! Event types for different topics.

use battle_core::{Action, BuffEvent, ParticipantId, Side};
use serde::{Deserialize, Serialize};

/// Battle lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BattleEvent {
    /// A battle was created and its start entry logged.
    Created {
        battle_id: String,
        participants: usize,
        seed: u64,
    },

    /// A battle became inactive.
    ///
    /// `winner` is `None` when it was stopped or hit the round limit.
    Ended {
        battle_id: String,
        winner: Option<Side>,
        turns: u32,
    },
}

/// Events related to turn management (lightweight).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEvent {
    /// `actor` is about to decide.
    Started {
        battle_id: String,
        actor: ParticipantId,
        turn: u32,
        round: u32,
    },

    /// `actor` forfeited the turn because a control effect blocks actions.
    Skipped {
        battle_id: String,
        actor: ParticipantId,
        turn: u32,
    },
}

/// An action was resolved and appended to the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent {
    pub battle_id: String,
    pub action: Action,
}

/// A buff engine event forwarded after a tick or action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffNotice {
    pub battle_id: String,
    pub event: BuffEvent,
}
