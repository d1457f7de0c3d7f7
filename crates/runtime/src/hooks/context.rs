//! Execution context provided to hooks.

use battle_core::{Action, BuffEngine, Roster};

/// Read-only view of a battle right after an action resolved.
pub struct HookContext<'a> {
    pub battle_id: &'a str,

    /// The action as it was appended to the log.
    pub action: &'a Action,

    /// Participants after the action, before the buff tick.
    pub roster: &'a Roster,

    pub buffs: &'a BuffEngine,
}
