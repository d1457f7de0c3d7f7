//! Async orchestration for turn-based battles.
//!
//! This crate wires the deterministic rules of `battle-core` into a battle
//! lifecycle: strategies decide, the executor resolves, hooks observe and
//! the event bus reports. Consumers build a [`BattleManager`] and drive
//! battles turn by turn or to completion.
//!
//! Modules are organized by responsibility:
//! - [`manager`] hosts the turn pipeline and its builder
//! - [`battle`] holds the per-battle aggregate and snapshots
//! - [`executor`] resolves actions against combat state
//! - [`ai`] provides the decision strategies
//! - [`hooks`] provides the post-action hook system
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`api`] exposes the error types downstream clients interact with
pub mod ai;
pub mod api;
pub mod battle;
pub mod events;
pub mod executor;
pub mod hooks;
pub mod manager;

pub use ai::{
    AiFactory, BattleAi, BattleAnalysis, BattleView, CharacterAi, EnemyAi, PriorityStrategy,
};
pub use api::{Result, RuntimeError};
pub use battle::{Battle, BattleSnapshot};
pub use events::{ActionEvent, BattleEvent, BuffNotice, Event, EventBus, Topic, TurnEvent};
pub use executor::ActionExecutor;
pub use hooks::{
    ActionHook, ActionHookError, HookContext, HookCriticality, HookRegistry, InvariantHook,
    KillFeedHook,
};
pub use manager::{BattleManager, BattleManagerBuilder};
