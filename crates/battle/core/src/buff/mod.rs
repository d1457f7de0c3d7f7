//! Buff/status engine.
//!
//! - [`BuffBehavior`]: stateless script with apply/remove/update/refresh hooks
//! - [`BuffContext`]: per-instance variables, timers and modifier helpers
//! - [`BuffRegistry`]: buff id → behavior factory table
//! - [`BuffEngine`]: owns the instances of one battle and drives their lifecycle
pub mod behavior;
pub mod boundary;
pub mod config;
pub mod context;
pub mod engine;
pub mod registry;

pub use behavior::{BuffBehavior, BuffHook, HookError, HookResult};
pub use boundary::{DEFAULT_RETRY_ATTEMPTS, retry};
pub use config::{BuffConfig, BuffDuration, ControlType, StackRule};
pub use context::{BuffContext, BuffEvent, BuffEventKind, BuffState};
pub use engine::{BuffEngine, BuffError, BuffInstance};
pub use registry::{BehaviorFactory, BuffRegistry, ScriptMetadata};
