//! Post-action hook system.
//!
//! Hooks run after every executed action, in priority order, and may await
//! slow external work (presentation callbacks, telemetry). They observe the
//! battle but never mutate it; anything a hook wants to change has to go
//! through the action pipeline.
//!
//! Failures are handled by criticality:
//! - `Critical` hooks abort the turn with [`RuntimeError::Hook`](crate::RuntimeError::Hook)
//! - `Important` hook failures are logged at error level
//! - `Optional` hook failures are logged at debug level

mod context;
mod invariants;
mod kill_feed;
mod registry;

pub use context::HookContext;
pub use invariants::InvariantHook;
pub use kill_feed::KillFeedHook;
pub use registry::HookRegistry;

use async_trait::async_trait;

/// Defines the criticality level of a hook for error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum HookCriticality {
    /// Hook failure aborts the turn.
    ///
    /// Use for hooks that guard battle state consistency.
    Critical,

    /// Hook failure is logged as an error; the turn continues. Default.
    Important,

    /// Hook failure is expected and only logged at debug level.
    Optional,
}

/// Failure reported by an [`ActionHook`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionHookError {
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("{0}")]
    Failed(String),
}

/// Hook evaluated after each executed action.
///
/// Hooks are sorted by priority (lower values execute first):
/// - Negative priorities: consistency checks
/// - Zero: default
/// - Positive priorities: cosmetic or reporting hooks
#[async_trait]
pub trait ActionHook: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Important
    }

    /// Cheap pre-check; `after_action` only runs when this returns true.
    fn should_trigger(&self, _ctx: &HookContext<'_>) -> bool {
        true
    }

    async fn after_action(&self, ctx: &HookContext<'_>) -> Result<(), ActionHookError>;
}
