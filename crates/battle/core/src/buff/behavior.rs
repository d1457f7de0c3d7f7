use super::context::BuffContext;

pub type HookResult = Result<(), HookError>;

/// Failure raised inside a behavior hook.
///
/// Never escapes the engine: the error boundary logs it and treats the hook
/// as a no-op.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum HookError {
    #[error("missing context variable `{0}`")]
    MissingVariable(String),

    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("{0}")]
    Failed(String),
}

/// Lifecycle hook identifier used in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BuffHook {
    OnApply,
    OnRemove,
    OnUpdate,
    OnRefresh,
}

/// Scripted behavior behind a buff id.
///
/// Implementations must not keep owner-specific mutable state: one instance is
/// created per applied buff, and all working values go through the
/// [`BuffContext`] variable map.
///
/// Modifiers registered through the context are cleared by the engine after
/// `on_remove`, so implementations do not need to undo them.
pub trait BuffBehavior: Send + Sync {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult;

    fn on_remove(&self, _ctx: &mut BuffContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_update(&self, _ctx: &mut BuffContext<'_>, _delta_ms: u64) -> HookResult {
        Ok(())
    }

    fn on_refresh(&self, _ctx: &mut BuffContext<'_>) -> HookResult {
        Ok(())
    }
}
