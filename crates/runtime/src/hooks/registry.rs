//! Hook registry for managing and executing post-action hooks.

use std::sync::Arc;

use tracing::{debug, error};

use super::{ActionHook, ActionHookError, HookContext, HookCriticality, InvariantHook, KillFeedHook};
use crate::api::{Result, RuntimeError};

/// Ordered set of action hooks.
#[derive(Clone)]
pub struct HookRegistry {
    hooks: Arc<[Arc<dyn ActionHook>]>,
}

impl HookRegistry {
    /// Creates a registry; hooks are sorted by priority (lower values first).
    pub fn new(mut hooks: Vec<Arc<dyn ActionHook>>) -> Self {
        hooks.sort_by_key(|h| h.priority());
        Self {
            hooks: hooks.into(),
        }
    }

    /// Registry with no hooks.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Creates a registry with the default set of hooks.
    ///
    /// - InvariantHook: rejects inconsistent state (critical)
    /// - KillFeedHook: logs defeated participants (optional)
    pub fn default_hooks() -> Self {
        Self::new(vec![
            Arc::new(InvariantHook) as Arc<dyn ActionHook>,
            Arc::new(KillFeedHook) as Arc<dyn ActionHook>,
        ])
    }

    /// Returns a copy with `hook` added.
    pub fn with_hook(&self, hook: Arc<dyn ActionHook>) -> Self {
        let mut hooks: Vec<_> = self.hooks.iter().cloned().collect();
        hooks.push(hook);
        Self::new(hooks)
    }

    /// Runs every triggered hook in priority order.
    ///
    /// Returns `Err` only for a failed `Critical` hook; later hooks are not
    /// run in that case.
    pub async fn execute_hooks(&self, ctx: &HookContext<'_>) -> Result<()> {
        for hook in self.hooks.iter() {
            if !hook.should_trigger(ctx) {
                continue;
            }
            if let Err(e) = hook.after_action(ctx).await {
                self.handle_hook_error(hook.as_ref(), e)?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hook names and priorities in execution order (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.hooks.iter().map(|h| (h.name(), h.priority()))
    }

    fn handle_hook_error(&self, hook: &dyn ActionHook, error: ActionHookError) -> Result<()> {
        let criticality = hook.criticality();
        let level: &'static str = criticality.into();
        match criticality {
            HookCriticality::Critical => {
                error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = level,
                    error = %error,
                    "Critical hook failed, aborting turn"
                );
                return Err(RuntimeError::Hook {
                    hook: hook.name(),
                    source: error,
                });
            }
            HookCriticality::Important => error!(
                target: "runtime::hooks",
                hook = hook.name(),
                criticality = level,
                error = %error,
                "Hook failed, continuing"
            ),
            HookCriticality::Optional => debug!(
                target: "runtime::hooks",
                hook = hook.name(),
                criticality = level,
                error = %error,
                "Optional hook failed"
            ),
        }
        Ok(())
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::default_hooks()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.hooks()).finish()
    }
}
