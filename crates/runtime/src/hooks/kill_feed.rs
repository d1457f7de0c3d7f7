//! Hook that reports defeated participants.

use async_trait::async_trait;
use battle_core::ActionFlags;
use tracing::info;

use super::{ActionHook, ActionHookError, HookContext, HookCriticality};

/// Logs an info line whenever an action defeats its target.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillFeedHook;

#[async_trait]
impl ActionHook for KillFeedHook {
    fn name(&self) -> &'static str {
        "kill_feed"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Optional
    }

    fn should_trigger(&self, ctx: &HookContext<'_>) -> bool {
        ctx.action.flags.contains(ActionFlags::KILL)
    }

    async fn after_action(&self, ctx: &HookContext<'_>) -> Result<(), ActionHookError> {
        let target = ctx
            .roster
            .get(ctx.action.target.as_str())
            .ok_or_else(|| ActionHookError::Failed(format!("unknown target {}", ctx.action.target)))?;
        info!(
            target: "runtime::hooks",
            battle = ctx.battle_id,
            source = %ctx.action.source,
            defeated = %target.name,
            skill = ctx.action.skill_id.as_deref().unwrap_or("attack"),
            "participant defeated"
        );
        Ok(())
    }
}
