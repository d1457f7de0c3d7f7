//! Hook that re-checks participant and action invariants.

use async_trait::async_trait;

use super::{ActionHook, ActionHookError, HookContext, HookCriticality};

/// Verifies that the logged action is well formed and every participant's
/// meters are within bounds.
///
/// Runs first and is critical: a violation means the pipeline produced
/// inconsistent state and the turn must not be treated as resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvariantHook;

#[async_trait]
impl ActionHook for InvariantHook {
    fn name(&self) -> &'static str {
        "invariants"
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Critical
    }

    async fn after_action(&self, ctx: &HookContext<'_>) -> Result<(), ActionHookError> {
        if !ctx.action.is_well_formed() {
            return Err(ActionHookError::Invariant(format!(
                "action `{}` is missing an id, source or target",
                ctx.action.id
            )));
        }
        for participant in ctx.roster.iter() {
            if participant.health() > participant.max_health() {
                return Err(ActionHookError::Invariant(format!(
                    "{} health {} exceeds max {}",
                    participant.id,
                    participant.health(),
                    participant.max_health()
                )));
            }
            if participant.energy() > participant.max_energy() {
                return Err(ActionHookError::Invariant(format!(
                    "{} energy {} exceeds max {}",
                    participant.id,
                    participant.energy(),
                    participant.max_energy()
                )));
            }
        }
        Ok(())
    }
}
