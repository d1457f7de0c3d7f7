//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from action resolution, skill execution and action hooks so
//! clients can bubble them up with consistent context.
use battle_core::{ActionError, BattleError, ErrorSeverity, SkillError};
use thiserror::Error;

use crate::hooks::ActionHookError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("battle `{0}` not found")]
    BattleNotFound(String),

    #[error("battle `{0}` is not active")]
    BattleInactive(String),

    #[error("roster is empty")]
    EmptyRoster,

    #[error("roster has no living {0} participants")]
    MissingSide(battle_core::Side),

    #[error("participant id `{0}` appears more than once")]
    DuplicateParticipant(String),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Skill(#[from] SkillError),

    #[error("critical hook `{hook}` failed")]
    Hook {
        hook: &'static str,
        #[source]
        source: ActionHookError,
    },
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::BattleNotFound(_) | Self::BattleInactive(_) => ErrorSeverity::Recoverable,
            Self::EmptyRoster | Self::MissingSide(_) | Self::DuplicateParticipant(_) => {
                ErrorSeverity::Validation
            }
            Self::Action(err) => err.severity(),
            Self::Skill(err) => err.severity(),
            Self::Hook { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BattleNotFound(_) => "BATTLE_NOT_FOUND",
            Self::BattleInactive(_) => "BATTLE_INACTIVE",
            Self::EmptyRoster => "BATTLE_EMPTY_ROSTER",
            Self::MissingSide(_) => "BATTLE_MISSING_SIDE",
            Self::DuplicateParticipant(_) => "BATTLE_DUPLICATE_PARTICIPANT",
            Self::Action(err) => err.error_code(),
            Self::Skill(err) => err.error_code(),
            Self::Hook { .. } => "HOOK_CRITICAL_FAILURE",
        }
    }
}
