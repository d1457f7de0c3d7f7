//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`BuffError`, `SkillError`, `ActionError`) live next to
//! the operations that raise them. This module holds the shared classification
//! used by callers to decide between fallback, rejection and abort.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller has a defined fallback (skill → plain attack)
/// - **Validation**: configuration or input was rejected at load/lookup time
/// - **Internal**: a pipeline invariant was violated (missing participant)
/// - **Fatal**: battle state can no longer be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Failure reported by a configuration validator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{entity} is missing required field `{field}`")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity} `{id}` has no steps")]
    EmptySteps { entity: &'static str, id: String },

    #[error("step {index} of `{id}`: {reason}")]
    InvalidStep {
        id: String,
        index: usize,
        reason: &'static str,
    },

    #[error("duplicate id `{0}`")]
    DuplicateId(String),
}

impl BattleError for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "VALIDATION_MISSING_FIELD",
            Self::EmptySteps { .. } => "VALIDATION_EMPTY_STEPS",
            Self::InvalidStep { .. } => "VALIDATION_INVALID_STEP",
            Self::DuplicateId(_) => "VALIDATION_DUPLICATE_ID",
        }
    }
}
