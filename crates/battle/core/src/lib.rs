//! Deterministic combat rules shared by the runtime and offline tools.
//!
//! `battle-core` owns the participant model, the modifier stack, the buff
//! engine, the damage and heal calculators and skill execution. Nothing here
//! is async; a battle is advanced by explicit calls and every random draw
//! goes through a seeded [`rng::BattleRng`].
pub mod action;
pub mod buff;
pub mod combat;
pub mod config;
pub mod error;
pub mod participant;
pub mod rng;
pub mod skill;
pub mod stats;

#[cfg(feature = "serde")]
pub use action::compute_log_root;
pub use action::{Action, ActionError, ActionFlags, ActionKind, Effect, EffectKind};
pub use buff::{
    BehaviorFactory, BuffBehavior, BuffConfig, BuffContext, BuffDuration, BuffEngine, BuffError,
    BuffEvent, BuffEventKind, BuffHook, BuffInstance, BuffRegistry, BuffState, ControlType,
    HookError, HookResult, ScriptMetadata, StackRule,
};
pub use combat::{
    CalculationKind, CalculationLog, CombatState, DamageCalculator, DamageModifier, DamageOutcome,
    HealCalculator,
};
pub use config::{AiConfig, BattleConfig, DamageConfig, EnergyConfig, HealConfig, TurnConfig};
pub use error::{BattleError, ErrorSeverity, ValidationError};
pub use participant::{Participant, ParticipantId, ParticipantInfo, Roster, Side};
pub use rng::{BattleRng, PcgRng, RngOracle, compute_seed};
pub use skill::{
    AttackType, Calculation, CriticalConfig, ExtraValue, SkillBook, SkillConfig, SkillError,
    SkillManager, SkillOutcome, SkillStep, SkillTarget, SkillType, StepKind, TargetModifier,
};
pub use stats::{Attribute, Modifier, ModifierKind, ModifierStack};
