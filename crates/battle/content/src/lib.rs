//! Data-driven battle content: built-in buff behaviors and file loaders.
//!
//! - Buff behaviors for every built-in buff id, exposed through
//!   [`default_registry`]
//! - Skill catalogs and buff templates (RON)
//! - Rosters and battle rules (TOML)
//!
//! Content is consumed by the runtime when a battle is created.

pub mod behaviors;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use behaviors::{BUILTIN_ORIGIN, builtin_behaviors, default_registry};

#[cfg(feature = "loaders")]
pub use loaders::{
    BattleContent, BuffConfigLoader, ConfigLoader, ContentFactory, LoadResult, RosterLoader,
    SkillLoader,
};
