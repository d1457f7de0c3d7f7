//! Damage and heal calculators.
mod damage;
mod heal;
mod log;
mod state;

pub use damage::{
    DamageCalculator, DamageModifier, DamageOutcome, ElementalAdvantage, LevelDifference,
    RandomVariance, defense_effect,
};
pub use heal::HealCalculator;
pub use log::{CalculationKind, CalculationLog, ExtraContribution};
pub use state::CombatState;
