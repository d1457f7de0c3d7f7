use std::sync::Arc;

use crate::buff::{BuffEngine, BuffRegistry};
use crate::config::BattleConfig;
use crate::participant::Roster;
use crate::rng::BattleRng;

use super::{DamageCalculator, HealCalculator};

/// Mutable simulation state of one battle.
///
/// Fields are public so callers can borrow them independently.
#[derive(Debug)]
pub struct CombatState {
    pub roster: Roster,
    pub buffs: BuffEngine,
    pub damage: DamageCalculator,
    pub heal: HealCalculator,
    pub rng: BattleRng,
}

impl CombatState {
    pub fn new(roster: Roster, registry: Arc<BuffRegistry>, config: &BattleConfig, seed: u64) -> Self {
        Self {
            roster,
            buffs: BuffEngine::new(registry),
            damage: DamageCalculator::new(config.damage.clone()).with_builtin_modifiers(),
            heal: HealCalculator::new(config.heal.clone()),
            rng: BattleRng::new(seed),
        }
    }
}
