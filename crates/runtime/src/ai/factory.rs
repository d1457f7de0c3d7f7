//! Strategy selection by side.

use battle_core::Side;

use super::{BattleAi, CharacterAi, EnemyAi, PriorityStrategy};

/// Builds the strategy for a participant from its side tag.
#[derive(Clone, Copy, Debug)]
pub struct AiFactory {
    character: PriorityStrategy,
    enemy: PriorityStrategy,
}

impl AiFactory {
    pub fn new() -> Self {
        Self {
            character: PriorityStrategy::Balanced,
            enemy: PriorityStrategy::Aggressive,
        }
    }

    pub fn with_character_priority(mut self, priority: PriorityStrategy) -> Self {
        self.character = priority;
        self
    }

    pub fn with_enemy_priority(mut self, priority: PriorityStrategy) -> Self {
        self.enemy = priority;
        self
    }

    /// [`CharacterAi`] for allies, [`EnemyAi`] for enemies.
    pub fn create(&self, side: Side) -> Box<dyn BattleAi> {
        match side {
            Side::Ally => Box::new(CharacterAi::new(self.character)),
            Side::Enemy => Box::new(EnemyAi::new(self.enemy)),
        }
    }
}

impl Default for AiFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_selects_strategy() {
        let factory = AiFactory::new();
        assert_eq!(factory.create(Side::Ally).name(), "character");
        assert_eq!(factory.create(Side::Enemy).name(), "enemy");
    }
}
