//! Strategy for opposing-side participants.

use battle_core::{Participant, ParticipantId, SkillConfig};

use super::{BattleAi, BattleAnalysis, BattleView, PriorityStrategy};

/// Aggressive strategy with a flat energy threshold.
///
/// Picks the heaviest affordable skill and focuses the opponent with the
/// lowest current health.
#[derive(Clone, Copy, Debug)]
pub struct EnemyAi {
    priority: PriorityStrategy,
}

impl EnemyAi {
    pub fn new(priority: PriorityStrategy) -> Self {
        Self { priority }
    }
}

impl Default for EnemyAi {
    fn default() -> Self {
        Self::new(PriorityStrategy::Aggressive)
    }
}

impl BattleAi for EnemyAi {
    fn name(&self) -> &'static str {
        "enemy"
    }

    fn should_use_skill(&self, view: &BattleView<'_>, actor: &Participant, _analysis: &BattleAnalysis) -> bool {
        actor.energy() >= view.config.ai.enemy_skill_energy
    }

    fn select_skill<'a>(
        &self,
        view: &BattleView<'a>,
        actor: &Participant,
        analysis: &BattleAnalysis,
    ) -> Option<&'a SkillConfig> {
        let usable = view.usable_skills(actor);
        self.priority
            .rank(&usable, actor, analysis, &view.config.ai, &view.config.energy)
            .into_iter()
            .find(|(_, weight)| *weight > 0.0)
            .map(|(skill, _)| skill)
    }

    fn select_target(&self, _view: &BattleView<'_>, _actor: &Participant, analysis: &BattleAnalysis) -> Option<ParticipantId> {
        analysis.weakest_enemy.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use battle_core::{
        ActionKind, BattleConfig, BuffEngine, BuffRegistry, Calculation, ParticipantInfo, Roster,
        Side, SkillBook, SkillStep, SkillType,
    };

    use super::*;

    #[test]
    fn focuses_lowest_health_and_uses_skill_at_threshold() {
        let roster = Roster::from_infos(&[
            ParticipantInfo::new("orc", "Orc", Side::Enemy, 100)
                .with_energy(50, 150)
                .with_skills(["smash"]),
            ParticipantInfo::new("knight", "Knight", Side::Ally, 200).with_health(120),
            ParticipantInfo::new("mage", "Mage", Side::Ally, 100).with_health(90),
        ]);
        let buffs = BuffEngine::new(Arc::new(BuffRegistry::new()));
        let skills = SkillBook::load([SkillConfig::new("smash", "Smash", SkillType::Small)
            .with_step(SkillStep::damage(Calculation::base(25.0)))])
        .expect("valid skill");
        let config = BattleConfig::default();
        let view = BattleView {
            battle_id: "b1",
            turn: 1,
            roster: &roster,
            buffs: &buffs,
            skills: &skills,
            config: &config,
        };

        let action = EnemyAi::default().make_decision(&view, "orc");
        assert_eq!(action.kind, ActionKind::Skill);
        assert_eq!(action.skill_id.as_deref(), Some("smash"));
        assert_eq!(action.target.as_str(), "mage");
    }
}
