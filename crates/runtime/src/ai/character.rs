//! Strategy for player-side participants.

use battle_core::{Participant, SkillConfig, SkillType};

use super::{BattleAi, BattleAnalysis, BattleView, PriorityStrategy};

/// Heal-first, ultimate-eager strategy.
///
/// Uses skills at the configured energy ratio, whenever its own health is
/// critical, or when it can afford an ultimate at the ultimate threshold.
/// Attacks the highest-threat opponent.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharacterAi {
    priority: PriorityStrategy,
}

impl CharacterAi {
    pub fn new(priority: PriorityStrategy) -> Self {
        Self { priority }
    }

    pub fn priority(&self) -> PriorityStrategy {
        self.priority
    }
}

impl BattleAi for CharacterAi {
    fn name(&self) -> &'static str {
        "character"
    }

    fn should_use_skill(&self, view: &BattleView<'_>, actor: &Participant, analysis: &BattleAnalysis) -> bool {
        let ai = &view.config.ai;
        if actor.energy_ratio() >= ai.skill_energy_ratio || analysis.actor_critical {
            return true;
        }
        actor.energy() >= ai.ultimate_energy
            && view
                .usable_skills(actor)
                .iter()
                .any(|s| s.skill_type == SkillType::Ultimate)
    }

    fn select_skill<'a>(
        &self,
        view: &BattleView<'a>,
        actor: &Participant,
        analysis: &BattleAnalysis,
    ) -> Option<&'a SkillConfig> {
        let usable = view.usable_skills(actor);
        let ranked = self
            .priority
            .rank(&usable, actor, analysis, &view.config.ai, &view.config.energy);
        let first = |pred: &dyn Fn(&SkillConfig) -> bool| {
            ranked
                .iter()
                .find(|(skill, weight)| *weight > 0.0 && pred(skill))
                .map(|(skill, _)| *skill)
        };

        if (analysis.needs_healing || analysis.actor_critical)
            && let Some(heal) = first(&|s: &SkillConfig| s.is_heal())
        {
            return Some(heal);
        }
        if analysis.top_threat_score > view.config.ai.threat_skill_threshold
            && let Some(damage) = first(&|s: &SkillConfig| s.is_damage())
        {
            return Some(damage);
        }
        if actor.energy() >= view.config.ai.ultimate_energy
            && let Some(ultimate) = first(&|s: &SkillConfig| s.skill_type == SkillType::Ultimate)
        {
            return Some(ultimate);
        }
        first(&|s: &SkillConfig| s.skill_type == SkillType::Small)
            .or_else(|| first(&|s: &SkillConfig| s.skill_type == SkillType::Ultimate))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use battle_core::{
        ActionKind, BattleConfig, BuffEngine, BuffRegistry, Calculation, ParticipantInfo, Roster,
        Side, SkillBook, SkillStep, SkillTarget,
    };

    use super::*;

    fn book() -> SkillBook {
        SkillBook::load([
            SkillConfig::new("mend", "Mend", SkillType::Small)
                .with_target(SkillTarget::Ally)
                .with_step(SkillStep::heal(Calculation::base(30.0))),
            SkillConfig::new("slash", "Slash", SkillType::Small)
                .with_step(SkillStep::damage(Calculation::base(20.0))),
        ])
        .expect("valid skills")
    }

    #[test]
    fn wounded_actor_heals_itself() {
        let roster = Roster::from_infos(&[
            ParticipantInfo::new("a", "A", Side::Ally, 100)
                .with_health(40)
                .with_energy(100, 150)
                .with_skills(["slash", "mend"]),
            ParticipantInfo::new("b", "B", Side::Enemy, 80).with_energy(0, 150),
        ]);
        let buffs = BuffEngine::new(Arc::new(BuffRegistry::new()));
        let skills = book();
        let config = BattleConfig::default();
        let view = BattleView {
            battle_id: "b1",
            turn: 1,
            roster: &roster,
            buffs: &buffs,
            skills: &skills,
            config: &config,
        };

        let action = CharacterAi::default().make_decision(&view, "a");
        assert_eq!(action.kind, ActionKind::Skill);
        assert_eq!(action.skill_id.as_deref(), Some("mend"));
        assert_eq!(action.target.as_str(), "a");
    }

    #[test]
    fn healthy_low_energy_actor_attacks() {
        let roster = Roster::from_infos(&[
            ParticipantInfo::new("a", "A", Side::Ally, 100)
                .with_energy(20, 150)
                .with_skills(["slash"]),
            ParticipantInfo::new("b", "B", Side::Enemy, 80),
        ]);
        let buffs = BuffEngine::new(Arc::new(BuffRegistry::new()));
        let skills = book();
        let config = BattleConfig::default();
        let view = BattleView {
            battle_id: "b1",
            turn: 1,
            roster: &roster,
            buffs: &buffs,
            skills: &skills,
            config: &config,
        };

        let action = CharacterAi::default().make_decision(&view, "a");
        assert_eq!(action.kind, ActionKind::Attack);
        assert!(!action.is_fallback());
        assert_eq!(action.target.as_str(), "b");
    }
}
