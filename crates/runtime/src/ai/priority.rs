//! Weighted skill ranking.

use battle_core::{AiConfig, EnergyConfig, Participant, SkillConfig, SkillType};

use super::BattleAnalysis;

/// Skill weighting profile.
///
/// Parsed from a name; unknown names fall back to [`Balanced`](Self::Balanced).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PriorityStrategy {
    #[default]
    Balanced,
    /// Extra weight on damage skills.
    Aggressive,
    /// Extra weight on heals, growing as the actor's health drops.
    Defensive,
}

impl PriorityStrategy {
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Weight of `skill` for `actor` in the analysed situation. Never negative.
    pub fn weight(
        &self,
        skill: &SkillConfig,
        actor: &Participant,
        analysis: &BattleAnalysis,
        ai: &AiConfig,
        energy: &EnergyConfig,
    ) -> f64 {
        let mut weight = match skill.skill_type {
            SkillType::Passive => return 0.0,
            SkillType::Ultimate => 80.0,
            SkillType::Small => 60.0,
            SkillType::Reaction => 50.0,
        };

        if skill.is_heal() {
            if analysis.any_ally_below_half {
                weight += 40.0;
            } else if analysis.needs_healing {
                weight += 20.0;
            }
            if analysis.actor_critical {
                weight += 30.0;
            }
        }
        if skill.is_damage() && analysis.top_threat_score > ai.threat_skill_threshold {
            weight += 30.0;
        }
        if actor.energy() < skill.energy_cost(energy) {
            weight -= 50.0;
        }

        match self {
            Self::Balanced => {}
            Self::Aggressive => {
                if skill.is_damage() {
                    weight += 20.0;
                }
            }
            Self::Defensive => {
                if skill.is_heal() {
                    weight += 30.0;
                    if analysis.actor_health_ratio < 0.5 {
                        weight += (0.5 - analysis.actor_health_ratio) * 100.0;
                    }
                }
            }
        }
        weight.max(0.0)
    }

    /// `skills` paired with their weights, heaviest first. Equal weights keep
    /// their input order.
    pub fn rank<'a>(
        &self,
        skills: &[&'a SkillConfig],
        actor: &Participant,
        analysis: &BattleAnalysis,
        ai: &AiConfig,
        energy: &EnergyConfig,
    ) -> Vec<(&'a SkillConfig, f64)> {
        let mut ranked: Vec<_> = skills
            .iter()
            .map(|&skill| (skill, self.weight(skill, actor, analysis, ai, energy)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
