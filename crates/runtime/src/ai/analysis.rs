//! Battle analysis computed once per decision.

use battle_core::{BuffEngine, Participant, ParticipantId, Side};

use super::BattleView;

/// Weighted danger of `candidate` from `attacker`'s point of view.
///
/// `(1 - health_ratio)·50 + energy_ratio·30`, plus 20 when an enemy-side
/// attacker looks at an ally-side candidate, plus 10 per active buff on
/// the candidate.
pub fn threat_score(attacker: &Participant, candidate: &Participant, buffs: &BuffEngine) -> f64 {
    let mut score = (1.0 - candidate.health_ratio()) * 50.0 + candidate.energy_ratio() * 30.0;
    if attacker.side == Side::Enemy && candidate.side == Side::Ally {
        score += 20.0;
    }
    score + 10.0 * buffs.active_count(candidate.id.as_str()) as f64
}

/// Snapshot of the situation around one actor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BattleAnalysis {
    /// Living members of the actor's side, actor included.
    pub allies: Vec<ParticipantId>,
    /// Living members of the opposing side.
    pub enemies: Vec<ParticipantId>,
    /// Summed health over summed max health of the living allies.
    pub team_health_ratio: f64,
    pub top_threat: Option<ParticipantId>,
    pub top_threat_score: f64,
    /// Opponent with the lowest current health.
    pub weakest_enemy: Option<ParticipantId>,
    /// Ally with the lowest health ratio.
    pub lowest_ally: Option<ParticipantId>,
    /// Some ally is below the heal threshold.
    pub needs_healing: bool,
    pub any_ally_below_half: bool,
    pub actor_health_ratio: f64,
    /// Actor is below the critical health ratio.
    pub actor_critical: bool,
}

impl BattleAnalysis {
    pub fn analyze(view: &BattleView<'_>, actor: &Participant) -> Self {
        let ai = &view.config.ai;
        let allies: Vec<&Participant> = view.roster.living_on(actor.side).collect();
        let enemies: Vec<&Participant> = view.roster.living_on(actor.side.opposite()).collect();

        let (health, max_health) = allies.iter().fold((0u64, 0u64), |(h, m), p| {
            (h + u64::from(p.health()), m + u64::from(p.max_health()))
        });
        let team_health_ratio = if max_health == 0 {
            0.0
        } else {
            health as f64 / max_health as f64
        };

        // Strict comparisons keep the first candidate in roster order on ties.
        let mut top_threat: Option<(&Participant, f64)> = None;
        for enemy in &enemies {
            let score = threat_score(actor, enemy, view.buffs);
            if top_threat.is_none_or(|(_, best)| score > best) {
                top_threat = Some((enemy, score));
            }
        }

        let mut weakest_enemy: Option<&Participant> = None;
        for enemy in &enemies {
            if weakest_enemy.is_none_or(|w| enemy.health() < w.health()) {
                weakest_enemy = Some(enemy);
            }
        }

        let mut lowest_ally: Option<&Participant> = None;
        for ally in &allies {
            if lowest_ally.is_none_or(|l| ally.health_ratio() < l.health_ratio()) {
                lowest_ally = Some(ally);
            }
        }

        let actor_health_ratio = actor.health_ratio();
        Self {
            needs_healing: allies.iter().any(|p| p.health_ratio() < ai.heal_threshold),
            any_ally_below_half: allies.iter().any(|p| p.health_ratio() < 0.5),
            allies: allies.iter().map(|p| p.id.clone()).collect(),
            enemies: enemies.iter().map(|p| p.id.clone()).collect(),
            team_health_ratio,
            top_threat_score: top_threat.map(|(_, s)| s).unwrap_or_default(),
            top_threat: top_threat.map(|(p, _)| p.id.clone()),
            weakest_enemy: weakest_enemy.map(|p| p.id.clone()),
            lowest_ally: lowest_ally.map(|p| p.id.clone()),
            actor_health_ratio,
            actor_critical: actor_health_ratio < ai.critical_health_ratio,
        }
    }
}
