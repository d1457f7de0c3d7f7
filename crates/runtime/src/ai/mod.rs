//! AI decision engine.
//!
//! Every participant without an external controller is driven by a
//! [`BattleAi`] strategy. A strategy only has to answer four narrow
//! questions (use a skill? which one? at whom? which plain attack?);
//! [`BattleAi::make_decision`] combines them into one action per turn and
//! is total: it always returns a well-formed [`Action`].
//!
//! # Fallback chain
//!
//! 1. Skill action, when [`BattleAi::should_use_skill`] agrees and a skill
//!    and target are found.
//! 2. Plain attack from [`BattleAi::select_attack`].
//! 3. Hardcoded fixed-damage attack ([`ActionFlags::FALLBACK`]).
//!
//! A strategy method that panics is treated like one that returned `None`.

mod analysis;
mod character;
mod enemy;
mod factory;
mod priority;

pub use analysis::{BattleAnalysis, threat_score};
pub use character::CharacterAi;
pub use enemy::EnemyAi;
pub use factory::AiFactory;
pub use priority::PriorityStrategy;

use std::panic::{self, AssertUnwindSafe};

use battle_core::{
    Action, BattleConfig, BuffEngine, Participant, ParticipantId, Roster,
    SkillBook, SkillConfig, SkillTarget, SkillType,
};
use tracing::{debug, error, warn};

/// Read-only battle state handed to strategies.
#[derive(Clone, Copy)]
pub struct BattleView<'a> {
    pub battle_id: &'a str,
    pub turn: u32,
    pub roster: &'a Roster,
    pub buffs: &'a BuffEngine,
    pub skills: &'a SkillBook,
    pub config: &'a BattleConfig,
}

impl<'a> BattleView<'a> {
    /// Skills `actor` could use this turn: known, active, off cooldown,
    /// affordable and not blocked by a control effect.
    pub fn usable_skills(&self, actor: &Participant) -> Vec<&'a SkillConfig> {
        if !self.buffs.can_use_skill(actor.id.as_str()) {
            return Vec::new();
        }
        actor
            .skills()
            .iter()
            .filter_map(|id| self.skills.get(id))
            .filter(|skill| skill.skill_type != SkillType::Passive)
            .filter(|skill| actor.cooldown(&skill.id) == 0)
            .filter(|skill| actor.energy() >= skill.energy_cost(&self.config.energy))
            .collect()
    }
}

/// Per-participant decision strategy.
pub trait BattleAi: Send + Sync {
    fn name(&self) -> &'static str;

    fn should_use_skill(&self, view: &BattleView<'_>, actor: &Participant, analysis: &BattleAnalysis) -> bool;

    fn select_skill<'a>(
        &self,
        view: &BattleView<'a>,
        actor: &Participant,
        analysis: &BattleAnalysis,
    ) -> Option<&'a SkillConfig>;

    /// Target for a plain attack or a damaging skill.
    fn select_target(
        &self,
        _view: &BattleView<'_>,
        _actor: &Participant,
        analysis: &BattleAnalysis,
    ) -> Option<ParticipantId> {
        analysis.top_threat.clone()
    }

    /// Target for `skill`: the weakest ally for heals and ally skills, the
    /// actor for self skills, otherwise [`select_target`](Self::select_target).
    fn skill_target(
        &self,
        view: &BattleView<'_>,
        actor: &Participant,
        skill: &SkillConfig,
        analysis: &BattleAnalysis,
    ) -> Option<ParticipantId> {
        match skill.target {
            SkillTarget::SelfOnly => Some(actor.id.clone()),
            SkillTarget::Ally => analysis.lowest_ally.clone(),
            SkillTarget::Enemy if skill.is_heal() && !skill.is_damage() => analysis.lowest_ally.clone(),
            SkillTarget::Enemy => self.select_target(view, actor, analysis),
        }
    }

    fn select_attack(
        &self,
        view: &BattleView<'_>,
        actor: &Participant,
        analysis: &BattleAnalysis,
        action_id: &str,
    ) -> Option<Action> {
        let target = self.select_target(view, actor, analysis)?;
        Some(Action::attack(action_id, actor.id.clone(), target))
    }

    fn select_skill_action(
        &self,
        view: &BattleView<'_>,
        actor: &Participant,
        analysis: &BattleAnalysis,
        action_id: &str,
    ) -> Option<Action> {
        if !self.should_use_skill(view, actor, analysis) {
            return None;
        }
        let skill = self.select_skill(view, actor, analysis)?;
        let target = self.skill_target(view, actor, skill, analysis)?;
        Some(Action::skill(action_id, actor.id.clone(), target, skill.id.clone()))
    }

    /// Chooses this turn's action for `actor_id`. Never fails.
    fn make_decision(&self, view: &BattleView<'_>, actor_id: &str) -> Action {
        let action_id = format!("{}-{}-{}", view.battle_id, view.turn, actor_id);
        let Some(actor) = view.roster.get(actor_id).filter(|a| a.is_alive()) else {
            warn!(target: "runtime::ai", strategy = self.name(), actor = actor_id, "actor missing or dead");
            return hardcoded_attack(view, actor_id, action_id);
        };
        let analysis = BattleAnalysis::analyze(view, actor);

        if let Some(action) = guarded(self.name(), "skill", || {
            self.select_skill_action(view, actor, &analysis, &action_id)
        }) {
            debug!(
                target: "runtime::ai",
                strategy = self.name(),
                actor = actor_id,
                skill = action.skill_id.as_deref().unwrap_or_default(),
                defender = %action.target,
                "skill chosen"
            );
            return action;
        }
        if let Some(action) = guarded(self.name(), "attack", || {
            self.select_attack(view, actor, &analysis, &action_id)
        }) {
            debug!(target: "runtime::ai", strategy = self.name(), actor = actor_id, defender = %action.target, "attack chosen");
            return action;
        }
        warn!(target: "runtime::ai", strategy = self.name(), actor = actor_id, "no decision, using hardcoded attack");
        hardcoded_attack(view, actor_id, action_id)
    }
}

fn guarded<F>(strategy: &'static str, step: &'static str, f: F) -> Option<Action>
where
    F: FnOnce() -> Option<Action>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(action) => action,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(target: "runtime::ai", strategy, step, panic = %message, "strategy panicked");
            None
        }
    }
}

/// Fixed-damage attack at the first living opponent, or at any other
/// living participant when the actor's side is unknown.
fn hardcoded_attack(view: &BattleView<'_>, actor_id: &str, action_id: String) -> Action {
    let side = view.roster.get(actor_id).map(|a| a.side);
    let target = view
        .roster
        .living()
        .filter(|p| p.id.as_str() != actor_id)
        .find(|p| side.is_none_or(|s| p.side != s))
        .map(|p| p.id.clone())
        .unwrap_or_else(|| ParticipantId::new(actor_id));
    Action::fallback(action_id, ParticipantId::new(actor_id), target, view.config.ai.fallback_damage)
}
