//! Action executor: turns a requested [`Action`] into a resolved one.
//!
//! Resolution order:
//! 1. Validate source (present and alive) and target (present).
//! 2. Skills: check usability, spend the energy cost and run the steps.
//!    A recoverable refusal or missing energy downgrades the action to a
//!    plain attack in place.
//! 3. Attacks: ATK-scaled physical hit, or the fixed damage of a fallback.
//! 4. Grant on-hit energy to a damaged target and post-action energy to
//!    the source, then set the outcome flags.

use battle_core::{
    Action, ActionError, ActionFlags, ActionKind, AttackType, Attribute, BattleError, Calculation,
    CombatState, Effect, EnergyConfig, SkillManager,
};
use tracing::{debug, info};

use crate::api::Result;

/// Resolves actions against one battle's [`CombatState`].
#[derive(Clone, Debug)]
pub struct ActionExecutor {
    skills: SkillManager,
    energy: EnergyConfig,
}

impl ActionExecutor {
    pub fn new(skills: SkillManager, energy: EnergyConfig) -> Self {
        Self { skills, energy }
    }

    pub fn skills(&self) -> &SkillManager {
        &self.skills
    }

    /// Calculation used by basic attacks.
    pub fn basic_attack() -> Calculation {
        Calculation::base(0.0)
            .with_extra(Attribute::Atk, 1.0)
            .with_attack_type(AttackType::Physical)
    }

    /// Resolves `action` and returns it with the applied damage, healing,
    /// effects and flags filled in.
    ///
    /// Errors only when the action references a missing source or target, a
    /// dead source, or a skill that does not exist.
    pub fn execute(&self, state: &mut CombatState, mut action: Action) -> Result<Action> {
        let source = state
            .roster
            .get(action.source.as_str())
            .ok_or_else(|| ActionError::MissingSource(action.source.to_string()))?;
        if !source.is_alive() {
            return Err(ActionError::DeadSource(action.source.to_string()).into());
        }
        let target_alive = state
            .roster
            .get(action.target.as_str())
            .map(|t| t.is_alive())
            .ok_or_else(|| ActionError::MissingTarget(action.target.to_string()))?;
        let target_health = state
            .roster
            .get(action.target.as_str())
            .map(|t| t.health())
            .unwrap_or_default();

        match action.kind {
            ActionKind::Status => return Ok(action),
            ActionKind::Skill => self.resolve_skill(state, &mut action)?,
            ActionKind::Attack => self.resolve_attack(state, &mut action),
        }

        let target_id = action.target.as_str();
        if let Some(target) = state.roster.get_mut(target_id) {
            if action.damage > 0 && target.is_alive() {
                target.gain_energy(self.energy.on_hit);
            }
            if target_alive && !target.is_alive() {
                action.flags |= ActionFlags::KILL;
            }
        }
        if let Some(source) = state.roster.get_mut(action.source.as_str()) {
            source.gain_energy(self.energy.after_action);
        }

        info!(
            target: "runtime::executor",
            kind = %action.kind,
            source = %action.source,
            defender = %action.target,
            skill = action.skill_id.as_deref().unwrap_or_default(),
            damage = action.damage,
            heal = action.heal,
            health_before = target_health,
            flags = ?action.flags,
            "action resolved"
        );
        Ok(action)
    }

    fn resolve_skill(&self, state: &mut CombatState, action: &mut Action) -> Result<()> {
        let Some(skill_id) = action.skill_id.clone() else {
            self.downgrade(state, action, "no skill id");
            return Ok(());
        };
        let source_id = action.source.to_string();

        let cost = match self.skills.check_usable(state, &skill_id, &source_id) {
            Ok(skill) => skill.energy_cost(&self.energy),
            Err(err) if err.severity().is_recoverable() => {
                self.downgrade(state, action, &err.to_string());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let paid = state
            .roster
            .get_mut(&source_id)
            .is_some_and(|source| source.spend_energy(cost));
        if !paid {
            self.downgrade(state, action, "insufficient energy");
            return Ok(());
        }

        let outcome = self
            .skills
            .execute_skill(state, &skill_id, &source_id, action.target.as_str())?;
        action.damage = outcome.damage;
        action.heal = outcome.heal;
        if outcome.critical {
            action.flags |= ActionFlags::CRITICAL;
        }
        if outcome.missed {
            action.flags |= ActionFlags::MISS;
        }
        action.effects.extend(outcome.effects);
        Ok(())
    }

    /// Converts a skill request into a plain attack and resolves it.
    fn downgrade(&self, state: &mut CombatState, action: &mut Action, reason: &str) {
        let skill = action.skill_id.take().unwrap_or_default();
        debug!(
            target: "runtime::executor",
            source = %action.source,
            skill = %skill,
            reason,
            "skill downgraded to attack"
        );
        action.kind = ActionKind::Attack;
        action.flags |= ActionFlags::DOWNGRADED;
        action.effects.push(Effect::status(format!("{skill} unavailable: {reason}")));
        self.resolve_attack(state, action);
    }

    fn resolve_attack(&self, state: &mut CombatState, action: &mut Action) {
        let target_id = action.target.as_str();
        if action.is_fallback() {
            let amount = action.damage;
            let applied = state
                .roster
                .get_mut(target_id)
                .map(|target| state.damage.apply_damage(target, amount))
                .unwrap_or_default();
            action.damage = applied;
            action.effects.push(Effect::damage(applied, false));
            return;
        }

        let (Some(source), Some(target)) = (
            state.roster.get(action.source.as_str()),
            state.roster.get(target_id),
        ) else {
            return;
        };
        let outcome = state
            .damage
            .calculate(&Self::basic_attack(), source, target, &mut state.rng);
        if outcome.miss {
            action.flags |= ActionFlags::MISS;
            action.effects.push(Effect::miss());
            return;
        }
        let applied = state
            .roster
            .get_mut(target_id)
            .map(|target| state.damage.apply_damage(target, outcome.amount))
            .unwrap_or_default();
        action.damage = applied;
        if outcome.critical {
            action.flags |= ActionFlags::CRITICAL;
        }
        action.effects.push(Effect::damage(applied, outcome.critical));
    }
}
