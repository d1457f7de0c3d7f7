use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{SkillBook, SkillConfig, SkillStep, SkillType, StepKind};
use crate::action::Effect;
use crate::buff::{BuffConfig, BuffDuration, ControlType, StackRule};
use crate::combat::CombatState;
use crate::config::TurnConfig;
use crate::error::{BattleError, ErrorSeverity};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SkillError {
    #[error("skill `{0}` not found")]
    NotFound(String),

    #[error("skill source `{0}` not found")]
    SourceNotFound(String),

    #[error("skill target `{0}` not found")]
    TargetNotFound(String),

    #[error("skill `{0}` is passive")]
    Passive(String),

    #[error("skill `{skill}` on cooldown for {remaining} turns")]
    OnCooldown { skill: String, remaining: u32 },

    #[error("`{0}` cannot use skills while controlled")]
    Controlled(String),
}

impl BattleError for SkillError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound(_) => ErrorSeverity::Validation,
            Self::SourceNotFound(_) | Self::TargetNotFound(_) => ErrorSeverity::Internal,
            Self::Passive(_) | Self::OnCooldown { .. } | Self::Controlled(_) => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "SKILL_NOT_FOUND",
            Self::SourceNotFound(_) => "SKILL_SOURCE_NOT_FOUND",
            Self::TargetNotFound(_) => "SKILL_TARGET_NOT_FOUND",
            Self::Passive(_) => "SKILL_PASSIVE",
            Self::OnCooldown { .. } => "SKILL_ON_COOLDOWN",
            Self::Controlled(_) => "SKILL_CONTROLLED",
        }
    }
}

/// What one skill execution did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkillOutcome {
    pub damage: u32,
    pub heal: u32,
    pub critical: bool,
    pub missed: bool,
    pub target_died: bool,
    pub effects: Vec<Effect>,
    /// Buff instance ids created or refreshed.
    pub buffs: Vec<String>,
}

/// Executes skill steps against a [`CombatState`].
#[derive(Clone, Debug)]
pub struct SkillManager {
    book: Arc<SkillBook>,
    templates: Arc<BTreeMap<String, BuffConfig>>,
    turn_duration_ms: u64,
}

impl SkillManager {
    /// Buff applied by SHIELD steps without an explicit id.
    pub const SHIELD_BUFF: &'static str = "shield";
    /// Buff applied by CONTROL steps without an explicit id.
    pub const CONTROL_BUFF: &'static str = "buff_stun";

    pub fn new(book: Arc<SkillBook>) -> Self {
        Self {
            book,
            templates: Arc::new(BTreeMap::new()),
            turn_duration_ms: TurnConfig::DEFAULT_TURN_DURATION_MS,
        }
    }

    /// Buff configs used as the starting point for buffs applied by steps.
    pub fn with_buff_templates<I>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = BuffConfig>,
    {
        self.templates = Arc::new(templates.into_iter().map(|c| (c.id.clone(), c)).collect());
        self
    }

    pub fn with_turn_duration(mut self, turn_duration_ms: u64) -> Self {
        self.turn_duration_ms = turn_duration_ms;
        self
    }

    pub fn book(&self) -> &SkillBook {
        &self.book
    }

    pub fn get_skill_config(&self, skill_id: &str) -> Option<&SkillConfig> {
        self.book.get(skill_id)
    }

    /// Checks whether `source_id` could use `skill_id` right now, ignoring
    /// energy.
    pub fn check_usable(
        &self,
        state: &CombatState,
        skill_id: &str,
        source_id: &str,
    ) -> Result<&SkillConfig, SkillError> {
        let skill = self
            .book
            .get(skill_id)
            .ok_or_else(|| SkillError::NotFound(skill_id.to_string()))?;
        let source = state
            .roster
            .get(source_id)
            .ok_or_else(|| SkillError::SourceNotFound(source_id.to_string()))?;
        if skill.skill_type == SkillType::Passive {
            return Err(SkillError::Passive(skill_id.to_string()));
        }
        let remaining = source.cooldown(skill_id);
        if remaining > 0 {
            return Err(SkillError::OnCooldown {
                skill: skill_id.to_string(),
                remaining,
            });
        }
        if !state.buffs.can_use_skill(source_id) {
            return Err(SkillError::Controlled(source_id.to_string()));
        }
        Ok(skill)
    }

    /// Runs every step of `skill_id` from `source_id` at `target_id`.
    ///
    /// Steps run by descending priority and stop once the target is dead.
    /// Buff application failures are logged and skipped.
    pub fn execute_skill(
        &self,
        state: &mut CombatState,
        skill_id: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<SkillOutcome, SkillError> {
        let skill = self.check_usable(state, skill_id, source_id)?;
        if !state.roster.contains(target_id) {
            return Err(SkillError::TargetNotFound(target_id.to_string()));
        }

        let mut steps: Vec<&SkillStep> = skill.steps.iter().collect();
        steps.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut outcome = SkillOutcome::default();
        for step in steps {
            if !state.roster.get(target_id).is_some_and(|t| t.is_alive()) {
                debug!(target: "battle::skill", skill = skill_id, "target down, remaining steps skipped");
                break;
            }
            let recipient = if step.target_self { source_id } else { target_id };
            match step.kind {
                StepKind::Damage => self.damage_step(state, step, source_id, recipient, &mut outcome),
                StepKind::Heal => self.heal_step(state, step, source_id, recipient, &mut outcome),
                StepKind::Buff | StepKind::Debuff | StepKind::Shield | StepKind::Control => {
                    self.buff_step(state, step, recipient, &mut outcome)
                }
            }
        }

        if let Some(source) = state.roster.get_mut(source_id) {
            source.start_cooldown(skill_id, skill.cooldown);
        }
        outcome.target_died = state.roster.get(target_id).is_some_and(|t| !t.is_alive());
        info!(
            target: "battle::skill",
            skill = skill_id,
            source = source_id,
            recipient = target_id,
            damage = outcome.damage,
            heal = outcome.heal,
            "skill executed"
        );
        Ok(outcome)
    }

    fn damage_step(
        &self,
        state: &mut CombatState,
        step: &SkillStep,
        source_id: &str,
        target_id: &str,
        outcome: &mut SkillOutcome,
    ) {
        let (Some(source), Some(target)) = (state.roster.get(source_id), state.roster.get(target_id)) else {
            return;
        };
        let result = state.damage.calculate_damage(step, source, target, &mut state.rng);
        if result.miss {
            outcome.missed = true;
            outcome.effects.push(Effect::miss());
            return;
        }
        let Some(target) = state.roster.get_mut(target_id) else {
            return;
        };
        let applied = state.damage.apply_damage(target, result.amount);
        outcome.damage += applied;
        outcome.critical |= result.critical;
        outcome.effects.push(Effect::damage(applied, result.critical));
    }

    fn heal_step(
        &self,
        state: &mut CombatState,
        step: &SkillStep,
        source_id: &str,
        target_id: &str,
        outcome: &mut SkillOutcome,
    ) {
        let (Some(source), Some(target)) = (state.roster.get(source_id), state.roster.get(target_id)) else {
            return;
        };
        let amount = state.heal.calculate_heal(step, source, target, &state.buffs);
        let Some(target) = state.roster.get_mut(target_id) else {
            return;
        };
        let applied = state.heal.apply_heal(target, amount);
        outcome.heal += applied;
        outcome.effects.push(Effect::heal(applied));
        if step.calculation.as_ref().is_some_and(|c| c.single_turn) {
            outcome.effects.push(Effect::status("single-turn heal"));
        }
    }

    fn buff_step(&self, state: &mut CombatState, step: &SkillStep, recipient: &str, outcome: &mut SkillOutcome) {
        let Some(buff_id) = step.effective_buff_id() else {
            warn!(target: "battle::skill", kind = %step.kind, "buff step without buff id");
            return;
        };
        let config = self.buff_config(step, buff_id);
        let debuff = config.is_debuff;
        match state.buffs.add_buff(&mut state.roster, recipient, buff_id, config) {
            Ok(instance_id) => {
                outcome.effects.push(Effect::buff(buff_id, debuff));
                outcome.buffs.push(instance_id);
            }
            Err(err) => {
                warn!(
                    target: "battle::skill",
                    buff = buff_id,
                    recipient,
                    error = %err,
                    "buff step failed"
                );
            }
        }
    }

    /// Template (if any) overlaid with the step's duration, stacks and
    /// parameters.
    fn buff_config(&self, step: &SkillStep, buff_id: &str) -> BuffConfig {
        let turns = u64::from(step.duration_turns.unwrap_or(1));
        let duration = BuffDuration::Timed(turns.saturating_mul(self.turn_duration_ms));
        let mut config = match self.templates.get(buff_id) {
            Some(template) => {
                let mut config = template.clone();
                config.duration = duration;
                config
            }
            None => BuffConfig::new(buff_id, duration),
        };

        let stacks = step.stacks.unwrap_or(1).max(1);
        if stacks > 1 {
            config = config.with_stacking(StackRule::Limited, stacks);
        } else if step.stacks.is_some() {
            config.max_stacks = 1;
        }
        for (key, value) in &step.parameters {
            config.parameters.insert(key.clone(), *value);
        }

        match step.kind {
            StepKind::Debuff => config.is_debuff = true,
            StepKind::Control if config.control == ControlType::None => {
                config = config.with_control(ControlType::Stun, 10).debuff();
            }
            StepKind::Shield => {
                if let Some(calc) = &step.calculation {
                    config.parameters.entry("baseShield".to_string()).or_insert(calc.base_value);
                }
            }
            _ => {}
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::{BuffBehavior, BuffContext, BuffRegistry, HookResult};
    use crate::config::BattleConfig;
    use crate::participant::{ParticipantInfo, Roster, Side};
    use crate::skill::{Calculation, SkillTarget};
    use crate::stats::{Attribute, ModifierKind};

    #[derive(Default)]
    struct Weaken;

    impl BuffBehavior for Weaken {
        fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
            ctx.add_modifier(Attribute::Atk, -5.0, ModifierKind::Additive);
            Ok(())
        }
    }

    fn state() -> CombatState {
        let mut registry = BuffRegistry::new();
        registry.register_behavior::<Weaken>("weaken", "test");
        registry.register_behavior::<Weaken>(SkillManager::CONTROL_BUFF, "test");
        let roster = Roster::from_infos(&[
            ParticipantInfo::new("mage", "Mage", Side::Ally, 100).with_stat(Attribute::MagicPower, 30.0),
            ParticipantInfo::new("orc", "Orc", Side::Enemy, 200).with_health(150),
        ]);
        let config = BattleConfig {
            damage: crate::config::DamageConfig {
                critical_enabled: false,
                ..Default::default()
            },
            ..BattleConfig::default()
        };
        let mut state = CombatState::new(roster, Arc::new(registry), &config, 11);
        state.damage = crate::combat::DamageCalculator::new(config.damage.clone());
        state
    }

    fn manager() -> SkillManager {
        let bolt = SkillConfig::new("bolt", "Bolt", SkillType::Small)
            .with_cooldown(2)
            .with_step(SkillStep::buff(StepKind::Debuff, "weaken", 2).with_priority(-1))
            .with_step(SkillStep::damage(Calculation::base(10.0).with_extra(Attribute::MagicPower, 1.0)).with_priority(5));
        let mend = SkillConfig::new("mend", "Mend", SkillType::Small)
            .with_target(SkillTarget::Ally)
            .with_step(SkillStep::heal(Calculation::base(500.0)));
        let slam = SkillConfig::new("slam", "Slam", SkillType::Ultimate)
            .with_step(SkillStep::damage(Calculation::base(9999.0)))
            .with_step(SkillStep::new(StepKind::Control));
        let aura = SkillConfig::new("aura", "Aura", SkillType::Passive)
            .with_step(SkillStep::buff(StepKind::Buff, "weaken", 1));
        let book = SkillBook::load([bolt, mend, slam, aura]).expect("valid skills");
        SkillManager::new(Arc::new(book))
    }

    #[test]
    fn steps_run_in_priority_order() {
        let mut state = state();
        let outcome = manager()
            .execute_skill(&mut state, "bolt", "mage", "orc")
            .expect("usable");
        assert_eq!(outcome.damage, 40);
        assert_eq!(outcome.effects[0].kind, crate::action::EffectKind::Damage);
        assert_eq!(outcome.effects[1].kind, crate::action::EffectKind::Debuff);
        assert!(state.buffs.has_buff("orc", "weaken"));
        let remaining = state.buffs.instances("orc").next().and_then(|i| i.state().remaining_ms());
        assert_eq!(remaining, Some(2000));
        assert_eq!(state.roster.get("mage").map(|m| m.cooldown("bolt")), Some(2));
    }

    #[test]
    fn usability_errors() {
        let mut state = state();
        let skills = manager();
        assert_eq!(
            skills.execute_skill(&mut state, "nope", "mage", "orc"),
            Err(SkillError::NotFound("nope".into()))
        );
        assert_eq!(
            skills.execute_skill(&mut state, "aura", "mage", "orc"),
            Err(SkillError::Passive("aura".into()))
        );
        skills.execute_skill(&mut state, "bolt", "mage", "orc").ok();
        assert!(matches!(
            skills.execute_skill(&mut state, "bolt", "mage", "orc"),
            Err(SkillError::OnCooldown { remaining: 2, .. })
        ));
        assert_eq!(
            skills.execute_skill(&mut state, "bolt", "ghost", "orc"),
            Err(SkillError::SourceNotFound("ghost".into()))
        );
    }

    #[test]
    fn dead_target_stops_execution() {
        let mut state = state();
        let outcome = manager()
            .execute_skill(&mut state, "slam", "mage", "orc")
            .expect("usable");
        assert!(outcome.target_died);
        assert_eq!(outcome.damage, 150);
        assert!(!state.buffs.has_buff("orc", SkillManager::CONTROL_BUFF));
    }

    #[test]
    fn heal_is_capped() {
        let mut state = state();
        let outcome = manager()
            .execute_skill(&mut state, "mend", "mage", "orc")
            .expect("usable");
        assert_eq!(outcome.heal, 50);
        assert!(state.roster.get("orc").is_some_and(|o| o.is_full_health()));
    }

    #[test]
    fn controlled_source_cannot_cast() {
        let mut state = state();
        let stun = BuffConfig::permanent(SkillManager::CONTROL_BUFF).with_control(ControlType::Stun, 10);
        state
            .buffs
            .add_buff(&mut state.roster, "mage", SkillManager::CONTROL_BUFF, stun)
            .expect("registered");
        assert_eq!(
            manager().execute_skill(&mut state, "bolt", "mage", "orc"),
            Err(SkillError::Controlled("mage".into()))
        );
    }
}
