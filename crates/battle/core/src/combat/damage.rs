//! Damage resolution.
//!
//! Order is fixed: base and extra values, defense, target modifiers,
//! critical roll, pluggable modifiers by descending priority, then clamping.

use std::sync::Arc;

use tracing::{debug, warn};

use super::log::{self, CalculationKind, CalculationLog};
use crate::config::DamageConfig;
use crate::participant::Participant;
use crate::rng::BattleRng;
use crate::skill::{AttackType, Calculation, SkillStep};
use crate::stats::Attribute;

/// Result of one damage calculation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    pub amount: u32,
    pub critical: bool,
    pub miss: bool,
}

/// Pluggable post-critical damage transform.
pub trait DamageModifier: Send + Sync {
    fn name(&self) -> &str;

    /// Higher runs first.
    fn priority(&self) -> i32;

    fn apply(
        &self,
        damage: f64,
        source: &Participant,
        target: &Participant,
        rng: &mut BattleRng,
    ) -> f64;
}

/// `×(1 + (source.ELEMENT − target.ELEMENT) × 0.1)`
#[derive(Debug, Default)]
pub struct ElementalAdvantage;

impl DamageModifier for ElementalAdvantage {
    fn name(&self) -> &str {
        "elemental_advantage"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn apply(&self, damage: f64, source: &Participant, target: &Participant, _: &mut BattleRng) -> f64 {
        let diff = source.attribute(Attribute::Element) - target.attribute(Attribute::Element);
        damage * (1.0 + diff * 0.1)
    }
}

/// `×(1 + (source.level − target.level) × 0.02)`
#[derive(Debug, Default)]
pub struct LevelDifference;

impl DamageModifier for LevelDifference {
    fn name(&self) -> &str {
        "level_difference"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn apply(&self, damage: f64, source: &Participant, target: &Participant, _: &mut BattleRng) -> f64 {
        let diff = source.level as f64 - target.level as f64;
        damage * (1.0 + diff * 0.02)
    }
}

/// Uniform `×[0.9, 1.1)`.
#[derive(Debug, Default)]
pub struct RandomVariance;

impl DamageModifier for RandomVariance {
    fn name(&self) -> &str {
        "random_variance"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn apply(&self, damage: f64, _: &Participant, _: &Participant, rng: &mut BattleRng) -> f64 {
        damage * rng.range_f64(0.9, 1.1)
    }
}

pub struct DamageCalculator {
    config: DamageConfig,
    modifiers: Vec<Arc<dyn DamageModifier>>,
    logs: Vec<CalculationLog>,
}

impl DamageCalculator {
    pub fn new(config: DamageConfig) -> Self {
        Self {
            config,
            modifiers: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// Installs elemental advantage, level difference and random variance.
    pub fn with_builtin_modifiers(mut self) -> Self {
        self.add_modifier(Arc::new(ElementalAdvantage));
        self.add_modifier(Arc::new(LevelDifference));
        self.add_modifier(Arc::new(RandomVariance));
        self
    }

    pub fn config(&self) -> &DamageConfig {
        &self.config
    }

    /// Inserts `modifier` keeping descending priority; equal priorities keep
    /// insertion order.
    pub fn add_modifier(&mut self, modifier: Arc<dyn DamageModifier>) {
        let position = self
            .modifiers
            .iter()
            .position(|m| m.priority() < modifier.priority())
            .unwrap_or(self.modifiers.len());
        self.modifiers.insert(position, modifier);
    }

    pub fn remove_modifier(&mut self, name: &str) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.name() != name);
        self.modifiers.len() != before
    }

    pub fn modifier_names(&self) -> Vec<&str> {
        self.modifiers.iter().map(|m| m.name()).collect()
    }

    /// Damage for a DAMAGE step. A step without a calculation yields zero.
    pub fn calculate_damage(
        &mut self,
        step: &SkillStep,
        source: &Participant,
        target: &Participant,
        rng: &mut BattleRng,
    ) -> DamageOutcome {
        match &step.calculation {
            Some(calculation) => self.calculate(calculation, source, target, rng),
            None => {
                warn!(
                    target: "battle::damage",
                    source = %source.id,
                    defender = %target.id,
                    "damage step has no calculation"
                );
                DamageOutcome::default()
            }
        }
    }

    pub fn calculate(
        &mut self,
        calculation: &Calculation,
        source: &Participant,
        target: &Participant,
        rng: &mut BattleRng,
    ) -> DamageOutcome {
        if self.config.dodge_enabled && rng.chance(target.attribute(Attribute::DodgeRate)) {
            let entry = CalculationLog::new(
                CalculationKind::Miss,
                &source.id,
                &target.id,
                calculation.base_value,
            );
            debug!(target: "battle::damage", source = %source.id, defender = %target.id, "attack dodged");
            self.logs.push(entry);
            return DamageOutcome {
                miss: true,
                ..DamageOutcome::default()
            };
        }

        let mut entry = CalculationLog::new(
            CalculationKind::Damage,
            &source.id,
            &target.id,
            calculation.base_value,
        );
        let mut result =
            log::base_with_extras(calculation.base_value, &calculation.extra_values, source, &mut entry);

        if self.config.defense_enabled
            && let Some(attack_type) = calculation.attack_type
        {
            let factor = 1.0 - defense_effect(attack_type, target);
            result *= factor;
            entry.modifiers.insert("defense".to_string(), factor);
        }

        result = log::apply_target_modifiers(result, &calculation.target_modifiers, target, &mut entry);

        if self.config.critical_enabled {
            let (rate, multiplier) = calculation
                .critical
                .as_ref()
                .map(|c| (c.rate, c.multiplier))
                .unwrap_or((
                    self.config.default_critical_rate,
                    self.config.default_critical_multiplier,
                ));
            if rng.chance(rate) {
                result *= multiplier;
                entry.critical = true;
                entry.modifiers.insert("critical".to_string(), multiplier);
            }
        }

        for modifier in &self.modifiers {
            let before = result;
            result = modifier.apply(result, source, target, rng);
            let ratio = if before != 0.0 { result / before } else { 1.0 };
            entry.modifiers.insert(modifier.name().to_string(), ratio);
        }

        let amount = self.clamp(result);
        entry.final_value = amount;
        debug!(
            target: "battle::damage",
            source = %source.id,
            defender = %target.id,
            amount,
            critical = entry.critical,
            "damage calculated"
        );
        let critical = entry.critical;
        self.logs.push(entry);
        DamageOutcome {
            amount,
            critical,
            miss: false,
        }
    }

    /// Applies `amount` to `target`. Returns the health actually lost.
    pub fn apply_damage(&self, target: &mut Participant, amount: u32) -> u32 {
        target.take_damage(amount)
    }

    pub fn calculation_logs(&self) -> &[CalculationLog] {
        &self.logs
    }

    pub fn clear_calculation_logs(&mut self) {
        self.logs.clear();
    }

    fn clamp(&self, value: f64) -> u32 {
        if !value.is_finite() {
            return self.config.min_damage.max(0.0) as u32;
        }
        let clamped = value.max(self.config.min_damage).min(self.config.max_damage);
        clamped.floor().max(0.0) as u32
    }
}

impl Default for DamageCalculator {
    fn default() -> Self {
        Self::new(DamageConfig::default())
    }
}

impl std::fmt::Debug for DamageCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DamageCalculator")
            .field("config", &self.config)
            .field("modifiers", &self.modifier_names())
            .field("logs", &self.logs.len())
            .finish()
    }
}

/// Fraction of damage removed by the target's defenses.
pub fn defense_effect(attack_type: AttackType, target: &Participant) -> f64 {
    match attack_type {
        AttackType::True => 0.0,
        AttackType::Physical => target.attribute(Attribute::Def) * 0.01,
        AttackType::Magic => target.attribute(Attribute::Mdef) * 0.01,
        AttackType::Normal => {
            (target.attribute(Attribute::Def) + target.attribute(Attribute::Mdef)) * 0.005
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{ParticipantInfo, Side};

    fn pair() -> (Participant, Participant) {
        let source = Participant::from_info(
            &ParticipantInfo::new("a", "A", Side::Ally, 100).with_stat(Attribute::Atk, 50.0),
        );
        let target = Participant::from_info(
            &ParticipantInfo::new("b", "B", Side::Enemy, 100)
                .with_stat(Attribute::Def, 20.0)
                .with_stat(Attribute::Mdef, 10.0),
        );
        (source, target)
    }

    fn no_crit() -> DamageConfig {
        DamageConfig {
            critical_enabled: false,
            ..DamageConfig::default()
        }
    }

    #[test]
    fn pipeline_order_and_log() {
        let (source, target) = pair();
        let mut calc = DamageCalculator::new(no_crit());
        let mut rng = BattleRng::new(1);
        let step = SkillStep::damage(
            Calculation::base(10.0)
                .with_extra(Attribute::Atk, 1.0)
                .with_attack_type(AttackType::Physical)
                .with_target_modifier(Attribute::Def, 1.0),
        );
        // (10 + 50) × 0.8 × 1.2 = 57.6
        let outcome = calc.calculate_damage(&step, &source, &target, &mut rng);
        assert_eq!(outcome.amount, 57);
        assert!(!outcome.critical);

        let entry = &calc.calculation_logs()[0];
        assert_eq!(entry.base_value, 10.0);
        assert_eq!(entry.extra_values[0].value, 50.0);
        assert!(entry.modifiers.get("defense").is_some_and(|f| (f - 0.8).abs() < 1e-9));
        assert_eq!(entry.final_value, 57);
        calc.clear_calculation_logs();
        assert!(calc.calculation_logs().is_empty());
    }

    #[test]
    fn defense_channels() {
        let (_, target) = pair();
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert_eq!(defense_effect(AttackType::True, &target), 0.0);
        assert!(close(defense_effect(AttackType::Physical, &target), 0.2));
        assert!(close(defense_effect(AttackType::Magic, &target), 0.1));
        assert!(close(defense_effect(AttackType::Normal, &target), 0.15));
    }

    #[test]
    fn guaranteed_critical() {
        let (source, target) = pair();
        let mut calc = DamageCalculator::default();
        let mut rng = BattleRng::new(7);
        let outcome = calc.calculate(&Calculation::base(100.0).with_critical(1.0, 2.0), &source, &target, &mut rng);
        assert!(outcome.critical);
        assert_eq!(outcome.amount, 200);
    }

    #[test]
    fn clamped_and_never_negative() {
        let (source, mut target) = pair();
        let mut calc = DamageCalculator::new(no_crit());
        let mut rng = BattleRng::new(3);
        // defense above 100 would make the raw value negative
        target
            .modifiers_mut()
            .add("wall", Attribute::Def, 500.0, crate::stats::ModifierKind::Additive);
        let low = calc.calculate(
            &Calculation::base(100.0).with_attack_type(AttackType::Physical),
            &source,
            &target,
            &mut rng,
        );
        assert_eq!(low.amount, 1);

        let high = calc.calculate(&Calculation::base(1e9), &source, &target, &mut rng);
        assert_eq!(high.amount, 9999);

        let empty = calc.calculate_damage(&SkillStep::new(crate::skill::StepKind::Damage), &source, &target, &mut rng);
        assert_eq!(empty.amount, 0);
    }

    #[test]
    fn apply_damage_on_dead_target_is_noop() {
        let (_, mut target) = pair();
        let calc = DamageCalculator::default();
        assert_eq!(calc.apply_damage(&mut target, 150), 100);
        assert_eq!(calc.apply_damage(&mut target, 10), 0);
        assert_eq!(target.health(), 0);
    }

    #[test]
    fn modifiers_run_by_priority() {
        let (source, target) = pair();
        let mut calc = DamageCalculator::new(no_crit()).with_builtin_modifiers();
        assert_eq!(
            calc.modifier_names(),
            vec!["elemental_advantage", "level_difference", "random_variance"]
        );
        assert!(calc.remove_modifier("random_variance"));
        assert!(!calc.remove_modifier("random_variance"));

        let mut rng = BattleRng::new(9);
        let outcome = calc.calculate(&Calculation::base(100.0), &source, &target, &mut rng);
        assert_eq!(outcome.amount, 100);
        assert_eq!(calc.calculation_logs()[0].modifiers.len(), 2);
    }

    #[test]
    fn dodge_yields_miss() {
        let (source, target) = pair();
        let target = {
            let mut t = target;
            t.modifiers_mut()
                .add("evasion", Attribute::DodgeRate, 1.0, crate::stats::ModifierKind::Additive);
            t
        };
        let mut calc = DamageCalculator::new(DamageConfig {
            dodge_enabled: true,
            ..no_crit()
        });
        let mut rng = BattleRng::new(5);
        let outcome = calc.calculate(&Calculation::base(100.0), &source, &target, &mut rng);
        assert!(outcome.miss);
        assert_eq!(outcome.amount, 0);
        assert_eq!(calc.calculation_logs()[0].kind, CalculationKind::Miss);
    }
}
