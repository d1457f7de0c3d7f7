use tracing::{debug, warn};

use super::log::{self, CalculationKind, CalculationLog};
use crate::buff::BuffEngine;
use crate::config::HealConfig;
use crate::participant::Participant;
use crate::skill::{Calculation, SkillStep};

/// Healing resolution: base and extra values, target modifiers,
/// status mitigation, then a cap at the target's missing health.
/// Heals never crit.
#[derive(Debug, Default)]
pub struct HealCalculator {
    config: HealConfig,
    logs: Vec<CalculationLog>,
}

impl HealCalculator {
    pub fn new(config: HealConfig) -> Self {
        Self {
            config,
            logs: Vec::new(),
        }
    }

    pub fn config(&self) -> &HealConfig {
        &self.config
    }

    /// Healing for a HEAL step. Each reducing buff id present on the target
    /// in `buffs` counts once, however many stacks it has.
    pub fn calculate_heal(
        &mut self,
        step: &SkillStep,
        source: &Participant,
        target: &Participant,
        buffs: &BuffEngine,
    ) -> u32 {
        let Some(calculation) = &step.calculation else {
            warn!(target: "battle::heal", source = %source.id, "heal step has no calculation");
            return 0;
        };
        let statuses = buffs.count_buffs(target.id.as_str(), &self.config.reducing_buffs);
        self.calculate(calculation, source, target, statuses)
    }

    pub fn calculate(
        &mut self,
        calculation: &Calculation,
        source: &Participant,
        target: &Participant,
        reducing_statuses: usize,
    ) -> u32 {
        let mut entry =
            CalculationLog::new(CalculationKind::Heal, &source.id, &target.id, calculation.base_value);
        let mut result =
            log::base_with_extras(calculation.base_value, &calculation.extra_values, source, &mut entry);
        result = log::apply_target_modifiers(result, &calculation.target_modifiers, target, &mut entry);

        let reduction = self.reduction(reducing_statuses);
        if reduction > 0.0 {
            result *= 1.0 - reduction;
            entry.modifiers.insert("heal_reduction".to_string(), 1.0 - reduction);
        }

        let raw = if result.is_finite() { result.floor().max(0.0) } else { 0.0 };
        let amount = (raw as u32).min(target.missing_health());
        entry.final_value = amount;
        debug!(
            target: "battle::heal",
            source = %source.id,
            recipient = %target.id,
            amount,
            reducing_statuses,
            "heal calculated"
        );
        self.logs.push(entry);
        amount
    }

    /// Cumulative reduction for `statuses` matching statuses.
    pub fn reduction(&self, statuses: usize) -> f64 {
        (statuses as f64 * self.config.reduction_per_status).clamp(0.0, self.config.max_reduction.max(0.0))
    }

    /// Heals `target`. No-op on a dead or full-health target.
    pub fn apply_heal(&self, target: &mut Participant, amount: u32) -> u32 {
        if !target.is_alive() || target.is_full_health() {
            return 0;
        }
        target.heal(amount)
    }

    pub fn calculation_logs(&self) -> &[CalculationLog] {
        &self.logs
    }

    pub fn clear_calculation_logs(&mut self) {
        self.logs.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::buff::{BuffBehavior, BuffConfig, BuffContext, BuffDuration, BuffRegistry, HookResult, StackRule};
    use crate::participant::{ParticipantInfo, Roster, Side};
    use crate::stats::Attribute;

    #[derive(Default)]
    struct Inert;

    impl BuffBehavior for Inert {
        fn on_apply(&self, _ctx: &mut BuffContext<'_>) -> HookResult {
            Ok(())
        }
    }

    fn healer() -> Participant {
        Participant::from_info(
            &ParticipantInfo::new("cleric", "Cleric", Side::Ally, 100).with_stat(Attribute::Wisdom, 40.0),
        )
    }

    #[test]
    fn capped_at_missing_health() {
        let source = healer();
        let target = Participant::from_info(&ParticipantInfo::new("t", "T", Side::Ally, 100).with_health(95));
        let mut calc = HealCalculator::default();
        let amount = calc.calculate(&Calculation::base(50.0).with_extra(Attribute::Wisdom, 1.0), &source, &target, 0);
        assert_eq!(amount, 5);
        assert_eq!(calc.calculation_logs()[0].final_value, 5);
    }

    #[test]
    fn reduction_is_cumulative_and_capped() {
        let calc = HealCalculator::default();
        assert_eq!(calc.reduction(0), 0.0);
        assert!((calc.reduction(2) - 0.4).abs() < 1e-9);
        assert!((calc.reduction(10) - 0.8).abs() < 1e-9);

        let source = healer();
        let target = Participant::from_info(&ParticipantInfo::new("t", "T", Side::Ally, 1000).with_health(1));
        let mut calc = HealCalculator::default();
        assert_eq!(calc.calculate(&Calculation::base(100.0), &source, &target, 1), 80);
        let capped = calc.calculate(&Calculation::base(100.0), &source, &target, 5);
        assert!((19..=20).contains(&capped));
    }

    #[test]
    fn apply_heal_skips_dead_and_full() {
        let calc = HealCalculator::default();
        let mut full = healer();
        assert_eq!(calc.apply_heal(&mut full, 10), 0);

        let mut dead = Participant::from_info(&ParticipantInfo::new("d", "D", Side::Ally, 100).with_health(0));
        assert_eq!(calc.apply_heal(&mut dead, 10), 0);
        assert_eq!(dead.health(), 0);

        let mut hurt = Participant::from_info(&ParticipantInfo::new("h", "H", Side::Ally, 100).with_health(60));
        assert_eq!(calc.apply_heal(&mut hurt, 70), 40);
    }

    #[test]
    fn stacked_reducing_buff_counts_once() {
        let mut registry = BuffRegistry::new();
        registry.register_behavior::<Inert>("buff_heal_reduction", "test");
        registry.register_behavior::<Inert>("poison", "test");
        let mut buffs = BuffEngine::new(Arc::new(registry));
        let mut roster = Roster::from_infos(&[
            ParticipantInfo::new("t", "T", Side::Ally, 1000).with_health(1),
        ]);
        let wound = BuffConfig::new("buff_heal_reduction", BuffDuration::Timed(3000))
            .with_stacking(StackRule::Independent, 1);
        for _ in 0..3 {
            buffs
                .add_buff(&mut roster, "t", "buff_heal_reduction", wound.clone())
                .expect("stack applied");
        }
        assert_eq!(buffs.active_count("t"), 3);

        let source = healer();
        let step = SkillStep::heal(Calculation::base(100.0));
        let target = roster.get("t").expect("target present").clone();
        let mut calc = HealCalculator::default();
        // one reducing id: 20%
        assert_eq!(calc.calculate_heal(&step, &source, &target, &buffs), 80);

        buffs
            .add_buff(&mut roster, "t", "poison", BuffConfig::new("poison", BuffDuration::Timed(3000)))
            .expect("poison applied");
        assert_eq!(calc.calculate_heal(&step, &source, &target, &buffs), 60);
    }
}
