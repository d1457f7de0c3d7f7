//! Built-in buff behaviors and the registry that wires them to buff ids.
mod attribute;
mod berserk;
mod nature;
mod poison;
mod support;

use std::sync::Arc;

use battle_core::{BehaviorFactory, BuffBehavior, BuffContext, BuffRegistry, HookResult};

pub use attribute::{AttributeBoost, ScaledModifier};
pub use berserk::{Berserk, MountainGod};
pub use nature::{MountainChild, StoneSkin};
pub use poison::{Poison, StrongPoison};
pub use support::{HealOverTime, Shield};

/// Origin recorded in [`battle_core::ScriptMetadata`] for everything below.
pub const BUILTIN_ORIGIN: &str = "builtin";

/// Behavior with no effect of its own.
///
/// Used for statuses that other systems only count, such as the heal
/// reduction markers read by the heal calculator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Marker;

impl BuffBehavior for Marker {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        ctx.log("marker applied");
        Ok(())
    }
}

fn shared<B>(make: fn() -> B) -> BehaviorFactory
where
    B: BuffBehavior + 'static,
{
    Arc::new(move || -> Box<dyn BuffBehavior> { Box::new(make()) })
}

/// `(buff id, factory)` for every built-in behavior.
pub fn builtin_behaviors() -> Vec<(&'static str, BehaviorFactory)> {
    vec![
        ("buff_atk_up", shared(AttributeBoost::attack_up)),
        ("buff_def_up", shared(AttributeBoost::defense_up)),
        ("buff_speed_up", shared(AttributeBoost::speed_up)),
        ("buff_dodge_up", shared(ScaledModifier::dodge_up)),
        ("buff_crit_damage_reduction", shared(ScaledModifier::crit_damage_reduction)),
        ("buff_hit_reduction", shared(ScaledModifier::hit_reduction)),
        ("buff_speed_reduction", shared(ScaledModifier::speed_reduction)),
        ("buff_stun", shared(ScaledModifier::stun)),
        ("berserk", shared(Berserk::default)),
        ("mountain_god", shared(MountainGod::default)),
        ("buff_mountain_child", shared(MountainChild::default)),
        ("buff_stone_skin", shared(StoneSkin::default)),
        ("poison", shared(Poison::default)),
        ("buff_strong_poison", shared(StrongPoison::default)),
        ("heal_over_time", shared(HealOverTime::default)),
        ("shield", shared(Shield::default)),
        ("buff_heal_reduction", shared(Marker::default)),
        ("buff_curse", shared(Marker::default)),
    ]
}

/// Registry holding every built-in behavior.
pub fn default_registry() -> BuffRegistry {
    let mut registry = BuffRegistry::new();
    for (id, factory) in builtin_behaviors() {
        registry.register_with(id, factory, BUILTIN_ORIGIN, None);
    }
    registry
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use battle_core::{
        Attribute, BuffConfig, BuffDuration, BuffEngine, BuffEventKind, ParticipantInfo, Roster,
        Side,
    };

    use super::*;

    fn setup(max_health: u32) -> (BuffEngine, Roster) {
        let engine = BuffEngine::new(Arc::new(default_registry()));
        let roster = Roster::from_infos(&[ParticipantInfo::new("hero", "Hero", Side::Ally, max_health)
            .with_stat(Attribute::Atk, 100.0)
            .with_stat(Attribute::Def, 50.0)
            .with_stat(Attribute::Spd, 100.0)]);
        (engine, roster)
    }

    fn timed(id: &str, ms: u64) -> BuffConfig {
        BuffConfig::new(id, BuffDuration::millis(ms))
    }

    fn attr(roster: &Roster, attribute: Attribute) -> f64 {
        roster.get("hero").map(|p| p.attribute(attribute)).unwrap_or_default()
    }

    #[test]
    fn registry_covers_every_builtin() {
        let registry = default_registry();
        assert_eq!(registry.len(), builtin_behaviors().len());
        for id in ["poison", "shield", "buff_stun", "mountain_god"] {
            assert!(registry.has(id), "{id} missing");
            assert_eq!(registry.metadata(id).map(|m| m.origin.as_str()), Some(BUILTIN_ORIGIN));
        }
    }

    #[test]
    fn attack_up_adds_and_removes_flat_bonus() {
        let (mut engine, mut roster) = setup(100);
        let id = engine
            .add_buff(&mut roster, "hero", "buff_atk_up", timed("buff_atk_up", 3000))
            .expect("registered");
        assert_eq!(attr(&roster, Attribute::Atk), 110.0);
        engine.remove_buff(&mut roster, &id);
        assert_eq!(attr(&roster, Attribute::Atk), 100.0);
    }

    #[test]
    fn defense_up_growth_ignores_tick_size() {
        let (mut coarse, mut coarse_roster) = setup(100);
        let (mut fine, mut fine_roster) = setup(100);
        for (engine, roster) in [(&mut coarse, &mut coarse_roster), (&mut fine, &mut fine_roster)] {
            engine
                .add_buff(roster, "hero", "buff_def_up", BuffConfig::permanent("buff_def_up"))
                .expect("registered");
        }
        coarse.update(&mut coarse_roster, 5000);
        for _ in 0..50 {
            fine.update(&mut fine_roster, 100);
        }
        assert_eq!(
            attr(&coarse_roster, Attribute::Def),
            attr(&fine_roster, Attribute::Def)
        );
    }

    #[test]
    fn stun_sets_flag_and_lowers_defense() {
        let (mut engine, mut roster) = setup(100);
        let id = engine
            .add_buff(&mut roster, "hero", "buff_stun", timed("buff_stun", 2000))
            .expect("registered");
        let instance = engine.instance(&id).expect("active");
        assert_eq!(instance.state().variable("stunned"), Some(1.0));
        assert!((attr(&roster, Attribute::Def) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn poison_damage_grows_per_tick() {
        let (mut engine, mut roster) = setup(1000);
        engine
            .add_buff(&mut roster, "hero", "poison", timed("poison", 10_000))
            .expect("registered");
        engine.update(&mut roster, 2000);
        // floor(10 * 1.2)
        assert_eq!(roster.get("hero").map(|p| p.health()), Some(988));
        engine.update(&mut roster, 2000);
        // floor(10 * 1.2^2)
        assert_eq!(roster.get("hero").map(|p| p.health()), Some(974));
        let damage_events = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e.kind, BuffEventKind::PeriodicDamage(_)))
            .count();
        assert_eq!(damage_events, 2);
    }

    #[test]
    fn berserk_drain_never_kills() {
        let (mut engine, mut roster) = setup(100);
        if let Some(hero) = roster.get_mut("hero") {
            hero.set_health(3);
        }
        engine
            .add_buff(&mut roster, "hero", "berserk", BuffConfig::permanent("berserk"))
            .expect("registered");
        engine.update(&mut roster, 10_000);
        assert_eq!(roster.get("hero").map(|p| p.health()), Some(1));
        assert_eq!(attr(&roster, Attribute::Atk), 200.0);
    }

    #[test]
    fn shield_scales_with_max_health_and_clears_on_remove() {
        let (mut engine, mut roster) = setup(200);
        let id = engine
            .add_buff(&mut roster, "hero", "shield", timed("shield", 5000))
            .expect("registered");
        assert_eq!(roster.get("hero").map(|p| p.shield()), Some(120));
        engine.remove_buff(&mut roster, &id);
        assert_eq!(roster.get("hero").map(|p| p.shield()), Some(0));
    }

    #[test]
    fn heal_over_time_heals_each_interval() {
        let (mut engine, mut roster) = setup(100);
        if let Some(hero) = roster.get_mut("hero") {
            hero.set_health(10);
        }
        engine
            .add_buff(
                &mut roster,
                "hero",
                "heal_over_time",
                timed("heal_over_time", 5000),
            )
            .expect("registered");
        engine.update(&mut roster, 2500);
        assert_eq!(roster.get("hero").map(|p| p.health()), Some(50));
    }

    #[test]
    fn stone_skin_refresh_is_capped() {
        let (mut engine, mut roster) = setup(100);
        let config = BuffConfig::permanent("buff_stone_skin");
        for _ in 0..10 {
            engine
                .add_buff(&mut roster, "hero", "buff_stone_skin", config.clone())
                .expect("registered");
        }
        assert_eq!(engine.active_count("hero"), 1);
        let reduction = roster
            .get("hero")
            .map(|p| {
                p.modifiers()
                    .modifiers(Attribute::PhysicalDamageReduction)
                    .iter()
                    .map(|m| m.value)
                    .sum::<f64>()
            })
            .unwrap_or_default();
        assert!((reduction - 0.8).abs() < 1e-9);
    }
}
