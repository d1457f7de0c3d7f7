use battle_core::{Attribute, BuffBehavior, BuffContext, HookResult, ModifierKind};

/// `berserk`: large attack and crit bonus paid for with defense and a
/// per-second health drain that never kills.
#[derive(Clone, Copy, Debug, Default)]
pub struct Berserk;

impl BuffBehavior for Berserk {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let attack = ctx.param("attackBonus", 100.0);
        ctx.add_modifier(Attribute::Atk, attack, ModifierKind::Additive);
        ctx.add_modifier(Attribute::CritRate, 0.2, ModifierKind::Additive);
        ctx.add_modifier(Attribute::CritDmg, 0.5, ModifierKind::Additive);
        ctx.add_modifier(Attribute::Def, -0.3, ModifierKind::Multiplicative);
        ctx.set_var("attackBonus", attack);
        ctx.log("berserk");
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let seconds = ctx.intervals_crossed(delta_ms, 1000);
        if seconds == 0 {
            return Ok(());
        }
        let per_second = ctx.param("selfDamage", 5.0).max(0.0);
        let health = ctx.owner().health();
        let wanted = (per_second * seconds as f64) as u32;
        let drain = wanted.min(health.saturating_sub(1));
        if drain > 0 {
            ctx.damage_owner(drain);
        }
        Ok(())
    }

    /// Each refresh stacks another attack and crit-rate entry.
    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let attack = ctx.param("refreshAttackBonus", 20.0);
        let crit = ctx.param("refreshCritRateBonus", 0.05);
        ctx.add_modifier(Attribute::Atk, attack, ModifierKind::Additive);
        ctx.add_modifier(Attribute::CritRate, crit, ModifierKind::Additive);
        let total = ctx.var_or("attackBonus", 0.0) + attack;
        ctx.set_var("attackBonus", total);
        Ok(())
    }
}

/// `mountain_god`: flat attack, defense and crit bonus with regeneration.
#[derive(Clone, Copy, Debug, Default)]
pub struct MountainGod;

impl BuffBehavior for MountainGod {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let attack = ctx.param("attackBonus", 50.0);
        let defense = ctx.param("defenseBonus", 30.0);
        ctx.add_modifier(Attribute::Atk, attack, ModifierKind::Additive);
        ctx.add_modifier(Attribute::Def, defense, ModifierKind::Additive);
        ctx.add_modifier(Attribute::CritRate, 0.1, ModifierKind::Additive);
        ctx.set_var("initialAttackBonus", attack);
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let seconds = ctx.intervals_crossed(delta_ms, 1000);
        if seconds > 0 {
            let regen = ctx.param("regeneration", 5.0).max(0.0);
            ctx.heal_owner((regen * seconds as f64) as u32);
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param("refreshBonus", 10.0);
        ctx.add_modifier(Attribute::Atk, bonus, ModifierKind::Additive);
        Ok(())
    }
}
