use battle_core::{Attribute, BuffBehavior, BuffContext, HookResult, ModifierKind};

/// `buff_mountain_child`: nature power bonus that slowly strengthens, plus
/// regeneration.
#[derive(Clone, Copy, Debug, Default)]
pub struct MountainChild;

impl MountainChild {
    const GROWTH_CAP: f64 = 0.3;
    const REFRESH_CAP: f64 = 0.4;

    fn set_bonus(ctx: &mut BuffContext<'_>, bonus: f64) {
        ctx.replace_modifier(Attribute::NaturePower, bonus, ModifierKind::Multiplicative);
        ctx.set_var("natureBonus", bonus);
    }
}

impl BuffBehavior for MountainChild {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param("natureBonus", 0.15);
        Self::set_bonus(ctx, bonus);
        let regen = ctx.param("hpRegen", 5.0);
        ctx.set_var("hpRegen", regen);
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let seconds = ctx.intervals_crossed(delta_ms, 1000);
        if seconds == 0 {
            return Ok(());
        }
        let regen = ctx.var_or("hpRegen", 5.0).max(0.0);
        ctx.heal_owner((regen * seconds as f64) as u32);

        let rate = ctx.param("enhancementRate", 0.001);
        let current = ctx.var_or("natureBonus", 0.15);
        let next = (current + rate * seconds as f64).min(Self::GROWTH_CAP);
        if next > current {
            Self::set_bonus(ctx, next);
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param("refreshBonus", 0.05);
        let next = (ctx.var_or("natureBonus", 0.15) + bonus).min(Self::REFRESH_CAP);
        Self::set_bonus(ctx, next);
        let regen = ctx.var_or("hpRegen", 5.0) + 2.0;
        ctx.set_var("hpRegen", regen);
        Ok(())
    }
}

/// `buff_stone_skin`: physical damage reduction traded for speed. Both
/// sides grow over time.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoneSkin;

impl StoneSkin {
    fn set(ctx: &mut BuffContext<'_>, reduction: f64, penalty: f64) {
        ctx.replace_modifier(
            Attribute::PhysicalDamageReduction,
            reduction,
            ModifierKind::Multiplicative,
        );
        ctx.replace_modifier(Attribute::Spd, -penalty, ModifierKind::Multiplicative);
        ctx.set_var("physicalReduction", reduction);
        ctx.set_var("speedPenalty", penalty);
    }

    fn current(ctx: &BuffContext<'_>) -> (f64, f64) {
        (
            ctx.var_or("physicalReduction", 0.3),
            ctx.var_or("speedPenalty", 0.15),
        )
    }
}

impl BuffBehavior for StoneSkin {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let reduction = ctx.param("physicalReduction", 0.3);
        let penalty = ctx.param("speedPenalty", 0.15);
        Self::set(ctx, reduction, penalty);
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let seconds = ctx.intervals_crossed(delta_ms, 1000) as f64;
        if seconds == 0.0 {
            return Ok(());
        }
        let rate = ctx.param("enhancementRate", 0.005);
        let (reduction, penalty) = Self::current(ctx);
        let next_reduction = (reduction + rate * seconds).min(0.6);
        let next_penalty = (penalty + rate * 0.5 * seconds).min(0.3);
        if next_reduction > reduction {
            Self::set(ctx, next_reduction, next_penalty);
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param("refreshBonus", 0.1);
        let (reduction, penalty) = Self::current(ctx);
        Self::set(ctx, (reduction + bonus).min(0.8), (penalty + 0.03).min(0.4));
        Ok(())
    }
}
