use battle_core::{Attribute, BuffBehavior, BuffContext, HookResult};

/// `heal_over_time`: heals the owner once per interval.
#[derive(Clone, Copy, Debug, Default)]
pub struct HealOverTime;

impl BuffBehavior for HealOverTime {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let base = ctx.param("baseHealing", 20.0);
        ctx.set_var("baseHealing", base);
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let interval = ctx.param("healInterval", 1000.0).max(1.0) as u64;
        let crossed = ctx.intervals_crossed(delta_ms, interval);
        if crossed == 0 {
            return Ok(());
        }
        let per_tick = ctx.var_or("baseHealing", 20.0) + ctx.param("healingBonus", 0.0);
        let amount = (per_tick.max(0.0) * crossed as f64).floor() as u32;
        let healed = ctx.heal_owner(amount);
        if healed > 0 {
            ctx.log(&format!("healed {healed}"));
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let base = ctx.var_or("baseHealing", 20.0) + ctx.param("refreshBonus", 5.0);
        ctx.set_var("baseHealing", base);
        Ok(())
    }
}

/// `shield`: absorbs incoming damage and regenerates up to its cap.
///
/// The initial value scales with the owner's max health. Removal drops the
/// shield to zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct Shield;

impl Shield {
    fn set(ctx: &mut BuffContext<'_>, value: f64) {
        ctx.set_var("shieldValue", value);
        ctx.set_owner_shield(value.max(0.0) as u32);
    }
}

impl BuffBehavior for Shield {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let base = ctx.param("baseShield", 100.0);
        let scale = ctx.param("shieldScale", 1.0);
        let max_health = ctx.owner().attribute(Attribute::MaxHp);
        let value = (base * scale + max_health * 0.1).floor();
        ctx.set_var("maxShield", value);
        Self::set(ctx, value);
        ctx.log(&format!("shield {value}"));
        Ok(())
    }

    fn on_remove(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        Self::set(ctx, 0.0);
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let seconds = ctx.intervals_crossed(delta_ms, 1000);
        let regen = ctx.param("shieldRegen", 0.0);
        if seconds == 0 || regen <= 0.0 {
            return Ok(());
        }
        let max = ctx.var_or("maxShield", 0.0);
        // Damage is absorbed outside the behavior; start from the live value.
        let current = f64::from(ctx.owner().shield());
        let next = (current + regen * seconds as f64).min(max);
        if next > current {
            Self::set(ctx, next);
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param("refreshBonus", 20.0);
        let max = ctx.var_or("maxShield", 0.0) + bonus;
        ctx.set_var("maxShield", max);
        let current = f64::from(ctx.owner().shield()) + bonus;
        Self::set(ctx, current.min(max));
        Ok(())
    }
}
