//! Damage-over-time behaviors.
//!
//! The `k`-th crossed interval (counting from 1) deals
//! `floor(base * multiplier^k)`, so `k` equals `floor(elapsed / interval)`.

use battle_core::{Attribute, BuffBehavior, BuffContext, HookResult, ModifierKind};

const TICKS_VAR: &str = "ticks";
const BASE_VAR: &str = "baseDamage";

fn tick_damage(ctx: &mut BuffContext<'_>, delta_ms: u64, interval: f64, multiplier: f64) -> u32 {
    let interval = interval.max(1.0) as u64;
    let crossed = ctx.intervals_crossed(delta_ms, interval);
    if crossed == 0 {
        return 0;
    }
    let base = ctx.var_or(BASE_VAR, 0.0);
    let mut ticks = ctx.var_or(TICKS_VAR, 0.0) as i32;
    let mut total = 0;
    for _ in 0..crossed {
        if !ctx.owner().is_alive() {
            break;
        }
        ticks += 1;
        let amount = (base * multiplier.powi(ticks)).floor().max(0.0) as u32;
        total += ctx.damage_owner(amount);
    }
    ctx.set_var(TICKS_VAR, f64::from(ticks));
    total
}

/// `poison`: slows the owner and deals growing damage every two seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Poison;

impl BuffBehavior for Poison {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let slow = ctx.param("speedReduction", 0.2);
        ctx.add_modifier(Attribute::Spd, -slow, ModifierKind::Multiplicative);
        let base = ctx.param(BASE_VAR, 10.0);
        ctx.set_var(BASE_VAR, base);
        ctx.set_var(TICKS_VAR, 0.0);
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let interval = ctx.param("damageInterval", 2000.0);
        let multiplier = ctx.param("damageMultiplier", 1.2);
        let dealt = tick_damage(ctx, delta_ms, interval, multiplier);
        if dealt > 0 {
            ctx.log(&format!("poison dealt {dealt}"));
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param("refreshBonus", 5.0);
        let base = ctx.var_or(BASE_VAR, 10.0) + bonus;
        ctx.set_var(BASE_VAR, base);
        Ok(())
    }
}

/// `buff_strong_poison`: slows and weakens the owner, with faster and
/// steeper damage than [`Poison`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StrongPoison;

impl StrongPoison {
    fn set_reductions(ctx: &mut BuffContext<'_>, speed: f64, attack: f64) {
        ctx.replace_modifier(Attribute::Spd, -speed, ModifierKind::Multiplicative);
        ctx.replace_modifier(Attribute::Atk, -attack, ModifierKind::Multiplicative);
        ctx.set_var("speedReduction", speed);
        ctx.set_var("attackReduction", attack);
    }
}

impl BuffBehavior for StrongPoison {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let speed = ctx.param("speedReduction", 0.2);
        let attack = ctx.param("attackReduction", 0.15);
        Self::set_reductions(ctx, speed, attack);
        let base = ctx.param(BASE_VAR, 15.0);
        ctx.set_var(BASE_VAR, base);
        ctx.set_var(TICKS_VAR, 0.0);
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let interval = ctx.param("damageInterval", 1500.0);
        let multiplier = ctx.param("damageMultiplier", 1.3);
        tick_damage(ctx, delta_ms, interval, multiplier);
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let speed = (ctx.var_or("speedReduction", 0.2) + 0.05).min(0.4);
        let attack = (ctx.var_or("attackReduction", 0.15) + 0.05).min(0.3);
        Self::set_reductions(ctx, speed, attack);
        let base = ctx.var_or(BASE_VAR, 15.0) + 3.0;
        ctx.set_var(BASE_VAR, base);
        Ok(())
    }
}
