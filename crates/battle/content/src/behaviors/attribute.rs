//! Single-attribute behaviors built from two shared shapes.
//!
//! - [`AttributeBoost`]: a bonus that can grow every second and is raised on
//!   refresh (`buff_atk_up`, `buff_def_up`, `buff_speed_up`).
//! - [`ScaledModifier`]: a multiplicative bonus or penalty that drifts toward
//!   zero every second and is deepened on refresh, up to a cap
//!   (`buff_dodge_up`, `buff_crit_damage_reduction`, `buff_hit_reduction`,
//!   `buff_speed_reduction`, `buff_stun`).

use battle_core::{Attribute, BuffBehavior, BuffContext, HookResult, ModifierKind};

const BONUS_VAR: &str = "bonus";
const STUNNED_FLAG: &str = "stunned";

/// Flat or multiplicative stat bonus with optional per-second growth.
#[derive(Clone, Debug)]
pub struct AttributeBoost {
    pub attribute: Attribute,
    pub kind: ModifierKind,
    /// Parameter key and default for the starting bonus.
    pub base: (&'static str, f64),
    pub growth_rate: f64,
    pub refresh_bonus: f64,
}

impl AttributeBoost {
    pub fn attack_up() -> Self {
        Self {
            attribute: Attribute::Atk,
            kind: ModifierKind::Additive,
            base: ("stackBonus", 10.0),
            growth_rate: 0.0,
            refresh_bonus: 0.0,
        }
    }

    pub fn defense_up() -> Self {
        Self {
            attribute: Attribute::Def,
            kind: ModifierKind::Additive,
            base: ("defenseBonus", 15.0),
            growth_rate: 0.008,
            refresh_bonus: 8.0,
        }
    }

    pub fn speed_up() -> Self {
        Self {
            attribute: Attribute::Spd,
            kind: ModifierKind::Multiplicative,
            base: ("speedBonus", 0.2),
            growth_rate: 0.0,
            refresh_bonus: 0.0,
        }
    }

    fn current(&self, ctx: &BuffContext<'_>) -> f64 {
        ctx.var(BONUS_VAR)
            .unwrap_or_else(|| ctx.param(self.base.0, self.base.1))
    }

    fn set(&self, ctx: &mut BuffContext<'_>, bonus: f64) {
        ctx.replace_modifier(self.attribute, bonus, self.kind);
        ctx.set_var(BONUS_VAR, bonus);
    }
}

impl BuffBehavior for AttributeBoost {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param(self.base.0, self.base.1);
        self.set(ctx, bonus);
        ctx.log(&format!("{} raised by {bonus}", self.attribute));
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let rate = ctx.param("growthRate", self.growth_rate);
        if rate <= 0.0 {
            return Ok(());
        }
        let seconds = ctx.intervals_crossed(delta_ms, 1000);
        for _ in 0..seconds {
            let current = self.current(ctx);
            let grown = (current * (1.0 + rate)).floor();
            if grown > current {
                self.set(ctx, grown);
            }
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param("refreshBonus", self.refresh_bonus);
        if bonus <= 0.0 {
            return Ok(());
        }
        let raised = self.current(ctx) + bonus;
        self.set(ctx, raised);
        ctx.log(&format!("{} bonus raised to {raised}", self.attribute));
        Ok(())
    }
}

/// Multiplicative modifier whose magnitude drifts toward zero each second.
///
/// The stored magnitude is always non-negative; `sign` turns it into a
/// penalty.
#[derive(Clone, Debug)]
pub struct ScaledModifier {
    pub attribute: Attribute,
    pub sign: f64,
    /// Parameter key and default for the starting magnitude.
    pub initial: (&'static str, f64),
    /// Parameter key and default for the per-second drift toward zero.
    pub drift: (&'static str, f64),
    pub refresh_bonus: f64,
    pub refresh_cap: f64,
    /// Set the `stunned` flag while active.
    pub stuns: bool,
}

impl ScaledModifier {
    pub fn dodge_up() -> Self {
        Self {
            attribute: Attribute::DodgeRate,
            sign: 1.0,
            initial: ("dodgeBonus", 0.2),
            drift: ("decayRate", 0.02),
            refresh_bonus: 0.1,
            refresh_cap: 0.5,
            stuns: false,
        }
    }

    pub fn crit_damage_reduction() -> Self {
        Self {
            attribute: Attribute::CritDmg,
            sign: -1.0,
            initial: ("critDamageReduction", 0.2),
            drift: ("recoveryRate", 0.02),
            refresh_bonus: 0.05,
            refresh_cap: 0.5,
            stuns: false,
        }
    }

    pub fn hit_reduction() -> Self {
        Self {
            attribute: Attribute::HitRate,
            sign: -1.0,
            initial: ("hitReduction", 0.3),
            drift: ("recoveryRate", 0.05),
            refresh_bonus: 0.1,
            refresh_cap: 0.8,
            stuns: false,
        }
    }

    pub fn speed_reduction() -> Self {
        Self {
            attribute: Attribute::Spd,
            sign: -1.0,
            initial: ("speedReduction", 0.25),
            drift: ("recoveryRate", 0.03),
            refresh_bonus: 0.1,
            refresh_cap: 0.6,
            stuns: false,
        }
    }

    pub fn stun() -> Self {
        Self {
            attribute: Attribute::Def,
            sign: -1.0,
            initial: ("defenseReduction", 0.2),
            drift: ("recoveryRate", 0.05),
            refresh_bonus: 0.1,
            refresh_cap: 0.4,
            stuns: true,
        }
    }

    fn current(&self, ctx: &BuffContext<'_>) -> f64 {
        ctx.var(BONUS_VAR)
            .unwrap_or_else(|| ctx.param(self.initial.0, self.initial.1))
    }

    fn set(&self, ctx: &mut BuffContext<'_>, magnitude: f64) {
        ctx.replace_modifier(self.attribute, self.sign * magnitude, ModifierKind::Multiplicative);
        ctx.set_var(BONUS_VAR, magnitude);
    }
}

impl BuffBehavior for ScaledModifier {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let magnitude = ctx.param(self.initial.0, self.initial.1).max(0.0);
        self.set(ctx, magnitude);
        if self.stuns {
            ctx.set_flag(STUNNED_FLAG, true);
            ctx.log("stunned");
        }
        Ok(())
    }

    fn on_remove(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        if self.stuns {
            ctx.set_flag(STUNNED_FLAG, false);
        }
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta_ms: u64) -> HookResult {
        let seconds = ctx.intervals_crossed(delta_ms, 1000);
        if seconds == 0 {
            return Ok(());
        }
        let rate = ctx.param(self.drift.0, self.drift.1);
        let current = self.current(ctx);
        let next = (current - rate * seconds as f64).max(0.0);
        if next < current {
            self.set(ctx, next);
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param("refreshBonus", self.refresh_bonus);
        let next = (self.current(ctx) + bonus).min(self.refresh_cap);
        self.set(ctx, next);
        Ok(())
    }
}
