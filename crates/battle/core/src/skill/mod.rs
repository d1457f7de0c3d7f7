//! Skill definitions, validation and execution.
mod book;
mod manager;

pub use book::{SkillBook, validate_skill};
pub use manager::{SkillError, SkillManager, SkillOutcome};

use std::collections::BTreeMap;

use crate::config::EnergyConfig;
use crate::stats::Attribute;

/// Defense channel a damage step goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum AttackType {
    /// Mitigated by DEF and MDEF at half weight each.
    Normal,
    Physical,
    Magic,
    /// Ignores defense.
    True,
}

/// `source.attribute × ratio` added to the base value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtraValue {
    pub attribute: Attribute,
    pub ratio: f64,
}

/// Multiplies the result by `1 + percent × target.attribute / 100`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetModifier {
    pub attribute: Attribute,
    pub percent: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriticalConfig {
    pub rate: f64,
    pub multiplier: f64,
}

/// Numeric recipe for a DAMAGE or HEAL step.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Calculation {
    pub base_value: f64,
    pub extra_values: Vec<ExtraValue>,
    pub attack_type: Option<AttackType>,
    pub critical: Option<CriticalConfig>,
    pub target_modifiers: Vec<TargetModifier>,
    /// Heal applies once instead of lingering.
    pub single_turn: bool,
}

impl Calculation {
    pub fn base(value: f64) -> Self {
        Self {
            base_value: value,
            ..Self::default()
        }
    }

    pub fn with_extra(mut self, attribute: Attribute, ratio: f64) -> Self {
        self.extra_values.push(ExtraValue { attribute, ratio });
        self
    }

    pub fn with_attack_type(mut self, attack_type: AttackType) -> Self {
        self.attack_type = Some(attack_type);
        self
    }

    pub fn with_critical(mut self, rate: f64, multiplier: f64) -> Self {
        self.critical = Some(CriticalConfig { rate, multiplier });
        self
    }

    pub fn with_target_modifier(mut self, attribute: Attribute, percent: f64) -> Self {
        self.target_modifiers.push(TargetModifier { attribute, percent });
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum StepKind {
    Damage,
    Heal,
    Buff,
    Debuff,
    Shield,
    Control,
}

/// One typed sub-operation of a skill.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillStep {
    pub kind: StepKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub calculation: Option<Calculation>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub buff_id: Option<String>,
    /// Buff lifetime in turns. Defaults to 1.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_turns: Option<u32>,
    /// Maximum stacks of the applied buff. Defaults to 1.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stacks: Option<u32>,
    /// Apply to the caster instead of the skill target.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_self: bool,
    /// Higher runs first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,
    /// Passed through to the applied buff's config.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parameters: BTreeMap<String, f64>,
}

impl SkillStep {
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            calculation: None,
            buff_id: None,
            duration_turns: None,
            stacks: None,
            target_self: false,
            priority: 0,
            parameters: BTreeMap::new(),
        }
    }

    pub fn damage(calculation: Calculation) -> Self {
        Self::new(StepKind::Damage).with_calculation(calculation)
    }

    pub fn heal(calculation: Calculation) -> Self {
        Self::new(StepKind::Heal).with_calculation(calculation)
    }

    pub fn buff(kind: StepKind, buff_id: impl Into<String>, duration_turns: u32) -> Self {
        let mut step = Self::new(kind);
        step.buff_id = Some(buff_id.into());
        step.duration_turns = Some(duration_turns);
        step
    }

    pub fn with_calculation(mut self, calculation: Calculation) -> Self {
        self.calculation = Some(calculation);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn on_self(mut self) -> Self {
        self.target_self = true;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Buff id used by BUFF/DEBUFF/SHIELD/CONTROL steps.
    pub fn effective_buff_id(&self) -> Option<&str> {
        match (self.kind, self.buff_id.as_deref()) {
            (_, Some(id)) => Some(id),
            (StepKind::Shield, None) => Some(SkillManager::SHIELD_BUFF),
            (StepKind::Control, None) => Some(SkillManager::CONTROL_BUFF),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SkillType {
    #[default]
    Small,
    Passive,
    Ultimate,
    Reaction,
}

/// Who a skill is aimed at by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SkillTarget {
    #[default]
    Enemy,
    Ally,
    SelfOnly,
}

/// Static skill definition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillConfig {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skill_type: SkillType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: SkillTarget,
    /// Cooldown in owner turns.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: u32,
    /// Overrides the cost implied by `skill_type`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub energy_cost: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    pub steps: Vec<SkillStep>,
}

impl SkillConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, skill_type: SkillType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            skill_type,
            target: SkillTarget::Enemy,
            cooldown: 0,
            energy_cost: None,
            tags: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: SkillTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_cooldown(mut self, turns: u32) -> Self {
        self.cooldown = turns;
        self
    }

    pub fn with_step(mut self, step: SkillStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Energy spent when the skill is used.
    pub fn energy_cost(&self, energy: &EnergyConfig) -> u32 {
        self.energy_cost.unwrap_or(match self.skill_type {
            SkillType::Small => energy.small_skill_cost,
            SkillType::Ultimate => energy.ultimate_skill_cost,
            SkillType::Passive | SkillType::Reaction => 0,
        })
    }

    pub fn is_heal(&self) -> bool {
        self.steps.iter().any(|s| s.kind == StepKind::Heal)
    }

    pub fn is_damage(&self) -> bool {
        self.steps.iter().any(|s| s.kind == StepKind::Damage)
    }

    /// Sum of DAMAGE step base values and ratios; a rough strength ranking.
    pub fn damage_weight(&self) -> f64 {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::Damage)
            .filter_map(|s| s.calculation.as_ref())
            .map(|c| c.base_value + c.extra_values.iter().map(|e| e.ratio * 100.0).sum::<f64>())
            .sum()
    }
}
