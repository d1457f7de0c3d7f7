use std::collections::BTreeMap;

/// Lifetime of a buff instance.
///
/// Content files encode durations as signed milliseconds where any value
/// `<= 0` (conventionally `-1`) means the buff never expires on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "i64", into = "i64")
)]
pub enum BuffDuration {
    Timed(u64),
    Permanent,
}

impl BuffDuration {
    pub const fn millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Permanent
        } else {
            Self::Timed(ms)
        }
    }

    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::Permanent)
    }
}

impl From<i64> for BuffDuration {
    fn from(value: i64) -> Self {
        if value <= 0 {
            Self::Permanent
        } else {
            Self::Timed(value as u64)
        }
    }
}

impl From<BuffDuration> for i64 {
    fn from(value: BuffDuration) -> Self {
        match value {
            BuffDuration::Timed(ms) => ms as i64,
            BuffDuration::Permanent => -1,
        }
    }
}

/// What happens when a buff is added to an owner that already carries it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum StackRule {
    /// Refresh the existing instance instead of adding another.
    #[default]
    Refresh,
    /// Add instances up to `max_stacks`, then return the oldest.
    Limited,
    /// Always add a new instance.
    Independent,
}

/// Crowd-control category carried by a buff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ControlType {
    #[default]
    None,
    /// Blocks skills; plain attacks are still allowed.
    Silence,
    /// Blocks every action.
    Stun,
    /// Blocks every action.
    Freeze,
}

impl ControlType {
    pub const fn blocks_actions(self) -> bool {
        matches!(self, Self::Stun | Self::Freeze)
    }

    pub const fn blocks_skills(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Static definition of a buff.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffConfig {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    pub duration: BuffDuration,
    #[cfg_attr(feature = "serde", serde(default = "default_max_stacks"))]
    pub max_stacks: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stack_rule: StackRule,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_debuff: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub control: ControlType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub control_priority: u32,
    /// Named numeric parameters read by the behavior.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parameters: BTreeMap<String, f64>,
}

#[cfg(feature = "serde")]
fn default_max_stacks() -> u32 {
    1
}

impl BuffConfig {
    pub fn new(id: impl Into<String>, duration: BuffDuration) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            duration,
            max_stacks: 1,
            stack_rule: StackRule::default(),
            is_debuff: false,
            control: ControlType::None,
            control_priority: 0,
            parameters: BTreeMap::new(),
        }
    }

    pub fn permanent(id: impl Into<String>) -> Self {
        Self::new(id, BuffDuration::Permanent)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_stacking(mut self, rule: StackRule, max_stacks: u32) -> Self {
        self.stack_rule = rule;
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_control(mut self, control: ControlType, priority: u32) -> Self {
        self.control = control;
        self.control_priority = priority;
        self
    }

    pub fn debuff(mut self) -> Self {
        self.is_debuff = true;
        self
    }

    pub fn param(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_durations() {
        assert_eq!(BuffDuration::from(-1), BuffDuration::Permanent);
        assert_eq!(BuffDuration::from(0), BuffDuration::Permanent);
        assert_eq!(BuffDuration::from(3000), BuffDuration::Timed(3000));
        assert_eq!(i64::from(BuffDuration::Permanent), -1);
    }

    #[test]
    fn control_blocking() {
        assert!(ControlType::Stun.blocks_actions());
        assert!(!ControlType::Silence.blocks_actions());
        assert!(ControlType::Silence.blocks_skills());
        assert!(!ControlType::None.blocks_skills());
    }
}
