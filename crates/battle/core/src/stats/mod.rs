//! Combat attributes and the modifier stack that adjusts them.
pub mod modifiers;

pub use modifiers::{Modifier, ModifierKind, ModifierStack};

/// Named combat attribute.
///
/// String forms (`"ATK"`, `"CRIT_RATE"`, ...) are what content files and skill
/// step formulas refer to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum Attribute {
    Hp,
    MaxHp,
    Energy,
    MaxEnergy,
    Atk,
    Def,
    Mdef,
    Spd,
    CritRate,
    CritDmg,
    DodgeRate,
    HitRate,
    Element,
    Strength,
    MagicPower,
    Wisdom,
    NaturePower,
    PhysicalDamageReduction,
}

impl Attribute {
    /// Resource attributes read live meters and ignore modifiers.
    pub const fn is_resource(self) -> bool {
        matches!(
            self,
            Self::Hp | Self::MaxHp | Self::Energy | Self::MaxEnergy
        )
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
