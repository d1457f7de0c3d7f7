//! Combatants and the roster that owns them.
//!
//! A [`Participant`] keeps its resource meters private so the bounds
//! `0 ≤ health ≤ max_health` and `0 ≤ energy ≤ max_energy` hold after every
//! mutation. Non-resource attributes are computed from a base value through
//! the participant's own [`ModifierStack`].
mod roster;

pub use roster::Roster;

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::EnergyConfig;
use crate::stats::{Attribute, ModifierStack};

/// Stable participant identifier as supplied by the roster.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Pseudo-participant used as source/target of engine-generated log entries.
    pub const SYSTEM: &'static str = "system";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn system() -> Self {
        Self(Self::SYSTEM.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_system(&self) -> bool {
        self.0 == Self::SYSTEM
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Faction tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Side {
    /// Player-controlled side.
    Ally,
    /// Opposing side.
    Enemy,
}

impl Side {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

/// Roster descriptor consumed at battle creation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantInfo {
    pub id: String,
    pub name: String,
    pub side: Side,
    #[cfg_attr(feature = "serde", serde(default = "default_level"))]
    pub level: u32,
    pub max_health: u32,
    /// Defaults to `max_health`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_health: Option<u32>,
    /// Defaults to [`EnergyConfig::DEFAULT_MAX_ENERGY`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_energy: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_energy: u32,
    /// Base attribute overrides; unspecified attributes derive from level.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: BTreeMap<Attribute, f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<String>,
}

#[cfg(feature = "serde")]
fn default_level() -> u32 {
    1
}

impl ParticipantInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, side: Side, max_health: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            side,
            level: 1,
            max_health,
            current_health: None,
            max_energy: None,
            current_energy: 0,
            stats: BTreeMap::new(),
            skills: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_health(mut self, current: u32) -> Self {
        self.current_health = Some(current);
        self
    }

    pub fn with_energy(mut self, current: u32, max: u32) -> Self {
        self.current_energy = current;
        self.max_energy = Some(max);
        self
    }

    pub fn with_stat(mut self, attribute: Attribute, value: f64) -> Self {
        self.stats.insert(attribute, value);
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }
}

/// One combatant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub level: u32,
    pub side: Side,
    health: u32,
    max_health: u32,
    energy: u32,
    max_energy: u32,
    shield: u32,
    base_stats: BTreeMap<Attribute, f64>,
    modifiers: ModifierStack,
    buffs: Vec<String>,
    skills: Vec<String>,
    cooldowns: BTreeMap<String, u32>,
}

impl Participant {
    pub fn from_info(info: &ParticipantInfo) -> Self {
        let max_health = info.max_health.max(1);
        let max_energy = info.max_energy.unwrap_or(EnergyConfig::DEFAULT_MAX_ENERGY);
        Self {
            id: ParticipantId::new(info.id.clone()),
            name: info.name.clone(),
            level: info.level,
            side: info.side,
            health: info.current_health.unwrap_or(max_health).min(max_health),
            max_health,
            energy: info.current_energy.min(max_energy),
            max_energy,
            shield: 0,
            base_stats: info.stats.clone(),
            modifiers: ModifierStack::new(),
            buffs: Vec::new(),
            skills: info.skills.clone(),
            cooldowns: BTreeMap::new(),
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn missing_health(&self) -> u32 {
        self.max_health - self.health
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn max_energy(&self) -> u32 {
        self.max_energy
    }

    pub fn shield(&self) -> u32 {
        self.shield
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_full_health(&self) -> bool {
        self.health >= self.max_health
    }

    pub fn health_ratio(&self) -> f64 {
        self.health as f64 / self.max_health as f64
    }

    pub fn energy_ratio(&self) -> f64 {
        if self.max_energy == 0 {
            return 0.0;
        }
        self.energy as f64 / self.max_energy as f64
    }

    /// Base value before modifiers. Unset attributes derive from level.
    pub fn base_stat(&self, attribute: Attribute) -> f64 {
        if let Some(value) = self.base_stats.get(&attribute) {
            return *value;
        }
        let level = self.level as f64;
        match attribute {
            Attribute::Atk => level * 5.0,
            Attribute::Def => level * 2.0,
            Attribute::Mdef => level,
            Attribute::Spd => level * 3.0,
            Attribute::Strength => level * 4.0,
            Attribute::MagicPower => level * 3.0,
            Attribute::Wisdom => level * 2.0,
            Attribute::CritRate => 0.05,
            Attribute::CritDmg => 1.5,
            Attribute::HitRate => 1.0,
            _ => 0.0,
        }
    }

    /// Effective attribute value.
    pub fn attribute(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Hp => self.health as f64,
            Attribute::MaxHp => self.max_health as f64,
            Attribute::Energy => self.energy as f64,
            Attribute::MaxEnergy => self.max_energy as f64,
            other => self.modifiers.calculate(other, self.base_stat(other)),
        }
    }

    pub fn modifiers(&self) -> &ModifierStack {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut ModifierStack {
        &mut self.modifiers
    }

    /// Applies damage, draining any shield first.
    ///
    /// Returns the health actually lost; a dead participant is left untouched.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let absorbed = amount.min(self.shield);
        self.shield -= absorbed;
        let lost = (amount - absorbed).min(self.health);
        self.health -= lost;
        lost
    }

    /// Restores health up to the maximum. Returns the amount actually healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let healed = amount.min(self.missing_health());
        self.health += healed;
        healed
    }

    /// Sets health, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, value: u32) {
        self.health = value.min(self.max_health);
    }

    pub fn gain_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount).min(self.max_energy);
    }

    /// Deducts `amount` if available. Leaves energy untouched otherwise.
    pub fn spend_energy(&mut self, amount: u32) -> bool {
        if self.energy < amount {
            return false;
        }
        self.energy -= amount;
        true
    }

    pub fn set_shield(&mut self, value: u32) {
        self.shield = value;
    }

    pub fn buff_ids(&self) -> &[String] {
        &self.buffs
    }

    pub fn attach_buff(&mut self, instance_id: &str) {
        if !self.buffs.iter().any(|id| id == instance_id) {
            self.buffs.push(instance_id.to_string());
        }
    }

    pub fn detach_buff(&mut self, instance_id: &str) {
        self.buffs.retain(|id| id != instance_id);
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn has_skill(&self, skill_id: &str) -> bool {
        self.skills.iter().any(|id| id == skill_id)
    }

    /// Remaining cooldown in owner turns.
    pub fn cooldown(&self, skill_id: &str) -> u32 {
        self.cooldowns.get(skill_id).copied().unwrap_or(0)
    }

    pub fn start_cooldown(&mut self, skill_id: &str, turns: u32) {
        if turns > 0 {
            self.cooldowns.insert(skill_id.to_string(), turns);
        }
    }

    /// Counts every cooldown down by one turn.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ModifierKind;

    fn hero() -> Participant {
        Participant::from_info(
            &ParticipantInfo::new("hero", "Hero", Side::Ally, 100)
                .with_level(10)
                .with_energy(100, 150),
        )
    }

    #[test]
    fn meters_stay_in_bounds() {
        let mut p = hero();
        assert_eq!(p.take_damage(30), 30);
        assert_eq!(p.heal(500), 30);
        assert_eq!(p.health(), 100);

        assert_eq!(p.take_damage(250), 100);
        assert!(!p.is_alive());
        assert_eq!(p.take_damage(10), 0);
        assert_eq!(p.heal(10), 0);

        p.gain_energy(1000);
        assert_eq!(p.energy(), 150);
        assert!(!p.spend_energy(151));
        assert!(p.spend_energy(150));
        assert_eq!(p.energy(), 0);
    }

    #[test]
    fn info_values_are_clamped() {
        let info = ParticipantInfo::new("x", "X", Side::Enemy, 50)
            .with_health(80)
            .with_energy(400, 150);
        let p = Participant::from_info(&info);
        assert_eq!(p.health(), 50);
        assert_eq!(p.energy(), 150);
    }

    #[test]
    fn shield_absorbs_before_health() {
        let mut p = hero();
        p.set_shield(20);
        assert_eq!(p.take_damage(15), 0);
        assert_eq!(p.shield(), 5);
        assert_eq!(p.take_damage(15), 10);
        assert_eq!(p.health(), 90);
    }

    #[test]
    fn attribute_reads_modifiers() {
        let mut p = hero();
        assert_eq!(p.attribute(Attribute::Atk), 50.0);
        p.modifiers_mut()
            .add("buff", Attribute::Atk, 10.0, ModifierKind::Additive);
        assert_eq!(p.attribute(Attribute::Atk), 60.0);
        p.modifiers_mut()
            .add("buff", Attribute::Hp, 999.0, ModifierKind::Additive);
        assert_eq!(p.attribute(Attribute::Hp), 100.0);
    }

    #[test]
    fn cooldowns_tick_out() {
        let mut p = hero();
        p.start_cooldown("fireball", 2);
        assert_eq!(p.cooldown("fireball"), 2);
        p.tick_cooldowns();
        assert_eq!(p.cooldown("fireball"), 1);
        p.tick_cooldowns();
        assert_eq!(p.cooldown("fireball"), 0);
    }
}
