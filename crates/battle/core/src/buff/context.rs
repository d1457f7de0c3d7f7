use std::collections::BTreeMap;

use tracing::debug;

use super::config::{BuffConfig, BuffDuration};
use crate::participant::{Participant, ParticipantId};
use crate::stats::{Attribute, ModifierKind};

/// Persistent per-instance state: timers, config and behavior variables.
///
/// Behaviors are stateless; everything they need to remember between hooks
/// lives in `variables`.
#[derive(Clone, Debug, PartialEq)]
pub struct BuffState {
    pub owner: ParticipantId,
    pub instance_id: String,
    pub buff_id: String,
    pub config: BuffConfig,
    /// Engine clock when the instance was created or last refreshed.
    pub start_ms: u64,
    /// Time accumulated by this instance since `start_ms`.
    pub elapsed_ms: u64,
    variables: BTreeMap<String, f64>,
}

impl BuffState {
    pub fn new(
        owner: ParticipantId,
        instance_id: String,
        buff_id: String,
        config: BuffConfig,
        start_ms: u64,
    ) -> Self {
        Self {
            owner,
            instance_id,
            buff_id,
            config,
            start_ms,
            elapsed_ms: 0,
            variables: BTreeMap::new(),
        }
    }

    /// `None` for permanent buffs.
    pub fn remaining_ms(&self) -> Option<u64> {
        match self.config.duration {
            BuffDuration::Timed(total) => Some(total.saturating_sub(self.elapsed_ms)),
            BuffDuration::Permanent => None,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.config.duration, BuffDuration::Timed(total) if self.elapsed_ms >= total)
    }

    pub fn variable(&self, key: &str) -> Option<f64> {
        self.variables.get(key).copied()
    }
}

/// Something a buff did that the outside world may want to observe.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffEvent {
    pub owner: ParticipantId,
    pub instance_id: String,
    pub buff_id: String,
    pub kind: BuffEventKind,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuffEventKind {
    Applied,
    Refreshed,
    Removed { expired: bool },
    PeriodicDamage(u32),
    PeriodicHeal(u32),
    ShieldChanged(u32),
    Custom(String),
}

/// View handed to behavior hooks.
///
/// Couples the instance's [`BuffState`] with its owner so modifier helpers
/// register entries under this instance id.
pub struct BuffContext<'a> {
    state: &'a mut BuffState,
    owner: &'a mut Participant,
    events: &'a mut Vec<BuffEvent>,
}

impl<'a> BuffContext<'a> {
    pub fn new(
        state: &'a mut BuffState,
        owner: &'a mut Participant,
        events: &'a mut Vec<BuffEvent>,
    ) -> Self {
        Self {
            state,
            owner,
            events,
        }
    }

    pub fn owner_id(&self) -> &ParticipantId {
        &self.state.owner
    }

    pub fn instance_id(&self) -> &str {
        &self.state.instance_id
    }

    pub fn buff_id(&self) -> &str {
        &self.state.buff_id
    }

    pub fn config(&self) -> &BuffConfig {
        &self.state.config
    }

    pub fn start_ms(&self) -> u64 {
        self.state.start_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.state.elapsed_ms
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.state.remaining_ms()
    }

    /// Config parameter or `default`.
    pub fn param(&self, key: &str, default: f64) -> f64 {
        self.state.config.param(key).unwrap_or(default)
    }

    pub fn var(&self, key: &str) -> Option<f64> {
        self.state.variable(key)
    }

    pub fn var_or(&self, key: &str, default: f64) -> f64 {
        self.var(key).unwrap_or(default)
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: f64) {
        self.state.variables.insert(key.into(), value);
    }

    pub fn remove_var(&mut self, key: &str) -> Option<f64> {
        self.state.variables.remove(key)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.var(key).is_some_and(|v| v != 0.0)
    }

    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.set_var(key, if value { 1.0 } else { 0.0 });
    }

    pub fn owner(&self) -> &Participant {
        self.owner
    }

    pub fn add_modifier(&mut self, attribute: Attribute, value: f64, kind: ModifierKind) {
        self.owner.modifiers_mut().add(
            self.state.instance_id.clone(),
            attribute,
            value,
            kind,
        );
    }

    /// Drops every modifier this instance registered.
    pub fn remove_modifiers(&mut self) -> usize {
        self.owner
            .modifiers_mut()
            .remove_owner(&self.state.instance_id)
    }

    /// Drops this instance's modifiers on `attribute` only.
    pub fn remove_attribute_modifiers(&mut self, attribute: Attribute) -> usize {
        self.owner
            .modifiers_mut()
            .remove_owner_attribute(&self.state.instance_id, attribute)
    }

    /// Replaces this instance's modifiers on `attribute` with a single entry.
    pub fn replace_modifier(&mut self, attribute: Attribute, value: f64, kind: ModifierKind) {
        self.remove_attribute_modifiers(attribute);
        self.add_modifier(attribute, value, kind);
    }

    /// Deals damage to the owner and records a periodic-damage event.
    pub fn damage_owner(&mut self, amount: u32) -> u32 {
        let dealt = self.owner.take_damage(amount);
        self.emit(BuffEventKind::PeriodicDamage(dealt));
        dealt
    }

    /// Heals the owner and records a periodic-heal event.
    pub fn heal_owner(&mut self, amount: u32) -> u32 {
        let healed = self.owner.heal(amount);
        if healed > 0 {
            self.emit(BuffEventKind::PeriodicHeal(healed));
        }
        healed
    }

    pub fn set_owner_shield(&mut self, value: u32) {
        self.owner.set_shield(value);
        self.emit(BuffEventKind::ShieldChanged(value));
    }

    pub fn emit(&mut self, kind: BuffEventKind) {
        self.events.push(BuffEvent {
            owner: self.state.owner.clone(),
            instance_id: self.state.instance_id.clone(),
            buff_id: self.state.buff_id.clone(),
            kind,
        });
    }

    /// Debug line tagged with this buff's id.
    pub fn log(&self, message: &str) {
        debug!(
            target: "battle::buff",
            buff = %self.state.buff_id,
            owner = %self.state.owner,
            instance = %self.state.instance_id,
            "{message}"
        );
    }

    /// Number of `interval_ms` boundaries crossed by the last `delta_ms` of
    /// elapsed time. Per-second effects scale by this so coarse and fine
    /// ticking accrue the same total.
    pub fn intervals_crossed(&self, delta_ms: u64, interval_ms: u64) -> u64 {
        if interval_ms == 0 {
            return 0;
        }
        let now = self.state.elapsed_ms;
        let before = now.saturating_sub(delta_ms);
        now / interval_ms - before / interval_ms
    }
}
