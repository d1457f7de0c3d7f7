//! Resolved actions and the log digest.

use bitflags::bitflags;

use crate::error::{BattleError, ErrorSeverity};
use crate::participant::ParticipantId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ActionKind {
    Attack,
    Skill,
    /// Engine-generated entry: battle start, skipped turns.
    Status,
}

bitflags! {
    /// Resolution details of one action.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActionFlags: u8 {
        const CRITICAL   = 1 << 0;
        const MISS       = 1 << 1;
        /// Hardcoded last-resort attack.
        const FALLBACK   = 1 << 2;
        /// Actor forfeited the turn.
        const SKIPPED    = 1 << 3;
        /// Skill converted to a basic attack for lack of energy.
        const DOWNGRADED = 1 << 4;
        /// Target died to this action.
        const KILL       = 1 << 5;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum EffectKind {
    Damage,
    Heal,
    Buff,
    Debuff,
    Status,
    Miss,
}

/// Descriptive entry attached to an action.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub kind: EffectKind,
    pub value: Option<u32>,
    pub buff_id: Option<String>,
    pub description: String,
}

impl Effect {
    pub fn damage(amount: u32, critical: bool) -> Self {
        Self {
            kind: EffectKind::Damage,
            value: Some(amount),
            buff_id: None,
            description: if critical {
                format!("critical hit for {amount}")
            } else {
                format!("hit for {amount}")
            },
        }
    }

    pub fn heal(amount: u32) -> Self {
        Self {
            kind: EffectKind::Heal,
            value: Some(amount),
            buff_id: None,
            description: format!("healed {amount}"),
        }
    }

    pub fn buff(buff_id: impl Into<String>, debuff: bool) -> Self {
        let buff_id = buff_id.into();
        Self {
            kind: if debuff { EffectKind::Debuff } else { EffectKind::Buff },
            value: None,
            description: format!("applied {buff_id}"),
            buff_id: Some(buff_id),
        }
    }

    pub fn status(description: impl Into<String>) -> Self {
        Self {
            kind: EffectKind::Status,
            value: None,
            buff_id: None,
            description: description.into(),
        }
    }

    pub fn miss() -> Self {
        Self {
            kind: EffectKind::Miss,
            value: Some(0),
            buff_id: None,
            description: "missed".to_string(),
        }
    }
}

/// One resolved turn. Immutable once appended to a battle log.
///
/// Before execution an action is a request: `damage`/`heal` are zero except
/// for the hardcoded fallback attack, whose `damage` is the fixed amount to
/// deal.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub id: String,
    pub kind: ActionKind,
    pub source: ParticipantId,
    pub target: ParticipantId,
    pub skill_id: Option<String>,
    pub damage: u32,
    pub heal: u32,
    pub effects: Vec<Effect>,
    pub flags: ActionFlags,
    pub turn: u32,
    /// Logical battle clock in milliseconds.
    pub timestamp_ms: u64,
}

impl Action {
    fn new(id: impl Into<String>, kind: ActionKind, source: ParticipantId, target: ParticipantId) -> Self {
        Self {
            id: id.into(),
            kind,
            source,
            target,
            skill_id: None,
            damage: 0,
            heal: 0,
            effects: Vec::new(),
            flags: ActionFlags::empty(),
            turn: 0,
            timestamp_ms: 0,
        }
    }

    pub fn attack(id: impl Into<String>, source: ParticipantId, target: ParticipantId) -> Self {
        Self::new(id, ActionKind::Attack, source, target)
    }

    pub fn skill(
        id: impl Into<String>,
        source: ParticipantId,
        target: ParticipantId,
        skill_id: impl Into<String>,
    ) -> Self {
        let mut action = Self::new(id, ActionKind::Skill, source, target);
        action.skill_id = Some(skill_id.into());
        action
    }

    /// Fixed-damage attack used when every decision path failed.
    pub fn fallback(id: impl Into<String>, source: ParticipantId, target: ParticipantId, damage: u32) -> Self {
        let mut action = Self::attack(id, source, target);
        action.damage = damage;
        action.flags |= ActionFlags::FALLBACK;
        action
    }

    pub fn status(id: impl Into<String>, source: ParticipantId, description: impl Into<String>) -> Self {
        let mut action = Self::new(id, ActionKind::Status, source.clone(), source);
        action.effects.push(Effect::status(description));
        action
    }

    pub fn is_well_formed(&self) -> bool {
        !self.id.is_empty() && !self.source.as_str().is_empty() && !self.target.as_str().is_empty()
    }

    pub fn is_critical(&self) -> bool {
        self.flags.contains(ActionFlags::CRITICAL)
    }

    pub fn is_fallback(&self) -> bool {
        self.flags.contains(ActionFlags::FALLBACK)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("action source `{0}` not found")]
    MissingSource(String),

    #[error("action target `{0}` not found")]
    MissingTarget(String),

    #[error("action source `{0}` is dead")]
    DeadSource(String),
}

impl BattleError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingSource(_) => "ACTION_MISSING_SOURCE",
            Self::MissingTarget(_) => "ACTION_MISSING_TARGET",
            Self::DeadSource(_) => "ACTION_DEAD_SOURCE",
        }
    }
}

/// SHA-256 over the bincode encoding of each action, in order.
#[cfg(feature = "serde")]
pub fn compute_log_root<'a, I>(actions: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a Action>,
{
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for action in actions {
        if let Ok(bytes) = bincode::serialize(action) {
            hasher.update(&bytes);
        }
    }
    hasher.finalize().into()
}
