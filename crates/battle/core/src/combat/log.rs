use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::participant::ParticipantId;
use crate::stats::Attribute;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum CalculationKind {
    Damage,
    Heal,
    Miss,
}

/// One `source.attribute × ratio` term as evaluated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtraContribution {
    pub attribute: Attribute,
    pub value: f64,
    pub ratio: f64,
}

/// Record of one calculator invocation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalculationLog {
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub kind: CalculationKind,
    pub source_id: ParticipantId,
    pub target_id: ParticipantId,
    pub base_value: f64,
    pub extra_values: Vec<ExtraContribution>,
    pub final_value: u32,
    pub critical: bool,
    /// Named multiplicative contributions (defense, critical, modifiers).
    pub modifiers: BTreeMap<String, f64>,
}

impl CalculationLog {
    pub(crate) fn new(
        kind: CalculationKind,
        source_id: &ParticipantId,
        target_id: &ParticipantId,
        base_value: f64,
    ) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
            kind,
            source_id: source_id.clone(),
            target_id: target_id.clone(),
            base_value,
            extra_values: Vec::new(),
            final_value: 0,
            critical: false,
            modifiers: BTreeMap::new(),
        }
    }
}

/// Sums base value and extra contributions, recording each term.
pub(crate) fn base_with_extras(
    base_value: f64,
    extras: &[crate::skill::ExtraValue],
    source: &crate::participant::Participant,
    log: &mut CalculationLog,
) -> f64 {
    let mut result = base_value;
    for extra in extras {
        let value = source.attribute(extra.attribute);
        result += value * extra.ratio;
        log.extra_values.push(ExtraContribution {
            attribute: extra.attribute,
            value,
            ratio: extra.ratio,
        });
    }
    result
}

/// Applies target-side percentage modifiers.
pub(crate) fn apply_target_modifiers(
    mut result: f64,
    modifiers: &[crate::skill::TargetModifier],
    target: &crate::participant::Participant,
    log: &mut CalculationLog,
) -> f64 {
    for modifier in modifiers {
        let factor = 1.0 + modifier.percent * target.attribute(modifier.attribute) / 100.0;
        result *= factor;
        log.modifiers
            .insert(format!("target_{}", modifier.attribute.as_str()), factor);
    }
    result
}
