use std::collections::BTreeMap;

use tracing::debug;

use super::{SkillConfig, StepKind};
use crate::error::ValidationError;

/// Validated skill definitions keyed by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkillBook {
    skills: BTreeMap<String, SkillConfig>,
}

impl SkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from `configs`, stopping at the first invalid entry.
    pub fn load<I>(configs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = SkillConfig>,
    {
        let mut book = Self::new();
        for config in configs {
            book.insert(config)?;
        }
        debug!(target: "battle::skill", count = book.len(), "skill book loaded");
        Ok(book)
    }

    pub fn insert(&mut self, config: SkillConfig) -> Result<(), ValidationError> {
        validate_skill(&config)?;
        if self.skills.contains_key(&config.id) {
            return Err(ValidationError::DuplicateId(config.id));
        }
        self.skills.insert(config.id.clone(), config);
        Ok(())
    }

    /// `None` for unknown ids.
    pub fn get(&self, id: &str) -> Option<&SkillConfig> {
        self.skills.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.skills.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.skills.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillConfig> + '_ {
        self.skills.values()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// Structural checks for one skill definition.
pub fn validate_skill(config: &SkillConfig) -> Result<(), ValidationError> {
    if config.id.trim().is_empty() {
        return Err(ValidationError::MissingField {
            entity: "skill",
            field: "id",
        });
    }
    if config.name.trim().is_empty() {
        return Err(ValidationError::MissingField {
            entity: "skill",
            field: "name",
        });
    }
    if config.steps.is_empty() {
        return Err(ValidationError::EmptySteps {
            entity: "skill",
            id: config.id.clone(),
        });
    }

    for (index, step) in config.steps.iter().enumerate() {
        let invalid = |reason| ValidationError::InvalidStep {
            id: config.id.clone(),
            index,
            reason,
        };
        match step.kind {
            StepKind::Damage | StepKind::Heal => {
                let Some(calculation) = &step.calculation else {
                    return Err(invalid("missing calculation"));
                };
                if !(calculation.base_value >= 0.0) {
                    return Err(invalid("base value must be non-negative"));
                }
            }
            StepKind::Buff | StepKind::Debuff => {
                if step.buff_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
                    return Err(invalid("missing buff id"));
                }
            }
            StepKind::Shield | StepKind::Control => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::{Calculation, SkillStep, SkillType};

    fn strike() -> SkillConfig {
        SkillConfig::new("strike", "Strike", SkillType::Small)
            .with_step(SkillStep::damage(Calculation::base(20.0)))
    }

    #[test]
    fn validation_rules() {
        assert_eq!(validate_skill(&strike()), Ok(()));

        let unnamed = SkillConfig { name: String::new(), ..strike() };
        assert!(matches!(
            validate_skill(&unnamed),
            Err(ValidationError::MissingField { field: "name", .. })
        ));

        let empty = SkillConfig { steps: Vec::new(), ..strike() };
        assert!(matches!(validate_skill(&empty), Err(ValidationError::EmptySteps { .. })));

        let negative = SkillConfig::new("bad", "Bad", SkillType::Small)
            .with_step(SkillStep::damage(Calculation::base(-1.0)));
        assert!(matches!(
            validate_skill(&negative),
            Err(ValidationError::InvalidStep { index: 0, .. })
        ));

        let formula_less = SkillConfig::new("bad", "Bad", SkillType::Small)
            .with_step(SkillStep::new(StepKind::Heal));
        assert!(validate_skill(&formula_less).is_err());

        let nameless_buff = SkillConfig::new("bad", "Bad", SkillType::Small)
            .with_step(SkillStep::new(StepKind::Debuff));
        assert!(validate_skill(&nameless_buff).is_err());

        let shield = SkillConfig::new("guard", "Guard", SkillType::Small)
            .with_step(SkillStep::new(StepKind::Shield));
        assert_eq!(validate_skill(&shield), Ok(()));
    }

    #[test]
    fn load_rejects_duplicates() {
        let err = SkillBook::load([strike(), strike()]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateId("strike".into()));

        let book = SkillBook::load([strike()]).expect("valid");
        assert!(book.get("strike").is_some());
        assert!(book.get("missing").is_none());
    }
}
