//! Buff template loader.

use std::collections::BTreeMap;
use std::path::Path;

use battle_core::BuffConfig;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Buff template structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffCatalog {
    pub buffs: Vec<BuffConfig>,
}

/// Loader for buff templates from RON files.
pub struct BuffConfigLoader;

impl BuffConfigLoader {
    /// Loads templates keyed by buff id. Duplicate ids are rejected.
    pub fn load(path: &Path) -> LoadResult<BTreeMap<String, BuffConfig>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BTreeMap<String, BuffConfig>> {
        let catalog: BuffCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse buff catalog RON: {}", e))?;

        let mut templates = BTreeMap::new();
        for buff in catalog.buffs {
            if buff.id.is_empty() {
                anyhow::bail!("Buff template with empty id");
            }
            if templates.contains_key(&buff.id) {
                anyhow::bail!("Duplicate buff template `{}`", buff.id);
            }
            templates.insert(buff.id.clone(), buff);
        }
        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{BuffDuration, ControlType};

    use super::*;

    #[test]
    fn negative_duration_is_permanent() {
        let templates = BuffConfigLoader::parse(
            r#"(buffs: [
                (id: "mountain_god", name: "Mountain God", duration: -1),
                (id: "buff_stun", name: "Stun", duration: 2000, control: stun, control_priority: 10, is_debuff: true),
            ])"#,
        )
        .expect("valid catalog");
        assert_eq!(templates["mountain_god"].duration, BuffDuration::Permanent);
        assert_eq!(templates["buff_stun"].control, ControlType::Stun);
        assert_eq!(templates["buff_stun"].max_stacks, 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = BuffConfigLoader::parse(
            r#"(buffs: [(id: "a", name: "A", duration: 1), (id: "a", name: "A", duration: 2)])"#,
        )
        .expect_err("duplicate");
        assert!(err.to_string().contains("Duplicate"));
    }
}
