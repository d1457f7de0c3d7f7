//! Skill catalog loader.

use std::path::Path;

use battle_core::{SkillBook, SkillConfig};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Skill catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub skills: Vec<SkillConfig>,
}

/// Loader for skill definitions from RON files.
pub struct SkillLoader;

impl SkillLoader {
    /// Loads and validates a skill catalog.
    ///
    /// The whole file is rejected if any skill fails validation or an id is
    /// repeated.
    pub fn load(path: &Path) -> LoadResult<SkillBook> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<SkillBook> {
        let catalog: SkillCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill catalog RON: {}", e))?;

        SkillBook::load(catalog.skills)
            .map_err(|e| anyhow::anyhow!("Invalid skill catalog: {}", e))
    }
}
