//! Content factory for loading a complete battle setup from a data directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use battle_core::{BattleConfig, BuffConfig, ParticipantInfo, SkillBook};
use tracing::{info, warn};

use crate::behaviors::default_registry;
use crate::loaders::{
    BuffConfigLoader, ConfigLoader, LoadResult, RosterLoader, SkillLoader,
};

/// Everything needed to start a battle.
#[derive(Debug, Clone)]
pub struct BattleContent {
    pub config: BattleConfig,
    pub skills: SkillBook,
    pub buffs: BTreeMap<String, BuffConfig>,
    pub roster: Vec<ParticipantInfo>,
}

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml
/// ├── roster.toml
/// ├── skills.ron
/// └── buffs.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle rules from `battle.toml`, falling back to defaults when
    /// the file does not exist.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("battle.toml");
        if !path.exists() {
            warn!(target: "content", path = %path.display(), "battle.toml missing, using defaults");
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load and validate skills from `skills.ron`.
    pub fn load_skills(&self) -> LoadResult<SkillBook> {
        let path = self.data_dir.join("skills.ron");
        SkillLoader::load(&path)
    }

    /// Load buff templates from `buffs.ron`.
    pub fn load_buffs(&self) -> LoadResult<BTreeMap<String, BuffConfig>> {
        let path = self.data_dir.join("buffs.ron");
        BuffConfigLoader::load(&path)
    }

    /// Load participants from `roster.toml`.
    pub fn load_roster(&self) -> LoadResult<Vec<ParticipantInfo>> {
        let path = self.data_dir.join("roster.toml");
        RosterLoader::load(&path)
    }

    /// Loads every file and cross-checks references.
    ///
    /// Fails when a participant lists an unknown skill or a buff step names a
    /// buff with no registered behavior.
    pub fn load_all(&self) -> LoadResult<BattleContent> {
        let content = BattleContent {
            config: self.load_config()?,
            skills: self.load_skills()?,
            buffs: self.load_buffs()?,
            roster: self.load_roster()?,
        };

        for info in &content.roster {
            if let Some(missing) = info.skills.iter().find(|s| !content.skills.contains(s)) {
                anyhow::bail!("Participant `{}` references unknown skill `{}`", info.id, missing);
            }
        }

        let registry = default_registry();
        for skill in content.skills.iter() {
            for step in &skill.steps {
                if let Some(buff) = step.effective_buff_id()
                    && !registry.has(buff)
                {
                    anyhow::bail!("Skill `{}` references unknown buff `{}`", skill.id, buff);
                }
            }
        }

        info!(
            target: "content",
            skills = content.skills.len(),
            buffs = content.buffs.len(),
            participants = content.roster.len(),
            "battle content loaded"
        );
        Ok(content)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
