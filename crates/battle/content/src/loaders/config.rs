//! Battle rules loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`BattleConfig`] from TOML files.
///
/// Every table and field is optional; missing values keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse battle config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::EnergyConfig;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("[energy]\nper_turn = 40\n").expect("valid toml");
        assert_eq!(config.energy.per_turn, 40);
        assert_eq!(config.energy.on_hit, EnergyConfig::DEFAULT_ON_HIT);
        assert_eq!(config.turns, BattleConfig::default().turns);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(ConfigLoader::parse("").expect("empty toml"), BattleConfig::default());
    }
}
