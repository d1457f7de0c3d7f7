//! Roster loader.

use std::path::Path;

use battle_core::{ParticipantInfo, Side};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Roster structure for TOML files (`[[participants]]` tables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFile {
    pub participants: Vec<ParticipantInfo>,
}

/// Loader for battle rosters.
pub struct RosterLoader;

impl RosterLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ParticipantInfo>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses a roster and checks that ids are unique and both sides are
    /// present.
    pub fn parse(content: &str) -> LoadResult<Vec<ParticipantInfo>> {
        let roster: RosterFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster TOML: {}", e))?;

        let mut seen = std::collections::BTreeSet::new();
        for info in &roster.participants {
            if !seen.insert(info.id.as_str()) {
                anyhow::bail!("Duplicate participant id `{}`", info.id);
            }
            if info.max_health == 0 {
                anyhow::bail!("Participant `{}` has zero max_health", info.id);
            }
        }
        for side in [Side::Ally, Side::Enemy] {
            if !roster.participants.iter().any(|p| p.side == side) {
                anyhow::bail!("Roster has no {} participants", side);
            }
        }
        Ok(roster.participants)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::Attribute;

    use super::*;

    const ROSTER: &str = r#"
[[participants]]
id = "hero"
name = "Hero"
side = "ally"
max_health = 120
skills = ["slash"]
stats = { ATK = 30.0, SPD = 12.0 }

[[participants]]
id = "slime"
name = "Slime"
side = "enemy"
level = 3
max_health = 80
"#;

    #[test]
    fn parses_participants() {
        let roster = RosterLoader::parse(ROSTER).expect("valid roster");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].stats.get(&Attribute::Atk), Some(&30.0));
        assert_eq!(roster[1].level, 3);
        assert_eq!(roster[1].current_health, None);
    }

    #[test]
    fn one_sided_roster_is_rejected() {
        let one_side = ROSTER.replace("\"enemy\"", "\"ally\"");
        assert!(RosterLoader::parse(&one_side).is_err());
    }
}
