/// Battle rules and tunable parameters.
///
/// Every group has `const` defaults; loading a partial TOML file fills the
/// missing fields from those defaults.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    pub energy: EnergyConfig,
    pub turns: TurnConfig,
    pub damage: DamageConfig,
    pub heal: HealConfig,
    pub ai: AiConfig,
}

impl BattleConfig {
    pub fn new() -> Self {
        Self {
            energy: EnergyConfig::new(),
            turns: TurnConfig::new(),
            damage: DamageConfig::new(),
            heal: HealConfig::new(),
            ai: AiConfig::new(),
        }
    }

    /// Returns a copy with a fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.turns.seed = Some(seed);
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Energy economy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnergyConfig {
    /// Granted to every living participant at the start of each turn.
    pub per_turn: u32,
    /// Granted to a participant whenever it takes damage.
    pub on_hit: u32,
    /// Granted to the actor after it resolves an action.
    pub after_action: u32,
    pub small_skill_cost: u32,
    pub ultimate_skill_cost: u32,
    pub default_max_energy: u32,
}

impl EnergyConfig {
    pub const DEFAULT_PER_TURN: u32 = 25;
    pub const DEFAULT_ON_HIT: u32 = 15;
    pub const DEFAULT_AFTER_ACTION: u32 = 10;
    pub const DEFAULT_SMALL_SKILL_COST: u32 = 50;
    pub const DEFAULT_ULTIMATE_SKILL_COST: u32 = 100;
    pub const DEFAULT_MAX_ENERGY: u32 = 150;

    pub const fn new() -> Self {
        Self {
            per_turn: Self::DEFAULT_PER_TURN,
            on_hit: Self::DEFAULT_ON_HIT,
            after_action: Self::DEFAULT_AFTER_ACTION,
            small_skill_cost: Self::DEFAULT_SMALL_SKILL_COST,
            ultimate_skill_cost: Self::DEFAULT_ULTIMATE_SKILL_COST,
            default_max_energy: Self::DEFAULT_MAX_ENERGY,
        }
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn scheduling and battle bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TurnConfig {
    /// Order participants by effective SPD (ties shuffled) instead of a pure shuffle.
    pub speed_first: bool,
    /// Rounds after which the battle ends without a winner.
    pub max_rounds: u32,
    /// Simulated time that passes for a participant's buffs at the end of each of its turns.
    pub turn_duration_ms: u64,
    /// Maximum retained action log entries; oldest are evicted first.
    pub action_log_capacity: usize,
    /// Fixed RNG seed. `None` draws a fresh seed per battle.
    pub seed: Option<u64>,
}

impl TurnConfig {
    pub const DEFAULT_MAX_ROUNDS: u32 = 999;
    pub const DEFAULT_TURN_DURATION_MS: u64 = 1000;
    pub const DEFAULT_ACTION_LOG_CAPACITY: usize = 500;

    pub const fn new() -> Self {
        Self {
            speed_first: true,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            turn_duration_ms: Self::DEFAULT_TURN_DURATION_MS,
            action_log_capacity: Self::DEFAULT_ACTION_LOG_CAPACITY,
            seed: None,
        }
    }
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Damage calculator switches and thresholds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageConfig {
    pub critical_enabled: bool,
    pub default_critical_rate: f64,
    pub default_critical_multiplier: f64,
    pub defense_enabled: bool,
    pub dodge_enabled: bool,
    pub min_damage: f64,
    pub max_damage: f64,
}

impl DamageConfig {
    pub const DEFAULT_CRITICAL_RATE: f64 = 0.05;
    pub const DEFAULT_CRITICAL_MULTIPLIER: f64 = 1.5;
    pub const DEFAULT_MIN_DAMAGE: f64 = 1.0;
    pub const DEFAULT_MAX_DAMAGE: f64 = 9999.0;

    pub const fn new() -> Self {
        Self {
            critical_enabled: true,
            default_critical_rate: Self::DEFAULT_CRITICAL_RATE,
            default_critical_multiplier: Self::DEFAULT_CRITICAL_MULTIPLIER,
            defense_enabled: true,
            dodge_enabled: false,
            min_damage: Self::DEFAULT_MIN_DAMAGE,
            max_damage: Self::DEFAULT_MAX_DAMAGE,
        }
    }
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Heal calculator mitigation rules.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HealConfig {
    /// Healing lost per matching status on the target.
    pub reduction_per_status: f64,
    /// Upper bound on the cumulative reduction.
    pub max_reduction: f64,
    /// Buff ids that count as "reduce healing" statuses.
    pub reducing_buffs: Vec<String>,
}

impl HealConfig {
    pub const DEFAULT_REDUCTION_PER_STATUS: f64 = 0.2;
    pub const DEFAULT_MAX_REDUCTION: f64 = 0.8;
    pub const DEFAULT_REDUCING_BUFFS: [&'static str; 4] = [
        "buff_heal_reduction",
        "poison",
        "buff_strong_poison",
        "buff_curse",
    ];

    pub fn new() -> Self {
        Self {
            reduction_per_status: Self::DEFAULT_REDUCTION_PER_STATUS,
            max_reduction: Self::DEFAULT_MAX_REDUCTION,
            reducing_buffs: Self::DEFAULT_REDUCING_BUFFS
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

impl Default for HealConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Thresholds used by the AI decision engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    /// Fraction of max energy at which the base strategy uses skills.
    pub skill_energy_ratio: f64,
    /// Flat energy at which opposing-side strategies use skills.
    pub enemy_skill_energy: u32,
    /// Health ratio below which a participant is in critical condition.
    pub critical_health_ratio: f64,
    /// Health ratio below which an ally counts as needing healing.
    pub heal_threshold: f64,
    /// Energy at which player-side strategies reach for an ultimate.
    pub ultimate_energy: u32,
    /// Threat score above which damage skills are preferred.
    pub threat_skill_threshold: f64,
    /// Damage of the hardcoded last-resort attack.
    pub fallback_damage: u32,
}

impl AiConfig {
    pub const DEFAULT_SKILL_ENERGY_RATIO: f64 = 0.7;
    pub const DEFAULT_ENEMY_SKILL_ENERGY: u32 = 50;
    pub const DEFAULT_CRITICAL_HEALTH_RATIO: f64 = 0.5;
    pub const DEFAULT_HEAL_THRESHOLD: f64 = 0.3;
    pub const DEFAULT_ULTIMATE_ENERGY: u32 = 100;
    pub const DEFAULT_THREAT_SKILL_THRESHOLD: f64 = 60.0;
    pub const DEFAULT_FALLBACK_DAMAGE: u32 = 10;

    pub const fn new() -> Self {
        Self {
            skill_energy_ratio: Self::DEFAULT_SKILL_ENERGY_RATIO,
            enemy_skill_energy: Self::DEFAULT_ENEMY_SKILL_ENERGY,
            critical_health_ratio: Self::DEFAULT_CRITICAL_HEALTH_RATIO,
            heal_threshold: Self::DEFAULT_HEAL_THRESHOLD,
            ultimate_energy: Self::DEFAULT_ULTIMATE_ENERGY,
            threat_skill_threshold: Self::DEFAULT_THREAT_SKILL_THRESHOLD,
            fallback_damage: Self::DEFAULT_FALLBACK_DAMAGE,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}
