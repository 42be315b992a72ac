//! TOML-based engine configuration.
//!
//! Every tunable constant of the engine lives here:
//! - Hero scoring weights
//! - Paralysis threshold
//! - Reward tier weights and values, streak multiplier, level and stage tables
//! - Daily challenge rewards and level gates
//! - Accessory tier costs and the wardrobe catalog
//!
//! Configuration is stored at `~/.config/nudge/config.toml` unless
//! `NUDGE_HOME` points elsewhere. Missing keys fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::wardrobe::AccessoryTier;

/// Hero task scoring weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub overdue_bonus: i32,
    /// Age in days at which a task starts counting as stale
    pub stale_after_days: i64,
    pub stale_points_per_day: i32,
    pub stale_cap: i32,
    pub energy_match_bonus: i32,
    /// Subtracted when the task needs more energy than is available
    pub energy_mismatch_penalty: i32,
    pub due_today_bonus: i32,
    pub quick_win_bonus: i32,
    pub quick_win_minutes: u32,
    /// Estimate assumed for quick-catch ordering when a task has none
    pub unknown_estimate_minutes: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            overdue_bonus: 100,
            stale_after_days: 3,
            stale_points_per_day: 2,
            stale_cap: 40,
            energy_match_bonus: 15,
            energy_mismatch_penalty: 20,
            due_today_bonus: 10,
            quick_win_bonus: 5,
            quick_win_minutes: 10,
            unknown_estimate_minutes: 30,
        }
    }
}

/// Skip cycle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipConfig {
    /// Consecutive skips that raise the paralysis flag
    pub paralysis_threshold: u32,
}

impl Default for SkipConfig {
    fn default() -> Self {
        Self {
            paralysis_threshold: 3,
        }
    }
}

/// Relative draw weights for the ordinary reward tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierWeights {
    pub common: u32,
    pub uncommon: u32,
    pub rare: u32,
    pub legendary: u32,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            common: 70,
            uncommon: 20,
            rare: 8,
            legendary: 2,
        }
    }
}

/// Base snowflake value per ordinary reward tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierValues {
    pub common: u64,
    pub uncommon: u64,
    pub rare: u64,
    pub legendary: u64,
}

impl Default for TierValues {
    fn default() -> Self {
        Self {
            common: 1,
            uncommon: 2,
            rare: 4,
            legendary: 8,
        }
    }
}

/// Reward economy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub tier_weights: TierWeights,
    pub tier_values: TierValues,
    pub all_clear_bonus: u64,
    pub streak_multiplier: u64,
    /// Streak length from which the multiplier applies
    pub streak_multiplier_after: u32,
    /// Lifetime snowflakes needed for each level; level = thresholds reached
    pub level_thresholds: Vec<u64>,
    /// First level of each stage, in stage order
    pub stage_start_levels: [u32; 5],
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            tier_weights: TierWeights::default(),
            tier_values: TierValues::default(),
            all_clear_bonus: 15,
            streak_multiplier: 2,
            streak_multiplier_after: 3,
            level_thresholds: vec![0, 50, 150, 300, 500, 800, 1200, 1700, 2300, 3000],
            stage_start_levels: [1, 3, 5, 7, 9],
        }
    }
}

/// Daily challenge rewards and gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    pub max_daily: usize,
    pub complete_one_reward: u64,
    pub complete_three_reward: u64,
    pub complete_three_level: u32,
    pub brain_dump_reward: u64,
    pub brain_dump_level: u32,
    pub clear_all_reward: u64,
    pub clear_all_level: u32,
    pub before_noon_reward: u64,
    pub before_noon_level: u32,
    pub streak_min: u32,
    pub streak_base_reward: u64,
    pub streak_reward_per_day: u64,
    pub streak_reward_cap: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            max_daily: 3,
            complete_one_reward: 3,
            complete_three_reward: 5,
            complete_three_level: 2,
            brain_dump_reward: 4,
            brain_dump_level: 3,
            clear_all_reward: 10,
            clear_all_level: 4,
            before_noon_reward: 6,
            before_noon_level: 5,
            streak_min: 2,
            streak_base_reward: 2,
            streak_reward_per_day: 1,
            streak_reward_cap: 15,
        }
    }
}

/// Snowflake cost per accessory tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierCosts {
    pub tier1: u64,
    pub tier2: u64,
    pub tier3: u64,
    pub tier4: u64,
}

impl Default for TierCosts {
    fn default() -> Self {
        Self {
            tier1: 5,
            tier2: 15,
            tier3: 30,
            tier4: 50,
        }
    }
}

/// A wardrobe catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoryDef {
    pub id: String,
    pub name: String,
    pub tier: AccessoryTier,
}

impl AccessoryDef {
    fn new(id: &str, name: &str, tier: AccessoryTier) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tier,
        }
    }
}

/// Wardrobe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardrobeConfig {
    pub tier_costs: TierCosts,
    pub catalog: Vec<AccessoryDef>,
}

impl Default for WardrobeConfig {
    fn default() -> Self {
        use AccessoryTier::*;
        Self {
            tier_costs: TierCosts::default(),
            catalog: vec![
                AccessoryDef::new("scarf", "Cozy Scarf", Tier1),
                AccessoryDef::new("earmuffs", "Earmuffs", Tier1),
                AccessoryDef::new("beanie", "Knit Beanie", Tier1),
                AccessoryDef::new("sunglasses", "Sunglasses", Tier2),
                AccessoryDef::new("bow_tie", "Bow Tie", Tier2),
                AccessoryDef::new("headphones", "Headphones", Tier2),
                AccessoryDef::new("top_hat", "Top Hat", Tier3),
                AccessoryDef::new("backpack", "Explorer Backpack", Tier3),
                AccessoryDef::new("crown", "Ice Crown", Tier4),
                AccessoryDef::new("cape", "Aurora Cape", Tier4),
            ],
        }
    }
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/nudge/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub skip: SkipConfig,
    #[serde(default)]
    pub rewards: RewardConfig,
    #[serde(default)]
    pub challenges: ChallengeConfig,
    #[serde(default)]
    pub wardrobe: WardrobeConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Check the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rewards = &self.rewards;
        let thresholds = &rewards.level_thresholds;
        if thresholds.first() != Some(&0) {
            return Err(ConfigError::invalid(
                "rewards.level_thresholds",
                "must start with 0",
            ));
        }
        if thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(
                "rewards.level_thresholds",
                "must be strictly increasing",
            ));
        }

        let stages = &rewards.stage_start_levels;
        if stages[0] != 1 || stages.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(
                "rewards.stage_start_levels",
                "must start at level 1 and be strictly increasing",
            ));
        }
        let max_level = u32::try_from(thresholds.len()).unwrap_or(u32::MAX);
        if stages[4] > max_level {
            return Err(ConfigError::invalid(
                "rewards.stage_start_levels",
                format!(
                    "last stage starts at level {} but only {} levels exist",
                    stages[4], max_level
                ),
            ));
        }

        let w = &rewards.tier_weights;
        let total_weight = [w.common, w.uncommon, w.rare, w.legendary]
            .into_iter()
            .try_fold(0u32, u32::checked_add)
            .ok_or_else(|| ConfigError::invalid("rewards.tier_weights", "sum overflows"))?;
        if total_weight == 0 {
            return Err(ConfigError::invalid(
                "rewards.tier_weights",
                "at least one weight must be positive",
            ));
        }
        if rewards.streak_multiplier == 0 {
            return Err(ConfigError::invalid(
                "rewards.streak_multiplier",
                "must be at least 1",
            ));
        }

        if self.skip.paralysis_threshold == 0 {
            return Err(ConfigError::invalid(
                "skip.paralysis_threshold",
                "must be at least 1",
            ));
        }

        if !(1..=3).contains(&self.challenges.max_daily) {
            return Err(ConfigError::invalid(
                "challenges.max_daily",
                "must be between 1 and 3",
            ));
        }

        let mut seen = HashSet::new();
        for item in &self.wardrobe.catalog {
            if !seen.insert(item.id.as_str()) {
                return Err(ConfigError::invalid(
                    "wardrobe.catalog",
                    format!("duplicate accessory id '{}'", item.id),
                ));
            }
        }

        Ok(())
    }
}

/// Directory holding config and persisted economy state.
///
/// `NUDGE_HOME` overrides the default `~/.config/nudge`.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("NUDGE_HOME") {
        Some(home) => PathBuf::from(home),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("nudge"),
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::LoadFailed {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
