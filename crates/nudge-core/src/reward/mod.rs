//! Reward economy: species draw, payouts, levels and stages.
//!
//! Completing a task draws a species (reward tier) at random. The draw is
//! deliberately not a function of the task: variable rewards keep the loop
//! interesting. Randomness always comes from a caller-supplied generator so
//! tests can seed it.

mod level;

pub use level::{level_for, stage_for, LevelProgress, StageTier};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RewardConfig;
use crate::task::Task;

/// Rarity class of a completion reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardTier {
    Common,
    Uncommon,
    Rare,
    Legendary,
    /// Reserved for clearing the whole list; never drawn
    AllClear,
}

impl RewardTier {
    /// Tiers that take part in the ordinary draw, in draw order.
    pub const DRAWABLE: [RewardTier; 4] = [
        RewardTier::Common,
        RewardTier::Uncommon,
        RewardTier::Rare,
        RewardTier::Legendary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RewardTier::Common => "common",
            RewardTier::Uncommon => "uncommon",
            RewardTier::Rare => "rare",
            RewardTier::Legendary => "legendary",
            RewardTier::AllClear => "all-clear",
        }
    }
}

impl fmt::Display for RewardTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Species and payout for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub species: RewardTier,
    pub payout: u64,
}

/// Pure reward rules over a [`RewardConfig`].
#[derive(Debug, Clone, Default)]
pub struct RewardEconomy {
    config: RewardConfig,
}

impl RewardEconomy {
    /// Create with default tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom tables.
    pub fn with_config(config: RewardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    fn weight(&self, tier: RewardTier) -> u32 {
        let w = &self.config.tier_weights;
        match tier {
            RewardTier::Common => w.common,
            RewardTier::Uncommon => w.uncommon,
            RewardTier::Rare => w.rare,
            RewardTier::Legendary => w.legendary,
            RewardTier::AllClear => 0,
        }
    }

    /// Base snowflake value of a tier, before the streak multiplier.
    pub fn base_value(&self, tier: RewardTier) -> u64 {
        let v = &self.config.tier_values;
        match tier {
            RewardTier::Common => v.common,
            RewardTier::Uncommon => v.uncommon,
            RewardTier::Rare => v.rare,
            RewardTier::Legendary => v.legendary,
            RewardTier::AllClear => self.config.all_clear_bonus,
        }
    }

    /// Weighted draw over the ordinary tiers, independent per call.
    pub fn species_for_task<R: Rng + ?Sized>(&self, _task: &Task, rng: &mut R) -> RewardTier {
        let total: u64 = RewardTier::DRAWABLE
            .iter()
            .map(|&t| u64::from(self.weight(t)))
            .sum();
        if total == 0 {
            return RewardTier::Common;
        }

        let mut roll = rng.gen_range(0..total);
        for tier in RewardTier::DRAWABLE {
            let w = u64::from(self.weight(tier));
            if roll < w {
                return tier;
            }
            roll -= w;
        }
        RewardTier::Common
    }

    /// Multiplier earned by a streak of `streak` days.
    pub fn streak_multiplier(&self, streak: u32) -> u64 {
        if streak >= self.config.streak_multiplier_after {
            self.config.streak_multiplier
        } else {
            1
        }
    }

    /// Payout for a known species. The all-clear bonus ignores the streak.
    pub fn payout_for(&self, species: RewardTier, streak: u32) -> u64 {
        match species {
            RewardTier::AllClear => self.config.all_clear_bonus,
            tier => self
                .base_value(tier)
                .saturating_mul(self.streak_multiplier(streak)),
        }
    }

    /// Draw (unless the list was just cleared) and price one completion.
    pub fn award<R: Rng + ?Sized>(
        &self,
        task: &Task,
        streak: u32,
        is_all_clear: bool,
        rng: &mut R,
    ) -> Award {
        let species = if is_all_clear {
            RewardTier::AllClear
        } else {
            self.species_for_task(task, rng)
        };
        Award {
            species,
            payout: self.payout_for(species, streak),
        }
    }

    pub fn level(&self, lifetime_earned: u64) -> u32 {
        level_for(&self.config.level_thresholds, lifetime_earned)
    }

    pub fn stage(&self, level: u32) -> StageTier {
        stage_for(&self.config.stage_start_levels, level)
    }

    pub fn progress(&self, lifetime_earned: u64) -> LevelProgress {
        LevelProgress::compute(&self.config.level_thresholds, lifetime_earned)
    }
}
