//! Levels and stages.
//!
//! Level is a step function of lifetime snowflakes, so spending never lowers
//! it. Stages group contiguous level ranges into the five scenes the
//! companion lives in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named progression stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageTier {
    BareIce,
    SnowNest,
    FishingPier,
    CozyCamp,
    SummitLodge,
}

impl StageTier {
    pub const ALL: [StageTier; 5] = [
        StageTier::BareIce,
        StageTier::SnowNest,
        StageTier::FishingPier,
        StageTier::CozyCamp,
        StageTier::SummitLodge,
    ];

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            StageTier::BareIce => "Bare Ice",
            StageTier::SnowNest => "Snow Nest",
            StageTier::FishingPier => "Fishing Pier",
            StageTier::CozyCamp => "Cozy Camp",
            StageTier::SummitLodge => "Summit Lodge",
        }
    }
}

impl fmt::Display for StageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Number of thresholds reached by `lifetime_earned`.
pub fn level_for(thresholds: &[u64], lifetime_earned: u64) -> u32 {
    let reached = thresholds.iter().filter(|&&t| t <= lifetime_earned).count();
    u32::try_from(reached).unwrap_or(u32::MAX)
}

/// Stage whose range contains `level`. Levels below the first stage start
/// count as the first stage.
pub fn stage_for(stage_start_levels: &[u32; 5], level: u32) -> StageTier {
    stage_start_levels
        .iter()
        .rposition(|&start| start <= level)
        .map(|i| StageTier::ALL[i])
        .unwrap_or(StageTier::BareIce)
}

/// Progress within the current level, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    /// Lifetime snowflakes at which the current level began
    pub level_floor: u64,
    /// Lifetime snowflakes needed for the next level; `None` at max level
    pub next_threshold: Option<u64>,
    pub lifetime_earned: u64,
}

impl LevelProgress {
    pub fn compute(thresholds: &[u64], lifetime_earned: u64) -> Self {
        let level = level_for(thresholds, lifetime_earned);
        let idx = level as usize;
        Self {
            level,
            level_floor: idx
                .checked_sub(1)
                .and_then(|i| thresholds.get(i).copied())
                .unwrap_or(0),
            next_threshold: thresholds.get(idx).copied(),
            lifetime_earned,
        }
    }

    /// Snowflakes still needed for the next level.
    pub fn remaining(&self) -> Option<u64> {
        self.next_threshold
            .map(|next| next.saturating_sub(self.lifetime_earned))
    }

    /// Fraction of the current level completed (1.0 at max level).
    pub fn fraction(&self) -> f64 {
        match self.next_threshold {
            Some(next) if next > self.level_floor => {
                (self.lifetime_earned - self.level_floor) as f64
                    / (next - self.level_floor) as f64
            }
            _ => 1.0,
        }
    }
}
