use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::economy::StageUp;
use crate::hero::HeroReason;
use crate::reward::RewardTier;
use crate::streak::StreakChange;

/// Every engine decision produces an Event.
/// The UI drains them to drive celebrations, prompts and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HeroSelected {
        task_id: String,
        score: i32,
        reason: HeroReason,
        at: DateTime<Utc>,
    },
    /// Refresh found nothing to show.
    NoHeroAvailable {
        at: DateTime<Utc>,
    },
    TaskSkipped {
        task_id: String,
        skip_count: u32,
        at: DateTime<Utc>,
    },
    /// Skip count reached the threshold; the recovery prompt should open.
    ParalysisDetected {
        skip_count: u32,
        quick_catch_id: Option<String>,
        at: DateTime<Utc>,
    },
    ParalysisDismissed {
        at: DateTime<Utc>,
    },
    RewardEarned {
        task_id: String,
        species: RewardTier,
        payout: u64,
        balance: u64,
        at: DateTime<Utc>,
    },
    /// Crossing into a new stage; worth a celebration.
    StageUp {
        stage_up: StageUp,
        at: DateTime<Utc>,
    },
    ChallengeCompleted {
        challenge_id: String,
        reward: u64,
        at: DateTime<Utc>,
    },
    AccessoryUnlocked {
        accessory_id: String,
        balance: u64,
        at: DateTime<Utc>,
    },
    AccessoryEquipToggled {
        accessory_id: String,
        equipped: bool,
        at: DateTime<Utc>,
    },
    DayRolledOver {
        day: NaiveDate,
        streak: u32,
        change: StreakChange,
        at: DateTime<Utc>,
    },
}
