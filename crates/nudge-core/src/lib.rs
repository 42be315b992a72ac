//! # Nudge Core Library
//!
//! This library provides the decision logic behind the Nudge task companion:
//! which single task to show next, when repeated skipping means the user is
//! stuck, and the snowflake economy that rewards finishing things.
//!
//! The engine never persists anything and never performs I/O. It is called
//! synchronously on discrete events (refresh, skip, complete, unlock,
//! day rollover) and returns plain data for the caller to render and store.
//!
//! ## Key Components
//!
//! - [`HeroSelector`]: Scores the active pool and explains its pick
//! - [`SkipCycleTracker`]: Counts skips and raises the paralysis flag
//! - [`RewardEconomy`]: Species draw, payouts, levels and stages
//! - [`ChallengeGenerator`] / [`ChallengeBoard`]: Daily micro-challenges
//! - [`Wardrobe`]: Accessory unlocks and equipping
//! - [`Economy`]: The single shared, lock-guarded economy state
//! - [`Companion`]: Session facade wiring all of the above together

pub mod challenge;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod events;
pub mod hero;
pub mod reward;
pub mod skip;
pub mod streak;
pub mod task;
pub mod wardrobe;

pub use challenge::{
    evaluate, ChallengeBoard, ChallengeCompletion, ChallengeCounters, ChallengeGenerator,
    ChallengeKind, ChallengeProgress, DailyChallenge,
};
pub use config::{data_dir, EngineConfig};
pub use economy::{
    AwardOutcome, CompletionCredit, CreditOutcome, Economy, EconomyState, StageUp,
};
pub use engine::{
    Companion, CompletionContext, CompletionOutcome, ParalysisPrompt, RecoveryOption,
    SkipResponse,
};
pub use error::{ConfigError, EngineError};
pub use events::Event;
pub use hero::{HeroPick, HeroReason, HeroSelector, ScoreBreakdown};
pub use reward::{Award, LevelProgress, RewardEconomy, RewardTier, StageTier};
pub use skip::{SkipCycleTracker, SkipOutcome, SkipPhase};
pub use streak::{rollover_streak, StreakChange, StreakRollover};
pub use task::{ActionType, EnergyLevel, Task};
pub use wardrobe::{AccessoryTier, Wardrobe};
