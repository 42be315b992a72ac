//! Daily micro-challenges.
//!
//! Up to three small goals per calendar day, unlocked gradually by level.
//! Generation is a pure function of (level, streak, day): regenerating
//! mid-day yields the same ids, so a challenge can never pay out twice.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ChallengeConfig;
use crate::error::{EngineError, Result};

/// What a challenge asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChallengeKind {
    CompleteTasks { count: u32 },
    ClearAll,
    BrainDump,
    MaintainStreak,
    CompleteBeforeNoon,
}

impl ChallengeKind {
    fn slug(&self) -> String {
        match self {
            ChallengeKind::CompleteTasks { count } => format!("complete-{}", count),
            ChallengeKind::ClearAll => "clear-all".to_string(),
            ChallengeKind::BrainDump => "brain-dump".to_string(),
            ChallengeKind::MaintainStreak => "maintain-streak".to_string(),
            ChallengeKind::CompleteBeforeNoon => "before-noon".to_string(),
        }
    }
}

/// One of today's challenges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub id: String,
    pub title: String,
    /// Bonus snowflakes paid on completion
    pub reward: u64,
    pub kind: ChallengeKind,
    pub completed: bool,
}

/// Live counters supplied by the task store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeCounters {
    pub tasks_completed_today: u32,
    pub all_cleared: bool,
    pub brain_dump_done: bool,
    pub completed_before_noon: bool,
}

/// Progress toward a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub current: u32,
    pub total: u32,
}

impl ChallengeProgress {
    fn binary(done: bool) -> Self {
        Self {
            current: done as u32,
            total: 1,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

/// Builds and evaluates daily challenges.
#[derive(Debug, Clone, Default)]
pub struct ChallengeGenerator {
    config: ChallengeConfig,
}

impl ChallengeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ChallengeConfig) -> Self {
        Self { config }
    }

    /// Today's challenges, in fixed priority order, truncated to the daily
    /// maximum.
    pub fn generate_daily(&self, level: u32, streak: u32, day: NaiveDate) -> Vec<DailyChallenge> {
        let cfg = &self.config;
        let mut candidates: Vec<(ChallengeKind, String, u64)> = vec![(
            ChallengeKind::CompleteTasks { count: 1 },
            "Complete 1 task".to_string(),
            cfg.complete_one_reward,
        )];

        if level >= cfg.complete_three_level {
            candidates.push((
                ChallengeKind::CompleteTasks { count: 3 },
                "Complete 3 tasks".to_string(),
                cfg.complete_three_reward,
            ));
        }
        if level >= cfg.brain_dump_level {
            candidates.push((
                ChallengeKind::BrainDump,
                "Do a brain unload".to_string(),
                cfg.brain_dump_reward,
            ));
        }
        if level >= cfg.clear_all_level {
            candidates.push((
                ChallengeKind::ClearAll,
                "Clear all your tasks".to_string(),
                cfg.clear_all_reward,
            ));
        }
        if level >= cfg.before_noon_level {
            candidates.push((
                ChallengeKind::CompleteBeforeNoon,
                "Complete a task before noon".to_string(),
                cfg.before_noon_reward,
            ));
        }
        if streak >= cfg.streak_min {
            let reward = cfg
                .streak_base_reward
                .saturating_add(cfg.streak_reward_per_day.saturating_mul(u64::from(streak)))
                .min(cfg.streak_reward_cap);
            candidates.push((
                ChallengeKind::MaintainStreak,
                format!("Keep your {}-day streak alive", streak),
                reward,
            ));
        }

        candidates
            .into_iter()
            .take(cfg.max_daily.min(3))
            .map(|(kind, title, reward)| DailyChallenge {
                id: format!("{}:{}", day, kind.slug()),
                title,
                reward,
                kind,
                completed: false,
            })
            .collect()
    }

    /// Progress of one challenge against live counters.
    pub fn evaluate(&self, challenge: &DailyChallenge, counters: &ChallengeCounters) -> ChallengeProgress {
        evaluate(challenge, counters)
    }
}

/// Progress of one challenge against live counters.
pub fn evaluate(challenge: &DailyChallenge, counters: &ChallengeCounters) -> ChallengeProgress {
    match challenge.kind {
        ChallengeKind::CompleteTasks { count } => ChallengeProgress {
            current: counters.tasks_completed_today.min(count),
            total: count,
        },
        ChallengeKind::MaintainStreak => {
            ChallengeProgress::binary(counters.tasks_completed_today > 0)
        }
        ChallengeKind::ClearAll => ChallengeProgress::binary(counters.all_cleared),
        ChallengeKind::BrainDump => ChallengeProgress::binary(counters.brain_dump_done),
        ChallengeKind::CompleteBeforeNoon => {
            ChallengeProgress::binary(counters.completed_before_noon)
        }
    }
}

/// A challenge that just paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeCompletion {
    pub id: String,
    pub title: String,
    pub reward: u64,
}

/// Today's challenge set with completion flags.
#[derive(Debug, Clone, Default)]
pub struct ChallengeBoard {
    generator: ChallengeGenerator,
    day: Option<NaiveDate>,
    challenges: Vec<DailyChallenge>,
}

impl ChallengeBoard {
    pub fn new(generator: ChallengeGenerator) -> Self {
        Self {
            generator,
            day: None,
            challenges: Vec::new(),
        }
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.day
    }

    pub fn challenges(&self) -> &[DailyChallenge] {
        &self.challenges
    }

    /// Regenerate for `day`. Completion flags survive within the same day;
    /// a new day starts clean.
    pub fn refresh(&mut self, level: u32, streak: u32, day: NaiveDate) -> &[DailyChallenge] {
        let mut fresh = self.generator.generate_daily(level, streak, day);
        if self.day == Some(day) {
            for challenge in &mut fresh {
                challenge.completed = self
                    .challenges
                    .iter()
                    .any(|old| old.id == challenge.id && old.completed);
            }
        } else {
            debug!(%day, count = fresh.len(), "daily challenges generated");
        }
        self.day = Some(day);
        self.challenges = fresh;
        &self.challenges
    }

    /// Rebuild the board from persisted completion ids. Ids from another
    /// day are ignored.
    pub fn restore(&mut self, level: u32, streak: u32, day: NaiveDate, completed_ids: &[String]) {
        self.day = Some(day);
        self.challenges = self.generator.generate_daily(level, streak, day);
        for challenge in &mut self.challenges {
            challenge.completed = completed_ids.contains(&challenge.id);
        }
    }

    /// Ids completed today, for persistence.
    pub fn completed_ids(&self) -> Vec<String> {
        self.challenges
            .iter()
            .filter(|c| c.completed)
            .map(|c| c.id.clone())
            .collect()
    }

    fn get(&self, challenge_id: &str) -> Result<&DailyChallenge> {
        self.challenges
            .iter()
            .find(|c| c.id == challenge_id)
            .ok_or_else(|| EngineError::InvalidChallengeState(challenge_id.to_string()))
    }

    /// Progress of one of today's challenges.
    pub fn evaluate(&self, challenge_id: &str, counters: &ChallengeCounters) -> Result<ChallengeProgress> {
        Ok(evaluate(self.get(challenge_id)?, counters))
    }

    /// Flag a challenge complete. Returns the reward the first time, `None`
    /// if it was already complete.
    pub fn mark_complete(&mut self, challenge_id: &str) -> Result<Option<u64>> {
        let challenge = self
            .challenges
            .iter_mut()
            .find(|c| c.id == challenge_id)
            .ok_or_else(|| EngineError::InvalidChallengeState(challenge_id.to_string()))?;

        if challenge.completed {
            return Ok(None);
        }
        challenge.completed = true;
        info!(challenge_id, reward = challenge.reward, "challenge completed");
        Ok(Some(challenge.reward))
    }

    /// Complete every challenge the counters now satisfy.
    pub fn settle(&mut self, counters: &ChallengeCounters) -> Vec<ChallengeCompletion> {
        let ready: Vec<String> = self
            .challenges
            .iter()
            .filter(|c| !c.completed && evaluate(c, counters).is_complete())
            .map(|c| c.id.clone())
            .collect();

        let mut completions = Vec::new();
        for id in ready {
            if let Ok(Some(reward)) = self.mark_complete(&id) {
                let title = self.get(&id).map(|c| c.title.clone()).unwrap_or_default();
                completions.push(ChallengeCompletion { id, title, reward });
            }
        }
        completions
    }
}
