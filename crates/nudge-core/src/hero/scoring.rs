//! Hero scoring terms.
//!
//! Each term is a small function of the task, the current energy and "now".
//! The total is a plain sum; higher wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::task::{EnergyLevel, Task};

/// Per-term score for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub overdue: i32,
    pub stale: i32,
    pub energy: i32,
    pub due_today: i32,
    pub quick_win: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.overdue + self.stale + self.energy + self.due_today + self.quick_win
    }
}

/// Overdue bonus (+100 by default).
pub fn overdue_score(task: &Task, now: DateTime<Utc>, config: &SelectionConfig) -> i32 {
    if task.is_overdue(now) {
        config.overdue_bonus
    } else {
        0
    }
}

/// Staleness bonus: points per day once the task is old enough, capped.
pub fn stale_score(task: &Task, now: DateTime<Utc>, config: &SelectionConfig) -> i32 {
    let days = task.age_days(now);
    if days < config.stale_after_days {
        return 0;
    }
    let days = i32::try_from(days).unwrap_or(i32::MAX);
    days.saturating_mul(config.stale_points_per_day)
        .min(config.stale_cap)
}

/// Energy match: bonus when the task fits current energy, penalty when it
/// needs more. Untagged tasks are neutral.
pub fn energy_score(task: &Task, current: EnergyLevel, config: &SelectionConfig) -> i32 {
    match task.energy {
        Some(required) if required <= current => config.energy_match_bonus,
        Some(_) => -config.energy_mismatch_penalty,
        None => 0,
    }
}

/// Due later today, not yet overdue.
pub fn due_today_score(task: &Task, now: DateTime<Utc>, config: &SelectionConfig) -> i32 {
    if task.is_due_today(now) {
        config.due_today_bonus
    } else {
        0
    }
}

/// Small nudge toward quick wins.
pub fn quick_win_score(task: &Task, config: &SelectionConfig) -> i32 {
    if is_quick_win(task, config) {
        config.quick_win_bonus
    } else {
        0
    }
}

pub(crate) fn is_quick_win(task: &Task, config: &SelectionConfig) -> bool {
    task.estimated_minutes
        .is_some_and(|m| m <= config.quick_win_minutes)
}

/// All terms for one candidate.
pub fn calculate_score(
    task: &Task,
    current: EnergyLevel,
    now: DateTime<Utc>,
    config: &SelectionConfig,
) -> ScoreBreakdown {
    ScoreBreakdown {
        overdue: overdue_score(task, now, config),
        stale: stale_score(task, now, config),
        energy: energy_score(task, current, config),
        due_today: due_today_score(task, now, config),
        quick_win: quick_win_score(task, config),
    }
}
