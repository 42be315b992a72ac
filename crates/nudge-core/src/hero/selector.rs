//! Hero selector implementation.
//!
//! Picks the single task to put in front of the user, explains the pick in
//! one sentence, and finds the easiest task for paralysis recovery.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::scoring::{calculate_score, is_quick_win, ScoreBreakdown};
use crate::config::SelectionConfig;
use crate::task::{EnergyLevel, Task};

/// Why a task was chosen as hero. Only the strongest factor is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeroReason {
    Overdue { days_overdue: i64 },
    Stale { days_waiting: i64 },
    DueToday,
    EnergyMatch { energy: EnergyLevel },
    QuickWin { minutes: u32 },
    Generic,
}

impl fmt::Display for HeroReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeroReason::Overdue { days_overdue } if *days_overdue >= 1 => write!(
                f,
                "this one's {} overdue, let's get it off your plate",
                plural_days(*days_overdue)
            ),
            HeroReason::Overdue { .. } => {
                write!(f, "this one just slipped past due, let's get it off your plate")
            }
            HeroReason::Stale { days_waiting } => write!(
                f,
                "this one's been waiting {}, time to set it free",
                plural_days(*days_waiting)
            ),
            HeroReason::DueToday => {
                write!(f, "this one's due today, a good moment to get ahead of it")
            }
            HeroReason::EnergyMatch { energy } => {
                write!(f, "this one fits your {} energy right now", energy)
            }
            HeroReason::QuickWin { minutes } => {
                write!(f, "a quick one to get you going, about {} min", minutes)
            }
            HeroReason::Generic => write!(f, "one small step, you've got this"),
        }
    }
}

fn plural_days(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

/// Result of a refresh: the hero plus its justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroPick {
    pub task: Task,
    pub score: i32,
    pub breakdown: ScoreBreakdown,
    pub reason: HeroReason,
    /// Every candidate had been skipped this session, so skipped tasks were
    /// considered again
    pub recycled_skipped: bool,
}

impl HeroPick {
    pub fn reason_text(&self) -> String {
        self.reason.to_string()
    }
}

/// Scores candidates and picks the hero task.
#[derive(Debug, Clone, Default)]
pub struct HeroSelector {
    config: SelectionConfig,
}

impl HeroSelector {
    /// Create a selector with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom weights.
    pub fn with_config(config: SelectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Score breakdown for one candidate.
    pub fn score(&self, task: &Task, energy: EnergyLevel, now: DateTime<Utc>) -> ScoreBreakdown {
        calculate_score(task, energy, now, &self.config)
    }

    /// Highest-scoring candidate; the earliest one wins ties.
    pub fn pick_best<'a>(
        &self,
        candidates: &'a [Task],
        energy: EnergyLevel,
        now: DateTime<Utc>,
    ) -> Option<&'a Task> {
        let mut best: Option<(&Task, i32)> = None;
        for task in candidates {
            let total = self.score(task, energy, now).total();
            match best {
                Some((_, top)) if total <= top => {}
                _ => best = Some((task, total)),
            }
        }
        best.map(|(task, _)| task)
    }

    /// One-line explanation, using the same priority as scoring:
    /// overdue, stale, due today, energy match, quick win, generic.
    pub fn reason(&self, task: &Task, energy: EnergyLevel, now: DateTime<Utc>) -> HeroReason {
        if let Some(due) = task.due_at.filter(|_| task.is_overdue(now)) {
            return HeroReason::Overdue {
                days_overdue: (now - due).num_days(),
            };
        }

        let age = task.age_days(now);
        if age >= self.config.stale_after_days {
            return HeroReason::Stale { days_waiting: age };
        }

        if task.is_due_today(now) {
            return HeroReason::DueToday;
        }

        if task.energy.is_some_and(|required| required <= energy) {
            return HeroReason::EnergyMatch { energy };
        }

        if is_quick_win(task, &self.config) {
            if let Some(minutes) = task.estimated_minutes {
                return HeroReason::QuickWin { minutes };
            }
        }

        HeroReason::Generic
    }

    /// Refresh flow: pick from the pool minus session-skipped ids, unless
    /// that would leave nothing to pick from.
    pub fn pick_hero(
        &self,
        pool: &[Task],
        skipped: &HashSet<String>,
        energy: EnergyLevel,
        now: DateTime<Utc>,
    ) -> Option<HeroPick> {
        let fresh: Vec<Task> = pool
            .iter()
            .filter(|t| t.is_active() && !skipped.contains(&t.id))
            .cloned()
            .collect();

        let recycled_skipped = fresh.is_empty();
        let candidates: Vec<Task> = if recycled_skipped {
            pool.iter().filter(|t| t.is_active()).cloned().collect()
        } else {
            fresh
        };

        let task = self.pick_best(&candidates, energy, now)?.clone();
        let breakdown = self.score(&task, energy, now);
        let reason = self.reason(&task, energy, now);

        debug!(
            task_id = %task.id,
            score = breakdown.total(),
            candidates = candidates.len(),
            recycled_skipped,
            "hero selected"
        );

        Some(HeroPick {
            score: breakdown.total(),
            breakdown,
            reason,
            recycled_skipped,
            task,
        })
    }

    /// Easiest task: shortest estimate first (unknown counts as
    /// `unknown_estimate_minutes`), then lowest energy requirement.
    /// Excluded ids are ignored unless every task is excluded.
    pub fn find_quick_catch<'a>(
        &self,
        from: &'a [Task],
        excluding: &HashSet<String>,
    ) -> Option<&'a Task> {
        let key = |t: &&Task| {
            (
                t.estimated_minutes
                    .unwrap_or(self.config.unknown_estimate_minutes),
                Reverse(energy_ease(t.energy)),
            )
        };

        from.iter()
            .filter(|t| !excluding.contains(&t.id))
            .min_by_key(key)
            .or_else(|| from.iter().min_by_key(key))
    }
}

/// Ease weight for quick-catch ordering; untagged tasks count as easiest.
fn energy_ease(energy: Option<EnergyLevel>) -> u8 {
    match energy {
        None | Some(EnergyLevel::Low) => 2,
        Some(EnergyLevel::Medium) => 1,
        Some(EnergyLevel::High) => 0,
    }
}
