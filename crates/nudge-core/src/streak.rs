//! Day-rollover streak evaluation.
//!
//! The streak counts consecutive days with at least one completed task. It is
//! evaluated once per detected date change, never on a timer. Re-running the
//! rollover for a day that was already rolled over is a no-op, so multiple
//! "app became active" signals on the same day cannot double-increment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a rollover did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// Same day (or clock moved backwards); nothing evaluated
    Unchanged,
    Extended,
    Broken,
}

/// Result of [`rollover_streak`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRollover {
    pub streak: u32,
    pub change: StreakChange,
    /// Date to remember as the last rollover
    pub last_active: NaiveDate,
}

/// Evaluate the streak for a date change.
///
/// * `last_active` - day of the previous rollover, `None` on first launch
/// * `today` - current calendar day
/// * `completed_on_last_active_day` - whether anything was completed on
///   `last_active`
/// * `current` - streak before this rollover
pub fn rollover_streak(
    last_active: Option<NaiveDate>,
    today: NaiveDate,
    completed_on_last_active_day: bool,
    current: u32,
) -> StreakRollover {
    let Some(last) = last_active else {
        return StreakRollover {
            streak: current,
            change: StreakChange::Unchanged,
            last_active: today,
        };
    };

    if today <= last {
        return StreakRollover {
            streak: current,
            change: StreakChange::Unchanged,
            last_active: last,
        };
    }

    let consecutive = last.succ_opt() == Some(today);
    if consecutive && completed_on_last_active_day {
        StreakRollover {
            streak: current.saturating_add(1),
            change: StreakChange::Extended,
            last_active: today,
        }
    } else {
        StreakRollover {
            streak: 0,
            change: StreakChange::Broken,
            last_active: today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    #[test]
    fn first_launch_records_date_only() {
        let r = rollover_streak(None, day(1), true, 0);
        assert_eq!(r.streak, 0);
        assert_eq!(r.change, StreakChange::Unchanged);
        assert_eq!(r.last_active, day(1));
    }

    #[test]
    fn next_day_with_completion_extends() {
        let r = rollover_streak(Some(day(1)), day(2), true, 4);
        assert_eq!(r.streak, 5);
        assert_eq!(r.change, StreakChange::Extended);
        assert_eq!(r.last_active, day(2));
    }

    #[test]
    fn next_day_without_completion_breaks() {
        let r = rollover_streak(Some(day(1)), day(2), false, 4);
        assert_eq!(r.streak, 0);
        assert_eq!(r.change, StreakChange::Broken);
    }

    #[test]
    fn gap_of_several_days_breaks() {
        let r = rollover_streak(Some(day(1)), day(4), true, 9);
        assert_eq!(r.streak, 0);
        assert_eq!(r.change, StreakChange::Broken);
    }

    #[test]
    fn same_day_is_idempotent() {
        let first = rollover_streak(Some(day(1)), day(2), true, 2);
        let second = rollover_streak(Some(first.last_active), day(2), true, first.streak);
        assert_eq!(second.streak, 3);
        assert_eq!(second.change, StreakChange::Unchanged);
    }

    #[test]
    fn clock_going_backwards_changes_nothing() {
        let r = rollover_streak(Some(day(5)), day(3), false, 7);
        assert_eq!(r.streak, 7);
        assert_eq!(r.last_active, day(5));
    }
}
