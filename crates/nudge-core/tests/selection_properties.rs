//! Property tests for hero selection and the skip cycle.

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use nudge_core::{EnergyLevel, HeroSelector, SkipCycleTracker, Task};
use proptest::prelude::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 14, 13, 0, 0).unwrap()
}

fn energy() -> impl Strategy<Value = EnergyLevel> {
    prop_oneof![
        Just(EnergyLevel::Low),
        Just(EnergyLevel::Medium),
        Just(EnergyLevel::High),
    ]
}

/// (age hours, due offset hours, estimate, energy)
fn task_strategy() -> impl Strategy<Value = (i64, Option<i64>, Option<u32>, Option<EnergyLevel>)> {
    (
        0i64..24 * 60,
        proptest::option::of(-72i64..72),
        proptest::option::of(1u32..120),
        proptest::option::of(energy()),
    )
}

fn build(index: usize, shape: (i64, Option<i64>, Option<u32>, Option<EnergyLevel>)) -> Task {
    let (age, due, estimate, energy) = shape;
    let mut task = Task::new(format!("t{index}"), format!("Task {index}"), now() - Duration::hours(age));
    task.due_at = due.map(|h| now() + Duration::hours(h));
    task.estimated_minutes = estimate;
    task.energy = energy;
    task
}

fn pool_strategy() -> impl Strategy<Value = Vec<Task>> {
    proptest::collection::vec(task_strategy(), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, s)| build(i, s))
            .collect()
    })
}

proptest! {
    #[test]
    fn pick_best_returns_member_of_pool(pool in pool_strategy(), current in energy()) {
        let selector = HeroSelector::new();
        match selector.pick_best(&pool, current, now()) {
            Some(hero) => prop_assert!(pool.iter().any(|t| t.id == hero.id)),
            None => prop_assert!(pool.is_empty()),
        }
    }

    #[test]
    fn pick_best_has_maximal_score(pool in pool_strategy(), current in energy()) {
        let selector = HeroSelector::new();
        if let Some(hero) = selector.pick_best(&pool, current, now()) {
            let best = selector.score(hero, current, now()).total();
            let first_best = pool
                .iter()
                .position(|t| selector.score(t, current, now()).total() == best)
                .unwrap();
            for t in &pool {
                prop_assert!(selector.score(t, current, now()).total() <= best);
            }
            prop_assert_eq!(&pool[first_best].id, &hero.id);
        }
    }

    #[test]
    fn overdue_outranks_any_non_overdue_mismatch(
        age in 0i64..24 * 365,
        other in task_strategy(),
    ) {
        let selector = HeroSelector::new();
        let overdue = Task::new("late", "Late", now() - Duration::hours(age))
            .with_due(now() - Duration::minutes(1))
            .with_estimate(60)
            .with_energy(EnergyLevel::High);
        let mut rival = build(1, other);
        if rival.is_overdue(now()) {
            rival.due_at = Some(now() + Duration::minutes(30));
        }
        rival.energy = Some(EnergyLevel::High);

        let pool = vec![rival, overdue];
        let hero = selector.pick_best(&pool, EnergyLevel::Low, now()).unwrap();
        prop_assert_eq!(&hero.id, "late");
    }

    #[test]
    fn quick_catch_has_minimal_estimate(pool in pool_strategy(), excluded in proptest::collection::hash_set(0usize..12, 0..6)) {
        let selector = HeroSelector::new();
        let excluding: HashSet<String> = excluded.iter().map(|i| format!("t{i}")).collect();
        let estimate = |t: &Task| t.estimated_minutes.unwrap_or(30);

        match selector.find_quick_catch(&pool, &excluding) {
            None => prop_assert!(pool.is_empty()),
            Some(pick) => {
                let eligible: Vec<&Task> = pool.iter().filter(|t| !excluding.contains(&t.id)).collect();
                let considered: Vec<&Task> = if eligible.is_empty() { pool.iter().collect() } else { eligible };
                prop_assert!(considered.iter().any(|t| t.id == pick.id));
                for t in considered {
                    prop_assert!(estimate(pick) <= estimate(t));
                }
            }
        }
    }

    #[test]
    fn paralysis_after_threshold_skips(ids in proptest::collection::vec("[a-z]{1,4}", 0..8)) {
        let mut tracker = SkipCycleTracker::new();
        for id in &ids {
            tracker.record_skip(id);
        }
        prop_assert_eq!(tracker.is_paralyzed(), ids.len() >= 3);
        prop_assert_eq!(tracker.skip_count() as usize, ids.len());

        tracker.record_completion();
        prop_assert_eq!(tracker.skip_count(), 0);
        prop_assert!(!tracker.is_paralyzed());
    }
}

#[test]
fn selection_is_stable_across_calls() {
    let selector = HeroSelector::new();
    let pool: Vec<Task> = (0..5)
        .map(|i| Task::new(format!("t{i}"), "same", now()))
        .collect();
    for _ in 0..20 {
        assert_eq!(selector.pick_best(&pool, EnergyLevel::Medium, now()).unwrap().id, "t0");
    }
}
