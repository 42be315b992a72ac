//! Session-level companion engine.
//!
//! [`Companion`] wires the components together for one session (page
//! visit) and implements the discrete events the UI sends:
//!
//! - **refresh**: pick a hero from the active pool, avoiding tasks skipped
//!   this session
//! - **skip**: count the skip; on reaching the threshold, open the paralysis
//!   prompt with a quick catch and a brain-unload option
//! - **complete**: break the skip cycle, pay the reward, settle challenges
//! - **unlock / equip**: wardrobe purchases
//! - **day rollover**: streak evaluation and a fresh challenge set
//!
//! Nothing here performs I/O. Each call returns its result and queues
//! [`Event`]s for the UI to drain.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::challenge::{
    ChallengeBoard, ChallengeCompletion, ChallengeCounters, ChallengeGenerator, ChallengeProgress,
    DailyChallenge,
};
use crate::config::EngineConfig;
use crate::economy::{AwardOutcome, Economy, StageUp};
use crate::error::Result;
use crate::events::Event;
use crate::hero::{HeroPick, HeroSelector};
use crate::skip::{SkipCycleTracker, SkipOutcome};
use crate::streak::StreakRollover;
use crate::task::{EnergyLevel, Task};

/// A way out of paralysis offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "option", rename_all = "snake_case")]
pub enum RecoveryOption {
    /// Do the easiest task left
    QuickCatch { task: Task },
    /// Dump everything on your mind instead
    BrainUnload,
}

/// Prompt shown once the skip threshold is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParalysisPrompt {
    pub skip_count: u32,
    pub options: Vec<RecoveryOption>,
}

/// Result of a skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipResponse {
    pub outcome: SkipOutcome,
    /// Present only on the skip that entered paralysis
    pub prompt: Option<ParalysisPrompt>,
}

/// Facts about a completion that only the task store knows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionContext {
    /// This completion emptied the active list
    pub is_all_clear: bool,
    /// Counters after this completion has been recorded
    pub counters: ChallengeCounters,
}

/// Result of a completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub award: AwardOutcome,
    pub challenges: Vec<ChallengeCompletion>,
    pub challenge_bonus: u64,
    /// Final balance after reward and bonuses
    pub balance: u64,
    /// Stage change caused by the reward or by challenge bonuses
    pub stage_up: Option<StageUp>,
}

/// One session's view of the engine.
#[derive(Debug)]
pub struct Companion {
    selector: HeroSelector,
    skips: SkipCycleTracker,
    board: ChallengeBoard,
    economy: Economy,
    hero: Option<HeroPick>,
    events: Vec<Event>,
}

impl Companion {
    /// Start a session over a shared economy.
    pub fn new(config: &EngineConfig, economy: Economy) -> Self {
        Self {
            selector: HeroSelector::with_config(config.selection.clone()),
            skips: SkipCycleTracker::with_config(config.skip.clone()),
            board: ChallengeBoard::new(ChallengeGenerator::with_config(config.challenges.clone())),
            economy,
            hero: None,
            events: Vec::new(),
        }
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn selector(&self) -> &HeroSelector {
        &self.selector
    }

    pub fn current_hero(&self) -> Option<&HeroPick> {
        self.hero.as_ref()
    }

    pub fn skip_count(&self) -> u32 {
        self.skips.skip_count()
    }

    pub fn is_paralyzed(&self) -> bool {
        self.skips.is_paralyzed()
    }

    pub fn skip_tracker(&self) -> &SkipCycleTracker {
        &self.skips
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Pick the hero for the current pool.
    pub fn refresh(&mut self, pool: &[Task], energy: EnergyLevel, now: DateTime<Utc>) -> Option<&HeroPick> {
        self.hero = self
            .selector
            .pick_hero(pool, self.skips.skipped_ids(), energy, now);

        self.events.push(match &self.hero {
            Some(pick) => Event::HeroSelected {
                task_id: pick.task.id.clone(),
                score: pick.score,
                reason: pick.reason.clone(),
                at: now,
            },
            None => Event::NoHeroAvailable { at: now },
        });
        self.hero.as_ref()
    }

    /// Record a skip of `task_id`; `pool` is used to find the quick catch
    /// when paralysis sets in.
    pub fn skip(&mut self, task_id: &str, pool: &[Task], now: DateTime<Utc>) -> SkipResponse {
        let outcome = self.skips.record_skip(task_id);
        self.events.push(Event::TaskSkipped {
            task_id: task_id.to_string(),
            skip_count: outcome.count,
            at: now,
        });

        let prompt = outcome.entered_paralysis.then(|| {
            let active: Vec<Task> = pool.iter().filter(|t| t.is_active()).cloned().collect();
            let quick_catch = self
                .selector
                .find_quick_catch(&active, self.skips.skipped_ids())
                .cloned();

            self.events.push(Event::ParalysisDetected {
                skip_count: outcome.count,
                quick_catch_id: quick_catch.as_ref().map(|t| t.id.clone()),
                at: now,
            });

            let mut options = Vec::with_capacity(2);
            if let Some(task) = quick_catch {
                options.push(RecoveryOption::QuickCatch { task });
            }
            options.push(RecoveryOption::BrainUnload);
            ParalysisPrompt {
                skip_count: outcome.count,
                options,
            }
        });

        SkipResponse { outcome, prompt }
    }

    /// Close the paralysis prompt without completing anything.
    pub fn dismiss_paralysis(&mut self, now: DateTime<Utc>) {
        self.skips.dismiss_paralysis_prompt();
        self.events.push(Event::ParalysisDismissed { at: now });
    }

    /// Today's challenges at the economy's current level and streak.
    pub fn challenges(&mut self, today: NaiveDate) -> &[DailyChallenge] {
        let level = self.economy.level();
        let streak = self.economy.current_streak();
        self.board.refresh(level, streak, today)
    }

    /// Reload today's challenge completion flags saved by the caller.
    pub fn restore_challenges(&mut self, day: NaiveDate, completed_ids: &[String]) {
        let level = self.economy.level();
        let streak = self.economy.current_streak();
        self.board.restore(level, streak, day, completed_ids);
    }

    /// Ids of today's completed challenges, for persistence.
    pub fn completed_challenge_ids(&self) -> Vec<String> {
        self.board.completed_ids()
    }

    /// Progress of one of today's challenges.
    pub fn evaluate_challenge(&self, challenge_id: &str, counters: &ChallengeCounters) -> Result<ChallengeProgress> {
        self.board.evaluate(challenge_id, counters)
    }

    /// Handle a task completion: break the skip cycle, then pay the reward
    /// and any challenges the new counters satisfy in one economy update.
    pub fn complete(&mut self, task: &Task, ctx: CompletionContext, now: DateTime<Utc>) -> CompletionOutcome {
        self.skips.record_completion();
        if self.hero.as_ref().is_some_and(|h| h.task.id == task.id) {
            self.hero = None;
        }

        // Board for a new day is generated at the pre-award level.
        if self.board.day() != Some(now.date_naive()) {
            self.challenges(now.date_naive());
        }

        let challenges = self.board.settle(&ctx.counters);
        let challenge_bonus = challenges
            .iter()
            .fold(0u64, |sum, done| sum.saturating_add(done.reward));

        let credit = self
            .economy
            .award_completion_with_bonus(task, ctx.is_all_clear, challenge_bonus);
        let award = credit.award;

        self.events.push(Event::RewardEarned {
            task_id: task.id.clone(),
            species: award.species,
            payout: award.payout,
            balance: award.balance,
            at: now,
        });
        for done in &challenges {
            self.events.push(Event::ChallengeCompleted {
                challenge_id: done.id.clone(),
                reward: done.reward,
                at: now,
            });
        }
        if let Some(up) = credit.stage_up {
            self.events.push(Event::StageUp { stage_up: up, at: now });
        }

        debug!(
            task_id = %task.id,
            payout = award.payout,
            challenge_bonus,
            "completion handled"
        );

        CompletionOutcome {
            award,
            challenges,
            challenge_bonus,
            balance: credit.balance,
            stage_up: credit.stage_up,
        }
    }

    /// Buy an accessory. Returns the new balance.
    pub fn unlock(&mut self, accessory_id: &str, now: DateTime<Utc>) -> Result<u64> {
        let balance = self.economy.unlock(accessory_id)?;
        self.events.push(Event::AccessoryUnlocked {
            accessory_id: accessory_id.to_string(),
            balance,
            at: now,
        });
        Ok(balance)
    }

    /// Flip whether an accessory is worn.
    pub fn toggle_equip(&mut self, accessory_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let equipped = self.economy.toggle_equip(accessory_id)?;
        self.events.push(Event::AccessoryEquipToggled {
            accessory_id: accessory_id.to_string(),
            equipped,
            at: now,
        });
        Ok(equipped)
    }

    /// Handle a detected date change.
    pub fn roll_over_day(
        &mut self,
        today: NaiveDate,
        completed_on_last_active_day: bool,
        now: DateTime<Utc>,
    ) -> StreakRollover {
        let result = self.economy.rollover_day(today, completed_on_last_active_day);
        self.events.push(Event::DayRolledOver {
            day: today,
            streak: result.streak,
            change: result.change,
            at: now,
        });
        self.challenges(today);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierWeights;
    use crate::economy::EconomyState;
    use crate::error::EngineError;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 9, 30, 0).unwrap()
    }

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.rewards.tier_weights = TierWeights {
            common: 1,
            uncommon: 0,
            rare: 0,
            legendary: 0,
        };
        config
    }

    fn companion(state: EconomyState) -> Companion {
        let config = config();
        let economy = Economy::with_seed(state, &config, 7);
        Companion::new(&config, economy)
    }

    fn pool() -> Vec<Task> {
        vec![
            Task::new("overdue", "Pay rent", now() - Duration::days(1))
                .with_due(now() - Duration::hours(2)),
            Task::new("long", "Clean garage", now()).with_estimate(90),
            Task::new("short", "Text Alex", now()).with_estimate(2),
            Task::new("medium", "Book dentist", now()).with_estimate(15),
        ]
    }

    #[test]
    fn refresh_picks_and_queues_event() {
        let mut c = companion(EconomyState::default());
        let hero = c.refresh(&pool(), EnergyLevel::High, now()).unwrap();
        assert_eq!(hero.task.id, "overdue");

        let events = c.drain_events();
        assert!(matches!(&events[0], Event::HeroSelected { task_id, .. } if task_id == "overdue"));
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn refresh_on_empty_pool() {
        let mut c = companion(EconomyState::default());
        assert!(c.refresh(&[], EnergyLevel::High, now()).is_none());
        assert!(matches!(c.drain_events()[0], Event::NoHeroAvailable { .. }));
    }

    #[test]
    fn skipping_moves_hero_and_third_skip_opens_prompt() {
        let mut c = companion(EconomyState::default());
        let pool = pool();

        let first = c.refresh(&pool, EnergyLevel::High, now()).unwrap().task.id.clone();
        assert!(c.skip(&first, &pool, now()).prompt.is_none());

        let second = c.refresh(&pool, EnergyLevel::High, now()).unwrap().task.id.clone();
        assert_ne!(first, second);
        assert!(c.skip(&second, &pool, now()).prompt.is_none());

        let third = c.refresh(&pool, EnergyLevel::High, now()).unwrap().task.id.clone();
        let response = c.skip(&third, &pool, now());
        assert!(c.is_paralyzed());

        let prompt = response.prompt.unwrap();
        assert_eq!(prompt.skip_count, 3);
        assert_eq!(prompt.options.len(), 2);
        match &prompt.options[0] {
            RecoveryOption::QuickCatch { task } => {
                assert!(!c.skip_tracker().skipped_ids().contains(&task.id));
            }
            other => panic!("expected quick catch, got {other:?}"),
        }
        assert_eq!(prompt.options[1], RecoveryOption::BrainUnload);
    }

    #[test]
    fn dismiss_then_skip_again() {
        let mut c = companion(EconomyState::default());
        let pool = pool();
        for id in ["overdue", "short", "medium"] {
            c.skip(id, &pool, now());
        }
        c.dismiss_paralysis(now());
        assert!(!c.is_paralyzed());
        assert_eq!(c.skip_count(), 0);

        let hero = c.refresh(&pool, EnergyLevel::High, now()).unwrap();
        assert_eq!(hero.task.id, "long");
    }

    #[test]
    fn completion_pays_reward_and_first_challenge() {
        let mut c = companion(EconomyState::default());
        let pool = pool();
        c.skip("overdue", &pool, now());

        let ctx = CompletionContext {
            is_all_clear: false,
            counters: ChallengeCounters {
                tasks_completed_today: 1,
                ..Default::default()
            },
        };
        let outcome = c.complete(&pool[2], ctx, now());

        assert_eq!(outcome.award.payout, 1);
        assert_eq!(outcome.challenges.len(), 1);
        assert_eq!(outcome.challenge_bonus, 3);
        assert_eq!(outcome.balance, 4);
        assert_eq!(c.economy().balance(), 4);
        assert_eq!(c.skip_count(), 0);
        assert!(c.skip_tracker().skipped_ids().is_empty());

        let again = c.complete(&pool[3], ctx, now());
        assert!(again.challenges.is_empty());
        assert_eq!(c.economy().balance(), 5);
    }

    #[test]
    fn challenge_bonus_can_trigger_stage_up() {
        let state = EconomyState {
            lifetime_earned: 146,
            balance: 0,
            ..Default::default()
        };
        let mut c = companion(state);
        let ctx = CompletionContext {
            is_all_clear: false,
            counters: ChallengeCounters {
                tasks_completed_today: 1,
                ..Default::default()
            },
        };
        let outcome = c.complete(&pool()[1], ctx, now());
        assert!(outcome.award.stage_up.is_none());
        assert!(outcome.stage_up.is_some());
        assert!(c
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::StageUp { .. })));
    }

    #[test]
    fn completion_lands_in_one_economy_update() {
        let mut c = companion(EconomyState::default());
        let other_screen = c.economy().clone();
        let ctx = CompletionContext {
            is_all_clear: false,
            counters: ChallengeCounters {
                tasks_completed_today: 1,
                ..Default::default()
            },
        };
        let outcome = c.complete(&pool()[2], ctx, now());

        let snap = other_screen.snapshot();
        assert_eq!(snap.balance, outcome.balance);
        assert_eq!(snap.balance, outcome.award.payout + outcome.challenge_bonus);
        assert_eq!(snap.lifetime_earned, snap.balance);
    }

    #[test]
    fn unknown_challenge_is_reported() {
        let mut c = companion(EconomyState::default());
        c.challenges(now().date_naive());
        let err = c
            .evaluate_challenge("bogus", &ChallengeCounters::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidChallengeState(_)));
    }

    #[test]
    fn wardrobe_through_companion() {
        let mut c = companion(EconomyState {
            balance: 30,
            ..Default::default()
        });
        assert_eq!(c.unlock("top_hat", now()).unwrap(), 0);
        assert!(c.toggle_equip("top_hat", now()).unwrap());
        assert!(matches!(
            c.unlock("crown", now()),
            Err(EngineError::InsufficientCurrency { cost: 50, balance: 0 })
        ));
        let events = c.drain_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| match e {
            Event::AccessoryUnlocked { at, .. } | Event::AccessoryEquipToggled { at, .. } => {
                *at == now()
            }
            _ => false,
        }));
    }

    #[test]
    fn day_rollover_refreshes_board() {
        let mut c = companion(EconomyState {
            streak: 2,
            last_rollover: Some(now().date_naive()),
            ..Default::default()
        });
        let tomorrow = now().date_naive().succ_opt().unwrap();
        let result = c.roll_over_day(tomorrow, true, now());
        assert_eq!(result.streak, 3);
        assert!(c
            .challenges(tomorrow)
            .iter()
            .all(|ch| ch.id.starts_with(&tomorrow.to_string())));
    }
}
