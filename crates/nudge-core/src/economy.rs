//! Shared economy state.
//!
//! The balance, lifetime total, streak and wardrobe sets are observed by many
//! screens at once. [`Economy`] is a cheap-to-clone handle around a single
//! mutex: every public mutation takes the lock once and applies its whole
//! effect before releasing it, so no caller ever sees a half-applied award or
//! purchase. Callers never touch [`EconomyState`] fields directly; they get
//! snapshots.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::reward::{LevelProgress, RewardEconomy, RewardTier, StageTier};
use crate::streak::{rollover_streak, StreakRollover};
use crate::task::Task;
use crate::wardrobe::Wardrobe;

/// Persisted economy counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyState {
    /// Spendable snowflakes
    pub balance: u64,
    /// Everything ever earned; never decreases
    pub lifetime_earned: u64,
    /// Consecutive active days
    pub streak: u32,
    /// Day of the last streak rollover
    pub last_rollover: Option<NaiveDate>,
    pub unlocked: BTreeSet<String>,
    /// Always a subset of `unlocked`
    pub equipped: BTreeSet<String>,
}

/// Crossing into a new stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageUp {
    pub from: StageTier,
    pub to: StageTier,
    pub level: u32,
}

/// Everything a completion celebration needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardOutcome {
    pub species: RewardTier,
    pub payout: u64,
    pub balance: u64,
    pub lifetime_earned: u64,
    pub level: u32,
    pub leveled_up: bool,
    /// Set only when the stage changed, not on every level
    pub stage_up: Option<StageUp>,
}

/// Result of crediting a bonus (e.g. a daily challenge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditOutcome {
    pub amount: u64,
    pub balance: u64,
    pub lifetime_earned: u64,
    pub level: u32,
    pub stage_up: Option<StageUp>,
}

/// A completion award plus the challenge bonus paid with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCredit {
    pub award: AwardOutcome,
    pub bonus: u64,
    pub balance: u64,
    pub lifetime_earned: u64,
    pub level: u32,
    /// Stage change across award and bonus together
    pub stage_up: Option<StageUp>,
}

struct Inner {
    state: EconomyState,
    rng: Mcg128Xsl64,
}

struct Rules {
    rewards: RewardEconomy,
    wardrobe: Wardrobe,
}

/// Handle to the single economy state.
#[derive(Clone)]
pub struct Economy {
    inner: Arc<Mutex<Inner>>,
    rules: Arc<Rules>,
}

impl Economy {
    /// Wrap loaded state; species draws use an entropy-seeded generator.
    pub fn new(state: EconomyState, config: &EngineConfig) -> Self {
        Self::with_rng(state, config, Mcg128Xsl64::from_entropy())
    }

    /// Wrap loaded state with a reproducible draw sequence.
    pub fn with_seed(state: EconomyState, config: &EngineConfig, seed: u64) -> Self {
        Self::with_rng(state, config, Mcg128Xsl64::seed_from_u64(seed))
    }

    fn with_rng(mut state: EconomyState, config: &EngineConfig, rng: Mcg128Xsl64) -> Self {
        let stray: Vec<String> = state.equipped.difference(&state.unlocked).cloned().collect();
        if !stray.is_empty() {
            warn!(?stray, "dropping equipped accessories that are not unlocked");
            state.equipped.retain(|id| state.unlocked.contains(id));
        }
        Self {
            inner: Arc::new(Mutex::new(Inner { state, rng })),
            rules: Arc::new(Rules {
                rewards: RewardEconomy::with_config(config.rewards.clone()),
                wardrobe: Wardrobe::with_config(config.wardrobe.clone()),
            }),
        }
    }

    // Every mutation computes its result before writing, so a poisoned lock
    // still guards a consistent state.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn rewards(&self) -> &RewardEconomy {
        &self.rules.rewards
    }

    pub fn wardrobe(&self) -> &Wardrobe {
        &self.rules.wardrobe
    }

    /// Copy of the current state, for persistence and display.
    pub fn snapshot(&self) -> EconomyState {
        self.lock().state.clone()
    }

    pub fn balance(&self) -> u64 {
        self.lock().state.balance
    }

    pub fn lifetime_earned(&self) -> u64 {
        self.lock().state.lifetime_earned
    }

    pub fn current_streak(&self) -> u32 {
        self.lock().state.streak
    }

    pub fn level(&self) -> u32 {
        self.rules.rewards.level(self.lifetime_earned())
    }

    pub fn stage(&self) -> StageTier {
        self.rules.rewards.stage(self.level())
    }

    pub fn progress(&self) -> LevelProgress {
        self.rules.rewards.progress(self.lifetime_earned())
    }

    fn credit(rewards: &RewardEconomy, state: &mut EconomyState, amount: u64) -> (u32, u32, Option<StageUp>) {
        let level_before = rewards.level(state.lifetime_earned);
        state.balance = state.balance.saturating_add(amount);
        state.lifetime_earned = state.lifetime_earned.saturating_add(amount);
        let level_after = rewards.level(state.lifetime_earned);

        let (from, to) = (rewards.stage(level_before), rewards.stage(level_after));
        let stage_up = (to != from).then_some(StageUp {
            from,
            to,
            level: level_after,
        });
        (level_before, level_after, stage_up)
    }

    fn pay_award(
        rewards: &RewardEconomy,
        inner: &mut Inner,
        task: &Task,
        is_all_clear: bool,
    ) -> AwardOutcome {
        let Inner { state, rng } = inner;
        let award = rewards.award(task, state.streak, is_all_clear, rng);
        let (level_before, level, stage_up) = Self::credit(rewards, state, award.payout);

        info!(
            task_id = %task.id,
            species = %award.species,
            payout = award.payout,
            balance = state.balance,
            level,
            "reward earned"
        );

        AwardOutcome {
            species: award.species,
            payout: award.payout,
            balance: state.balance,
            lifetime_earned: state.lifetime_earned,
            level,
            leveled_up: level > level_before,
            stage_up,
        }
    }

    /// Pay out one task completion at the current streak.
    pub fn award_completion(&self, task: &Task, is_all_clear: bool) -> AwardOutcome {
        let mut guard = self.lock();
        Self::pay_award(&self.rules.rewards, &mut guard, task, is_all_clear)
    }

    /// Pay a completion and its challenge bonus under one lock, so no other
    /// handle can observe the payout without the bonus.
    pub fn award_completion_with_bonus(
        &self,
        task: &Task,
        is_all_clear: bool,
        bonus: u64,
    ) -> CompletionCredit {
        let rewards = &self.rules.rewards;
        let mut guard = self.lock();
        let stage_before = rewards.stage(rewards.level(guard.state.lifetime_earned));

        let award = Self::pay_award(rewards, &mut guard, task, is_all_clear);
        let state = &mut guard.state;
        if bonus > 0 {
            Self::credit(rewards, state, bonus);
            info!(amount = bonus, balance = state.balance, "bonus credited");
        }

        let level = rewards.level(state.lifetime_earned);
        let stage = rewards.stage(level);
        let stage_up = (stage != stage_before).then_some(StageUp {
            from: stage_before,
            to: stage,
            level,
        });

        CompletionCredit {
            award,
            bonus,
            balance: state.balance,
            lifetime_earned: state.lifetime_earned,
            level,
            stage_up,
        }
    }

    /// Credit a fixed bonus to balance and lifetime total.
    pub fn credit_bonus(&self, amount: u64) -> CreditOutcome {
        let mut guard = self.lock();
        let state = &mut guard.state;
        let (_, level, stage_up) = Self::credit(&self.rules.rewards, state, amount);
        info!(amount, balance = state.balance, "bonus credited");

        CreditOutcome {
            amount,
            balance: state.balance,
            lifetime_earned: state.lifetime_earned,
            level,
            stage_up,
        }
    }

    /// Buy an accessory. Returns the new balance.
    pub fn unlock(&self, accessory_id: &str) -> Result<u64> {
        let mut guard = self.lock();
        let EconomyState {
            balance, unlocked, ..
        } = &mut guard.state;
        let left = self.rules.wardrobe.unlock(accessory_id, balance, unlocked)?;
        info!(accessory_id, balance = left, "accessory unlocked");
        Ok(left)
    }

    /// Flip whether an accessory is worn. Returns the new equipped state.
    pub fn toggle_equip(&self, accessory_id: &str) -> Result<bool> {
        let mut guard = self.lock();
        let EconomyState {
            unlocked, equipped, ..
        } = &mut guard.state;
        self.rules.wardrobe.toggle_equip(accessory_id, unlocked, equipped)
    }

    pub fn increment_streak(&self) -> u32 {
        let mut guard = self.lock();
        guard.state.streak = guard.state.streak.saturating_add(1);
        guard.state.streak
    }

    pub fn reset_streak(&self) {
        self.lock().state.streak = 0;
    }

    /// Apply a detected date change to the streak.
    pub fn rollover_day(&self, today: NaiveDate, completed_on_last_active_day: bool) -> StreakRollover {
        let mut guard = self.lock();
        let state = &mut guard.state;
        let result = rollover_streak(
            state.last_rollover,
            today,
            completed_on_last_active_day,
            state.streak,
        );
        state.streak = result.streak;
        state.last_rollover = Some(result.last_active);
        info!(streak = result.streak, change = ?result.change, %today, "day rolled over");
        result
    }
}

impl std::fmt::Debug for Economy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Economy")
            .field("state", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierWeights;
    use crate::error::EngineError;
    use chrono::Utc;

    fn common_only() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.rewards.tier_weights = TierWeights {
            common: 1,
            uncommon: 0,
            rare: 0,
            legendary: 0,
        };
        config
    }

    fn task() -> Task {
        Task::new("t1", "Reply to Sam", Utc::now())
    }

    #[test]
    fn award_updates_balance_and_lifetime() {
        let economy = Economy::with_seed(EconomyState::default(), &common_only(), 1);
        let outcome = economy.award_completion(&task(), false);
        assert_eq!(outcome.payout, 1);
        assert_eq!(economy.balance(), 1);
        assert_eq!(economy.lifetime_earned(), 1);
    }

    #[test]
    fn streak_doubles_payout() {
        let state = EconomyState {
            streak: 5,
            ..Default::default()
        };
        let economy = Economy::with_seed(state, &common_only(), 1);
        assert_eq!(economy.award_completion(&task(), false).payout, 2);
    }

    #[test]
    fn stage_up_reported_only_on_stage_change() {
        // level 2 at 50, level 3 (Snow Nest) at 150
        let state = EconomyState {
            lifetime_earned: 49,
            ..Default::default()
        };
        let economy = Economy::with_seed(state, &common_only(), 1);
        let level_only = economy.award_completion(&task(), false);
        assert!(level_only.leveled_up);
        assert_eq!(level_only.level, 2);
        assert!(level_only.stage_up.is_none());

        let economy = Economy::with_seed(
            EconomyState {
                lifetime_earned: 140,
                ..Default::default()
            },
            &common_only(),
            1,
        );
        let outcome = economy.award_completion(&task(), true);
        assert_eq!(outcome.payout, 15);
        assert_eq!(
            outcome.stage_up,
            Some(StageUp {
                from: StageTier::BareIce,
                to: StageTier::SnowNest,
                level: 3
            })
        );
    }

    #[test]
    fn spending_never_lowers_level() {
        let state = EconomyState {
            balance: 200,
            lifetime_earned: 200,
            ..Default::default()
        };
        let economy = Economy::with_seed(state, &EngineConfig::default(), 1);
        let level = economy.level();
        economy.unlock("crown").unwrap();
        economy.unlock("cape").unwrap();
        assert_eq!(economy.balance(), 100);
        assert_eq!(economy.level(), level);
    }

    #[test]
    fn failed_unlock_is_atomic() {
        let state = EconomyState {
            balance: 25,
            ..Default::default()
        };
        let economy = Economy::with_seed(state, &EngineConfig::default(), 1);
        let before = economy.snapshot();
        assert!(matches!(
            economy.unlock("top_hat"),
            Err(EngineError::InsufficientCurrency { .. })
        ));
        assert_eq!(economy.snapshot(), before);
    }

    #[test]
    fn equip_stays_subset_of_unlocked() {
        let state = EconomyState {
            balance: 10,
            ..Default::default()
        };
        let economy = Economy::with_seed(state, &EngineConfig::default(), 1);
        assert!(economy.toggle_equip("scarf").is_err());
        economy.unlock("scarf").unwrap();
        assert!(economy.toggle_equip("scarf").unwrap());

        let snap = economy.snapshot();
        assert!(snap.equipped.is_subset(&snap.unlocked));
    }

    #[test]
    fn rollover_is_idempotent_within_a_day() {
        let economy = Economy::with_seed(EconomyState::default(), &EngineConfig::default(), 1);
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let d2 = d1.succ_opt().unwrap();

        economy.rollover_day(d1, false);
        assert_eq!(economy.rollover_day(d2, true).streak, 1);
        assert_eq!(economy.rollover_day(d2, true).streak, 1);
        assert_eq!(economy.current_streak(), 1);
    }

    #[test]
    fn clones_share_state() {
        let economy = Economy::with_seed(EconomyState::default(), &EngineConfig::default(), 1);
        let other = economy.clone();
        other.credit_bonus(10);
        assert_eq!(economy.balance(), 10);
        economy.increment_streak();
        assert_eq!(other.current_streak(), 1);
        other.reset_streak();
        assert_eq!(economy.current_streak(), 0);
    }

    #[test]
    fn award_with_bonus_lands_as_one_update() {
        let state = EconomyState {
            lifetime_earned: 146,
            ..Default::default()
        };
        let economy = Economy::with_seed(state, &common_only(), 1);
        let credit = economy.award_completion_with_bonus(&task(), false, 3);

        assert_eq!(credit.award.payout, 1);
        assert!(credit.award.stage_up.is_none());
        assert_eq!(credit.balance, 4);
        assert_eq!(
            credit.stage_up,
            Some(StageUp {
                from: StageTier::BareIce,
                to: StageTier::SnowNest,
                level: 3
            })
        );
        let snap = economy.snapshot();
        assert_eq!(snap.balance, 4);
        assert_eq!(snap.lifetime_earned, 150);
    }

    #[test]
    fn observers_never_see_payout_without_bonus() {
        let economy = Economy::with_seed(EconomyState::default(), &common_only(), 1);
        let observer = economy.clone();
        let writer = std::thread::spawn(move || {
            for _ in 0..200 {
                economy.award_completion_with_bonus(&task(), false, 3);
            }
        });
        // every completion adds 1 + 3
        for _ in 0..200 {
            assert_eq!(observer.snapshot().balance % 4, 0);
        }
        writer.join().unwrap();
        assert_eq!(observer.balance(), 800);
    }

    #[test]
    fn equipped_without_unlock_is_dropped_on_load() {
        let state = EconomyState {
            unlocked: ["scarf".to_string()].into_iter().collect(),
            equipped: ["scarf".to_string(), "crown".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let economy = Economy::with_seed(state, &EngineConfig::default(), 1);
        let snap = economy.snapshot();
        assert!(snap.equipped.contains("scarf"));
        assert!(!snap.equipped.contains("crown"));
        assert!(snap.equipped.is_subset(&snap.unlocked));
    }

    #[test]
    fn concurrent_awards_are_all_counted() {
        let economy = Economy::with_seed(EconomyState::default(), &common_only(), 1);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let economy = economy.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        economy.award_completion(&task(), false);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = economy.snapshot();
        assert_eq!(snap.balance, 100);
        assert_eq!(snap.lifetime_earned, 100);
    }
}
