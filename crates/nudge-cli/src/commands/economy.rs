//! Snowflake economy commands.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde::Serialize;

use nudge_core::{
    ChallengeCounters, Companion, CompletionContext, CompletionOutcome, Economy, EngineConfig,
    Event, LevelProgress, StageTier, Task,
};

use crate::store::{load_config, load_tasks, today, CliResult, StoredState};

#[derive(Subcommand)]
pub enum EconomyAction {
    /// Show balance, level, stage and wardrobe
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Record a completed task and pay its reward
    Complete {
        /// Task id
        task_id: String,
        /// JSON task file to look the task up in
        #[arg(long)]
        tasks: Option<PathBuf>,
        /// This completion emptied the active list
        #[arg(long)]
        all_clear: bool,
        /// Tasks completed today, including this one
        #[arg(long, default_value_t = 1)]
        completed_today: u32,
        #[arg(long)]
        brain_dump: bool,
        #[arg(long)]
        before_noon: bool,
        /// Fixed seed for the species draw
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// List accessories with prices
    Catalog {
        #[arg(long)]
        json: bool,
    },
    /// Buy an accessory
    Unlock {
        accessory_id: String,
    },
    /// Put an unlocked accessory on or take it off
    Equip {
        accessory_id: String,
    },
    /// Apply a day change to the streak
    Rollover {
        /// New day as YYYY-MM-DD; defaults to today
        #[arg(long)]
        day: Option<NaiveDate>,
        /// A task was completed on the last active day
        #[arg(long)]
        completed: bool,
    },
    /// Show or adjust the streak
    Streak {
        #[arg(long, conflicts_with = "reset")]
        increment: bool,
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Serialize)]
struct EconomyView {
    balance: u64,
    lifetime_earned: u64,
    streak: u32,
    level: u32,
    stage: StageTier,
    progress: LevelProgress,
    unlocked: Vec<String>,
    equipped: Vec<String>,
}

#[derive(Serialize)]
struct CompleteView {
    outcome: CompletionOutcome,
    events: Vec<Event>,
}

#[derive(Serialize)]
struct CatalogEntry {
    id: String,
    name: String,
    cost: u64,
    unlocked: bool,
    equipped: bool,
}

pub fn run(action: EconomyAction) -> CliResult<()> {
    let config = load_config()?;
    let mut stored = StoredState::load()?;

    match action {
        EconomyAction::Show { json } => {
            let economy = Economy::new(stored.economy.clone(), &config);
            show(&economy, json)?;
        }
        EconomyAction::Complete {
            task_id,
            tasks,
            all_clear,
            completed_today,
            brain_dump,
            before_noon,
            seed,
            json,
        } => {
            let counters = ChallengeCounters {
                tasks_completed_today: completed_today,
                all_cleared: all_clear,
                brain_dump_done: brain_dump,
                completed_before_noon: before_noon,
            };
            let task = find_task(&task_id, tasks)?;
            complete(&config, &mut stored, &task, all_clear, counters, seed, json)?;
        }
        EconomyAction::Catalog { json } => catalog(&config, &stored, json)?,
        EconomyAction::Unlock { accessory_id } => {
            let economy = Economy::new(stored.economy.clone(), &config);
            let balance = economy.unlock(&accessory_id)?;
            stored.economy = economy.snapshot();
            stored.save()?;
            println!("unlocked {accessory_id}, {balance} snowflakes left");
        }
        EconomyAction::Equip { accessory_id } => {
            let economy = Economy::new(stored.economy.clone(), &config);
            let equipped = economy.toggle_equip(&accessory_id)?;
            stored.economy = economy.snapshot();
            stored.save()?;
            let state = if equipped { "equipped" } else { "removed" };
            println!("{accessory_id} {state}");
        }
        EconomyAction::Rollover { day, completed } => {
            let economy = Economy::new(stored.economy.clone(), &config);
            let result = economy.rollover_day(day.unwrap_or_else(today), completed);
            stored.economy = economy.snapshot();
            stored.save()?;
            println!("streak: {} ({:?})", result.streak, result.change);
        }
        EconomyAction::Streak { increment, reset } => {
            let economy = Economy::new(stored.economy.clone(), &config);
            if increment {
                economy.increment_streak();
            } else if reset {
                economy.reset_streak();
            }
            if increment || reset {
                stored.economy = economy.snapshot();
                stored.save()?;
            }
            println!("streak: {}", economy.current_streak());
        }
    }
    Ok(())
}

fn find_task(task_id: &str, tasks: Option<PathBuf>) -> CliResult<Task> {
    match tasks {
        Some(path) => load_tasks(&path)?
            .into_iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| format!("task not found: {task_id}").into()),
        None => Ok(Task::new(task_id, task_id, Utc::now())),
    }
}

fn show(economy: &Economy, json: bool) -> CliResult<()> {
    let state = economy.snapshot();
    let view = EconomyView {
        balance: state.balance,
        lifetime_earned: state.lifetime_earned,
        streak: state.streak,
        level: economy.level(),
        stage: economy.stage(),
        progress: economy.progress(),
        unlocked: state.unlocked.into_iter().collect(),
        equipped: state.equipped.into_iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("Snowflakes: {}", view.balance);
    println!("Lifetime:   {}", view.lifetime_earned);
    match view.progress.remaining() {
        Some(left) => println!("Level:      {} ({left} to next)", view.level),
        None => println!("Level:      {} (max)", view.level),
    }
    println!("Stage:      {}", view.stage);
    println!("Streak:     {} days", view.streak);
    if !view.equipped.is_empty() {
        println!("Wearing:    {}", view.equipped.join(", "));
    }
    Ok(())
}

fn complete(
    config: &EngineConfig,
    stored: &mut StoredState,
    task: &Task,
    is_all_clear: bool,
    counters: ChallengeCounters,
    seed: Option<u64>,
    json: bool,
) -> CliResult<()> {
    let economy = match seed {
        Some(seed) => Economy::with_seed(stored.economy.clone(), config, seed),
        None => Economy::new(stored.economy.clone(), config),
    };
    let now = Utc::now();
    let day = now.date_naive();

    let mut session = Companion::new(config, economy.clone());
    session.restore_challenges(day, stored.completed_on(day));
    let outcome = session.complete(task, CompletionContext { is_all_clear, counters }, now);

    stored.economy = economy.snapshot();
    stored.challenge_day = Some(day);
    stored.completed_challenges = session.completed_challenge_ids();
    stored.save()?;

    if json {
        let view = CompleteView {
            outcome,
            events: session.drain_events(),
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let award = &outcome.award;
    println!("Caught a {} fish! +{} snowflakes", award.species, award.payout);
    for done in &outcome.challenges {
        println!("Challenge complete: {} (+{})", done.title, done.reward);
    }
    if let Some(up) = outcome.stage_up {
        println!("New stage: {} (level {})", up.to, up.level);
    } else if award.leveled_up {
        println!("Level up! Now level {}", award.level);
    }
    println!("Balance: {}", outcome.balance);
    Ok(())
}

fn catalog(config: &EngineConfig, stored: &StoredState, json: bool) -> CliResult<()> {
    let economy = Economy::new(stored.economy.clone(), config);
    let wardrobe = economy.wardrobe();
    let entries: Vec<CatalogEntry> = wardrobe
        .catalog()
        .iter()
        .map(|a| CatalogEntry {
            id: a.id.clone(),
            name: a.name.clone(),
            cost: wardrobe.tier_cost(a.tier),
            unlocked: stored.economy.unlocked.contains(&a.id),
            equipped: stored.economy.equipped.contains(&a.id),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Balance: {}\n", stored.economy.balance);
    for entry in &entries {
        let status = match (entry.unlocked, entry.equipped) {
            (_, true) => "wearing",
            (true, false) => "owned",
            (false, false) => "",
        };
        println!("{:<12} {:<14} {:>3}  {status}", entry.id, entry.name, entry.cost);
    }
    Ok(())
}
