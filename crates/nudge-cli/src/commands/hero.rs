//! Hero task selection command.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;

use nudge_core::{EnergyLevel, HeroPick, HeroSelector, ScoreBreakdown, Task};

use crate::store::{energy_or_now, load_config, load_tasks, CliResult};

#[derive(Subcommand)]
pub enum HeroAction {
    /// Show the single task to do next
    Pick {
        /// JSON file holding an array of tasks
        #[arg(long)]
        tasks: PathBuf,
        /// Current energy (low, medium, high); defaults to time of day
        #[arg(long)]
        energy: Option<EnergyLevel>,
        /// Task ids skipped this cycle
        #[arg(long, value_delimiter = ',')]
        skipped: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score every active task, best first
    Rank {
        #[arg(long)]
        tasks: PathBuf,
        #[arg(long)]
        energy: Option<EnergyLevel>,
        #[arg(long)]
        json: bool,
    },
    /// The easiest task, for when you're stuck
    QuickCatch {
        #[arg(long)]
        tasks: PathBuf,
        /// Task ids to leave out
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct RankedTask<'a> {
    id: &'a str,
    content: &'a str,
    score: i32,
    breakdown: ScoreBreakdown,
}

pub fn run(action: HeroAction) -> CliResult<()> {
    match action {
        HeroAction::Pick {
            tasks,
            energy,
            skipped,
            json,
        } => pick(tasks, energy, skipped, json),
        HeroAction::Rank { tasks, energy, json } => rank(tasks, energy, json),
        HeroAction::QuickCatch {
            tasks,
            exclude,
            json,
        } => quick_catch(tasks, exclude, json),
    }
}

fn selector() -> CliResult<HeroSelector> {
    Ok(HeroSelector::with_config(load_config()?.selection))
}

fn pick(path: PathBuf, energy: Option<EnergyLevel>, skipped: Vec<String>, json: bool) -> CliResult<()> {
    let pool = load_tasks(&path)?;
    let skipped: HashSet<String> = skipped.into_iter().collect();
    let energy = energy_or_now(energy);

    let hero = selector()?.pick_hero(&pool, &skipped, energy, Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&hero)?);
        return Ok(());
    }

    match hero {
        Some(hero) => print_hero(&hero, energy),
        None => println!("Nothing to do. Enjoy the quiet."),
    }
    Ok(())
}

fn print_hero(hero: &HeroPick, energy: EnergyLevel) {
    println!("{}", hero.task.content);
    println!("  {}", hero.reason_text());
    println!("  id: {}  score: {}  energy: {}", hero.task.id, hero.score, energy);
    if hero.recycled_skipped {
        println!("  (everything was skipped, starting over)");
    }
}

fn rank(path: PathBuf, energy: Option<EnergyLevel>, json: bool) -> CliResult<()> {
    let pool = load_tasks(&path)?;
    let energy = energy_or_now(energy);
    let selector = selector()?;
    let now = Utc::now();

    let mut ranked: Vec<RankedTask> = pool
        .iter()
        .filter(|t| t.is_active())
        .map(|t| {
            let breakdown = selector.score(t, energy, now);
            RankedTask {
                id: &t.id,
                content: &t.content,
                score: breakdown.total(),
                breakdown,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("No active tasks.");
        return Ok(());
    }
    for (i, entry) in ranked.iter().enumerate() {
        let b = &entry.breakdown;
        println!("{}. {} (Score: {})", i + 1, entry.content, entry.score);
        println!(
            "   overdue {} / stale {} / energy {} / due today {} / quick win {}",
            b.overdue, b.stale, b.energy, b.due_today, b.quick_win
        );
    }
    Ok(())
}

fn quick_catch(path: PathBuf, exclude: Vec<String>, json: bool) -> CliResult<()> {
    let pool = load_tasks(&path)?;
    let exclude: HashSet<String> = exclude.into_iter().collect();
    let active: Vec<Task> = pool.into_iter().filter(Task::is_active).collect();

    let task = selector()?.find_quick_catch(&active, &exclude);

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
        return Ok(());
    }

    match task {
        Some(task) => {
            println!("{}", task.content);
            match task.estimated_minutes {
                Some(minutes) => println!("  about {minutes} min  id: {}", task.id),
                None => println!("  id: {}", task.id),
            }
        }
        None => println!("No active tasks."),
    }
    Ok(())
}
