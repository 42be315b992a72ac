use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;

use nudge_core::{
    evaluate, ChallengeCounters, ChallengeGenerator, ChallengeProgress, DailyChallenge, Economy,
};

use crate::store::{load_config, today, CliResult, StoredState};

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// List the day's challenges
    List {
        /// Level to generate for; defaults to the saved economy
        #[arg(long)]
        level: Option<u32>,
        /// Streak to generate for; defaults to the saved economy
        #[arg(long)]
        streak: Option<u32>,
        /// Day as YYYY-MM-DD; defaults to today
        #[arg(long)]
        day: Option<NaiveDate>,
        /// Tasks completed today, for progress
        #[arg(long, default_value_t = 0)]
        completed: u32,
        #[arg(long)]
        all_cleared: bool,
        #[arg(long)]
        brain_dump: bool,
        #[arg(long)]
        before_noon: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ChallengeView {
    #[serde(flatten)]
    challenge: DailyChallenge,
    progress: ChallengeProgress,
}

pub fn run(action: ChallengeAction) -> CliResult<()> {
    match action {
        ChallengeAction::List {
            level,
            streak,
            day,
            completed,
            all_cleared,
            brain_dump,
            before_noon,
            json,
        } => {
            let config = load_config()?;
            let stored = StoredState::load()?;
            let economy = Economy::new(stored.economy.clone(), &config);
            let day = day.unwrap_or_else(today);

            let generator = ChallengeGenerator::with_config(config.challenges.clone());
            let counters = ChallengeCounters {
                tasks_completed_today: completed,
                all_cleared,
                brain_dump_done: brain_dump,
                completed_before_noon: before_noon,
            };
            let done = stored.completed_on(day);

            let views: Vec<ChallengeView> = generator
                .generate_daily(
                    level.unwrap_or_else(|| economy.level()),
                    streak.unwrap_or_else(|| economy.current_streak()),
                    day,
                )
                .into_iter()
                .map(|mut challenge| {
                    challenge.completed = done.contains(&challenge.id);
                    let progress = evaluate(&challenge, &counters);
                    ChallengeView { challenge, progress }
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
                return Ok(());
            }

            println!("=== Challenges for {day} ===\n");
            for view in &views {
                let mark = if view.challenge.completed { "x" } else { " " };
                println!(
                    "[{mark}] {} (+{})  {}/{}",
                    view.challenge.title,
                    view.challenge.reward,
                    view.progress.current,
                    view.progress.total
                );
            }
        }
    }
    Ok(())
}
