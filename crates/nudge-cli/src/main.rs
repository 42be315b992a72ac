use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod store;

#[derive(Parser)]
#[command(name = "nudge-cli", version, about = "Nudge CLI")]
struct Cli {
    /// Log level when NUDGE_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick the one task to show next
    Hero {
        #[command(subcommand)]
        action: commands::hero::HeroAction,
    },
    /// Daily micro-challenges
    Challenge {
        #[command(subcommand)]
        action: commands::challenge::ChallengeAction,
    },
    /// Snowflake balance, levels and accessories
    Economy {
        #[command(subcommand)]
        action: commands::economy::EconomyAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NUDGE_LOG").unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Hero { action } => commands::hero::run(action),
        Commands::Challenge { action } => commands::challenge::run(action),
        Commands::Economy { action } => commands::economy::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
