use clap::Subcommand;
use nudge_core::EngineConfig;

use crate::store::{load_config, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective config as TOML
    Show {
        /// Output as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Print the config file location
    Path,
    /// Write the default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(action: ConfigAction) -> CliResult<()> {
    match action {
        ConfigAction::Show { json } => {
            let config = load_config()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::Path => {
            println!("{}", EngineConfig::path()?.display());
        }
        ConfigAction::Init { force } => {
            let path = EngineConfig::path()?;
            if path.exists() && !force {
                return Err(format!("{} already exists (use --force)", path.display()).into());
            }
            EngineConfig::default().save_to(&path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
