//! On-disk state shared by the commands.
//!
//! The engine itself never touches the filesystem; the CLI keeps the
//! economy counters and today's challenge flags in `state.json` next to
//! `config.toml` in the data directory.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use nudge_core::{data_dir, EconomyState, EnergyLevel, EngineConfig, Task};

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredState {
    pub economy: EconomyState,
    /// Day the completion flags below belong to
    pub challenge_day: Option<NaiveDate>,
    pub completed_challenges: Vec<String>,
}

impl StoredState {
    pub fn path() -> CliResult<PathBuf> {
        Ok(data_dir()?.join("state.json"))
    }

    pub fn load() -> CliResult<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved state, starting fresh");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self) -> CliResult<()> {
        let path = Self::path()?;
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "state saved");
        Ok(())
    }

    /// Challenge ids completed on `day`; stale flags from an earlier day are
    /// dropped.
    pub fn completed_on(&self, day: NaiveDate) -> &[String] {
        if self.challenge_day == Some(day) {
            &self.completed_challenges
        } else {
            &[]
        }
    }
}

pub fn load_config() -> CliResult<EngineConfig> {
    Ok(EngineConfig::load_from(&EngineConfig::path()?)?)
}

/// Read a JSON array of tasks.
pub fn load_tasks(path: &Path) -> CliResult<Vec<Task>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read tasks from {}: {e}", path.display()))?;
    let tasks: Vec<Task> = serde_json::from_str(&content)?;
    Ok(tasks)
}

/// Energy from the flag, or from the local time of day.
pub fn energy_or_now(energy: Option<EnergyLevel>) -> EnergyLevel {
    energy.unwrap_or_else(|| EnergyLevel::for_hour(Local::now().hour()))
}

/// Challenge days follow the engine's UTC calendar.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
