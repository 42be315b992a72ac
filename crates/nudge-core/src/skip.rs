//! Skip cycle tracking and paralysis detection.
//!
//! Phases follow the skip count:
//!
//!   Idle(0) ──skip──> Skipping(1..threshold-1) ──skip──> Paralysis(≥threshold)
//!     ^                        |                               |
//!     +────── complete ────────+───────────────────────────────+
//!     +────── dismiss (keeps skipped ids) ─────────────────────+
//!
//! One tracker lives for a session (page visit). It only counts; choosing a
//! replacement task is the hero selector's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SkipConfig;

/// Where the tracker currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "count", rename_all = "snake_case")]
pub enum SkipPhase {
    Idle,
    Skipping(u32),
    Paralysis(u32),
}

/// Result of recording a skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipOutcome {
    /// Skip count after this skip
    pub count: u32,
    /// This skip is the one that raised the paralysis flag
    pub entered_paralysis: bool,
}

/// Counts consecutive skips of the hero task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipCycleTracker {
    threshold: u32,
    skip_count: u32,
    skipped_ids: HashSet<String>,
    paralyzed: bool,
}

impl SkipCycleTracker {
    /// Create a tracker with the default threshold of 3.
    pub fn new() -> Self {
        Self::with_config(SkipConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(config: SkipConfig) -> Self {
        Self {
            threshold: config.paralysis_threshold.max(1),
            skip_count: 0,
            skipped_ids: HashSet::new(),
            paralyzed: false,
        }
    }

    /// Record a skip of `task_id`.
    pub fn record_skip(&mut self, task_id: &str) -> SkipOutcome {
        self.skip_count = self.skip_count.saturating_add(1);
        self.skipped_ids.insert(task_id.to_string());

        let entered_paralysis = !self.paralyzed && self.skip_count >= self.threshold;
        if entered_paralysis {
            self.paralyzed = true;
            info!(skips = self.skip_count, "paralysis detected");
        } else {
            debug!(task_id, skips = self.skip_count, "task skipped");
        }

        SkipOutcome {
            count: self.skip_count,
            entered_paralysis,
        }
    }

    /// A completion breaks the cycle entirely.
    pub fn record_completion(&mut self) {
        self.skip_count = 0;
        self.skipped_ids.clear();
        self.paralyzed = false;
    }

    /// Close the paralysis prompt. Skipped ids are kept so the next round of
    /// skips does not revisit the same tasks.
    pub fn dismiss_paralysis_prompt(&mut self) {
        self.skip_count = 0;
        self.paralyzed = false;
    }

    pub fn skip_count(&self) -> u32 {
        self.skip_count
    }

    pub fn is_paralyzed(&self) -> bool {
        self.paralyzed
    }

    pub fn skipped_ids(&self) -> &HashSet<String> {
        &self.skipped_ids
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn phase(&self) -> SkipPhase {
        match self.skip_count {
            0 => SkipPhase::Idle,
            n if self.paralyzed => SkipPhase::Paralysis(n),
            n => SkipPhase::Skipping(n),
        }
    }
}

impl Default for SkipCycleTracker {
    fn default() -> Self {
        Self::new()
    }
}
