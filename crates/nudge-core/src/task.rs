//! Task records as seen by the engine.
//!
//! Tasks are owned by the task store. The engine only reads them: it never
//! creates, edits or completes one itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy level a task needs, or the user currently has.
///
/// Ordered `Low < Medium < High` so that "required ≤ current" is a plain
/// comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    /// Low energy (e.g., end of day)
    Low,
    /// Medium energy (default)
    Medium,
    /// High energy (e.g., morning)
    High,
}

impl EnergyLevel {
    /// Energy bucket for a wall-clock hour (0-23).
    ///
    /// Mornings (06-11) are high, afternoons (12-16) medium, everything
    /// else low.
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            6..=11 => EnergyLevel::High,
            12..=16 => EnergyLevel::Medium,
            _ => EnergyLevel::Low,
        }
    }

    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        }
    }
}

impl Default for EnergyLevel {
    fn default() -> Self {
        EnergyLevel::Medium
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EnergyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(EnergyLevel::Low),
            "medium" | "med" => Ok(EnergyLevel::Medium),
            "high" => Ok(EnergyLevel::High),
            other => Err(format!("unknown energy level: '{other}'")),
        }
    }
}

/// Quick action a task can launch directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Call,
    Text,
    Email,
    Link,
    Search,
    Navigate,
    Calendar,
}

/// A task record supplied by the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Display content
    pub content: String,
    /// Optional quick action
    #[serde(default)]
    pub action: Option<ActionType>,
    /// Optional contact name or handle for the action
    #[serde(default)]
    pub contact: Option<String>,
    /// Optional due timestamp
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    /// Estimated duration in minutes
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    /// Energy the task needs, if the user tagged it
    #[serde(default)]
    pub energy: Option<EnergyLevel>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Completion timestamp; `None` while active
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            action: None,
            contact: None,
            due_at: None,
            estimated_minutes: None,
            energy: None,
            created_at,
            completed_at: None,
        }
    }

    pub fn with_due(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn with_energy(mut self, energy: EnergyLevel) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn with_action(mut self, action: ActionType) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    /// Whether the task is still open.
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }

    /// Whole days elapsed since creation, never negative.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days().max(0)
    }

    /// Due timestamp lies strictly in the past.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_at.is_some_and(|due| due < now)
    }

    /// Due later on the same calendar day as `now`.
    pub fn is_due_today(&self, now: DateTime<Utc>) -> bool {
        self.due_at
            .is_some_and(|due| due >= now && due.date_naive() == now.date_naive())
    }
}
