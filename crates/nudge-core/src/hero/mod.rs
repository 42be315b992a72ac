//! Hero task selection.
//!
//! The hero is the one task the companion puts in front of the user. It is
//! recomputed on every refresh from the active pool and the current energy
//! bucket, and always comes with a short human-readable reason.
//!
//! When the user keeps skipping, the same selector serves the "quick catch":
//! the easiest task left, offered as a way out of paralysis.

mod scoring;
mod selector;

pub use scoring::{calculate_score, ScoreBreakdown};
pub use selector::{HeroPick, HeroReason, HeroSelector};
