//! Repository traits for domain layer.

pub mod tournaments;

pub use tournaments::{AppendOutcome, FinishMark, TournamentStore};
