//! Store implementations behind `repos::TournamentStore`.

#[cfg(test)]
pub mod failing_store;
pub mod memory_store;
pub mod redis_store;
