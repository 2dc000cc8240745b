//! Domain layer: pure tournament rules with no I/O.

pub mod contract;
pub mod matchpoints;
pub mod movement;
pub mod results;
pub mod scoring;
pub mod tournament;
pub mod vulnerability;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_matchpoints;
#[cfg(test)]
mod tests_movement;
#[cfg(test)]
mod tests_props_matchpoints;
#[cfg(test)]
mod tests_props_movement;
#[cfg(test)]
mod tests_props_scoring;
#[cfg(test)]
mod tests_scoring;

// Re-exports for ergonomics
pub use contract::{Contract, Doubling, Strain, TrickResult};
pub use matchpoints::{rank, Leaderboard, MatchpointScore, Ranking, Standing};
pub use movement::{advance, initial_state, BoardState, Transition};
pub use results::{BoardResult, PairBoardResult};
pub use scoring::{score, score_board, ScoredBoard};
pub use tournament::{Direction, GameFormat, Pair, PairId, Tournament, TournamentId};
pub use vulnerability::Vulnerability;
