//! Tournament store contract.
//!
//! The store is the single source of truth for tournaments, pairs, board
//! states and recorded results. Every operation that two requests could race
//! on (slot claims, state transitions, result inserts, finish bookkeeping) is
//! atomic at the store level.

use async_trait::async_trait;

use crate::domain::{BoardResult, BoardState, Pair, PairBoardResult, PairId, Tournament, TournamentId};
use crate::errors::domain::DomainError;

/// Outcome of inserting a board result that may already exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Inserted,
    /// A result was already recorded for this board and table; carries it.
    Duplicate(BoardResult),
}

/// Finish bookkeeping for one pair, read back in the same atomic step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishMark {
    /// True only for the call that first marked the pair.
    pub newly_finished: bool,
    /// Finished pairs after this call.
    pub finished_count: u32,
}

#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Cheap connectivity check for health reporting.
    async fn ping(&self) -> Result<(), DomainError>;

    /// Insert a new tournament. `Conflict(AlreadyExists)` if the id is taken.
    async fn create_tournament(&self, tournament: &Tournament) -> Result<(), DomainError>;

    /// `NotFound(Tournament)` if unknown.
    async fn get_tournament(&self, id: &TournamentId) -> Result<Tournament, DomainError>;

    /// Reserve the next registration ordinal (1-based). Fails with `Capacity`
    /// once `capacity` ordinals are taken, leaving the counter unchanged.
    async fn claim_pair_slot(&self, id: &TournamentId, capacity: u32) -> Result<u32, DomainError>;

    /// Give back `ordinal` after a failed registration. The top ordinal is
    /// returned to the counter; any other is kept aside and handed out again
    /// by the next claim, so no seat is skipped or claimed twice.
    async fn release_pair_slot(&self, id: &TournamentId, ordinal: u32) -> Result<(), DomainError>;

    async fn put_pair(&self, pair: &Pair) -> Result<(), DomainError>;

    /// `NotFound(Pair)` if unknown.
    async fn get_pair(&self, id: &TournamentId, pair_id: PairId) -> Result<Pair, DomainError>;

    /// Registered pairs ordered by pair id.
    async fn list_pairs(&self, id: &TournamentId) -> Result<Vec<Pair>, DomainError>;

    /// Unconditional write, used when a pair is registered.
    async fn set_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        state: &BoardState,
    ) -> Result<(), DomainError>;

    /// `NotFound(PairState)` if the pair has no state yet.
    async fn get_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<BoardState, DomainError>;

    /// Replace the state only if it still equals `expected`. Returns whether
    /// the swap happened.
    async fn compare_and_set_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        expected: &BoardState,
        next: &BoardState,
    ) -> Result<bool, DomainError>;

    /// Insert-if-absent keyed by (board, NS pair).
    async fn append_board_result(
        &self,
        id: &TournamentId,
        board_number: u32,
        ns_pair: PairId,
        result: &BoardResult,
    ) -> Result<AppendOutcome, DomainError>;

    /// Every recorded result, ordered by board then NS pair.
    async fn list_board_results(&self, id: &TournamentId) -> Result<Vec<BoardResult>, DomainError>;

    /// Mark `pair_id` finished. Returns true only the first time.
    async fn add_finished_pair(&self, id: &TournamentId, pair_id: PairId) -> Result<bool, DomainError>;

    /// Returns the incremented count.
    async fn increment_finished_counter(&self, id: &TournamentId) -> Result<u32, DomainError>;

    /// `add_finished_pair` and, when the pair is new, `increment_finished_counter`
    /// as one atomic step. Safe to repeat: a pair already marked reports the
    /// current count without bumping it.
    async fn mark_pair_finished(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<FinishMark, DomainError>;

    /// Record that the final standings are stored. Returns true only the first time.
    async fn mark_completed(&self, id: &TournamentId) -> Result<bool, DomainError>;

    async fn is_completed(&self, id: &TournamentId) -> Result<bool, DomainError>;

    async fn put_pair_board_results(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        rows: &[PairBoardResult],
    ) -> Result<(), DomainError>;

    /// Empty until the tournament has been ranked.
    async fn get_pair_board_results(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<Vec<PairBoardResult>, DomainError>;
}
