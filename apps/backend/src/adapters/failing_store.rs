//! Test store that fails chosen operations once, then behaves like
//! [`MemoryStore`].

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::adapters::memory_store::MemoryStore;
use crate::domain::{BoardResult, BoardState, Pair, PairBoardResult, PairId, Tournament, TournamentId};
use crate::errors::domain::{DomainError, TransportKind};
use crate::repos::{AppendOutcome, FinishMark, TournamentStore};

#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    armed: Mutex<HashSet<&'static str>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `op` (a store method name) fail with a transport error.
    pub fn fail_next(&self, op: &'static str) {
        self.armed.lock().insert(op);
    }

    fn trip(&self, op: &'static str) -> Result<(), DomainError> {
        if self.armed.lock().remove(op) {
            return Err(DomainError::transport(
                TransportKind::StoreUnavailable,
                format!("{op} failed"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TournamentStore for FailingStore {
    async fn ping(&self) -> Result<(), DomainError> {
        self.trip("ping")?;
        self.inner.ping().await
    }

    async fn create_tournament(&self, tournament: &Tournament) -> Result<(), DomainError> {
        self.trip("create_tournament")?;
        self.inner.create_tournament(tournament).await
    }

    async fn get_tournament(&self, id: &TournamentId) -> Result<Tournament, DomainError> {
        self.trip("get_tournament")?;
        self.inner.get_tournament(id).await
    }

    async fn claim_pair_slot(&self, id: &TournamentId, capacity: u32) -> Result<u32, DomainError> {
        self.trip("claim_pair_slot")?;
        self.inner.claim_pair_slot(id, capacity).await
    }

    async fn release_pair_slot(&self, id: &TournamentId, ordinal: u32) -> Result<(), DomainError> {
        self.trip("release_pair_slot")?;
        self.inner.release_pair_slot(id, ordinal).await
    }

    async fn put_pair(&self, pair: &Pair) -> Result<(), DomainError> {
        self.trip("put_pair")?;
        self.inner.put_pair(pair).await
    }

    async fn get_pair(&self, id: &TournamentId, pair_id: PairId) -> Result<Pair, DomainError> {
        self.trip("get_pair")?;
        self.inner.get_pair(id, pair_id).await
    }

    async fn list_pairs(&self, id: &TournamentId) -> Result<Vec<Pair>, DomainError> {
        self.trip("list_pairs")?;
        self.inner.list_pairs(id).await
    }

    async fn set_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        state: &BoardState,
    ) -> Result<(), DomainError> {
        self.trip("set_pair_state")?;
        self.inner.set_pair_state(id, pair_id, state).await
    }

    async fn get_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<BoardState, DomainError> {
        self.trip("get_pair_state")?;
        self.inner.get_pair_state(id, pair_id).await
    }

    async fn compare_and_set_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        expected: &BoardState,
        next: &BoardState,
    ) -> Result<bool, DomainError> {
        self.trip("compare_and_set_pair_state")?;
        self.inner
            .compare_and_set_pair_state(id, pair_id, expected, next)
            .await
    }

    async fn append_board_result(
        &self,
        id: &TournamentId,
        board_number: u32,
        ns_pair: PairId,
        result: &BoardResult,
    ) -> Result<AppendOutcome, DomainError> {
        self.trip("append_board_result")?;
        self.inner
            .append_board_result(id, board_number, ns_pair, result)
            .await
    }

    async fn list_board_results(&self, id: &TournamentId) -> Result<Vec<BoardResult>, DomainError> {
        self.trip("list_board_results")?;
        self.inner.list_board_results(id).await
    }

    async fn add_finished_pair(&self, id: &TournamentId, pair_id: PairId) -> Result<bool, DomainError> {
        self.trip("add_finished_pair")?;
        self.inner.add_finished_pair(id, pair_id).await
    }

    async fn increment_finished_counter(&self, id: &TournamentId) -> Result<u32, DomainError> {
        self.trip("increment_finished_counter")?;
        self.inner.increment_finished_counter(id).await
    }

    async fn mark_pair_finished(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<FinishMark, DomainError> {
        self.trip("mark_pair_finished")?;
        self.inner.mark_pair_finished(id, pair_id).await
    }

    async fn mark_completed(&self, id: &TournamentId) -> Result<bool, DomainError> {
        self.trip("mark_completed")?;
        self.inner.mark_completed(id).await
    }

    async fn is_completed(&self, id: &TournamentId) -> Result<bool, DomainError> {
        self.trip("is_completed")?;
        self.inner.is_completed(id).await
    }

    async fn put_pair_board_results(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        rows: &[PairBoardResult],
    ) -> Result<(), DomainError> {
        self.trip("put_pair_board_results")?;
        self.inner.put_pair_board_results(id, pair_id, rows).await
    }

    async fn get_pair_board_results(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<Vec<PairBoardResult>, DomainError> {
        self.trip("get_pair_board_results")?;
        self.inner.get_pair_board_results(id, pair_id).await
    }
}
