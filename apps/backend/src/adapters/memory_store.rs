//! Process-local tournament store.
//!
//! Each tournament lives behind its own mutex inside a sharded map, so the
//! atomic operations of the store contract hold without any cross-tournament
//! locking. Used by tests and by `STORE_BACKEND=memory`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::domain::{BoardResult, BoardState, Pair, PairBoardResult, PairId, Tournament, TournamentId};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::repos::{AppendOutcome, FinishMark, TournamentStore};

struct TournamentRecord {
    tournament: Tournament,
    slots_claimed: u32,
    /// Ordinals below `slots_claimed` given back by failed registrations.
    released_slots: BTreeSet<u32>,
    pairs: BTreeMap<PairId, Pair>,
    states: HashMap<PairId, BoardState>,
    results: BTreeMap<(u32, PairId), BoardResult>,
    finished: BTreeSet<PairId>,
    finished_counter: u32,
    completed: bool,
    pair_board_results: HashMap<PairId, Vec<PairBoardResult>>,
}

impl TournamentRecord {
    fn new(tournament: Tournament) -> Self {
        Self {
            tournament,
            slots_claimed: 0,
            released_slots: BTreeSet::new(),
            pairs: BTreeMap::new(),
            states: HashMap::new(),
            results: BTreeMap::new(),
            finished: BTreeSet::new(),
            finished_counter: 0,
            completed: false,
            pair_board_results: HashMap::new(),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tournaments: DashMap<TournamentId, Arc<Mutex<TournamentRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: &TournamentId) -> Result<Arc<Mutex<TournamentRecord>>, DomainError> {
        self.tournaments
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Tournament, format!("Tournament {id} not found"))
            })
    }
}

#[async_trait]
impl TournamentStore for MemoryStore {
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn create_tournament(&self, tournament: &Tournament) -> Result<(), DomainError> {
        match self.tournaments.entry(tournament.id.clone()) {
            Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::AlreadyExists,
                format!("Tournament {} already exists", tournament.id),
            )),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(TournamentRecord::new(tournament.clone()))));
                Ok(())
            }
        }
    }

    async fn get_tournament(&self, id: &TournamentId) -> Result<Tournament, DomainError> {
        let record = self.record(id)?;
        let tournament = record.lock().tournament.clone();
        Ok(tournament)
    }

    async fn claim_pair_slot(&self, id: &TournamentId, capacity: u32) -> Result<u32, DomainError> {
        let record = self.record(id)?;
        let mut guard = record.lock();
        if let Some(ordinal) = guard.released_slots.pop_first() {
            return Ok(ordinal);
        }
        if guard.slots_claimed >= capacity {
            return Err(DomainError::capacity(format!(
                "Tournament {id} already has {capacity} pairs"
            )));
        }
        guard.slots_claimed += 1;
        Ok(guard.slots_claimed)
    }

    async fn release_pair_slot(&self, id: &TournamentId, ordinal: u32) -> Result<(), DomainError> {
        let record = self.record(id)?;
        let mut guard = record.lock();
        let rec = &mut *guard;
        if ordinal == 0 || ordinal > rec.slots_claimed {
            return Ok(());
        }
        if ordinal == rec.slots_claimed {
            rec.slots_claimed -= 1;
            // Fold earlier releases that are now on top back into the counter.
            while rec.released_slots.remove(&rec.slots_claimed) {
                rec.slots_claimed -= 1;
            }
        } else {
            rec.released_slots.insert(ordinal);
        }
        Ok(())
    }

    async fn put_pair(&self, pair: &Pair) -> Result<(), DomainError> {
        let record = self.record(&pair.tournament_id)?;
        record.lock().pairs.insert(pair.id, pair.clone());
        Ok(())
    }

    async fn get_pair(&self, id: &TournamentId, pair_id: PairId) -> Result<Pair, DomainError> {
        let record = self.record(id)?;
        let pair = record.lock().pairs.get(&pair_id).cloned();
        pair.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Pair,
                format!("Pair {pair_id} not found in tournament {id}"),
            )
        })
    }

    async fn list_pairs(&self, id: &TournamentId) -> Result<Vec<Pair>, DomainError> {
        let record = self.record(id)?;
        let pairs = record.lock().pairs.values().cloned().collect();
        Ok(pairs)
    }

    async fn set_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        state: &BoardState,
    ) -> Result<(), DomainError> {
        let record = self.record(id)?;
        record.lock().states.insert(pair_id, *state);
        Ok(())
    }

    async fn get_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<BoardState, DomainError> {
        let record = self.record(id)?;
        let state = record.lock().states.get(&pair_id).copied();
        state.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::PairState,
                format!("No board state for pair {pair_id} in tournament {id}"),
            )
        })
    }

    async fn compare_and_set_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        expected: &BoardState,
        next: &BoardState,
    ) -> Result<bool, DomainError> {
        let record = self.record(id)?;
        let mut guard = record.lock();
        match guard.states.get_mut(&pair_id) {
            Some(current) if current == expected => {
                *current = *next;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DomainError::not_found(
                NotFoundKind::PairState,
                format!("No board state for pair {pair_id} in tournament {id}"),
            )),
        }
    }

    async fn append_board_result(
        &self,
        id: &TournamentId,
        board_number: u32,
        ns_pair: PairId,
        result: &BoardResult,
    ) -> Result<AppendOutcome, DomainError> {
        let record = self.record(id)?;
        let mut guard = record.lock();
        if let Some(existing) = guard.results.get(&(board_number, ns_pair)) {
            return Ok(AppendOutcome::Duplicate(existing.clone()));
        }
        guard.results.insert((board_number, ns_pair), result.clone());
        Ok(AppendOutcome::Inserted)
    }

    async fn list_board_results(&self, id: &TournamentId) -> Result<Vec<BoardResult>, DomainError> {
        let record = self.record(id)?;
        let results = record.lock().results.values().cloned().collect();
        Ok(results)
    }

    async fn add_finished_pair(&self, id: &TournamentId, pair_id: PairId) -> Result<bool, DomainError> {
        let record = self.record(id)?;
        let added = record.lock().finished.insert(pair_id);
        Ok(added)
    }

    async fn increment_finished_counter(&self, id: &TournamentId) -> Result<u32, DomainError> {
        let record = self.record(id)?;
        let mut guard = record.lock();
        guard.finished_counter += 1;
        Ok(guard.finished_counter)
    }

    async fn mark_pair_finished(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<FinishMark, DomainError> {
        let record = self.record(id)?;
        let mut guard = record.lock();
        let newly_finished = guard.finished.insert(pair_id);
        if newly_finished {
            guard.finished_counter += 1;
        }
        Ok(FinishMark {
            newly_finished,
            finished_count: guard.finished_counter,
        })
    }

    async fn mark_completed(&self, id: &TournamentId) -> Result<bool, DomainError> {
        let record = self.record(id)?;
        let mut guard = record.lock();
        let first = !guard.completed;
        guard.completed = true;
        Ok(first)
    }

    async fn is_completed(&self, id: &TournamentId) -> Result<bool, DomainError> {
        let record = self.record(id)?;
        let completed = record.lock().completed;
        Ok(completed)
    }

    async fn put_pair_board_results(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        rows: &[PairBoardResult],
    ) -> Result<(), DomainError> {
        let record = self.record(id)?;
        record.lock().pair_board_results.insert(pair_id, rows.to_vec());
        Ok(())
    }

    async fn get_pair_board_results(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<Vec<PairBoardResult>, DomainError> {
        let record = self.record(id)?;
        let rows = record
            .lock()
            .pair_board_results
            .get(&pair_id)
            .cloned()
            .unwrap_or_default();
        Ok(rows)
    }
}
