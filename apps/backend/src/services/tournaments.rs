//! Tournament and pair registration, plus read-side lookups.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    initial_state, BoardState, GameFormat, Pair, PairBoardResult, PairId, Tournament, TournamentId,
};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::TournamentStore;
use crate::utils::tournament_id::generate_tournament_id;
use crate::ws::hub::BroadcastHub;

/// Fresh ids tried before giving up on registration.
const ID_ATTEMPTS: usize = 8;
const MAX_NAME_LEN: usize = 64;

/// Parameters for a tournament that does not exist yet.
#[derive(Debug, Clone, Copy)]
pub struct NewTournament {
    pub boards_per_round: u32,
    pub total_rounds: u32,
    pub format: GameFormat,
    pub total_pairs: u32,
}

pub struct TournamentService {
    store: Arc<dyn TournamentStore>,
    hub: Arc<BroadcastHub>,
}

fn clean_name(raw: &str, field: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::PlayerName,
            format!("{field} must not be empty"),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(
            ValidationKind::PlayerName,
            format!("{field} must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(name.to_string())
}

impl TournamentService {
    pub fn new(store: Arc<dyn TournamentStore>, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }

    /// Register a tournament under a fresh id and open its broadcast session.
    /// Only shapes with one round per table are accepted.
    pub async fn create(&self, params: NewTournament) -> Result<Tournament, DomainError> {
        for _ in 0..ID_ATTEMPTS {
            let tournament = Tournament::new(
                generate_tournament_id(),
                params.boards_per_round,
                params.total_rounds,
                params.format,
                params.total_pairs,
            )?;
            tournament.validate_movement()?;

            match self.store.create_tournament(&tournament).await {
                Ok(()) => {
                    self.hub
                        .open_session(&tournament.id, tournament.total_pairs as usize);
                    info!(
                        tournament_id = %tournament.id,
                        boards_per_round = tournament.boards_per_round,
                        total_rounds = tournament.total_rounds,
                        total_pairs = tournament.total_pairs,
                        format = tournament.format.as_str(),
                        "Tournament registered"
                    );
                    return Ok(tournament);
                }
                Err(DomainError::Conflict(ConflictKind::AlreadyExists, _)) => {
                    warn!(tournament_id = %tournament.id, "Tournament id collision, retrying");
                }
                Err(err) => return Err(err),
            }
        }
        Err(DomainError::conflict(
            ConflictKind::AlreadyExists,
            "Could not allocate a free tournament id",
        ))
    }

    pub async fn get(&self, id: &TournamentId) -> Result<Tournament, DomainError> {
        self.store.get_tournament(id).await
    }

    /// Seat the next pair. The k-th registration sits at table ceil(k/2), NS
    /// for odd k and EW for even k. A failed registration gives its ordinal back
    /// for the next registration to take.
    pub async fn register_pair(
        &self,
        id: &TournamentId,
        name1: &str,
        name2: &str,
    ) -> Result<(Pair, BoardState), DomainError> {
        let name1 = clean_name(name1, "name1")?;
        let name2 = clean_name(name2, "name2")?;
        let tournament = self.store.get_tournament(id).await?;

        let ordinal = self.store.claim_pair_slot(id, tournament.total_pairs).await?;
        let pair_id = tournament.seat_for_ordinal(ordinal);
        let pair = Pair {
            id: pair_id,
            name1,
            name2,
            tournament_id: id.clone(),
        };
        let state = initial_state(&tournament, pair_id);

        let persisted = match self.store.put_pair(&pair).await {
            Ok(()) => self.store.set_pair_state(id, pair_id, &state).await,
            Err(err) => Err(err),
        };
        if let Err(err) = persisted {
            if let Err(release_err) = self.store.release_pair_slot(id, ordinal).await {
                warn!(
                    tournament_id = %id,
                    ordinal,
                    error = %release_err,
                    "Failed to release pair slot after registration error"
                );
            }
            return Err(err);
        }

        info!(
            tournament_id = %id,
            pair_id = %pair_id,
            ordinal,
            board = state.current_board,
            "Pair registered"
        );
        Ok((pair, state))
    }

    pub async fn get_pair(&self, id: &TournamentId, pair_id: PairId) -> Result<Pair, DomainError> {
        let tournament = self.store.get_tournament(id).await?;
        tournament.validate_pair(pair_id)?;
        self.store.get_pair(id, pair_id).await
    }

    pub async fn get_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<BoardState, DomainError> {
        let tournament = self.store.get_tournament(id).await?;
        tournament.validate_pair(pair_id)?;
        self.store.get_pair_state(id, pair_id).await
    }

    /// Per-board statistics for a pair; empty until the tournament completes.
    pub async fn get_pair_results(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<Vec<PairBoardResult>, DomainError> {
        self.get_pair(id, pair_id).await?;
        self.store.get_pair_board_results(id, pair_id).await
    }
}
