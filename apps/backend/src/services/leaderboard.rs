//! Final ranking, per-pair statistics and the closing results broadcast.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{rank, Leaderboard, Ranking, Tournament, TournamentId};
use crate::errors::domain::DomainError;
use crate::repos::TournamentStore;
use crate::ws::hub::BroadcastHub;
use crate::ws::protocol::ServerMsg;

pub struct LeaderboardService {
    store: Arc<dyn TournamentStore>,
    hub: Arc<BroadcastHub>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn TournamentStore>, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }

    async fn ranking(&self, tournament: &Tournament) -> Result<(Ranking, Leaderboard), DomainError> {
        let results = self.store.list_board_results(&tournament.id).await?;
        let pairs = self.store.list_pairs(&tournament.id).await?;
        let ranking = rank(tournament, &results);
        let board = ranking.leaderboard(&pairs);
        Ok((ranking, board))
    }

    /// Current standings from whatever has been recorded so far. No side effects.
    pub async fn standings(&self, id: &TournamentId) -> Result<Leaderboard, DomainError> {
        let tournament = self.store.get_tournament(id).await?;
        let (_, board) = self.ranking(&tournament).await?;
        Ok(board)
    }

    /// Run once every pair has finished: store each pair's board statistics,
    /// push the results to live clients, then tear the session down.
    ///
    /// Safe to call again after a failure. Only the call that marks the
    /// tournament completed broadcasts and closes the session.
    pub async fn complete(&self, tournament: &Tournament) -> Result<Leaderboard, DomainError> {
        let (ranking, board) = self.ranking(tournament).await?;

        for (pair_id, rows) in &ranking.board_results {
            self.store
                .put_pair_board_results(&tournament.id, *pair_id, rows)
                .await?;
        }
        if !self.store.mark_completed(&tournament.id).await? {
            debug!(tournament_id = %tournament.id, "Tournament already completed");
            return Ok(board);
        }

        match self.hub.broadcast(&tournament.id, &ServerMsg::results(&board)) {
            Ok(report) => info!(
                tournament_id = %tournament.id,
                delivered = report.delivered,
                dropped = report.dropped,
                "Results broadcast"
            ),
            Err(err) => warn!(
                tournament_id = %tournament.id,
                error = %err,
                "Results not broadcast"
            ),
        }
        self.hub.close_session(&tournament.id);

        info!(
            tournament_id = %tournament.id,
            ns_leader = ?board.ns.first().map(|s| s.pair_id.to_string()),
            ew_leader = ?board.ew.first().map(|s| s.pair_id.to_string()),
            "Tournament complete"
        );
        Ok(board)
    }
}
