//! Board result submission.
//!
//! A submission is scored, recorded once per (board, table), and then moves
//! both pairs on. Every pair update is a compare-and-swap guarded by the board
//! and opponent the result was played at, so a retried or duplicated
//! submission never advances a pair twice.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{
    advance, score_board, BoardResult, BoardState, Direction, PairId, Tournament, TournamentId,
};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::{AppendOutcome, TournamentStore};
use crate::services::leaderboard::LeaderboardService;
use crate::ws::hub::BroadcastHub;

/// Compare-and-swap attempts per pair before surfacing a state conflict.
const MAX_CAS_ATTEMPTS: usize = 8;

/// One submitted table result, as received.
#[derive(Debug, Clone)]
pub struct Submission {
    pub tournament_id: TournamentId,
    pub board_number: u32,
    pub contract: String,
    pub declarer: String,
    pub result: String,
    pub ns_pair: String,
    pub ew_pair: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairProgress {
    pub pair_id: PairId,
    /// `None` once the pair has finished
    pub board_state: Option<BoardState>,
    pub is_over: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitOutcome {
    #[serde(rename = "NS")]
    pub ns: PairProgress,
    #[serde(rename = "EW")]
    pub ew: PairProgress,
    /// Signed NS score recorded for the board
    #[serde(rename = "nsScore")]
    pub ns_score: i32,
}

/// What happened to one pair while applying a result.
struct PairUpdate {
    progress: PairProgress,
    /// Finish counter value whenever the pair is in the terminal state
    finished_count: Option<u32>,
}

pub struct ResultService {
    store: Arc<dyn TournamentStore>,
    leaderboard: LeaderboardService,
}

fn parse_seat(raw: &str, expected: Direction, field: &str) -> Result<PairId, DomainError> {
    let pair: PairId = raw.parse()?;
    if pair.direction != expected {
        return Err(DomainError::validation(
            ValidationKind::PairId,
            format!("{field} must be an {expected} pair, got {pair}"),
        ));
    }
    Ok(pair)
}

fn progress(tournament: &Tournament, pair_id: PairId, state: BoardState) -> PairProgress {
    let is_over = state.is_over(tournament);
    PairProgress {
        pair_id,
        board_state: (!is_over).then_some(state),
        is_over,
    }
}

impl ResultService {
    pub fn new(store: Arc<dyn TournamentStore>, hub: Arc<BroadcastHub>) -> Self {
        let leaderboard = LeaderboardService::new(Arc::clone(&store), hub);
        Self { store, leaderboard }
    }

    pub async fn submit(&self, submission: Submission) -> Result<SubmitOutcome, DomainError> {
        let id = &submission.tournament_id;
        let tournament = self.store.get_tournament(id).await?;
        tournament.validate_board(submission.board_number)?;

        let ns_pair = parse_seat(&submission.ns_pair, Direction::NorthSouth, "nsPairId")?;
        let ew_pair = parse_seat(&submission.ew_pair, Direction::EastWest, "ewPairId")?;
        tournament.validate_pair(ns_pair)?;
        tournament.validate_pair(ew_pair)?;

        let scored = score_board(
            submission.board_number,
            &submission.contract,
            &submission.declarer,
            &submission.result,
        )?;
        let record = BoardResult::from_scored(submission.board_number, &scored, ns_pair, ew_pair);

        let ns_state = self.store.get_pair_state(id, ns_pair).await?;
        let ew_state = self.store.get_pair_state(id, ew_pair).await?;
        let seated = !ns_state.is_over(&tournament)
            && !ew_state.is_over(&tournament)
            && ns_state.current_board == submission.board_number
            && ew_state.current_board == submission.board_number
            && ns_state.current_opponent == ew_pair
            && ew_state.current_opponent == ns_pair;

        let recorded = if seated {
            self.store
                .append_board_result(id, submission.board_number, ns_pair, &record)
                .await?
        } else {
            // Not where this result belongs: only a retry of an already
            // recorded result is acceptable now.
            self.existing_result(id, submission.board_number, ns_pair)
                .await?
                .map(AppendOutcome::Duplicate)
                .ok_or_else(|| {
                    DomainError::validation(
                        ValidationKind::Seating,
                        format!(
                            "{ns_pair} and {ew_pair} are not playing board {} against each other",
                            submission.board_number
                        ),
                    )
                })?
        };

        match &recorded {
            AppendOutcome::Inserted => info!(
                tournament_id = %id,
                board = submission.board_number,
                ns_pair = %ns_pair,
                ew_pair = %ew_pair,
                contract = %record.contract,
                declarer = %record.declarer,
                result = %record.result,
                ns_score = record.ns_score,
                "Board result recorded"
            ),
            AppendOutcome::Duplicate(existing) if existing.same_outcome(&record) => debug!(
                tournament_id = %id,
                board = submission.board_number,
                ns_pair = %ns_pair,
                "Replaying identical board result"
            ),
            AppendOutcome::Duplicate(existing) => {
                return Err(DomainError::conflict(
                    ConflictKind::ResultAlreadyRecorded,
                    format!(
                        "Board {} at {ns_pair} is already recorded as {} {} {}",
                        existing.board_number, existing.contract, existing.declarer, existing.result
                    ),
                ));
            }
        }

        let ns = self
            .advance_pair(&tournament, ns_pair, submission.board_number, ew_pair)
            .await?;
        let ew = self
            .advance_pair(&tournament, ew_pair, submission.board_number, ns_pair)
            .await?;

        let everyone_done = [ns.finished_count, ew.finished_count]
            .into_iter()
            .flatten()
            .any(|count| count >= tournament.total_pairs);
        // A replay reaches this too, which retries a completion that failed earlier.
        if everyone_done && !self.store.is_completed(id).await? {
            self.leaderboard.complete(&tournament).await?;
        }

        Ok(SubmitOutcome {
            ns: ns.progress,
            ew: ew.progress,
            ns_score: record.ns_score,
        })
    }

    async fn existing_result(
        &self,
        id: &TournamentId,
        board_number: u32,
        ns_pair: PairId,
    ) -> Result<Option<BoardResult>, DomainError> {
        let results = self.store.list_board_results(id).await?;
        Ok(results
            .into_iter()
            .find(|r| r.board_number == board_number && r.ns_pair == ns_pair))
    }

    /// Move `pair_id` past `board_number`, if it is still sitting there against
    /// `opponent`. Lost races re-read and retry.
    async fn advance_pair(
        &self,
        tournament: &Tournament,
        pair_id: PairId,
        board_number: u32,
        opponent: PairId,
    ) -> Result<PairUpdate, DomainError> {
        let id = &tournament.id;
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let state = self.store.get_pair_state(id, pair_id).await?;
            if state.is_over(tournament) {
                // Finished by an earlier submission. Marking again is a no-op
                // unless that submission failed before recording the finish.
                let finished_count = self.mark_finished(tournament, pair_id).await?;
                return Ok(PairUpdate {
                    progress: progress(tournament, pair_id, state),
                    finished_count: Some(finished_count),
                });
            }
            if state.current_board != board_number || state.current_opponent != opponent {
                // Already moved on by an earlier identical submission.
                return Ok(PairUpdate {
                    progress: progress(tournament, pair_id, state),
                    finished_count: None,
                });
            }

            let transition = advance(&state, tournament, pair_id.direction)?;
            let next = transition.state();
            if !self
                .store
                .compare_and_set_pair_state(id, pair_id, &state, &next)
                .await?
            {
                debug!(tournament_id = %id, pair_id = %pair_id, attempt, "Board state changed underneath, retrying");
                continue;
            }

            let finished_count = if transition.is_finished() {
                Some(self.mark_finished(tournament, pair_id).await?)
            } else {
                None
            };
            return Ok(PairUpdate {
                progress: progress(tournament, pair_id, next),
                finished_count,
            });
        }

        warn!(tournament_id = %id, pair_id = %pair_id, "Gave up advancing pair after repeated conflicts");
        Err(DomainError::conflict(
            ConflictKind::StateConflict,
            format!("Board state for {pair_id} kept changing; try again"),
        ))
    }

    async fn mark_finished(&self, tournament: &Tournament, pair_id: PairId) -> Result<u32, DomainError> {
        let mark = self.store.mark_pair_finished(&tournament.id, pair_id).await?;
        if mark.newly_finished {
            info!(
                tournament_id = %tournament.id,
                pair_id = %pair_id,
                finished = mark.finished_count,
                total = tournament.total_pairs,
                "Pair finished"
            );
        }
        Ok(mark.finished_count)
    }
}
