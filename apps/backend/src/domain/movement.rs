//! Pair movement: which board, opponent and round each pair plays next.
//!
//! NS pairs walk the boards one set at a time and meet the EW pair from the
//! next-lower table each round. EW pairs jump a board set ahead and move up one
//! table. Halfway through, both directions skip one extra step so pairs do not
//! meet the same opponents again.

use serde::{Deserialize, Serialize};

use crate::domain::tournament::{Direction, PairId, Tournament};
use crate::errors::domain::{ConflictKind, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    pub current_board: u32,
    pub current_opponent: PairId,
    /// `total_rounds + 1` once the pair has finished
    pub current_round: u32,
}

impl BoardState {
    pub fn is_over(&self, tournament: &Tournament) -> bool {
        self.current_round > tournament.total_rounds
    }
}

/// Result of applying one submitted board to a pair's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced(BoardState),
    /// Rounds exhausted; the carried state is the terminal one to persist.
    Finished(BoardState),
}

impl Transition {
    pub fn state(&self) -> BoardState {
        match self {
            Transition::Advanced(state) | Transition::Finished(state) => *state,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Transition::Finished(_))
    }
}

/// Starting state for `pair`: its table's board set, facing the other pair at
/// the same table, round one.
pub fn initial_state(tournament: &Tournament, pair: PairId) -> BoardState {
    BoardState {
        current_board: (pair.table - 1) * tournament.boards_per_round + 1,
        current_opponent: pair.table_opponent(),
        current_round: 1,
    }
}

/// The round being left triggers the skip when it is the middle round.
fn skip_applies(tournament: &Tournament, leaving_round: u32) -> bool {
    tournament.total_pairs % 2 == 0 && leaving_round == (tournament.total_rounds + 1) / 2
}

/// Advance `state` by one played board.
pub fn advance(
    state: &BoardState,
    tournament: &Tournament,
    direction: Direction,
) -> Result<Transition, DomainError> {
    if state.is_over(tournament) {
        return Err(DomainError::conflict(
            ConflictKind::PairFinished,
            format!("Pair has already finished all {} rounds", tournament.total_rounds),
        ));
    }

    let bpr = tournament.boards_per_round;
    if state.current_board % bpr != 0 {
        return Ok(Transition::Advanced(BoardState {
            current_board: state.current_board + 1,
            ..*state
        }));
    }

    let next_round = state.current_round + 1;
    if next_round > tournament.total_rounds {
        return Ok(Transition::Finished(BoardState {
            current_round: next_round,
            ..*state
        }));
    }

    let step = if skip_applies(tournament, state.current_round) {
        2
    } else {
        1
    };
    let tables = tournament.pairs_per_direction();
    let total_boards = tournament.total_boards();
    let opponent_table = state.current_opponent.table;

    let (next_board, next_opponent) = match direction {
        Direction::NorthSouth => (
            state.current_board % total_boards + 1,
            PairId::ew((opponent_table - 1 + tables - step % tables) % tables + 1),
        ),
        Direction::EastWest => (
            (state.current_board + bpr * step) % total_boards + 1,
            PairId::ns((opponent_table - 1 + step) % tables + 1),
        ),
    };

    Ok(Transition::Advanced(BoardState {
        current_board: next_board,
        current_opponent: next_opponent,
        current_round: next_round,
    }))
}
