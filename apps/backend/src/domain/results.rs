//! Recorded board results and the per-pair statistics derived from them.

use serde::{Deserialize, Serialize};

use crate::domain::scoring::ScoredBoard;
use crate::domain::tournament::{Direction, PairId};
use crate::domain::vulnerability::Vulnerability;

/// One table's result on one board. Only the NS-keyed record is stored; the EW
/// view is always the negation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResult {
    pub board_number: u32,
    pub contract: String,
    pub declarer: Direction,
    pub result: String,
    pub ns_pair: PairId,
    pub ew_pair: PairId,
    pub vulnerability: Vulnerability,
    pub ns_score: i32,
}

impl BoardResult {
    pub fn from_scored(
        board_number: u32,
        scored: &ScoredBoard,
        ns_pair: PairId,
        ew_pair: PairId,
    ) -> Self {
        Self {
            board_number,
            contract: scored.contract.to_string(),
            declarer: scored.declarer,
            result: scored.result.to_string(),
            ns_pair,
            ew_pair,
            vulnerability: scored.vulnerability,
            ns_score: scored.ns_score,
        }
    }

    /// Raw score seen from `direction`'s side of the table.
    pub fn score_for(&self, direction: Direction) -> i32 {
        match direction {
            Direction::NorthSouth => self.ns_score,
            Direction::EastWest => -self.ns_score,
        }
    }

    /// Whether `other` records the same play at the same table. Used to tell a
    /// retried submission apart from a conflicting one.
    pub fn same_outcome(&self, other: &BoardResult) -> bool {
        self.board_number == other.board_number
            && self.ns_pair == other.ns_pair
            && self.ew_pair == other.ew_pair
            && self.contract == other.contract
            && self.declarer == other.declarer
            && self.ns_score == other.ns_score
    }
}

/// A pair's view of one board it played, written when the tournament completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairBoardResult {
    pub board_number: u32,
    pub opponent: PairId,
    pub contract: String,
    pub declarer: Direction,
    pub result: String,
    /// From this pair's perspective
    pub score: i32,
    pub matchpoints: f64,
    pub percentage: f64,
}
