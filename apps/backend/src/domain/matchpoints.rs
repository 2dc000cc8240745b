//! Matchpoint ranking: raw board scores become relative standings.
//!
//! Every board is compared across the tables that played it. NS entries earn one
//! point per lower score and half a point per tie; the EW pair at the same table
//! gets the remainder of the `n - 1` available points.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::results::{BoardResult, PairBoardResult};
use crate::domain::tournament::{Direction, Pair, PairId, Tournament};

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// NS matchpoints for each entry of one board's NS-perspective scores, in input
/// order. A board played once scores 0.5 per side.
pub fn board_matchpoints(ns_scores: &[i32]) -> Vec<f64> {
    if ns_scores.len() == 1 {
        return vec![0.5];
    }
    ns_scores
        .iter()
        .enumerate()
        .map(|(i, &score)| {
            ns_scores
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, &other)| match score.cmp(&other) {
                    Ordering::Greater => 1.0,
                    Ordering::Equal => 0.5,
                    Ordering::Less => 0.0,
                })
                .sum()
        })
        .collect()
}

/// EW matchpoints at a table given NS's matchpoints and the number of entries.
pub fn ew_matchpoints(ns_matchpoints: f64, entries: usize) -> f64 {
    if entries <= 1 {
        0.5
    } else {
        (entries - 1) as f64 - ns_matchpoints
    }
}

/// Final percentage for an aggregate. Zero when a direction holds a single pair.
pub fn percentage(total_matchpoints: f64, total_boards: u32, pairs_per_direction: u32) -> f64 {
    if pairs_per_direction <= 1 || total_boards == 0 {
        return 0.0;
    }
    let top = f64::from(total_boards) * f64::from(pairs_per_direction - 1);
    round2(total_matchpoints / top * 100.0)
}

/// Percentage of the available points on a single board.
fn board_percentage(matchpoints: f64, entries: usize) -> f64 {
    if entries <= 1 {
        50.0
    } else {
        round2(matchpoints / (entries - 1) as f64 * 100.0)
    }
}

/// A pair's aggregate over the whole tournament.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchpointScore {
    pub pair_id: PairId,
    pub direction: Direction,
    pub matchpoints: f64,
    pub percentage: f64,
}

/// Leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub pair_id: PairId,
    pub name1: String,
    pub name2: String,
    pub percentage: f64,
    pub matchpoints: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    pub ns: Vec<Standing>,
    pub ew: Vec<Standing>,
}

/// Output of a full ranking pass.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    pub scores: BTreeMap<PairId, MatchpointScore>,
    pub board_results: BTreeMap<PairId, Vec<PairBoardResult>>,
}

impl Ranking {
    /// Join the scores with pair names, split by direction and sorted best first.
    /// Pairs without a registration record keep empty names.
    pub fn leaderboard(&self, pairs: &[Pair]) -> Leaderboard {
        let names: BTreeMap<PairId, &Pair> = pairs.iter().map(|p| (p.id, p)).collect();
        let mut board = Leaderboard::default();

        for score in self.scores.values() {
            let (name1, name2) = names
                .get(&score.pair_id)
                .map(|p| (p.name1.clone(), p.name2.clone()))
                .unwrap_or_default();
            let row = Standing {
                pair_id: score.pair_id,
                name1,
                name2,
                percentage: score.percentage,
                matchpoints: score.matchpoints,
            };
            match score.direction {
                Direction::NorthSouth => board.ns.push(row),
                Direction::EastWest => board.ew.push(row),
            }
        }

        let best_first = |a: &Standing, b: &Standing| {
            b.percentage
                .total_cmp(&a.percentage)
                .then_with(|| a.pair_id.cmp(&b.pair_id))
        };
        board.ns.sort_by(best_first);
        board.ew.sort_by(best_first);
        board
    }
}

/// Rank every pair of `tournament` from all recorded board results.
pub fn rank(tournament: &Tournament, results: &[BoardResult]) -> Ranking {
    let mut ranking = Ranking::default();
    for table in 1..=tournament.pairs_per_direction() {
        for pair_id in [PairId::ns(table), PairId::ew(table)] {
            ranking.scores.insert(
                pair_id,
                MatchpointScore {
                    pair_id,
                    direction: pair_id.direction,
                    matchpoints: 0.0,
                    percentage: 0.0,
                },
            );
            ranking.board_results.insert(pair_id, Vec::new());
        }
    }

    let mut by_board: BTreeMap<u32, Vec<&BoardResult>> = BTreeMap::new();
    for result in results {
        by_board.entry(result.board_number).or_default().push(result);
    }

    for entries in by_board.values() {
        let ns_scores: Vec<i32> = entries.iter().map(|r| r.ns_score).collect();
        let ns_points = board_matchpoints(&ns_scores);
        let n = entries.len();

        for (result, &ns_mp) in entries.iter().zip(&ns_points) {
            let ew_mp = ew_matchpoints(ns_mp, n);
            for (pair_id, opponent, mp) in [
                (result.ns_pair, result.ew_pair, ns_mp),
                (result.ew_pair, result.ns_pair, ew_mp),
            ] {
                let score = ranking.scores.entry(pair_id).or_insert(MatchpointScore {
                    pair_id,
                    direction: pair_id.direction,
                    matchpoints: 0.0,
                    percentage: 0.0,
                });
                score.matchpoints += mp;

                ranking
                    .board_results
                    .entry(pair_id)
                    .or_default()
                    .push(PairBoardResult {
                        board_number: result.board_number,
                        opponent,
                        contract: result.contract.clone(),
                        declarer: result.declarer,
                        result: result.result.clone(),
                        score: result.score_for(pair_id.direction),
                        matchpoints: mp,
                        percentage: board_percentage(mp, n),
                    });
            }
        }
    }

    let total_boards = tournament.total_boards();
    let per_direction = tournament.pairs_per_direction();
    for score in ranking.scores.values_mut() {
        score.percentage = percentage(score.matchpoints, total_boards, per_direction);
    }
    ranking
}
