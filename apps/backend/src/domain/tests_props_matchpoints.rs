//! Property tests for matchpoint ranking.
//!
//! Properties tested:
//! - NS matchpoints on a board sum to n(n-1)/2
//! - NS and EW at one table share exactly n-1 points
//! - Final percentages stay within 0..=100

use proptest::prelude::*;

use crate::domain::matchpoints::{board_matchpoints, ew_matchpoints, rank};
use crate::domain::results::BoardResult;
use crate::domain::test_gens::board_scores;
use crate::domain::test_prelude;
use crate::domain::tournament::{Direction, GameFormat, PairId, Tournament, TournamentId};
use crate::domain::vulnerability::Vulnerability;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_board_total_is_fixed(scores in board_scores()) {
        let n = scores.len();
        let mp = board_matchpoints(&scores);
        prop_assert_eq!(mp.len(), n);
        let total: f64 = mp.iter().sum();
        if n == 1 {
            prop_assert_eq!(total, 0.5);
        } else {
            prop_assert_eq!(total, (n * (n - 1)) as f64 / 2.0);
        }
    }

    #[test]
    fn prop_table_shares_available_points(scores in board_scores()) {
        let n = scores.len();
        for ns in board_matchpoints(&scores) {
            let ew = ew_matchpoints(ns, n);
            prop_assert!(ns >= 0.0 && ew >= 0.0);
            if n > 1 {
                prop_assert_eq!(ns + ew, (n - 1) as f64);
            }
        }
    }

    #[test]
    fn prop_percentages_are_bounded(scores in board_scores(), boards in 1u32..=4) {
        let tables = scores.len() as u32;
        let tournament = Tournament {
            id: TournamentId::from("prop02"),
            boards_per_round: boards,
            total_rounds: tables,
            format: GameFormat::Pair,
            total_pairs: tables * 2,
        };
        let mut results = Vec::new();
        for board in 1..=tournament.total_boards() {
            for (i, &ns_score) in scores.iter().enumerate() {
                let table = i as u32 + 1;
                results.push(BoardResult {
                    board_number: board,
                    contract: "4H".to_string(),
                    declarer: Direction::NorthSouth,
                    result: "=".to_string(),
                    ns_pair: PairId::ns(table),
                    ew_pair: PairId::ew(table),
                    vulnerability: Vulnerability::for_board(board),
                    ns_score,
                });
            }
        }
        let ranking = rank(&tournament, &results);
        for score in ranking.scores.values() {
            prop_assert!((0.0..=100.0).contains(&score.percentage), "{:?}", score);
        }
    }
}
