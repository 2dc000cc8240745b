use crate::domain::matchpoints::{
    board_matchpoints, ew_matchpoints, percentage, rank, round2,
};
use crate::domain::results::BoardResult;
use crate::domain::scoring::score_board;
use crate::domain::tournament::{GameFormat, Pair, PairId, Tournament, TournamentId};

fn tournament() -> Tournament {
    // 3 tables, 3 boards
    Tournament::new(TournamentId::from("mp0001"), 1, 3, GameFormat::Pair, 6).unwrap()
}

fn played(board: u32, table: u32, contract: &str, declarer: &str, result: &str) -> BoardResult {
    let scored = score_board(board, contract, declarer, result).unwrap();
    BoardResult::from_scored(board, &scored, PairId::ns(table), PairId::ew(table))
}

fn pair(id: PairId, name1: &str, name2: &str) -> Pair {
    Pair {
        id,
        name1: name1.to_string(),
        name2: name2.to_string(),
        tournament_id: TournamentId::from("mp0001"),
    }
}

#[test]
fn lower_scores_and_ties_earn_points() {
    let mp = board_matchpoints(&[420, 420, -50]);
    assert_eq!(mp, vec![1.5, 1.5, 0.0]);
    assert_eq!(mp.iter().sum::<f64>(), 3.0);
}

#[test]
fn single_entry_scores_half_each_side() {
    assert_eq!(board_matchpoints(&[-800]), vec![0.5]);
    assert_eq!(ew_matchpoints(0.5, 1), 0.5);
}

#[test]
fn ew_gets_the_remainder() {
    assert_eq!(ew_matchpoints(1.5, 3), 0.5);
    assert_eq!(ew_matchpoints(0.0, 4), 3.0);
}

#[test]
fn top_on_every_board_is_one_hundred_percent() {
    assert_eq!(percentage(42.0, 6, 8), 100.0);
    assert_eq!(percentage(21.0, 6, 8), 50.0);
    assert_eq!(percentage(1.0, 3, 4), 11.11);
}

#[test]
fn lone_pair_per_direction_scores_zero() {
    assert_eq!(percentage(3.0, 3, 1), 0.0);
}

#[test]
fn rounds_to_two_decimals() {
    assert_eq!(round2(33.333_333), 33.33);
    assert_eq!(round2(66.666_666), 66.67);
}

#[test]
fn rank_aggregates_and_splits_directions() {
    let t = tournament();
    let results = vec![
        played(1, 1, "4H", "NS", "="),
        played(1, 2, "4H", "NS", "="),
        played(1, 3, "3NT", "NS", "-1"),
    ];
    let ranking = rank(&t, &results);

    assert_eq!(ranking.scores.len(), 6);
    assert_eq!(ranking.scores[&PairId::ns(1)].matchpoints, 1.5);
    assert_eq!(ranking.scores[&PairId::ns(1)].percentage, 25.0);
    assert_eq!(ranking.scores[&PairId::ns(3)].percentage, 0.0);
    assert_eq!(ranking.scores[&PairId::ew(3)].matchpoints, 2.0);
    assert_eq!(ranking.scores[&PairId::ew(3)].percentage, 33.33);
    assert_eq!(ranking.scores[&PairId::ew(1)].percentage, 8.33);

    let ns_total: f64 = ranking
        .scores
        .values()
        .filter(|s| s.pair_id.direction == crate::domain::tournament::Direction::NorthSouth)
        .map(|s| s.matchpoints)
        .sum();
    assert_eq!(ns_total, 3.0);
}

#[test]
fn rank_writes_per_pair_board_rows() {
    let t = tournament();
    let results = vec![
        played(1, 1, "4H", "NS", "="),
        played(1, 2, "4H", "NS", "="),
        played(1, 3, "3NT", "NS", "-1"),
        played(2, 1, "2S", "EW", "+1"),
    ];
    let ranking = rank(&t, &results);

    let ns1 = &ranking.board_results[&PairId::ns(1)];
    assert_eq!(ns1.len(), 2);
    assert_eq!(ns1[0].board_number, 1);
    assert_eq!(ns1[0].opponent, PairId::ew(1));
    assert_eq!(ns1[0].score, 420);
    assert_eq!(ns1[0].percentage, 75.0);
    // board 2 was only played once
    assert_eq!(ns1[1].matchpoints, 0.5);
    assert_eq!(ns1[1].percentage, 50.0);
    assert_eq!(ns1[1].score, -140);

    let ew3 = &ranking.board_results[&PairId::ew(3)];
    assert_eq!(ew3[0].score, 50);
    assert_eq!(ew3[0].percentage, 100.0);

    assert!(ranking.board_results[&PairId::ns(2)].len() == 1);
}

#[test]
fn leaderboard_sorts_best_first_with_pair_id_tiebreak() {
    let t = tournament();
    let results = vec![
        played(1, 1, "4H", "NS", "="),
        played(1, 2, "4H", "NS", "="),
        played(1, 3, "3NT", "NS", "-1"),
    ];
    let pairs = vec![
        pair(PairId::ns(1), "Ann", "Bob"),
        pair(PairId::ew(1), "Cat", "Dan"),
        pair(PairId::ns(2), "Eve", "Fay"),
        pair(PairId::ew(2), "Gus", "Hal"),
        pair(PairId::ns(3), "Ivy", "Jon"),
        pair(PairId::ew(3), "Kim", "Lou"),
    ];
    let board = rank(&t, &results).leaderboard(&pairs);

    let ns: Vec<PairId> = board.ns.iter().map(|s| s.pair_id).collect();
    assert_eq!(ns, vec![PairId::ns(1), PairId::ns(2), PairId::ns(3)]);
    let ew: Vec<PairId> = board.ew.iter().map(|s| s.pair_id).collect();
    assert_eq!(ew, vec![PairId::ew(3), PairId::ew(1), PairId::ew(2)]);

    assert_eq!(board.ew[0].name1, "Kim");
    assert_eq!(board.ew[0].percentage, 33.33);
}

#[test]
fn leaderboard_tolerates_missing_names() {
    let t = tournament();
    let board = rank(&t, &[]).leaderboard(&[]);
    assert_eq!(board.ns.len(), 3);
    assert!(board.ns.iter().all(|s| s.name1.is_empty() && s.percentage == 0.0));
}
