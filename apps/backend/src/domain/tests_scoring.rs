use crate::domain::contract::{Contract, TrickResult};
use crate::domain::scoring::{declarer_score, score, score_board};
use crate::domain::tournament::Direction;
use crate::domain::vulnerability::Vulnerability;
use crate::errors::domain::{DomainError, ValidationKind};

fn ns(contract: &str, result: &str, vulnerable: bool) -> i32 {
    let contract: Contract = contract.parse().expect("contract should parse");
    let result: TrickResult = result.parse().expect("result should parse");
    score(&contract, Direction::NorthSouth, result, vulnerable).expect("score should succeed")
}

#[test]
fn reference_examples() {
    assert_eq!(ns("4H", "=", false), 420);
    assert_eq!(ns("3NT", "-1", false), -50);
    // 120 x 2 = 240 trick points, vulnerable game 500, insult 50
    assert_eq!(ns("4SX", "=", true), 790);
}

#[test]
fn part_scores_and_games() {
    assert_eq!(ns("1NT", "=", false), 90);
    assert_eq!(ns("2D", "=", false), 90);
    assert_eq!(ns("3NT", "=", false), 400);
    assert_eq!(ns("3NT", "=", true), 600);
    assert_eq!(ns("5D", "=", false), 400);
    // four of a minor is still a part score
    assert_eq!(ns("4C", "=", true), 130);
}

#[test]
fn undoubled_overtricks_use_trick_value() {
    assert_eq!(ns("1NT", "+1", false), 120);
    assert_eq!(ns("2H", "+1", false), 140);
    assert_eq!(ns("3C", "+2", false), 150);
}

#[test]
fn slam_bonuses() {
    assert_eq!(ns("6S", "=", false), 980);
    assert_eq!(ns("6S", "=", true), 1430);
    assert_eq!(ns("7NT", "=", true), 2220);
    assert_eq!(ns("7C", "=", false), 1440);
}

#[test]
fn doubling_turns_part_score_into_game() {
    assert_eq!(ns("2SX", "=", false), 470);
    assert_eq!(ns("1CXX", "=", false), 180);
}

#[test]
fn doubled_and_redoubled_overtricks() {
    assert_eq!(ns("3NTX", "+1", true), 950);
    assert_eq!(ns("3NTX", "+1", false), 650);
    assert_eq!(ns("1CXX", "+1", false), 380);
    // 80 trick points stays a part score even redoubled
    assert_eq!(ns("1CXX", "+1", true), 580);
}

#[test]
fn undoubled_undertricks() {
    assert_eq!(ns("4H", "-2", false), -100);
    assert_eq!(ns("4H", "-3", true), -300);
}

#[test]
fn doubled_undertricks_follow_progressive_table() {
    assert_eq!(ns("4SX", "-1", false), -100);
    assert_eq!(ns("4SX", "-2", false), -300);
    assert_eq!(ns("4SX", "-3", false), -600);
    assert_eq!(ns("4SX", "-4", false), -900);

    assert_eq!(ns("4SX", "-1", true), -200);
    assert_eq!(ns("4SX", "-2", true), -500);
    assert_eq!(ns("4SX", "-3", true), -800);
}

#[test]
fn redoubled_undertricks_double_the_doubled_penalty() {
    assert_eq!(ns("4SXX", "-1", false), -200);
    assert_eq!(ns("4SXX", "-2", false), -600);
    assert_eq!(ns("4SXX", "-2", true), -1000);
}

#[test]
fn bare_trick_counts_are_odd_tricks() {
    assert_eq!(ns("4S", "4", false), 420);
    assert_eq!(ns("4S", "5", false), 450);
    assert_eq!(ns("4S", "2", false), -100);
}

#[test]
fn east_west_declarer_is_negated() {
    let contract: Contract = "4H".parse().unwrap();
    let ew = score(&contract, Direction::EastWest, TrickResult::Made, false).unwrap();
    assert_eq!(ew, -420);
    assert_eq!(
        declarer_score(&contract, TrickResult::Made, false).unwrap(),
        420
    );
}

#[test]
fn score_board_derives_vulnerability_from_board_number() {
    let board1 = score_board(1, "4H", "NS", "=").unwrap();
    assert_eq!(board1.vulnerability, Vulnerability::None);
    assert_eq!(board1.ns_score, 420);

    let board2 = score_board(2, "4H", "NS", "=").unwrap();
    assert_eq!(board2.ns_score, 620);

    // NS vulnerable on board 2, so EW declares non-vulnerable
    let board2_ew = score_board(2, "4H", "EW", "=").unwrap();
    assert_eq!(board2_ew.ns_score, -420);

    let board4_ew = score_board(4, "3NT", "EW", "-1").unwrap();
    assert_eq!(board4_ew.ns_score, 100);
}

#[test]
fn malformed_input_fails_instead_of_scoring_zero() {
    let err = score_board(1, "4Q", "NS", "=").unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::Contract, _)));

    let err = score_board(1, "4H", "NE", "=").unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::Direction, _)));

    let err = score_board(1, "4H", "NS", "made").unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::TrickResult, _)));

    let err = score_board(1, "7NT", "NS", "+1").unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::TrickResult, _)));
}
