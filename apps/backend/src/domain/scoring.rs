//! Duplicate-bridge contract scoring.
//!
//! Scores are computed from the declarer's side and then turned into the
//! North-South perspective used everywhere else; East-West's score on the same
//! board is always the negation.

use crate::domain::contract::{Contract, Doubling, Strain, TrickResult};
use crate::domain::tournament::Direction;
use crate::domain::vulnerability::Vulnerability;
use crate::errors::domain::DomainError;

const PART_SCORE_BONUS: i32 = 50;
const INSULT_BONUS: i32 = 50;
const GAME_THRESHOLD: i32 = 100;

fn trick_value(strain: Strain) -> i32 {
    if strain.is_minor() {
        20
    } else {
        30
    }
}

/// Trick points for the contracted tricks, including the doubling factor.
fn contract_trick_points(contract: &Contract) -> i32 {
    let level = i32::from(contract.level);
    let base = match contract.strain {
        Strain::NoTrump => 40 + (level - 1) * 30,
        strain => level * trick_value(strain),
    };
    base * contract.doubling.factor()
}

fn game_bonus(trick_points: i32, vulnerable: bool) -> i32 {
    match (trick_points >= GAME_THRESHOLD, vulnerable) {
        (true, true) => 500,
        (true, false) => 300,
        (false, _) => PART_SCORE_BONUS,
    }
}

fn slam_bonus(level: u8, vulnerable: bool) -> i32 {
    match (level, vulnerable) {
        (6, false) => 500,
        (6, true) => 750,
        (7, false) => 1000,
        (7, true) => 1500,
        _ => 0,
    }
}

fn overtrick_points(contract: &Contract, overtricks: i32, vulnerable: bool) -> i32 {
    let each = match (contract.doubling, vulnerable) {
        (Doubling::Undoubled, _) => trick_value(contract.strain),
        (Doubling::Doubled, false) => 100,
        (Doubling::Doubled, true) => 200,
        (Doubling::Redoubled, false) => 200,
        (Doubling::Redoubled, true) => 400,
    };
    overtricks * each
}

/// Penalty for going `down` tricks (always positive).
fn undertrick_penalty(doubling: Doubling, down: i32, vulnerable: bool) -> i32 {
    if doubling == Doubling::Undoubled {
        return down * if vulnerable { 100 } else { 50 };
    }

    let doubled = if vulnerable {
        // 200, then 300 each
        200 + (down - 1) * 300
    } else {
        // 100, 300, then 300 each past the second
        match down {
            1 => 100,
            _ => 300 + (down - 2) * 300,
        }
    };

    if doubling == Doubling::Redoubled {
        doubled * 2
    } else {
        doubled
    }
}

/// Score from the declaring side's point of view.
pub fn declarer_score(
    contract: &Contract,
    result: TrickResult,
    vulnerable: bool,
) -> Result<i32, DomainError> {
    let diff = i32::from(result.relative_to(contract)?);

    if diff < 0 {
        return Ok(-undertrick_penalty(contract.doubling, -diff, vulnerable));
    }

    let trick_points = contract_trick_points(contract);
    let mut score = trick_points + game_bonus(trick_points, vulnerable);
    if contract.doubling != Doubling::Undoubled {
        score += INSULT_BONUS;
    }
    score += slam_bonus(contract.level, vulnerable);
    score += overtrick_points(contract, diff, vulnerable);
    Ok(score)
}

/// Signed board score from North-South's perspective.
pub fn score(
    contract: &Contract,
    declarer: Direction,
    result: TrickResult,
    vulnerable: bool,
) -> Result<i32, DomainError> {
    let raw = declarer_score(contract, result, vulnerable)?;
    Ok(match declarer {
        Direction::NorthSouth => raw,
        Direction::EastWest => -raw,
    })
}

/// Outcome of scoring one submitted board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredBoard {
    pub contract: Contract,
    pub declarer: Direction,
    pub result: TrickResult,
    pub vulnerability: Vulnerability,
    /// North-South perspective
    pub ns_score: i32,
}

/// Parse the submitted text and score it with the board's vulnerability.
pub fn score_board(
    board_number: u32,
    contract: &str,
    declarer: &str,
    result: &str,
) -> Result<ScoredBoard, DomainError> {
    let contract: Contract = contract.parse()?;
    let declarer: Direction = declarer.parse()?;
    let result: TrickResult = result.parse()?;
    let vulnerability = Vulnerability::for_board(board_number);
    let ns_score = score(
        &contract,
        declarer,
        result,
        vulnerability.is_vulnerable(declarer),
    )?;
    Ok(ScoredBoard {
        contract,
        declarer,
        result,
        vulnerability,
        ns_score,
    })
}
