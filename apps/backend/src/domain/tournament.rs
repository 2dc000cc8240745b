//! Tournament, pair and seating types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::domain::{DomainError, ValidationKind};

/// Short opaque tournament id (base36, generated at registration).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(String);

impl TournamentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TournamentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "NS")]
    NorthSouth,
    #[serde(rename = "EW")]
    EastWest,
}

impl Direction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::NorthSouth => "NS",
            Direction::EastWest => "EW",
        }
    }

    pub const fn opposite(&self) -> Direction {
        match self {
            Direction::NorthSouth => Direction::EastWest,
            Direction::EastWest => Direction::NorthSouth,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NS" => Ok(Direction::NorthSouth),
            "EW" => Ok(Direction::EastWest),
            _ => Err(DomainError::validation(
                ValidationKind::Direction,
                format!("Direction must be NS or EW, got '{s}'"),
            )),
        }
    }
}

/// Pair identity: the starting table plus the direction, e.g. `3NS` or `1EW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairId {
    pub table: u32,
    pub direction: Direction,
}

impl PairId {
    pub const fn new(table: u32, direction: Direction) -> Self {
        Self { table, direction }
    }

    pub const fn ns(table: u32) -> Self {
        Self::new(table, Direction::NorthSouth)
    }

    pub const fn ew(table: u32) -> Self {
        Self::new(table, Direction::EastWest)
    }

    /// The pair seated opposite at the same table.
    pub const fn table_opponent(&self) -> Self {
        Self::new(self.table, self.direction.opposite())
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.table, self.direction)
    }
}

impl FromStr for PairId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || {
            DomainError::validation(
                ValidationKind::PairId,
                format!("Pair id must look like '<table><NS|EW>', got '{s}'"),
            )
        };
        if trimmed.len() < 3 || !trimmed.is_char_boundary(trimmed.len() - 2) {
            return Err(invalid());
        }
        let (table_part, dir_part) = trimmed.split_at(trimmed.len() - 2);
        if !table_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let table: u32 = table_part.parse().map_err(|_| invalid())?;
        if table == 0 {
            return Err(invalid());
        }
        let direction = dir_part.parse::<Direction>().map_err(|_| invalid())?;
        Ok(PairId::new(table, direction))
    }
}

impl Serialize for PairId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PairId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameFormat {
    Pair,
    Team,
}

impl GameFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GameFormat::Pair => "Pair",
            GameFormat::Team => "Team",
        }
    }
}

impl FromStr for GameFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pair" => Ok(GameFormat::Pair),
            "Team" => Ok(GameFormat::Team),
            other => Err(DomainError::validation(
                ValidationKind::TournamentShape,
                format!("Unknown format '{other}'"),
            )),
        }
    }
}

/// Static tournament parameters. Immutable after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub boards_per_round: u32,
    pub total_rounds: u32,
    pub format: GameFormat,
    pub total_pairs: u32,
}

impl Tournament {
    /// Build a tournament, rejecting shapes the movement cannot run.
    pub fn new(
        id: TournamentId,
        boards_per_round: u32,
        total_rounds: u32,
        format: GameFormat,
        total_pairs: u32,
    ) -> Result<Self, DomainError> {
        let reject = |detail: String| DomainError::validation(ValidationKind::TournamentShape, detail);

        if boards_per_round == 0 {
            return Err(reject("boardsPerRound must be at least 1".to_string()));
        }
        if total_rounds == 0 {
            return Err(reject("totalRounds must be at least 1".to_string()));
        }
        if total_pairs < 2 || total_pairs % 2 != 0 {
            return Err(reject(format!(
                "totalPairs must be an even number of at least 2, got {total_pairs}"
            )));
        }
        if total_rounds < total_pairs / 2 {
            return Err(reject(format!(
                "totalRounds ({total_rounds}) must cover every table ({})",
                total_pairs / 2
            )));
        }
        if boards_per_round.checked_mul(total_rounds).is_none() {
            return Err(reject("board count overflows".to_string()));
        }

        Ok(Self {
            id,
            boards_per_round,
            total_rounds,
            format,
            total_pairs,
        })
    }

    pub fn total_boards(&self) -> u32 {
        self.boards_per_round * self.total_rounds
    }

    /// Number of tables, equal to the number of pairs sitting in each direction.
    pub fn pairs_per_direction(&self) -> u32 {
        self.total_pairs / 2
    }

    /// Round value stored for a pair that has played every round.
    pub fn terminal_round(&self) -> u32 {
        self.total_rounds + 1
    }

    pub fn validate_board(&self, board_number: u32) -> Result<(), DomainError> {
        if board_number == 0 || board_number > self.total_boards() {
            return Err(DomainError::validation(
                ValidationKind::BoardNumber,
                format!(
                    "Board {board_number} is outside 1..={} for tournament {}",
                    self.total_boards(),
                    self.id
                ),
            ));
        }
        Ok(())
    }

    pub fn validate_pair(&self, pair: PairId) -> Result<(), DomainError> {
        if pair.table == 0 || pair.table > self.pairs_per_direction() {
            return Err(DomainError::validation(
                ValidationKind::PairId,
                format!(
                    "Pair {pair} does not exist in a {}-table tournament",
                    self.pairs_per_direction()
                ),
            ));
        }
        Ok(())
    }

    /// Check that the movement keeps every table together for the whole event.
    ///
    /// NS opponents wrap over the tables while board sets wrap over the rounds,
    /// so both sides of a table only agree on board and opponent in every round
    /// when there is exactly one round per table.
    pub fn validate_movement(&self) -> Result<(), DomainError> {
        let tables = self.pairs_per_direction();
        if self.total_rounds != tables {
            return Err(DomainError::validation(
                ValidationKind::TournamentShape,
                format!(
                    "totalRounds ({}) must equal the number of tables ({tables})",
                    self.total_rounds
                ),
            ));
        }
        Ok(())
    }

    /// Seat for the `ordinal`-th registered pair (1-based): odd ordinals sit NS,
    /// even ordinals sit EW at the same table.
    pub fn seat_for_ordinal(&self, ordinal: u32) -> PairId {
        let table = ordinal.div_ceil(2);
        if ordinal % 2 == 1 {
            PairId::ns(table)
        } else {
            PairId::ew(table)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub id: PairId,
    pub name1: String,
    pub name2: String,
    pub tournament_id: TournamentId,
}
