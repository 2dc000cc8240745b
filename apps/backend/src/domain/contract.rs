//! Contract and trick-result parsing (e.g. "4HX", "3NT", "=", "+1", "-2", "4").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Tricks a declarer must take before the first odd trick counts.
pub const BOOK: u8 = 6;
pub const TOTAL_TRICKS: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strain {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
    NoTrump,
}

impl Strain {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Strain::Clubs => "C",
            Strain::Diamonds => "D",
            Strain::Hearts => "H",
            Strain::Spades => "S",
            Strain::NoTrump => "NT",
        }
    }

    pub const fn is_minor(&self) -> bool {
        matches!(self, Strain::Clubs | Strain::Diamonds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Doubling {
    Undoubled,
    Doubled,
    Redoubled,
}

impl Doubling {
    pub const fn factor(&self) -> i32 {
        match self {
            Doubling::Undoubled => 1,
            Doubling::Doubled => 2,
            Doubling::Redoubled => 4,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Doubling::Undoubled => "",
            Doubling::Doubled => "X",
            Doubling::Redoubled => "XX",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contract {
    pub level: u8,
    pub strain: Strain,
    pub doubling: Doubling,
}

impl Contract {
    pub fn new(level: u8, strain: Strain, doubling: Doubling) -> Result<Self, DomainError> {
        if !(1..=7).contains(&level) {
            return Err(DomainError::validation(
                ValidationKind::Contract,
                format!("Contract level must be 1-7, got {level}"),
            ));
        }
        Ok(Self {
            level,
            strain,
            doubling,
        })
    }

    /// Tricks the declarer contracted to take.
    pub const fn tricks_required(&self) -> u8 {
        self.level + BOOK
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.level,
            self.strain.as_str(),
            self.doubling.as_str()
        )
    }
}

impl FromStr for Contract {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            DomainError::validation(
                ValidationKind::Contract,
                format!("Parse contract: '{s}'"),
            )
        };
        let text = s.trim().to_ascii_uppercase();
        let mut chars = text.chars();
        let level_ch = chars.next().ok_or_else(invalid)?;
        let level = level_ch.to_digit(10).ok_or_else(invalid)? as u8;
        let rest = chars.as_str();

        // NT must be tried before the single-letter strains
        let (strain, tail) = if let Some(tail) = rest.strip_prefix("NT") {
            (Strain::NoTrump, tail)
        } else if let Some(tail) = rest.strip_prefix('S') {
            (Strain::Spades, tail)
        } else if let Some(tail) = rest.strip_prefix('H') {
            (Strain::Hearts, tail)
        } else if let Some(tail) = rest.strip_prefix('D') {
            (Strain::Diamonds, tail)
        } else if let Some(tail) = rest.strip_prefix('C') {
            (Strain::Clubs, tail)
        } else {
            return Err(invalid());
        };

        let doubling = match tail {
            "" => Doubling::Undoubled,
            "X" => Doubling::Doubled,
            "XX" => Doubling::Redoubled,
            _ => return Err(invalid()),
        };

        Contract::new(level, strain, doubling).map_err(|_| invalid())
    }
}

/// How the play went, relative to the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrickResult {
    /// "=": exactly the contracted number of tricks
    Made,
    /// "+N"
    Over(u8),
    /// "-N"
    Down(u8),
    /// Bare number: odd tricks taken (tricks over book, 0-7)
    OddTricks(u8),
}

impl TrickResult {
    /// Signed trick difference against the contract: positive for overtricks,
    /// negative for undertricks. Fails when the outcome is impossible.
    pub fn relative_to(&self, contract: &Contract) -> Result<i8, DomainError> {
        let diff: i16 = match *self {
            TrickResult::Made => 0,
            TrickResult::Over(n) => i16::from(n),
            TrickResult::Down(n) => -i16::from(n),
            TrickResult::OddTricks(n) => i16::from(n) - i16::from(contract.level),
        };
        let taken = i16::from(contract.tricks_required()) + diff;
        if !(0..=i16::from(TOTAL_TRICKS)).contains(&taken) {
            return Err(DomainError::validation(
                ValidationKind::TrickResult,
                format!("Result {self} is impossible for contract {contract}"),
            ));
        }
        Ok(diff as i8)
    }
}

impl fmt::Display for TrickResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickResult::Made => f.write_str("="),
            TrickResult::Over(n) => write!(f, "+{n}"),
            TrickResult::Down(n) => write!(f, "-{n}"),
            TrickResult::OddTricks(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for TrickResult {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            DomainError::validation(ValidationKind::TrickResult, format!("Parse result: '{s}'"))
        };
        let text = s.trim();
        let count = |digits: &str| -> Result<u8, DomainError> {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            digits.parse::<u8>().map_err(|_| invalid())
        };

        if text == "=" {
            return Ok(TrickResult::Made);
        }
        if let Some(digits) = text.strip_prefix('+') {
            let n = count(digits)?;
            return if n == 0 { Ok(TrickResult::Made) } else { Ok(TrickResult::Over(n)) };
        }
        if let Some(digits) = text.strip_prefix('-') {
            let n = count(digits)?;
            return if n == 0 { Ok(TrickResult::Made) } else { Ok(TrickResult::Down(n)) };
        }
        let n = count(text)?;
        if n > TOTAL_TRICKS - BOOK {
            return Err(invalid());
        }
        Ok(TrickResult::OddTricks(n))
    }
}
