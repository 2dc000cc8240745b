use serde::{Deserialize, Serialize};

use crate::domain::tournament::Direction;

/// Board vulnerability. Cycles every four boards starting with None on board 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vulnerability {
    None,
    NorthSouth,
    EastWest,
    All,
}

impl Vulnerability {
    pub const fn for_board(board_number: u32) -> Self {
        match board_number % 4 {
            1 => Vulnerability::None,
            2 => Vulnerability::NorthSouth,
            3 => Vulnerability::EastWest,
            _ => Vulnerability::All,
        }
    }

    pub const fn is_vulnerable(&self, direction: Direction) -> bool {
        match self {
            Vulnerability::None => false,
            Vulnerability::All => true,
            Vulnerability::NorthSouth => matches!(direction, Direction::NorthSouth),
            Vulnerability::EastWest => matches!(direction, Direction::EastWest),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Vulnerability::None => "None",
            Vulnerability::NorthSouth => "NS",
            Vulnerability::EastWest => "EW",
            Vulnerability::All => "All",
        }
    }
}
