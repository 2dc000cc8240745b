//! Error codes for the tournament backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses and websocket error frames.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Contract text could not be parsed
    InvalidContract,
    /// Result text could not be parsed or is impossible for the contract
    InvalidResult,
    /// Direction must be NS or EW
    InvalidDirection,
    /// Pair id must look like `<table><NS|EW>`
    InvalidPairId,
    /// Board number outside the tournament
    InvalidBoard,
    /// Tournament parameters are inconsistent
    InvalidTournament,
    /// Submitted board/opponents do not match the current seating
    SeatingMismatch,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    TournamentNotFound,
    PairNotFound,
    PairStateNotFound,
    SessionNotFound,
    /// General not found error
    NotFound,

    // Capacity & Conflicts
    /// Tournament already has all of its pairs
    TournamentFull,
    /// Concurrent update of a pair's state could not be applied
    StateConflict,
    /// A different result is already stored for this board
    ResultAlreadyRecorded,
    /// Pair already finished all rounds
    PairFinished,
    /// Generic conflict
    Conflict,

    // System Errors
    StoreUnavailable,
    StoreTimeout,
    DataCorruption,
    BroadcastFailed,
    Internal,
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidContract => "INVALID_CONTRACT",
            Self::InvalidResult => "INVALID_RESULT",
            Self::InvalidDirection => "INVALID_DIRECTION",
            Self::InvalidPairId => "INVALID_PAIR_ID",
            Self::InvalidBoard => "INVALID_BOARD",
            Self::InvalidTournament => "INVALID_TOURNAMENT",
            Self::SeatingMismatch => "SEATING_MISMATCH",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::TournamentNotFound => "TOURNAMENT_NOT_FOUND",
            Self::PairNotFound => "PAIR_NOT_FOUND",
            Self::PairStateNotFound => "PAIR_STATE_NOT_FOUND",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::TournamentFull => "TOURNAMENT_FULL",
            Self::StateConflict => "STATE_CONFLICT",
            Self::ResultAlreadyRecorded => "RESULT_ALREADY_RECORDED",
            Self::PairFinished => "PAIR_FINISHED",
            Self::Conflict => "CONFLICT",

            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::StoreTimeout => "STORE_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::BroadcastFailed => "BROADCAST_FAILED",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
