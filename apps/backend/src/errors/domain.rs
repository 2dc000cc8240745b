//! Domain-level error type used across the scorer, movement engine, services
//! and store adapters.
//!
//! This error type is HTTP-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which piece of input failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    Contract,
    TrickResult,
    Direction,
    PairId,
    BoardNumber,
    TournamentShape,
    PlayerName,
    /// The submitted board/opponents do not match where the pairs currently sit.
    Seating,
    Other(String),
}

/// Domain-level not found entities.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Tournament,
    Pair,
    PairState,
    Session,
    Other(String),
}

/// Domain-level conflict kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// Compare-and-swap on a pair's board state lost the race.
    StateConflict,
    /// A different result is already stored for this board and table.
    ResultAlreadyRecorded,
    /// The pair has already reached the terminal state.
    PairFinished,
    /// Key already exists (tournament id collision).
    AlreadyExists,
    Other(String),
}

/// Store or broadcast I/O failure kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportKind {
    StoreUnavailable,
    Timeout,
    DataCorruption,
    Broadcast,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed contract, result, pair id or tournament parameters
    Validation(ValidationKind, String),
    /// Unknown tournament, pair or session
    NotFound(NotFoundKind, String),
    /// Tournament already holds its full pair count
    Capacity(String),
    /// Semantic or concurrency conflict
    Conflict(ConflictKind, String),
    /// Store or broadcast I/O failure
    Transport(TransportKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Capacity(d) => write!(f, "capacity reached: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::Transport(kind, d) => write!(f, "transport {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn capacity(detail: impl Into<String>) -> Self {
        Self::Capacity(detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn transport(kind: TransportKind, detail: impl Into<String>) -> Self {
        Self::Transport(kind, detail.into())
    }

    pub fn is_state_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict(ConflictKind::StateConflict, _))
    }
}

impl From<redis::RedisError> for DomainError {
    fn from(err: redis::RedisError) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal()
        {
            TransportKind::StoreUnavailable
        } else {
            TransportKind::Other("redis".to_string())
        };
        DomainError::Transport(kind, err.to_string())
    }
}
