// Unit tests for error mapping - pure domain logic without HTTP or store dependencies
use crate::errors::domain::{
    ConflictKind, DomainError, NotFoundKind, TransportKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_400() {
    let de = DomainError::validation(ValidationKind::Contract, "bad contract");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::InvalidContract);
    assert_eq!(app.status().as_u16(), 400);

    let seating = DomainError::validation(ValidationKind::Seating, "wrong board");
    let app: AppError = seating.into();
    assert_eq!(app.code().as_str(), "SEATING_MISMATCH");
}

#[test]
fn maps_capacity_to_tournament_full() {
    let app: AppError = DomainError::capacity("full").into();
    assert_eq!(app.code(), ErrorCode::TournamentFull);
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn maps_conflicts() {
    let race = DomainError::conflict(ConflictKind::StateConflict, "lost race");
    let app: AppError = race.into();
    assert_eq!(app.code().as_str(), "STATE_CONFLICT");
    assert_eq!(app.status().as_u16(), 409);

    let other = DomainError::conflict(ConflictKind::Other("x".to_string()), "generic");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "CONFLICT");
}

#[test]
fn maps_not_found() {
    let nf = DomainError::not_found(NotFoundKind::Tournament, "no tournament");
    let app: AppError = nf.into();
    assert_eq!(app.code().as_str(), "TOURNAMENT_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);
}

#[test]
fn maps_transport() {
    let t = DomainError::transport(TransportKind::Timeout, "slow");
    let app: AppError = t.into();
    assert_eq!(app.code().as_str(), "STORE_TIMEOUT");
    assert_eq!(app.status().as_u16(), 504);
    assert!(matches!(app, AppError::Timeout { .. }));

    let down = DomainError::transport(TransportKind::StoreUnavailable, "down");
    let app: AppError = down.into();
    assert_eq!(app.code().as_str(), "STORE_UNAVAILABLE");
    assert_eq!(app.status().as_u16(), 503);

    let corrupt = DomainError::transport(TransportKind::DataCorruption, "bad hash");
    let app: AppError = corrupt.into();
    assert_eq!(app.status().as_u16(), 500);
}
