use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, DomainError, NotFoundKind, TransportKind, ValidationKind,
};
use crate::errors::ErrorCode;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Store unavailable: {detail}")]
    Unavailable { code: ErrorCode, detail: String },
    #[error("Timeout: {detail}")]
    Timeout { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::Unavailable { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Timeout { .. } => ErrorCode::StoreTimeout,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::Unavailable { detail, .. }
            | AppError::Timeout { detail }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail } => detail.clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Internal {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::Contract => ErrorCode::InvalidContract,
                    ValidationKind::TrickResult => ErrorCode::InvalidResult,
                    ValidationKind::Direction => ErrorCode::InvalidDirection,
                    ValidationKind::PairId => ErrorCode::InvalidPairId,
                    ValidationKind::BoardNumber => ErrorCode::InvalidBoard,
                    ValidationKind::TournamentShape => ErrorCode::InvalidTournament,
                    ValidationKind::Seating => ErrorCode::SeatingMismatch,
                    ValidationKind::PlayerName | ValidationKind::Other(_) => {
                        ErrorCode::ValidationError
                    }
                };
                AppError::invalid(code, detail)
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Tournament => ErrorCode::TournamentNotFound,
                    NotFoundKind::Pair => ErrorCode::PairNotFound,
                    NotFoundKind::PairState => ErrorCode::PairStateNotFound,
                    NotFoundKind::Session => ErrorCode::SessionNotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::Capacity(detail) => AppError::conflict(ErrorCode::TournamentFull, detail),
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::StateConflict => ErrorCode::StateConflict,
                    ConflictKind::ResultAlreadyRecorded => ErrorCode::ResultAlreadyRecorded,
                    ConflictKind::PairFinished => ErrorCode::PairFinished,
                    ConflictKind::AlreadyExists | ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::conflict(code, detail)
            }
            DomainError::Transport(kind, detail) => match kind {
                TransportKind::Timeout => AppError::Timeout { detail },
                TransportKind::StoreUnavailable => AppError::Unavailable {
                    code: ErrorCode::StoreUnavailable,
                    detail,
                },
                TransportKind::DataCorruption => {
                    AppError::internal(ErrorCode::DataCorruption, detail)
                }
                TransportKind::Broadcast => AppError::internal(ErrorCode::BroadcastFailed, detail),
                TransportKind::Other(_) => AppError::internal(ErrorCode::Internal, detail),
            },
        }
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();

        let problem_details = ProblemDetails {
            type_: format!("https://bridge.local/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .json(problem_details)
    }
}
