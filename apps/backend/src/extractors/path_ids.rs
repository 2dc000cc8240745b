//! Path parameter extractors for `{tournament_id}` and `{pair_id}`.
//!
//! These only check shape; existence is decided by the services.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::{PairId, TournamentId};
use crate::error::AppError;
use crate::errors::ErrorCode;

const MAX_TOURNAMENT_ID_LEN: usize = 32;

fn path_param<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, AppError> {
    req.match_info().get(name).ok_or_else(|| {
        AppError::bad_request(ErrorCode::BadRequest, format!("Missing {name} parameter"))
    })
}

pub(crate) fn parse_tournament_id(raw: &str) -> Result<TournamentId, AppError> {
    let valid = !raw.is_empty()
        && raw.len() <= MAX_TOURNAMENT_ID_LEN
        && raw.bytes().all(|b| b.is_ascii_alphanumeric());
    if !valid {
        return Err(AppError::not_found(
            ErrorCode::TournamentNotFound,
            format!("Tournament {raw} not found"),
        ));
    }
    Ok(TournamentId::new(raw.to_ascii_lowercase()))
}

/// `{tournament_id}` from the matched route.
#[derive(Debug, Clone)]
pub struct TournamentPath(pub TournamentId);

impl FromRequest for TournamentPath {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(path_param(req, "tournament_id").and_then(parse_tournament_id).map(TournamentPath))
    }
}

/// `{tournament_id}` and `{pair_id}` from the matched route.
#[derive(Debug, Clone)]
pub struct PairPath {
    pub tournament_id: TournamentId,
    pub pair_id: PairId,
}

impl FromRequest for PairPath {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extract = || -> Result<Self, AppError> {
            let tournament_id = parse_tournament_id(path_param(req, "tournament_id")?)?;
            let pair_id = path_param(req, "pair_id")?.parse::<PairId>()?;
            Ok(PairPath {
                tournament_id,
                pair_id,
            })
        };
        ready(extract())
    }
}
