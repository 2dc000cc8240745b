//! Websocket upgrade: `GET /ws?tournamentId=…&clientId=…`.

use actix_web::{web, Error, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::path_ids::parse_tournament_id;
use crate::state::app_state::AppState;
use crate::ws::session;

const MAX_CLIENT_ID_LEN: usize = 128;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WsQuery {
    #[serde(default)]
    tournament_id: String,
    #[serde(default)]
    client_id: String,
}

async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let WsQuery {
        tournament_id,
        client_id,
    } = query.into_inner();

    let client_id = client_id.trim();
    if tournament_id.trim().is_empty() || client_id.is_empty() {
        return Err(AppError::bad_request(
            ErrorCode::BadRequest,
            "tournamentId and clientId are required",
        )
        .into());
    }
    if client_id.len() > MAX_CLIENT_ID_LEN {
        return Err(AppError::bad_request(
            ErrorCode::BadRequest,
            format!("clientId must be at most {MAX_CLIENT_ID_LEN} bytes"),
        )
        .into());
    }
    let tournament_id = parse_tournament_id(tournament_id.trim())?;

    session::upgrade(req, stream, tournament_id, client_id.to_string(), app_state).await
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(upgrade)));
}
