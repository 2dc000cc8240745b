//! Tournament, pair and standings routes under `/api/tournaments`.

use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{BoardState, GameFormat, Leaderboard, Pair};
use crate::error::AppError;
use crate::extractors::path_ids::{PairPath, TournamentPath};
use crate::extractors::validated_json::ValidatedJson;
use crate::services::tournaments::NewTournament;
use crate::state::app_state::AppState;
use crate::ws::protocol::StandingEntry;

fn default_format() -> GameFormat {
    GameFormat::Pair
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTournamentRequest {
    boards_per_round: u32,
    total_rounds: u32,
    #[serde(default = "default_format")]
    format: GameFormat,
    total_pairs: u32,
}

#[derive(Debug, Deserialize)]
struct RegisterPairRequest {
    name1: String,
    name2: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterPairResponse {
    pair: Pair,
    board_state: BoardState,
}

#[derive(Debug, Serialize)]
struct LeaderboardResponse {
    #[serde(rename = "NS")]
    ns: Vec<StandingEntry>,
    #[serde(rename = "EW")]
    ew: Vec<StandingEntry>,
}

impl From<&Leaderboard> for LeaderboardResponse {
    fn from(board: &Leaderboard) -> Self {
        Self {
            ns: board.ns.iter().map(StandingEntry::from).collect(),
            ew: board.ew.iter().map(StandingEntry::from).collect(),
        }
    }
}

/// POST /api/tournaments
async fn create_tournament(
    body: ValidatedJson<CreateTournamentRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let tournament = app_state
        .tournaments()
        .create(NewTournament {
            boards_per_round: req.boards_per_round,
            total_rounds: req.total_rounds,
            format: req.format,
            total_pairs: req.total_pairs,
        })
        .await?;
    Ok(HttpResponse::Created().json(tournament))
}

/// GET /api/tournaments/{tournament_id}
async fn get_tournament(
    path: TournamentPath,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tournament = app_state.tournaments().get(&path.0).await?;
    Ok(HttpResponse::Ok().json(tournament))
}

/// POST /api/tournaments/{tournament_id}/pairs
///
/// Seats the next pair and returns its starting board state.
async fn register_pair(
    path: TournamentPath,
    body: ValidatedJson<RegisterPairRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (pair, board_state) = app_state
        .tournaments()
        .register_pair(&path.0, &body.name1, &body.name2)
        .await?;
    Ok(HttpResponse::Created().json(RegisterPairResponse { pair, board_state }))
}

/// GET /api/tournaments/{tournament_id}/pairs/{pair_id}
async fn get_pair(path: PairPath, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let pair = app_state
        .tournaments()
        .get_pair(&path.tournament_id, path.pair_id)
        .await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// GET /api/tournaments/{tournament_id}/pairs/{pair_id}/state
async fn get_pair_state(
    path: PairPath,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let state = app_state
        .tournaments()
        .get_pair_state(&path.tournament_id, path.pair_id)
        .await?;
    Ok(HttpResponse::Ok().json(state))
}

/// GET /api/tournaments/{tournament_id}/pairs/{pair_id}/results
async fn get_pair_results(
    path: PairPath,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let rows = app_state
        .tournaments()
        .get_pair_results(&path.tournament_id, path.pair_id)
        .await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /api/tournaments/{tournament_id}/leaderboard
async fn get_leaderboard(
    path: TournamentPath,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let board = app_state.leaderboard().standings(&path.0).await?;
    Ok(HttpResponse::Ok().json(LeaderboardResponse::from(&board)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(create_tournament)))
        .service(web::resource("/{tournament_id}").route(web::get().to(get_tournament)))
        .service(web::resource("/{tournament_id}/pairs").route(web::post().to(register_pair)))
        .service(web::resource("/{tournament_id}/pairs/{pair_id}").route(web::get().to(get_pair)))
        .service(
            web::resource("/{tournament_id}/pairs/{pair_id}/state")
                .route(web::get().to(get_pair_state)),
        )
        .service(
            web::resource("/{tournament_id}/pairs/{pair_id}/results")
                .route(web::get().to(get_pair_results)),
        )
        .service(
            web::resource("/{tournament_id}/leaderboard").route(web::get().to(get_leaderboard)),
        );
}
