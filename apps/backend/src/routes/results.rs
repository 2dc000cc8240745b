//! Board result submission: `POST /api/results`.

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::path_ids::parse_tournament_id;
use crate::extractors::validated_json::ValidatedJson;
use crate::services::results::Submission;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResultRequest {
    tournament_id: String,
    board_number: u32,
    contract: String,
    /// Declaring side, `NS` or `EW`
    direction: String,
    result: String,
    ns_pair_id: String,
    ew_pair_id: String,
}

async fn submit_result(
    body: ValidatedJson<SubmitResultRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let submission = Submission {
        tournament_id: parse_tournament_id(&req.tournament_id)?,
        board_number: req.board_number,
        contract: req.contract,
        declarer: req.direction,
        result: req.result,
        ns_pair: req.ns_pair_id,
        ew_pair: req.ew_pair_id,
    };
    let outcome = app_state.results().submit(submission).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(submit_result)));
}
