use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::warn;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    store: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_error: Option<String>,
    /// Seconds since the Unix epoch
    time: u64,
}

/// Liveness plus a store round-trip. A down store is reported, not failed, so
/// the process is not restarted for a cache outage.
async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let (store, store_error) = match app_state.store.ping().await {
        Ok(()) => ("ok", None),
        Err(err) => {
            warn!(error = %err, "Store ping failed");
            ("error", Some(err.to_string()))
        }
    };

    let time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        store,
        store_error,
        time,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
