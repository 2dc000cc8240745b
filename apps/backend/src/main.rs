use actix_web::{web, App, HttpServer};
use bridge_backend::config::server::ServerConfig;
use bridge_backend::infra::state::build_state;
use bridge_backend::middleware::cors::cors_middleware;
use bridge_backend::middleware::request_trace::RequestTrace;
use bridge_backend::middleware::structured_logger::StructuredLogger;
use bridge_backend::routes;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or `set -a; . ./.env; set +a` locally).
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state().with_config(config.clone()).build().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build application state");
            std::process::exit(1);
        }
    };

    info!(
        host = %config.host,
        port = config.port,
        store = config.store_kind(),
        "Starting bridge tournament backend"
    );

    let data = web::Data::new(app_state);
    let origins = config.cors_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&origins))
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
