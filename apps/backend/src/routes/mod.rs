use actix_web::web;

pub mod health;
pub mod realtime;
pub mod results;
pub mod tournaments;

/// Register every route. `main.rs` adds the middleware stack around this;
/// tests call it directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Tournaments and pairs: /api/tournaments/**
    cfg.service(web::scope("/api/tournaments").configure(tournaments::configure_routes));

    // Result submission: /api/results
    cfg.service(web::scope("/api/results").configure(results::configure_routes));

    // Live standings: /ws
    cfg.service(web::scope("/ws").configure(realtime::configure_routes));
}
