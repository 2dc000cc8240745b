use actix_cors::Cors;
use actix_web::http::header;

use crate::middleware::request_trace::REQUEST_ID_HEADER;

/// Origins used when nothing valid is configured.
pub const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Keep only `http(s)://` entries from a comma-separated origin list,
/// falling back to localhost when none survive.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect()
    } else {
        origins
    }
}

/// CORS for the scoring clients: explicit origins, only the methods the API serves.
pub fn cors_middleware(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(3600);

    for origin in origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}
