//! Request context: an id for every request and, where the URL names one, the
//! tournament it concerns. Both go into the request extensions and onto a
//! `request` span, so every log line emitted while serving the request
//! (store calls, movement, broadcasts) carries them.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    HttpMessage,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::TournamentId;
use crate::extractors::path_ids::parse_tournament_id;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_INBOUND_ID_LEN: usize = 64;
const TOURNAMENTS_PREFIX: &str = "/api/tournaments/";

/// Per-request context stored in the request extensions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub tournament_id: Option<TournamentId>,
}

/// Keep a caller's `x-request-id` when it is short and plain, so a table
/// client's retries can be correlated; otherwise mint one.
fn request_id_for(inbound: Option<&str>) -> String {
    inbound
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_INBOUND_ID_LEN
                && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Tournament named by `/api/tournaments/{id}/…` or `/ws?tournamentId=…`.
/// Runs before routing, so it reads the raw URL.
fn tournament_in_url(path: &str, query: &str) -> Option<TournamentId> {
    let raw = match path.strip_prefix(TOURNAMENTS_PREFIX) {
        Some(rest) => rest.split('/').next(),
        None if path == "/ws" => query
            .split('&')
            .find_map(|pair| pair.strip_prefix("tournamentId=")),
        None => None,
    }?;
    parse_tournament_id(raw).ok()
}

/// Tags each request with its context and echoes the id in `x-request-id`.
pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let inbound = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        let context = RequestContext {
            request_id: request_id_for(inbound),
            tournament_id: tournament_in_url(req.path(), req.query_string()),
        };

        let span = tracing::info_span!(
            "request",
            request_id = %context.request_id,
            tournament_id = context.tournament_id.as_ref().map(|id| id.as_str()),
        );
        let request_id = context.request_id.clone();
        req.extensions_mut().insert(context);

        let fut = span.in_scope(|| self.service.call(req));

        Box::pin(
            async move {
                let mut res = fut.await?;
                if let Ok(value) = header::HeaderValue::from_str(&request_id) {
                    res.headers_mut()
                        .insert(header::HeaderName::from_static(REQUEST_ID_HEADER), value);
                }
                Ok(res)
            }
            .instrument(span),
        )
    }
}
