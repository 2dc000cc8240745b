use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::TournamentId;
use crate::errors::domain::{DomainError, NotFoundKind, TransportKind};
use crate::state::app_state::AppState;
use crate::ws::hub::{BroadcastHub, ClientConnection};
use crate::ws::protocol::ServerMsg;
use crate::AppError;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);
const MAILBOX_CAPACITY: usize = 256;

/// Commands the hub sends into a session actor.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub enum SessionCommand {
    Deliver(String),
    Close,
}

/// Hub-side handle to a running session actor.
pub struct ActorConnection {
    conn_id: Uuid,
    recipient: Recipient<SessionCommand>,
}

impl ClientConnection for ActorConnection {
    fn connection_id(&self) -> Uuid {
        self.conn_id
    }

    fn send(&self, payload: &str) -> Result<(), DomainError> {
        self.recipient
            .try_send(SessionCommand::Deliver(payload.to_string()))
            .map_err(|err| {
                DomainError::transport(
                    TransportKind::Broadcast,
                    format!("session {} unreachable: {err}", self.conn_id),
                )
            })
    }

    fn close(&self) {
        self.recipient.do_send(SessionCommand::Close);
    }
}

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    tournament_id: TournamentId,
    client_id: String,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let tournament = app_state
        .store
        .get_tournament(&tournament_id)
        .await
        .map_err(AppError::from)?;
    // Results are out and the session is gone; nothing left to listen for.
    if app_state
        .store
        .is_completed(&tournament_id)
        .await
        .map_err(AppError::from)?
    {
        info!(tournament_id = %tournament_id, client_id = %client_id, "[WS SESSION] refused, tournament completed");
        return Err(AppError::from(DomainError::not_found(
            NotFoundKind::Session,
            format!("Tournament {tournament_id} has already completed"),
        ))
        .into());
    }
    // The session normally exists from registration; re-open it after a restart.
    app_state
        .hub
        .open_session(&tournament_id, tournament.total_pairs as usize);

    let session = WsSession::new(tournament_id, client_id, Arc::clone(&app_state.hub));
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    tournament_id: TournamentId,
    client_id: String,
    hub: Arc<BroadcastHub>,

    last_heartbeat: Instant,
    heartbeat_handle: Option<actix::SpawnHandle>,
}

impl WsSession {
    fn new(tournament_id: TournamentId, client_id: String, hub: Arc<BroadcastHub>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            tournament_id,
            client_id,
            hub,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(
        ctx: &mut ws::WebsocketContext<Self>,
        code: &str,
        message: impl Into<String>,
    ) {
        Self::send_json(ctx, &ServerMsg::error(code, message));
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let handle = ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    tournament_id = %actor.tournament_id,
                    client_id = %actor.client_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.set_mailbox_capacity(MAILBOX_CAPACITY);
        info!(
            conn_id = %self.conn_id,
            tournament_id = %self.tournament_id,
            client_id = %self.client_id,
            "[WS SESSION] started"
        );

        let conn = Arc::new(ActorConnection {
            conn_id: self.conn_id,
            recipient: ctx.address().recipient::<SessionCommand>(),
        });
        if let Err(err) = self.hub.add_client(&self.tournament_id, &self.client_id, conn) {
            let app_err = AppError::from(err);
            Self::send_error_and_close(ctx, app_err.code().as_str(), app_err.to_string());
            return;
        }

        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Err(err) =
            self.hub
                .remove_connection(&self.tournament_id, &self.client_id, self.conn_id)
        {
            warn!(error = %err, conn_id = %self.conn_id, "[WS SESSION] deregistration failed");
        }
        info!(
            conn_id = %self.conn_id,
            tournament_id = %self.tournament_id,
            client_id = %self.client_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            // Clients only listen; inbound frames just count as liveness.
            Ok(ws::Message::Text(_))
            | Ok(ws::Message::Binary(_))
            | Ok(ws::Message::Continuation(_))
            | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    client_id = %self.client_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<SessionCommand> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: SessionCommand, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            SessionCommand::Deliver(payload) => ctx.text(payload),
            SessionCommand::Close => {
                if let Some(handle) = self.heartbeat_handle.take() {
                    ctx.cancel_future(handle);
                }
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
            }
        }
    }
}
