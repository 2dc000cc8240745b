//! Live client registry and fan-out, one session per tournament.
//!
//! Sessions are opened when a tournament is registered and closed after the
//! final results go out. Each session owns its client map, expected client
//! count, ready latch and count observer behind a single mutex; the outer
//! map only shards sessions by tournament id. Observers, connection closes and
//! the ready broadcast always run after the session lock is released.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::TournamentId;
use crate::errors::domain::{DomainError, NotFoundKind, TransportKind};
use crate::ws::protocol::ServerMsg;

/// A live client the hub can push text frames to.
pub trait ClientConnection: Send + Sync {
    /// Identity of this particular connection, distinct across reconnects of
    /// the same client.
    fn connection_id(&self) -> Uuid;

    /// Queue one frame. An error means the connection is gone.
    fn send(&self, payload: &str) -> Result<(), DomainError>;

    fn close(&self);
}

/// Called with the new live count after every add or remove.
pub type CountObserver = Arc<dyn Fn(&TournamentId, usize) + Send + Sync>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Default)]
struct Registry {
    clients: HashMap<String, Arc<dyn ClientConnection>>,
    ready_latched: bool,
}

impl Registry {
    /// Re-arm or trip the ready latch for the current count. Returns true when
    /// this change crossed into "ready".
    fn update_latch(&mut self, expected: usize) -> bool {
        let count = self.clients.len();
        if count < expected {
            self.ready_latched = false;
            false
        } else if !self.ready_latched {
            self.ready_latched = true;
            true
        } else {
            false
        }
    }
}

pub struct TournamentSession {
    id: TournamentId,
    expected: usize,
    registry: Mutex<Registry>,
    observer: Option<CountObserver>,
}

impl TournamentSession {
    fn new(id: TournamentId, expected: usize, observer: Option<CountObserver>) -> Self {
        Self {
            id,
            expected,
            registry: Mutex::new(Registry::default()),
            observer,
        }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn client_count(&self) -> usize {
        self.registry.lock().clients.len()
    }

    fn notify(&self, count: usize) {
        if let Some(observer) = &self.observer {
            observer(&self.id, count);
        }
    }
}

#[derive(Default)]
pub struct BroadcastHub {
    sessions: DashMap<TournamentId, Arc<TournamentSession>>,
    default_observer: Option<CountObserver>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hub whose sessions all report count changes to `observer`.
    pub fn with_observer(observer: CountObserver) -> Self {
        Self {
            sessions: DashMap::new(),
            default_observer: Some(observer),
        }
    }

    /// Open the session for `id`, or return the existing one unchanged.
    pub fn open_session(&self, id: &TournamentId, expected: usize) -> Arc<TournamentSession> {
        self.open_session_with_observer(id, expected, self.default_observer.clone())
    }

    pub fn open_session_with_observer(
        &self,
        id: &TournamentId,
        expected: usize,
        observer: Option<CountObserver>,
    ) -> Arc<TournamentSession> {
        self.sessions
            .entry(id.clone())
            .or_insert_with(|| {
                info!(tournament_id = %id, expected, "Opened broadcast session");
                Arc::new(TournamentSession::new(id.clone(), expected, observer))
            })
            .value()
            .clone()
    }

    /// Drop the session and close every connection it still holds.
    pub fn close_session(&self, id: &TournamentId) -> usize {
        let Some((_, session)) = self.sessions.remove(id) else {
            return 0;
        };
        let drained: Vec<Arc<dyn ClientConnection>> = {
            let mut registry = session.registry.lock();
            registry.ready_latched = false;
            registry.clients.drain().map(|(_, conn)| conn).collect()
        };
        for conn in &drained {
            conn.close();
        }
        info!(tournament_id = %id, closed = drained.len(), "Closed broadcast session");
        drained.len()
    }

    pub fn has_session(&self, id: &TournamentId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn client_count(&self, id: &TournamentId) -> usize {
        self.sessions
            .get(id)
            .map(|session| session.client_count())
            .unwrap_or(0)
    }

    fn session(&self, id: &TournamentId) -> Result<Arc<TournamentSession>, DomainError> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Session,
                    format!("No live session for tournament {id}"),
                )
            })
    }

    /// Register `conn` under `client_id`, replacing and closing any previous
    /// connection for that client. Returns the new live count.
    pub fn add_client(
        &self,
        id: &TournamentId,
        client_id: &str,
        conn: Arc<dyn ClientConnection>,
    ) -> Result<usize, DomainError> {
        let session = self.session(id)?;
        let new_id = conn.connection_id();
        let (replaced, count, became_ready) = {
            let mut registry = session.registry.lock();
            let replaced = registry.clients.insert(client_id.to_string(), conn);
            let became_ready = registry.update_latch(session.expected);
            (replaced, registry.clients.len(), became_ready)
        };

        if let Some(old) = replaced {
            if old.connection_id() != new_id {
                debug!(tournament_id = %id, client_id, "Replaced client connection");
                old.close();
            }
        }
        debug!(tournament_id = %id, client_id, count, "Client added");
        session.notify(count);

        if became_ready {
            info!(tournament_id = %id, count, "All expected clients connected");
            self.broadcast_to(&session, &ServerMsg::TournamentReady { ready: true })?;
        }
        Ok(count)
    }

    /// Deregister and close whatever connection `client_id` holds.
    pub fn remove_client(&self, id: &TournamentId, client_id: &str) -> Result<usize, DomainError> {
        let session = self.session(id)?;
        self.remove_where(&session, client_id, |_| true)
            .map(|(_, count)| count)
    }

    /// Remove `client_id` only while it is still bound to `connection_id`.
    /// Returns whether anything was removed. A missing session is not an error
    /// here: it was already torn down.
    pub fn remove_connection(
        &self,
        id: &TournamentId,
        client_id: &str,
        connection_id: Uuid,
    ) -> Result<bool, DomainError> {
        let Ok(session) = self.session(id) else {
            return Ok(false);
        };
        self.remove_where(&session, client_id, |conn| {
            conn.connection_id() == connection_id
        })
        .map(|(removed, _)| removed)
    }

    fn remove_where(
        &self,
        session: &TournamentSession,
        client_id: &str,
        matches: impl Fn(&Arc<dyn ClientConnection>) -> bool,
    ) -> Result<(bool, usize), DomainError> {
        let (removed, count) = {
            let mut registry = session.registry.lock();
            let is_target = registry.clients.get(client_id).is_some_and(&matches);
            let removed = if is_target {
                registry.clients.remove(client_id)
            } else {
                None
            };
            registry.update_latch(session.expected);
            (removed, registry.clients.len())
        };

        let Some(conn) = removed else {
            return Ok((false, count));
        };
        conn.close();
        debug!(tournament_id = %session.id, client_id, count, "Client removed");
        session.notify(count);
        Ok((true, count))
    }

    /// Send `msg` to every live client of `id`. Clients whose send fails are
    /// removed; the rest still receive the message.
    pub fn broadcast(&self, id: &TournamentId, msg: &ServerMsg) -> Result<BroadcastReport, DomainError> {
        let session = self.session(id)?;
        self.broadcast_to(&session, msg)
    }

    fn broadcast_to(
        &self,
        session: &TournamentSession,
        msg: &ServerMsg,
    ) -> Result<BroadcastReport, DomainError> {
        let payload = serde_json::to_string(msg).map_err(|err| {
            DomainError::transport(
                TransportKind::Broadcast,
                format!("Failed to serialize broadcast: {err}"),
            )
        })?;

        let targets: Vec<(String, Arc<dyn ClientConnection>)> = {
            let registry = session.registry.lock();
            registry
                .clients
                .iter()
                .map(|(client_id, conn)| (client_id.clone(), Arc::clone(conn)))
                .collect()
        };

        let mut report = BroadcastReport::default();
        for (client_id, conn) in targets {
            match conn.send(&payload) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(
                        tournament_id = %session.id,
                        client_id = %client_id,
                        error = %err,
                        "Dropping client after failed send"
                    );
                    report.dropped += 1;
                    let failed = conn.connection_id();
                    self.remove_where(session, &client_id, |current| {
                        current.connection_id() == failed
                    })?;
                }
            }
        }

        debug!(
            tournament_id = %session.id,
            delivered = report.delivered,
            dropped = report.dropped,
            "Broadcast complete"
        );
        Ok(report)
    }
}
