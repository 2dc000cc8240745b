#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridge_backend::domain::{PairId, TournamentId};
use bridge_backend::errors::domain::{DomainError, TransportKind};
use bridge_backend::infra::state::build_state;
use bridge_backend::ws::hub::ClientConnection;
use bridge_backend::AppState;
use parking_lot::Mutex;
use serde_json::Value;
use uuid::Uuid;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Build an actix test service over `routes::configure` with the production
/// middleware stack.
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(bridge_backend::StructuredLogger)
                .wrap(bridge_backend::RequestTrace)
                .app_data(actix_web::web::Data::new($state))
                .configure(bridge_backend::routes::configure),
        )
        .await
    };
}

/// Fresh state over the in-memory store.
pub async fn memory_state() -> AppState {
    build_state().build().await.expect("memory state builds")
}

/// Hub-side connection that keeps every frame it is sent.
#[derive(Default)]
pub struct RecordingClient {
    id: Uuid,
    frames: Mutex<Vec<String>>,
    closed: AtomicBool,
    failing: AtomicBool,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            ..Default::default()
        })
    }

    /// Make every later send fail, as a dropped socket would.
    pub fn break_connection(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn frames(&self) -> Vec<Value> {
        self.frames
            .lock()
            .iter()
            .map(|f| serde_json::from_str(f).expect("frames are JSON"))
            .collect()
    }

    pub fn frames_of_type(&self, kind: &str) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter(|f| f["type"] == kind)
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl ClientConnection for RecordingClient {
    fn connection_id(&self) -> Uuid {
        self.id
    }

    fn send(&self, payload: &str) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::transport(TransportKind::Broadcast, "socket gone"));
        }
        self.frames.lock().push(payload.to_string());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Deterministic but varied contract, declarer and result for a board.
pub fn sample_result(board: u32, ns: PairId, ew: PairId) -> (&'static str, &'static str, String) {
    const CONTRACTS: [&str; 6] = ["3NT", "4S", "2H", "5DX", "1NT", "4HX"];
    let salt = (board + 3 * ns.table + 5 * ew.table) as usize;
    let contract = CONTRACTS[salt % CONTRACTS.len()];
    let declarer = if salt % 2 == 0 { "NS" } else { "EW" };
    let result = match salt % 4 {
        0 => "=".to_string(),
        1 => "+1".to_string(),
        2 => "-1".to_string(),
        _ => "-2".to_string(),
    };
    (contract, declarer, result)
}

pub fn tid(raw: &str) -> TournamentId {
    TournamentId::from(raw)
}
