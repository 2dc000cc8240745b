use std::sync::Arc;

use crate::config::server::ServerConfig;
use crate::repos::TournamentStore;
use crate::services::leaderboard::LeaderboardService;
use crate::services::results::ResultService;
use crate::services::tournaments::TournamentService;
use crate::ws::hub::BroadcastHub;

/// Shared resources handed to every handler and websocket session.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TournamentStore>,
    pub hub: Arc<BroadcastHub>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn TournamentStore>, hub: Arc<BroadcastHub>, config: ServerConfig) -> Self {
        Self { store, hub, config }
    }

    pub fn tournaments(&self) -> TournamentService {
        TournamentService::new(Arc::clone(&self.store), Arc::clone(&self.hub))
    }

    pub fn results(&self) -> ResultService {
        ResultService::new(Arc::clone(&self.store), Arc::clone(&self.hub))
    }

    pub fn leaderboard(&self) -> LeaderboardService {
        LeaderboardService::new(Arc::clone(&self.store), Arc::clone(&self.hub))
    }
}
