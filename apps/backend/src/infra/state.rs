use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::memory_store::MemoryStore;
use crate::adapters::redis_store::RedisStore;
use crate::config::server::{ServerConfig, StoreBackend};
use crate::error::AppError;
use crate::repos::TournamentStore;
use crate::state::app_state::AppState;
use crate::ws::hub::BroadcastHub;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    config: ServerConfig,
    store: Option<Arc<dyn TournamentStore>>,
    hub: Option<Arc<BroadcastHub>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::in_memory(),
            store: None,
            hub: None,
        }
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this store instead of the one `config` names.
    pub fn with_store(mut self, store: Arc<dyn TournamentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_hub(mut self, hub: Arc<BroadcastHub>) -> Self {
        self.hub = Some(hub);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let store = match self.store {
            Some(store) => store,
            None => match &self.config.store {
                StoreBackend::Redis { url } => {
                    Arc::new(RedisStore::connect(url).await?) as Arc<dyn TournamentStore>
                }
                StoreBackend::Memory => {
                    info!("Using in-memory store; state is lost on restart");
                    Arc::new(MemoryStore::new()) as Arc<dyn TournamentStore>
                }
            },
        };

        let hub = self.hub.unwrap_or_else(|| {
            Arc::new(BroadcastHub::with_observer(Arc::new(|id, count| {
                debug!(tournament_id = %id, clients = count, "Live client count changed");
            })))
        });

        Ok(AppState::new(store, hub, self.config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
