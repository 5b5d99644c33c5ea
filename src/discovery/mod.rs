use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{catalog::MovieCatalog, journal::SearchJournal};

pub mod session;
pub mod state;

pub use session::{SessionClosed, SessionHandle};
pub use state::{FETCH_ERROR_MESSAGE, Phase, SessionView};

/// Shared map of live discovery sessions keyed by their public id.
// TODO: reap sessions idle longer than a configurable TTL
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a new session actor and register it under a fresh id.
    pub async fn create(
        &self,
        catalog: Arc<dyn MovieCatalog>,
        journal: Arc<SearchJournal>,
        quiet_period: Duration,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let handle = SessionHandle::spawn(catalog, journal, quiet_period);
        self.sessions.write().await.insert(id, handle);
        tracing::info!(session_id = %id, "discovery session created");
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drop a session's handle, which stops its actor once in-flight work
    /// drains. Returns whether the session existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session_id = %id, "discovery session closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
