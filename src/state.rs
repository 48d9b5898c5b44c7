use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ai::Recommender;
use crate::engine::console::Console;
use crate::error::AppError;
use crate::fleet::FleetRegistry;
use crate::models::assignment::ConfirmedAssignment;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub sessions: DashMap<Uuid, Console>,
    pub registry: FleetRegistry,
    pub recommender: Arc<dyn Recommender>,
    pub assignment_events_tx: broadcast::Sender<ConfirmedAssignment>,
    pub success_reset: Duration,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        registry: FleetRegistry,
        recommender: Arc<dyn Recommender>,
        event_buffer_size: usize,
        success_reset: Duration,
    ) -> Self {
        let (assignment_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            sessions: DashMap::new(),
            registry,
            recommender,
            assignment_events_tx,
            success_reset,
            metrics: Metrics::new(),
        }
    }

    pub fn open_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(id, Console::new(id));
        self.metrics.active_sessions.set(self.sessions.len() as i64);
        id
    }

    /// Drops the console. Searches or reset timers still pending for it are
    /// discarded when they finish.
    pub fn close_session(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))?;
        self.metrics.active_sessions.set(self.sessions.len() as i64);
        Ok(())
    }

    /// Runs `f` against the session's console under its entry lock.
    pub fn with_console<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Console) -> T,
    ) -> Result<T, AppError> {
        let mut console = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))?;

        Ok(f(console.value_mut()))
    }
}
