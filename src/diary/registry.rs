//! One controller per open diary view

use super::SessionController;
use crate::llm::LlmService;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Default idle time after which a diary is treated as abandoned
pub const DEFAULT_IDLE_EXPIRY: Duration = Duration::from_secs(30 * 60);

/// Open diary sessions, keyed by an opaque id
pub struct SessionRegistry {
    service: Arc<dyn LlmService>,
    reply_timeout: Duration,
    sessions: RwLock<HashMap<String, SessionController>>,
}

impl SessionRegistry {
    pub fn new(service: Arc<dyn LlmService>, reply_timeout: Duration) -> Self {
        Self {
            service,
            reply_timeout,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start an empty diary
    pub async fn open(&self) -> SessionController {
        let id = Uuid::new_v4().to_string();
        let controller = SessionController::new(id.clone(), self.service.clone())
            .with_reply_timeout(self.reply_timeout);

        self.sessions.write().await.insert(id.clone(), controller.clone());
        tracing::info!(session_id = %id, "Diary opened");
        controller
    }

    /// Look a diary up; every lookup counts as activity from its view
    pub async fn get(&self, id: &str) -> Option<SessionController> {
        let controller = self.sessions.read().await.get(id).cloned()?;
        controller.touch();
        Some(controller)
    }

    /// Tear the diary down. A reply still in flight finishes against the
    /// detached controller and is never seen again.
    pub async fn close(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Diary closed");
        }
        removed
    }

    /// Close every diary whose view has been silent for `max_idle`.
    /// Diaries waiting on a reply are kept. Returns the number removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, controller| {
            let keep = controller.is_pending() || controller.idle_for() < max_idle;
            if !keep {
                tracing::info!(session_id = %id, "Diary expired");
            }
            keep
        });

        before - sessions.len()
    }

    /// Sweep idle diaries every `period` for as long as the registry lives
    pub fn spawn_reaper(self: &Arc<Self>, max_idle: Duration, period: Duration) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let removed = registry.evict_idle(max_idle).await;
                if removed > 0 {
                    tracing::debug!(removed, "Swept idle diaries");
                }
            }
        })
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
