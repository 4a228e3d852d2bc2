//! HTTP API for the compendium
//!
//! The browser front end drives the diary and the storybook through these
//! routes; the views themselves live in the front end.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::diary::SessionRegistry;
use crate::llm::LlmService;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub diaries: Arc<SessionRegistry>,
    pub llm_service: Arc<dyn LlmService>,
    pub story_timeout: Duration,
}

impl AppState {
    pub fn new(llm_service: Arc<dyn LlmService>, reply_timeout: Duration) -> Self {
        Self {
            diaries: Arc::new(SessionRegistry::new(llm_service.clone(), reply_timeout)),
            llm_service,
            story_timeout: crate::story::DEFAULT_STORY_TIMEOUT,
        }
    }
}
