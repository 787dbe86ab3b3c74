use std::sync::Arc;

use crate::config::AppConfig;
use crate::global_session_manager::GlobalSessionManager;
use crate::services::completion_service::CompletionClient;

#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<dyn CompletionClient>,
    pub session_manager: GlobalSessionManager,
}

impl AppState {
    pub fn new(completion: Arc<dyn CompletionClient>, config: &AppConfig) -> Self {
        AppState {
            completion,
            session_manager: GlobalSessionManager::new(config.history_max_turns, config.session_idle_ttl),
        }
    }
}
