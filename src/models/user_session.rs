use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SYSTEM_PROMPT;
use crate::models::conversation::Conversation;

/// Which screen the session is on. A session starts on the welcome screen
/// and moves to the tool screen once; it never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Welcome,
    Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    #[default]
    Idle,
    Generating,
}

#[derive(Debug, Clone)]
pub struct UserSession {
    pub screen: Screen,
    pub workflow: WorkflowState,
    pub history: Conversation,
    pub created_at: DateTime<Utc>,
}

impl Default for UserSession {
    fn default() -> Self {
        UserSession::new(None)
    }
}

impl UserSession {
    pub fn new(history_max_turns: Option<usize>) -> Self {
        UserSession {
            screen: Screen::Welcome,
            workflow: WorkflowState::Idle,
            history: Conversation::with_window(SYSTEM_PROMPT, history_max_turns),
            created_at: Utc::now(),
        }
    }

    /// Moves the session to the tool screen. Returns `true` only on the call
    /// that actually changed the screen.
    pub fn enter_tool(&mut self) -> bool {
        match self.screen {
            Screen::Welcome => {
                self.screen = Screen::Tool;
                true
            }
            Screen::Tool => false,
        }
    }

    pub fn view(&self, session_id: &str) -> SessionView {
        SessionView {
            session_id: session_id.to_string(),
            screen: self.screen,
            workflow: self.workflow,
            turns: self.history.len(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub screen: Screen,
    pub workflow: WorkflowState,
    pub turns: usize,
    pub created_at: DateTime<Utc>,
}
