use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        ConversationTurn { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ConversationTurn { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ConversationTurn { role: Role::Assistant, content: content.into() }
    }
}

/// Append-only chat history of one session.
///
/// The first turn is always the system turn given at construction. Turns
/// are never removed or reordered. When a window is configured it only
/// limits what [`Conversation::context`] hands to the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    #[serde(skip)]
    max_turns: Option<usize>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self::with_window(system_prompt, None)
    }

    pub fn with_window(system_prompt: impl Into<String>, max_turns: Option<usize>) -> Self {
        Conversation {
            turns: vec![ConversationTurn::system(system_prompt)],
            max_turns,
        }
    }

    pub fn append_user_turn(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn::user(content));
    }

    pub fn append_assistant_turn(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn::assistant(content));
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// The most recent assistant turn, i.e. the current draft.
    pub fn latest_draft(&self) -> Option<&ConversationTurn> {
        self.turns.iter().rev().find(|turn| turn.role == Role::Assistant)
    }

    /// Turns to send to the provider: the system turn followed by the newest
    /// `max_turns` non-system turns, or the whole history without a window.
    pub fn context(&self) -> Vec<ConversationTurn> {
        let Some(max_turns) = self.max_turns else {
            return self.turns.clone();
        };

        let (system, rest) = self.turns.split_at(1);
        let skip = rest.len().saturating_sub(max_turns);
        system.iter().chain(rest.iter().skip(skip)).cloned().collect()
    }
}
