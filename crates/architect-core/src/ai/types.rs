//! Domain types shared by adapters and sessions

use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Build the message list for a turn: prior history, plus `input` as a user
/// turn unless the history already ends with it.
pub fn turn_messages(history: &[ChatMessage], input: &str) -> Vec<ChatMessage> {
    let mut messages = history.to_vec();
    let already_present = matches!(
        history.last(),
        Some(ChatMessage { role: Role::User, content }) if content == input
    );
    if !already_present {
        messages.push(ChatMessage::user(input));
    }
    messages
}
