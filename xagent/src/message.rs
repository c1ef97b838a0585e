//! Chat turns exchanged with the model.
//!
//! A turn is a tagged `{role, content}` record. External input (CLI text, checkpoint JSON,
//! role strings from other systems) is normalized into [`Message`] at the boundary; the rest
//! of the pipeline only sees this type.

use serde::{Deserialize, Serialize};

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat turn. Serialized as `{"role": "user", "content": "..."}`.
///
/// There is no separate tool role: tool results are fed back as user turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    /// System prompt; typically placed first in the message list.
    System(String),
    User(String),
    Assistant(String),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    /// Builds a turn from a role name (`system`, `user`/`human`, `assistant`/`ai`).
    /// Unknown roles give `None`.
    pub fn from_role(role: &str, content: impl Into<String>) -> Option<Self> {
        match role.trim().to_lowercase().as_str() {
            "system" => Some(Self::system(content)),
            "user" | "human" => Some(Self::user(content)),
            "assistant" | "ai" => Some(Self::assistant(content)),
            _ => None,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System(_) => Role::System,
            Message::User(_) => Role::User,
            Message::Assistant(_) => Role::Assistant,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::System(c) | Message::User(c) | Message::Assistant(c) => c,
        }
    }
}

/// Text of the last user turn, if any.
pub fn latest_user_request(messages: &[Message]) -> Option<&str> {
    messages.iter().rev().find_map(|m| match m {
        Message::User(c) => Some(c.as_str()),
        _ => None,
    })
}
