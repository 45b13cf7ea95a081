//! Append-only question/answer history.
//!
//! Turns are write-once: the log hands out shared references only, and the
//! sole bulk operation is [`ConversationLog::clear`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::citation::Citation;
use crate::engine::RetrievedPassage;

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

/// One entry in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    content: String,
    sources: Vec<Citation>,
    created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Citations; always empty for user turns.
    pub fn sources(&self) -> &[Citation] {
        &self.sources
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Ordered conversation history for the active collection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a user turn.
    pub fn append_user(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            created_at: Utc::now(),
        });
    }

    /// Append an assistant turn, converting passages into bounded citations.
    pub fn append_assistant(&mut self, content: impl Into<String>, sources: &[RetrievedPassage]) {
        self.turns.push(ConversationTurn {
            role: Role::Assistant,
            content: content.into(),
            sources: sources.iter().map(Citation::from).collect(),
            created_at: Utc::now(),
        });
    }

    /// Drop every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
