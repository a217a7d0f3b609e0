//! Transcript domain types.
//!
//! A transcript is the append-only sequence of turns owned by a single
//! agent invocation: user input goes in, hooks enrich it, the model
//! responds, and the memory hook persists the exchange. Turns are
//! read-only once appended, with one deliberate exception — a retrieval
//! hook may append recalled context to the *latest* user turn before the
//! model sees it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions (routing policy, specialist prompt)
    System,
}

/// What a turn carries.
///
/// Tool results come back through the runtime as user-role turns; memory
/// operations must be able to tell them apart from genuine user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// Ordinary text authored by the role
    #[default]
    Text,
    /// Echo of a tool execution result
    ToolResult,
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Who authored this turn
    pub role: Role,

    /// Text or tool-result echo
    #[serde(default)]
    pub kind: TurnKind,

    /// The text content
    pub content: String,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<crate::tool::ToolCall>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            kind: TurnKind::Text,
            content: content.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            kind: TurnKind::Text,
            content: content.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a tool-result turn (user role, excluded from memory).
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            kind: TurnKind::ToolResult,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Whether this turn is genuine user input (not a tool echo).
    pub fn is_user_text(&self) -> bool {
        self.role == Role::User && self.kind == TurnKind::Text
    }
}

/// An append-only ordered sequence of turns for one invocation session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create a new empty transcript.
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append the newest turn. This is the only mutation besides
    /// `last_mut`, which exists for pre-response context injection.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Turn> {
        self.turns.last_mut()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

/// Find the nearest completed exchange in a turn sequence.
///
/// Scans backward for the last assistant turn and the nearest preceding
/// genuine user turn, skipping tool-result echoes. Returns the indices as
/// `(user, assistant)`, or `None` when the transcript has no such pair.
///
/// This is a pure function: it does not care who produced the turns or
/// what runtime they came from.
pub fn find_last_exchange(turns: &[Turn]) -> Option<(usize, usize)> {
    let assistant_idx = turns.iter().rposition(|t| t.role == Role::Assistant)?;
    let user_idx = turns[..assistant_idx]
        .iter()
        .rposition(|t| t.is_user_text())?;
    Some((user_idx, assistant_idx))
}
