//! Chat transcript messages with cited sources.
//!
//! Messages are the primary data structure of a chat session: each entry has
//! a role, text content, an optional list of cited sources, and the UTC
//! timestamp at which it was appended. Messages are immutable once appended
//! to a transcript — failures are recorded by appending a new assistant
//! message, never by editing history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The sender of a [`ChatMessage`].
///
/// The onboarding chat only ever records the two conversational roles; system
/// prompting happens behind the backend boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A query typed by the user.
    User,
    /// An answer (or visible failure report) produced for the user.
    Assistant,
}

impl Role {
    /// Returns the wire-format string for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cited source attached to an assistant answer.
///
/// Scores, when present, are the backend's relevance scores in `[0, 1]`.
/// Demo-fallback answers cite fixed sources without scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Human-readable document title.
    pub title: String,
    /// Link to the source document.
    pub url: String,
    /// Relevance score reported by the retrieval backend, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl SourceRef {
    /// Creates a source citation without a relevance score.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            score: None,
        }
    }

    /// Attaches a relevance score to this citation.
    #[must_use]
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// One entry in a chat transcript.
///
/// # Examples
///
/// ```
/// use ragline::message::{ChatMessage, Role, SourceRef};
///
/// let question = ChatMessage::user("연차는 어떻게 사용하나요?");
/// assert_eq!(question.role, Role::User);
/// assert!(question.sources.is_empty());
///
/// let answer = ChatMessage::assistant("연차는 HR Portal에서 신청합니다.")
///     .with_sources(vec![SourceRef::new("인사관리규정", "https://wiki.example/hr")]);
/// assert_eq!(answer.sources.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced this message.
    pub role: Role,
    /// The text content shown in the transcript.
    pub content: String,
    /// Cited sources, ordered as returned by the answerer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a message with the given role, stamped now.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attaches cited sources to this message.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<SourceRef>) -> Self {
        self.sources = sources;
        self
    }
}
