//! Named chat sessions and the active-session pointer.
//!
//! [`SessionManager`] owns every [`ChatSession`] created during the
//! portal's lifetime. Transcripts are append-only: messages are added
//! through [`ChatSession::push`] and never edited or reordered; the only
//! destructive operations are clearing a whole transcript and deleting a
//! whole session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::message::{ChatMessage, Role};

/// Title given to a session before its first user message.
pub const DEFAULT_SESSION_TITLE: &str = "새 대화";

const TITLE_MAX_CHARS: usize = 40;

/// One chat session: identity, title, and an append-only transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_SESSION_TITLE.to_owned(),
            created_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    /// Appends a message to the transcript.
    ///
    /// A still-untitled session takes its title from the first user
    /// message, truncated for the history listing.
    pub fn push(&mut self, message: ChatMessage) {
        if self.title == DEFAULT_SESSION_TITLE && message.role == Role::User {
            self.title = truncate_title(&message.content);
        }
        self.messages.push(message);
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Clears the transcript; identity and title are kept.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_title(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        return trimmed.to_owned();
    }
    let cut: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    format!("{cut}…")
}

/// Errors raised by session management.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum SessionError {
    /// The given id matches no known session.
    #[error("unknown chat session: {id}")]
    #[diagnostic(code(ragline::session::not_found))]
    NotFound { id: String },
}

/// Creation, selection, and deletion of chat sessions.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: Vec<ChatSession>,
    active: Option<String>,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session and makes it active. Existing sessions are kept.
    pub fn create(&mut self) -> &ChatSession {
        let session = ChatSession::new();
        self.active = Some(session.id.clone());
        self.sessions.push(session);
        self.sessions.last().expect("session was just pushed")
    }

    /// Switches the active pointer to a known session.
    ///
    /// An unknown id is an explicit error rather than a silent no-op — a
    /// caller that wants no-op semantics can discard it.
    pub fn select(&mut self, id: &str) -> Result<(), SessionError> {
        if !self.sessions.iter().any(|session| session.id == id) {
            return Err(SessionError::NotFound { id: id.to_owned() });
        }
        self.active = Some(id.to_owned());
        Ok(())
    }

    /// Deletes a session. Deleting the active session leaves no session
    /// active — nothing is auto-selected in its place.
    pub fn delete(&mut self, id: &str) -> Result<(), SessionError> {
        let position = self
            .sessions
            .iter()
            .position(|session| session.id == id)
            .ok_or_else(|| SessionError::NotFound { id: id.to_owned() })?;
        self.sessions.remove(position);
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        Ok(())
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    #[must_use]
    pub fn active(&self) -> Option<&ChatSession> {
        let id = self.active.as_deref()?;
        self.sessions.iter().find(|session| session.id == id)
    }

    #[must_use]
    pub fn active_mut(&mut self) -> Option<&mut ChatSession> {
        let id = self.active.clone()?;
        self.sessions.iter_mut().find(|session| session.id == id)
    }

    /// Empties the active session's transcript. The session itself, its
    /// identity, and the active pointer all survive; without an active
    /// session this is a no-op.
    pub fn clear_active_transcript(&mut self) {
        if let Some(session) = self.active_mut() {
            session.clear();
        }
    }

    /// Sessions in creation order, for history listings.
    #[must_use]
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
