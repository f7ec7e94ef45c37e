//! Chat orchestration.
//!
//! [`ChatOrchestrator`] runs the per-turn state machine
//! `Idle → Sending → (Answered | Failed) → Idle`. A send appends the user
//! message optimistically, answers from the live backend or the demo
//! fallback, and always lands back in `Idle` with exactly one assistant
//! message appended — a live failure is written into the transcript rather
//! than lost in a notification.

pub mod fallback;

use thiserror::Error;
use tracing::instrument;

use crate::client::BackendClient;
use crate::config::ChatOptions;
use crate::message::ChatMessage;
use crate::notify::Notifier;
use crate::session::ChatSession;

/// The orchestrator's coarse state. `Sending` covers the window between the
/// optimistic user append and the assistant append.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChatState {
    #[default]
    Idle,
    Sending,
}

/// How a completed turn ended. Rejections never produce a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// An answer (live or demo) was appended.
    Answered,
    /// The live call failed; the failure text was appended instead.
    Failed,
}

/// A completed chat turn: the assistant message that was appended and how
/// the turn ended.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatTurn {
    pub outcome: TurnOutcome,
    pub answer: ChatMessage,
}

/// Why a send was refused before it started. A rejected send appends
/// nothing and leaves the orchestrator in `Idle`.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum SendRejected {
    /// Empty or whitespace-only query.
    #[error("cannot send an empty message")]
    #[diagnostic(code(ragline::chat::empty_query))]
    EmptyQuery,

    /// A send is already in flight; there is no queuing.
    #[error("a send is already in progress")]
    #[diagnostic(code(ragline::chat::busy))]
    Busy,

    /// Neither the collection is initialized nor demo mode is active.
    #[error("embedding is not ready and demo mode is off")]
    #[diagnostic(
        code(ragline::chat::not_ready),
        help("Initialize the collection and embed documents, or enable demo mode.")
    )]
    NotReady,
}

/// Per-session chat driver.
#[derive(Debug)]
pub struct ChatOrchestrator {
    state: ChatState,
    options: ChatOptions,
    demo_mode: bool,
    notifier: Notifier,
}

impl ChatOrchestrator {
    #[must_use]
    pub fn new(options: ChatOptions, notifier: Notifier) -> Self {
        Self {
            state: ChatState::Idle,
            options,
            demo_mode: false,
            notifier,
        }
    }

    #[must_use]
    pub fn state(&self) -> ChatState {
        self.state
    }

    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.state == ChatState::Sending
    }

    #[must_use]
    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// True when answers come from the local fixed table.
    #[must_use]
    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    /// Switches answering to the deterministic local table. This is a mode
    /// transition, not an error — it also satisfies the readiness gate.
    pub fn enable_demo_mode(&mut self) {
        if !self.demo_mode {
            self.demo_mode = true;
            self.notifier.success("데모 모드가 활성화되었습니다!");
        }
    }

    /// Runs one chat turn against the active session.
    ///
    /// Rejections (empty query, send in flight, not ready) append nothing.
    /// An accepted send appends the user message, then exactly one
    /// assistant message — the answer, or the normalized failure text —
    /// and returns to `Idle` regardless of outcome.
    #[instrument(skip(self, client, session, query), err)]
    pub async fn send(
        &mut self,
        client: &BackendClient,
        ready: bool,
        session: &mut ChatSession,
        query: &str,
    ) -> Result<ChatTurn, SendRejected> {
        if self.state == ChatState::Sending {
            return Err(SendRejected::Busy);
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(SendRejected::EmptyQuery);
        }
        if !ready && !self.demo_mode {
            self.notifier
                .warning("먼저 임베딩을 초기화하고 문서를 임베딩해주세요");
            return Err(SendRejected::NotReady);
        }

        session.push(ChatMessage::user(query));
        self.state = ChatState::Sending;

        // No `?` below: the Sending state must clear on every path.
        let (answer, outcome) = if self.demo_mode {
            (self.demo_answer(query).await, TurnOutcome::Answered)
        } else {
            self.live_answer(client, query).await
        };
        self.state = ChatState::Idle;

        session.push(answer.clone());
        Ok(ChatTurn { outcome, answer })
    }

    /// Deterministic local answer after the configured thinking delay.
    /// This path never fails.
    async fn demo_answer(&self, query: &str) -> ChatMessage {
        tokio::time::sleep(self.options.demo_delay).await;
        let (answer, sources) = fallback::answer_for(query);
        tracing::debug!(matched = !sources.is_empty(), "demo fallback answered");
        ChatMessage::assistant(answer).with_sources(sources)
    }

    async fn live_answer(
        &self,
        client: &BackendClient,
        query: &str,
    ) -> (ChatMessage, TurnOutcome) {
        match client
            .chat(query, self.options.top_k, self.options.score_threshold)
            .await
        {
            Ok(answer) => (
                ChatMessage::assistant(answer.answer).with_sources(answer.sources),
                TurnOutcome::Answered,
            ),
            Err(error) => {
                let detail = error.detail();
                tracing::warn!(%detail, "live chat call failed");
                self.notifier.error(detail.clone());
                // The failure stays visible in the transcript, not just as
                // a transient notice.
                (
                    ChatMessage::assistant(format!(
                        "죄송합니다. 오류가 발생했습니다.\n({detail})"
                    )),
                    TurnOutcome::Failed,
                )
            }
        }
    }
}
