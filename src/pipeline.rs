//! The onboarding pipeline facade.
//!
//! [`Pipeline`] wires the components — source connection, page index,
//! embedding orchestrator, chat orchestrator, session manager — to one
//! [`BackendClient`] and one [`Notifier`], and enforces the stage gating
//! between them: index fetches require an active connection, embedding
//! requires a selection, and chat requires collection readiness or demo
//! mode. There is no global state; everything lives in this struct, and
//! [`Pipeline::snapshot`] exposes an immutable view for inspection.

use tracing::instrument;

use crate::chat::{ChatOrchestrator, ChatTurn, SendRejected};
use crate::client::BackendClient;
use crate::config::{ChatOptions, ConnectionConfig};
use crate::connection::{ConnectError, SourceConnection};
use crate::embedding::{CollectionState, EmbedError, EmbedReport, EmbeddingOrchestrator, UploadFile};
use crate::index::{IndexError, PageIndex};
use crate::notify::{Notice, Notifier};
use crate::session::SessionManager;

/// Immutable point-in-time view of the pipeline, for UIs and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineSnapshot {
    pub connected: bool,
    pub pages_loaded: usize,
    pub selected: usize,
    pub collection: CollectionState,
    pub demo_mode: bool,
    pub sending: bool,
    pub sessions: usize,
}

/// Owns the full onboarding-and-chat state for one surface (one tab).
#[derive(Debug)]
pub struct Pipeline {
    client: BackendClient,
    connection: SourceConnection,
    index: PageIndex,
    embedding: EmbeddingOrchestrator,
    chat: ChatOrchestrator,
    sessions: SessionManager,
    notifier: Notifier,
}

impl Pipeline {
    /// Builds a pipeline and the receiver that drains its notices.
    #[must_use]
    pub fn new(client: BackendClient) -> (Self, flume::Receiver<Notice>) {
        let (notifier, notices) = Notifier::channel();
        (Self::with_notifier(client, ChatOptions::default(), notifier), notices)
    }

    /// Builds a pipeline with explicit chat options and notifier.
    #[must_use]
    pub fn with_notifier(client: BackendClient, options: ChatOptions, notifier: Notifier) -> Self {
        Self {
            client,
            connection: SourceConnection::new(notifier.clone()),
            index: PageIndex::new(notifier.clone()),
            embedding: EmbeddingOrchestrator::new(notifier.clone()),
            chat: ChatOrchestrator::new(options, notifier.clone()),
            sessions: SessionManager::new(),
            notifier,
        }
    }

    /// Probes the backend's health endpoint once, at startup.
    ///
    /// An unreachable backend activates demo-fallback mode — a mode
    /// transition, not an error. Returns whether the backend answered.
    #[instrument(skip(self))]
    pub async fn probe_backend(&mut self) -> bool {
        let healthy = self.client.health().await;
        if !healthy {
            tracing::warn!("backend health probe failed, activating demo fallback");
            self.chat.enable_demo_mode();
        }
        healthy
    }

    /// Connects to the document source, unlocking index fetches.
    pub async fn connect(&mut self, config: ConnectionConfig) -> Result<String, ConnectError> {
        self.connection.connect(&self.client, config).await
    }

    /// Fetches the page index. Gated on an active connection.
    pub async fn fetch_index(&mut self) -> Result<usize, IndexError> {
        let Some(config) = self.connection.active().cloned() else {
            return Err(IndexError::NoConnection);
        };
        self.index.fetch(&self.client, &config).await
    }

    /// Resolves the current filters to page ids on the backend.
    pub async fn filter_remote(&mut self) -> Result<Vec<String>, IndexError> {
        let Some(config) = self.connection.active().cloned() else {
            return Err(IndexError::NoConnection);
        };
        self.index.filter_remote(&self.client, &config).await
    }

    /// Initializes the embedding collection (idempotent).
    pub async fn initialize_collection(&mut self) -> Result<CollectionState, EmbedError> {
        self.embedding.initialize(&self.client).await
    }

    /// Embeds the current selection. Gated on an active connection.
    pub async fn embed_selection(&mut self) -> Result<EmbedReport, EmbedError> {
        let Some(config) = self.connection.active().cloned() else {
            return Err(EmbedError::NoConnection);
        };
        let selection = self.index.selection().clone();
        self.embedding
            .embed_selection(&self.client, &config, &selection)
            .await
    }

    /// Embeds uploaded files; this path bypasses the document source and
    /// needs no connection.
    pub async fn embed_uploads(&mut self, files: Vec<UploadFile>) -> Result<usize, EmbedError> {
        self.embedding.embed_uploads(&self.client, files).await
    }

    /// Refreshes the collection's point count.
    pub async fn refresh_collection(&mut self) -> Result<CollectionState, EmbedError> {
        self.embedding.refresh(&self.client).await
    }

    /// Sends a chat query against the active session, creating one first
    /// if none is active.
    ///
    /// A rejected send has no side effects: a session created provisionally
    /// for the turn is rolled back so rejection leaves the manager exactly
    /// as it was.
    pub async fn send(&mut self, query: &str) -> Result<ChatTurn, SendRejected> {
        let ready = self.embedding.is_ready();
        let Self {
            client,
            chat,
            sessions,
            ..
        } = self;

        let provisional = if sessions.active_id().is_none() {
            Some(sessions.create().id.clone())
        } else {
            None
        };
        let session = sessions
            .active_mut()
            .expect("an active session was just ensured");

        let result = chat.send(client, ready, session, query).await;
        if result.is_err()
            && let Some(id) = provisional
        {
            let _ = sessions.delete(&id);
        }
        result
    }

    /// Activates the deterministic local answerer.
    pub fn enable_demo_mode(&mut self) {
        self.chat.enable_demo_mode();
    }

    #[must_use]
    pub fn connection(&self) -> &SourceConnection {
        &self.connection
    }

    #[must_use]
    pub fn index(&self) -> &PageIndex {
        &self.index
    }

    /// Mutable index access for filter and selection operations.
    #[must_use]
    pub fn index_mut(&mut self) -> &mut PageIndex {
        &mut self.index
    }

    #[must_use]
    pub fn embedding(&self) -> &EmbeddingOrchestrator {
        &self.embedding
    }

    #[must_use]
    pub fn chat(&self) -> &ChatOrchestrator {
        &self.chat
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    #[must_use]
    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// An immutable view of the whole pipeline state.
    #[must_use]
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            connected: self.connection.is_connected(),
            pages_loaded: self.index.pages().len(),
            selected: self.index.selection().len(),
            collection: self.embedding.collection(),
            demo_mode: self.chat.demo_mode(),
            sending: self.chat.is_sending(),
            sessions: self.sessions.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Pipeline {
        let client = BackendClient::new("http://127.0.0.1:9").expect("client");
        Pipeline::with_notifier(client, ChatOptions::default(), Notifier::disconnected())
    }

    #[test]
    fn fresh_snapshot_is_fully_idle() {
        let snapshot = pipeline().snapshot();
        assert!(!snapshot.connected);
        assert_eq!(snapshot.pages_loaded, 0);
        assert_eq!(snapshot.selected, 0);
        assert!(!snapshot.collection.initialized);
        assert!(!snapshot.demo_mode);
        assert!(!snapshot.sending);
        assert_eq!(snapshot.sessions, 0);
    }

    #[tokio::test]
    async fn fetch_without_connection_is_gated() {
        let mut pipeline = pipeline();
        let error = pipeline.fetch_index().await.unwrap_err();
        assert!(matches!(error, IndexError::NoConnection));
    }

    #[tokio::test]
    async fn embed_without_connection_is_gated() {
        let mut pipeline = pipeline();
        let error = pipeline.embed_selection().await.unwrap_err();
        assert!(matches!(error, EmbedError::NoConnection));
    }

    #[tokio::test]
    async fn send_creates_a_session_on_demand() {
        let client = BackendClient::new("http://127.0.0.1:9").expect("client");
        let options = ChatOptions::default().with_demo_delay(std::time::Duration::ZERO);
        let mut pipeline = Pipeline::with_notifier(client, options, Notifier::disconnected());
        pipeline.enable_demo_mode();

        assert!(pipeline.sessions().is_empty());
        pipeline.send("연차").await.expect("demo send");
        assert_eq!(pipeline.sessions().len(), 1);
        assert_eq!(
            pipeline
                .sessions()
                .active()
                .expect("active session")
                .messages()
                .len(),
            2
        );
    }
}
