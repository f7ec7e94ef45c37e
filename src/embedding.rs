//! Embedding jobs and collection readiness.
//!
//! [`EmbeddingOrchestrator`] drives the backend's vector collection: it
//! initializes the collection idempotently, submits the selected page set
//! (or uploaded files) for embedding, and tracks readiness as the
//! collection's point count. Embedding jobs are single-flight — a guarded
//! state transition rejects re-entry while a job is still settling, and the
//! guard clears on every exit path.

use rustc_hash::FxHashSet;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::client::{BackendClient, ClientError};
use crate::config::ConnectionConfig;
use crate::notify::Notifier;

/// Name of the backend collection that receives onboarded documents.
pub const DEFAULT_COLLECTION: &str = "confluence_docs";

/// File extensions accepted by the upload ingestion path.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "md"];

/// Readiness of the backend's vector collection.
///
/// Transitions only move forward (uninitialized → initialized) unless the
/// backend itself reports the collection gone, in which case a refresh
/// observes the reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollectionState {
    pub initialized: bool,
    pub point_count: u64,
}

/// Outcome of a page-embedding job, mirroring the backend's
/// new-versus-skipped accounting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedReport {
    pub message: String,
    pub embedded: u64,
    pub skipped: u64,
}

/// An in-memory file handed to the upload ingestion path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Errors raised by embedding operations.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum EmbedError {
    /// Embedding requested with nothing selected; no request was made.
    #[error("no pages selected for embedding")]
    #[diagnostic(
        code(ragline::embedding::empty_selection),
        help("Select at least one page before starting an embedding job.")
    )]
    EmptySelection,

    /// A prior embedding job has not settled yet.
    #[error("an embedding job is already in flight")]
    #[diagnostic(code(ragline::embedding::busy))]
    Busy,

    /// Embedding attempted before a successful source connection.
    #[error("no active source connection")]
    #[diagnostic(code(ragline::embedding::no_connection))]
    NoConnection,

    /// Collection initialization failed.
    #[error("collection initialization failed: {detail}")]
    #[diagnostic(code(ragline::embedding::init))]
    Init { detail: String },

    /// The embedding job itself failed; the collection is unchanged and the
    /// job may be retried.
    #[error("embedding failed: {detail}")]
    #[diagnostic(code(ragline::embedding::embed))]
    Embed { detail: String },

    /// The collection info endpoint failed with something other than the
    /// "not created yet" response.
    #[error("collection info unavailable: {detail}")]
    #[diagnostic(code(ragline::embedding::info))]
    Info { detail: String },
}

/// Drives embedding jobs and tracks collection readiness.
#[derive(Debug)]
pub struct EmbeddingOrchestrator {
    collection: CollectionState,
    in_flight: bool,
    notifier: Notifier,
}

impl EmbeddingOrchestrator {
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            collection: CollectionState::default(),
            in_flight: false,
            notifier,
        }
    }

    /// The last observed collection state.
    #[must_use]
    pub fn collection(&self) -> CollectionState {
        self.collection
    }

    /// True once the collection can answer retrieval queries.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.collection.initialized
    }

    /// True while an embedding job is settling.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Initializes the embedding collection.
    ///
    /// Idempotent: the backend creates the collection only if absent, so
    /// repeating the call never destroys existing vectors — it simply
    /// reports the current point count.
    #[instrument(skip(self, client), err)]
    pub async fn initialize(&mut self, client: &BackendClient) -> Result<CollectionState, EmbedError> {
        match client.initialize_embedding().await {
            Ok(info) => {
                self.collection = CollectionState {
                    initialized: true,
                    point_count: info.points_count,
                };
                self.notifier.success("임베딩 초기화 완료");
                Ok(self.collection)
            }
            Err(error) => {
                let detail = error.detail();
                self.notifier.error(detail.clone());
                Err(EmbedError::Init { detail })
            }
        }
    }

    /// Submits the selected pages for embedding.
    ///
    /// Fails fast with [`EmbedError::EmptySelection`] before any network
    /// call when nothing is selected. Single-flight: a second call while
    /// one is settling is rejected with [`EmbedError::Busy`]. On success
    /// the collection state is refreshed and readiness is signaled; on
    /// failure the collection state is unchanged and the job can be
    /// retried.
    #[instrument(skip(self, client, config, selection), err)]
    pub async fn embed_selection(
        &mut self,
        client: &BackendClient,
        config: &ConnectionConfig,
        selection: &FxHashSet<String>,
    ) -> Result<EmbedReport, EmbedError> {
        if self.in_flight {
            return Err(EmbedError::Busy);
        }
        if selection.is_empty() {
            self.notifier.warning("임베딩할 문서를 선택해주세요.");
            return Err(EmbedError::EmptySelection);
        }

        // The flag must clear on every exit path below, so no `?` is
        // allowed between set and clear.
        self.in_flight = true;
        let result = self.embed_selection_inner(client, config, selection).await;
        self.in_flight = false;
        result
    }

    async fn embed_selection_inner(
        &mut self,
        client: &BackendClient,
        config: &ConnectionConfig,
        selection: &FxHashSet<String>,
    ) -> Result<EmbedReport, EmbedError> {
        let mut page_ids: Vec<String> = selection.iter().cloned().collect();
        page_ids.sort_unstable();
        tracing::info!(pages = page_ids.len(), "embedding job started");

        match client.embed_pages(config, &page_ids, DEFAULT_COLLECTION).await {
            Ok(ack) => {
                self.mark_ready(client).await;
                self.notifier.success(ack.message.clone());
                Ok(EmbedReport {
                    message: ack.message,
                    embedded: ack.embedded_pages,
                    skipped: ack.skipped_pages,
                })
            }
            Err(error) => {
                let detail = error.detail();
                self.notifier.error(detail.clone());
                Err(EmbedError::Embed { detail })
            }
        }
    }

    /// Embeds uploaded files, bypassing the external source.
    ///
    /// Files whose extension is not one of [`ACCEPTED_EXTENSIONS`] are
    /// silently excluded; the caller learns only the accepted count. An
    /// all-rejected batch performs no network call and reports zero.
    #[instrument(skip(self, client, files), err)]
    pub async fn embed_uploads(
        &mut self,
        client: &BackendClient,
        files: Vec<UploadFile>,
    ) -> Result<usize, EmbedError> {
        if self.in_flight {
            return Err(EmbedError::Busy);
        }

        let accepted = accept_uploads(files);
        let count = accepted.len();
        if count == 0 {
            self.notifier
                .warning("지원하지 않는 파일 형식입니다. (PDF, TXT, MD 지원)");
            return Ok(0);
        }

        self.in_flight = true;
        let result = self.embed_uploads_inner(client, accepted).await;
        self.in_flight = false;
        result.map(|()| count)
    }

    async fn embed_uploads_inner(
        &mut self,
        client: &BackendClient,
        accepted: Vec<UploadFile>,
    ) -> Result<(), EmbedError> {
        tracing::info!(files = accepted.len(), "file upload started");
        match client.upload_files(accepted).await {
            Ok(ack) => {
                self.mark_ready(client).await;
                self.notifier.success("파일 학습 완료!");
                tracing::debug!(embedded_files = ack.embedded_files, "upload acknowledged");
                Ok(())
            }
            Err(error) => {
                let detail = error.detail();
                self.notifier.error(detail.clone());
                Err(EmbedError::Embed { detail })
            }
        }
    }

    /// Fetches the collection's current point count.
    ///
    /// The backend answers 400 while the collection does not exist yet;
    /// that maps to an uninitialized [`CollectionState`], not an error. A
    /// refresh that observes points marks the collection initialized.
    #[instrument(skip(self, client), err)]
    pub async fn refresh(&mut self, client: &BackendClient) -> Result<CollectionState, EmbedError> {
        match client.collection_info().await {
            Ok(info) => {
                self.collection = CollectionState {
                    initialized: self.collection.initialized || info.points_count > 0,
                    point_count: info.points_count,
                };
                Ok(self.collection)
            }
            Err(error) if error.is_not_created() => {
                self.collection = CollectionState::default();
                Ok(self.collection)
            }
            Err(error) => {
                let detail = error.detail();
                self.notifier.error(detail.clone());
                Err(EmbedError::Info { detail })
            }
        }
    }

    /// Post-job readiness signal: refresh the count if possible, but stay
    /// ready even when the refresh itself fails — the job did succeed.
    async fn mark_ready(&mut self, client: &BackendClient) {
        if let Err(error) = self.refresh_after_job(client).await {
            tracing::warn!(%error, "collection refresh after embedding failed");
        }
        self.collection.initialized = true;
    }

    async fn refresh_after_job(&mut self, client: &BackendClient) -> Result<(), ClientError> {
        let info = client.collection_info().await?;
        self.collection.point_count = info.points_count;
        Ok(())
    }
}

/// Applies the upload allow-list, preserving input order.
#[must_use]
pub fn accept_uploads(files: Vec<UploadFile>) -> Vec<UploadFile> {
    files
        .into_iter()
        .filter(|file| has_accepted_extension(&file.name))
        .collect()
}

fn has_accepted_extension(name: &str) -> bool {
    let lowered = name.to_lowercase();
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|ext| lowered.ends_with(&format!(".{ext}")))
}
