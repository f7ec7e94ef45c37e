//! HTTP boundary to the onboarding backend.
//!
//! [`BackendClient`] wraps one [`reqwest::Client`] over the backend's small
//! REST surface: source connection, page-index retrieval, embedding jobs,
//! collection inspection, and chat. Every operation funnels its failure
//! through [`normalize_detail`], so the dynamic shapes a backend error body
//! can take (plain string, validation array, arbitrary object) collapse into
//! one human-readable string before anything is stored or displayed.

use reqwest::multipart;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::config::{ConnectionConfig, backend_url_from_env};
use crate::embedding::UploadFile;
use crate::index::{CategoryTree, PageEntry};
use crate::message::SourceRef;

/// Errors raised at the HTTP boundary.
///
/// `Backend` carries the normalized detail string extracted from the error
/// body; everything else is a transport- or decoding-level failure.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("backend unreachable at {endpoint}: {source}")]
    #[diagnostic(
        code(ragline::client::transport),
        help("Check that the onboarding backend is running and RAGLINE_BACKEND_URL points at it.")
    )]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {detail}")]
    #[diagnostic(code(ragline::client::backend))]
    Backend { status: u16, detail: String },

    /// A success response did not match the expected payload shape.
    #[error("malformed response from {endpoint}: {source}")]
    #[diagnostic(code(ragline::client::decode))]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The configured base URL could not be parsed.
    #[error("invalid backend base URL {url:?}")]
    #[diagnostic(
        code(ragline::client::base_url),
        help("The backend URL must be absolute, e.g. http://localhost:8000.")
    )]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to construct HTTP client")]
    #[diagnostic(code(ragline::client::init))]
    Init(#[source] reqwest::Error),
}

impl ClientError {
    /// The human-readable string shown in notices and transcripts.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            ClientError::Backend { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// True for the backend's "collection not created yet" response.
    #[must_use]
    pub fn is_not_created(&self) -> bool {
        matches!(self, ClientError::Backend { status: 400, .. })
    }
}

/// Acknowledgement of a successful source connection.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ConnectAck {
    pub message: String,
    #[serde(default)]
    pub page_count: Option<u64>,
}

/// Full page listing plus the derived two-level category hierarchy.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct IndexPayload {
    #[serde(default)]
    pub pages: Vec<PageEntry>,
    #[serde(default)]
    pub category_tree: CategoryTree,
    #[serde(default)]
    pub total_pages: usize,
}

/// Server-side resolution of a category filter to page ids.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct FilteredPages {
    #[serde(default)]
    pub page_ids: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

/// Point count of the embedding collection.
#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub points_count: u64,
}

#[derive(Debug, serde::Deserialize)]
struct CollectionInfoEnvelope {
    collection_info: CollectionInfo,
}

/// Acknowledgement of an embedding job, with the backend's
/// new-versus-skipped accounting.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct EmbedAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub embedded_pages: u64,
    #[serde(default)]
    pub skipped_pages: u64,
}

/// Acknowledgement of a multipart file upload.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct UploadAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub embedded_files: u64,
}

/// A retrieval-augmented answer with its citations.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

/// Client for the onboarding backend's REST surface.
///
/// Cheap to clone is not a goal here — the pipeline owns exactly one client
/// and threads it through component operations.
#[derive(Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    /// Creates a client against the given base URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // A trailing slash makes Url::join treat the last path segment as a
        // directory, which keeps prefixed deployments (e.g. /onboarding/api)
        // intact.
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized).map_err(|source| ClientError::BaseUrl {
            url: base_url.to_owned(),
            source,
        })?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(ClientError::Init)?;
        Ok(Self { http, base })
    }

    /// Creates a client from `RAGLINE_BACKEND_URL` (default `http://localhost:8000`).
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(&backend_url_from_env())
    }

    /// The base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Url {
        // Paths are compile-time relative literals; join cannot fail on them.
        self.base
            .join(path)
            .unwrap_or_else(|_| self.base.clone())
    }

    /// Probes `GET /`. Any transport failure or non-2xx status reads as
    /// "unreachable"; the caller decides whether that activates demo mode.
    pub async fn health(&self) -> bool {
        match self.http.get(self.base.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::debug!(%error, "backend health probe failed");
                false
            }
        }
    }

    /// `POST /confluence/connect`
    pub async fn connect_source(
        &self,
        config: &ConnectionConfig,
    ) -> Result<ConnectAck, ClientError> {
        self.post_json("confluence/connect", config).await
    }

    /// `POST /confluence/categories`
    pub async fn fetch_categories(
        &self,
        config: &ConnectionConfig,
    ) -> Result<IndexPayload, ClientError> {
        self.post_json("confluence/categories", config).await
    }

    /// `POST /confluence/filter-pages` — filters travel as query parameters;
    /// an absent level means "all" and is omitted.
    pub async fn filter_pages(
        &self,
        config: &ConnectionConfig,
        level_1: Option<&str>,
        level_2: Option<&str>,
    ) -> Result<FilteredPages, ClientError> {
        let endpoint = self.endpoint("confluence/filter-pages");
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(level_1) = level_1 {
            params.push(("level_1", level_1));
        }
        if let Some(level_2) = level_2 {
            params.push(("level_2", level_2));
        }

        let response = self
            .http
            .post(endpoint.clone())
            .query(&params)
            .json(config)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Self::decode(endpoint, Self::check(response).await?).await
    }

    /// `POST /embedding/initialize`
    pub async fn initialize_embedding(&self) -> Result<CollectionInfo, ClientError> {
        let envelope: CollectionInfoEnvelope = self
            .post_json("embedding/initialize", &json!({}))
            .await?;
        Ok(envelope.collection_info)
    }

    /// `POST /embedding/embed-pages`
    pub async fn embed_pages(
        &self,
        config: &ConnectionConfig,
        page_ids: &[String],
        collection_name: &str,
    ) -> Result<EmbedAck, ClientError> {
        let body = json!({
            "base_url": config.base_url,
            "email": config.email,
            "api_token": config.api_token,
            "space_key": config.space_key,
            "page_ids": page_ids,
            "collection_name": collection_name,
        });
        self.post_json("embedding/embed-pages", &body).await
    }

    /// `POST /embedding/upload` — multipart form with one `files` part per file.
    pub async fn upload_files(&self, files: Vec<UploadFile>) -> Result<UploadAck, ClientError> {
        let endpoint = self.endpoint("embedding/upload");
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.bytes).file_name(file.name);
            form = form.part("files", part);
        }

        let response = self
            .http
            .post(endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Self::decode(endpoint, Self::check(response).await?).await
    }

    /// `GET /collection/info` — callers map the 400 "not created yet"
    /// response via [`ClientError::is_not_created`].
    pub async fn collection_info(&self) -> Result<CollectionInfo, ClientError> {
        let envelope: CollectionInfoEnvelope = self.get_json("collection/info").await?;
        Ok(envelope.collection_info)
    }

    /// `POST /chat`
    pub async fn chat(
        &self,
        query: &str,
        top_k: u32,
        score_threshold: f32,
    ) -> Result<ChatAnswer, ClientError> {
        let body = json!({
            "query": query,
            "top_k": top_k,
            "score_threshold": score_threshold,
        });
        self.post_json("chat", &body).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(path);
        let response = self
            .http
            .post(endpoint.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Self::decode(endpoint, Self::check(response).await?).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let endpoint = self.endpoint(path);
        let response = self
            .http
            .get(endpoint.clone())
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Self::decode(endpoint, Self::check(response).await?).await
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Backend {
            status: status.as_u16(),
            detail: normalize_detail(status.as_u16(), &body),
        })
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: Url,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        response
            .json()
            .await
            .map_err(|source| ClientError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
    }
}

/// Collapses a backend error body into one human-readable string.
///
/// Accepted shapes, in order of preference:
/// - `{"detail": "plain message"}` → the message;
/// - `{"detail": [{"msg": ...}, ...]}` (validation errors) → the `msg`
///   fields joined with `", "`;
/// - `{"detail": {...}}` or any other JSON → the compact JSON text;
/// - a non-JSON body → the raw text;
/// - an empty body → `"HTTP <status>"`.
#[must_use]
pub fn normalize_detail(status: u16, body: &str) -> String {
    let fallback = || {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            format!("HTTP {status}")
        } else {
            trimmed.to_owned()
        }
    };

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };
    let Some(detail) = value.get("detail") else {
        return fallback();
    };

    match detail {
        serde_json::Value::String(message) => message.clone(),
        serde_json::Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(|msg| msg.as_str()))
                .collect();
            if messages.is_empty() {
                detail.to_string()
            } else {
                messages.join(", ")
            }
        }
        other => other.to_string(),
    }
}
