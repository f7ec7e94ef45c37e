//! Connection and chat configuration.
//!
//! [`ConnectionConfig`] carries the document-source credentials for one
//! session; it lives in memory only and is never persisted. [`ChatOptions`]
//! carries the retrieval knobs sent with every live chat request plus the
//! simulated latency of the demo fallback. Both can be seeded from the
//! environment (a `.env` file is honored via `dotenvy`).

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default backend base URL when `RAGLINE_BACKEND_URL` is unset.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Credentials and coordinates for the external document source.
///
/// Validated locally before any network call: [`crate::connection::SourceConnection`]
/// refuses to connect without an API token and a space key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the source wiki, e.g. `https://your-domain.atlassian.net/wiki`.
    pub base_url: String,
    /// Account email the API token belongs to.
    pub email: String,
    /// API token; required, never logged.
    pub api_token: String,
    /// Key of the space whose pages are onboarded; required.
    pub space_key: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://your-domain.atlassian.net/wiki".to_owned(),
            email: "user@example.com".to_owned(),
            api_token: String::new(),
            space_key: String::new(),
        }
    }
}

impl ConnectionConfig {
    /// Reads a config from `CONFLUENCE_BASE_URL`, `CONFLUENCE_EMAIL`,
    /// `CONFLUENCE_API_TOKEN`, and `CONFLUENCE_SPACE_KEY`.
    ///
    /// Unset variables fall back to the [`Default`] placeholders, so the
    /// result may still fail connection-time validation; this mirrors an
    /// operator leaving form fields blank.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            base_url: env::var("CONFLUENCE_BASE_URL").unwrap_or(defaults.base_url),
            email: env::var("CONFLUENCE_EMAIL").unwrap_or(defaults.email),
            api_token: env::var("CONFLUENCE_API_TOKEN").unwrap_or_default(),
            space_key: env::var("CONFLUENCE_SPACE_KEY").unwrap_or_default(),
        }
    }
}

/// Resolves the onboarding backend's base URL from `RAGLINE_BACKEND_URL`.
#[must_use]
pub fn backend_url_from_env() -> String {
    dotenvy::dotenv().ok();
    env::var("RAGLINE_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_owned())
}

/// Per-request retrieval knobs and the demo-fallback pacing.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatOptions {
    /// Number of retrieval candidates requested from the backend.
    pub top_k: u32,
    /// Minimum relevance score the backend should return.
    pub score_threshold: f32,
    /// Simulated thinking time of the demo fallback.
    pub demo_delay: Duration,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            score_threshold: 0.0,
            demo_delay: Duration::from_millis(1500),
        }
    }
}

impl ChatOptions {
    /// Overrides the retrieval candidate count.
    #[must_use]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Overrides the relevance threshold.
    #[must_use]
    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    /// Overrides the demo-fallback delay; tests set this to zero.
    #[must_use]
    pub fn with_demo_delay(mut self, demo_delay: Duration) -> Self {
        self.demo_delay = demo_delay;
        self
    }
}
