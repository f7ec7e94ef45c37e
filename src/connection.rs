//! Source connection lifecycle.
//!
//! [`SourceConnection`] owns the active [`ConnectionConfig`] for the
//! session. Connecting validates required fields locally before touching the
//! network; only a successful round trip installs the new config, so a
//! failed attempt can never leave the pipeline half-connected.

use thiserror::Error;
use tracing::instrument;

use crate::client::BackendClient;
use crate::config::ConnectionConfig;
use crate::notify::Notifier;

/// Why a connection attempt was refused or failed.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ConnectError {
    /// A required field was empty; no request was made.
    #[error("missing required field: {field}")]
    #[diagnostic(
        code(ragline::connection::validation),
        help("api_token and space_key must be provided before connecting.")
    )]
    Validation { field: &'static str },

    /// The backend rejected the connection attempt.
    #[error("connection failed: {detail}")]
    #[diagnostic(code(ragline::connection::failed))]
    Connection { detail: String },
}

/// Holds the active document-source configuration.
#[derive(Debug)]
pub struct SourceConnection {
    active: Option<ConnectionConfig>,
    notifier: Notifier,
}

impl SourceConnection {
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            active: None,
            notifier,
        }
    }

    /// The config installed by the last successful [`connect`](Self::connect).
    #[must_use]
    pub fn active(&self) -> Option<&ConnectionConfig> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Validates and establishes a connection to the document source.
    ///
    /// Local validation (non-empty `api_token` and `space_key`) runs before
    /// any network call. On success the config becomes active and the
    /// backend's message is returned; on failure the previously active
    /// config, if any, is untouched.
    #[instrument(skip(self, client, config), err)]
    pub async fn connect(
        &mut self,
        client: &BackendClient,
        config: ConnectionConfig,
    ) -> Result<String, ConnectError> {
        validate(&config)?;

        match client.connect_source(&config).await {
            Ok(ack) => {
                tracing::info!(page_count = ?ack.page_count, "source connected");
                self.active = Some(config);
                self.notifier.success(ack.message.clone());
                Ok(ack.message)
            }
            Err(error) => {
                let detail = error.detail();
                self.notifier.error(detail.clone());
                Err(ConnectError::Connection { detail })
            }
        }
    }

    /// Drops the active config, relocking index fetches.
    pub fn disconnect(&mut self) {
        self.active = None;
    }
}

fn validate(config: &ConnectionConfig) -> Result<(), ConnectError> {
    if config.api_token.trim().is_empty() {
        return Err(ConnectError::Validation { field: "api_token" });
    }
    if config.space_key.trim().is_empty() {
        return Err(ConnectError::Validation { field: "space_key" });
    }
    Ok(())
}
