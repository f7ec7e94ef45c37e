//! # Ragline
//!
//! Client-side orchestrator for document onboarding and retrieval-augmented
//! chat. Ragline drives the full journey a portal surface walks through:
//! connect to an external document source, pull and hierarchically filter
//! its page index, embed a selected subset into the backend's vector
//! collection, and then chat over it — falling back to a deterministic
//! local answerer whenever the backend is unreachable.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   ┌───────────┐   ┌──────────────────────┐
//! │ SourceConnection│──▶│ PageIndex │──▶│ EmbeddingOrchestrator │
//! └────────────────┘   └───────────┘   └──────────┬───────────┘
//!                                                 │ readiness gate
//!                     ┌───────────────┐   ┌───────▼─────────┐
//!                     │ SessionManager │◀──│ ChatOrchestrator │
//!                     └───────────────┘   └─────────────────┘
//!                All components share one BackendClient + Notifier
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Connection credentials and chat options |
//! | [`client`] | HTTP boundary to the onboarding backend |
//! | [`connection`] | Source connection lifecycle |
//! | [`index`] | Page listing, category filters, embedding selection |
//! | [`embedding`] | Embedding jobs and collection readiness |
//! | [`chat`] | Per-turn chat state machine and demo fallback |
//! | [`session`] | Named chat sessions and the active pointer |
//! | [`message`] | Transcript messages with cited sources |
//! | [`notify`] | Transient notices for the hosting surface |
//! | [`pipeline`] | Facade wiring the components with stage gating |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ragline::client::BackendClient;
//! use ragline::config::ConnectionConfig;
//! use ragline::pipeline::Pipeline;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BackendClient::from_env()?;
//! let (mut pipeline, notices) = Pipeline::new(client);
//!
//! // An unreachable backend flips the chat into demo-fallback mode.
//! pipeline.probe_backend().await;
//!
//! pipeline.connect(ConnectionConfig::from_env()).await?;
//! pipeline.fetch_index().await?;
//! pipeline.index_mut().select_all_filtered();
//! pipeline.initialize_collection().await?;
//! pipeline.embed_selection().await?;
//!
//! let turn = pipeline.send("연차는 어떻게 사용하나요?").await?;
//! println!("{}", turn.answer.content);
//! for notice in notices.drain() {
//!     eprintln!("[{}] {}", notice.level.as_str(), notice.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod client;
pub mod config;
pub mod connection;
pub mod embedding;
pub mod index;
pub mod message;
pub mod notify;
pub mod pipeline;
pub mod session;

pub use chat::{ChatOrchestrator, ChatState, ChatTurn, SendRejected, TurnOutcome};
pub use client::{BackendClient, ClientError};
pub use config::{ChatOptions, ConnectionConfig};
pub use connection::{ConnectError, SourceConnection};
pub use embedding::{
    CollectionState, EmbedError, EmbedReport, EmbeddingOrchestrator, UploadFile,
};
pub use index::{CategoryFilter, CategoryTree, IndexError, PageEntry, PageIndex};
pub use message::{ChatMessage, Role, SourceRef};
pub use notify::{Notice, NoticeLevel, Notifier};
pub use pipeline::{Pipeline, PipelineSnapshot};
pub use session::{ChatSession, SessionError, SessionManager};
