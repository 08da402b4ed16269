//! adminctl - Admin console library for the messaging and subscription backend
//!
//! This library holds the behavior behind the admin console: the login
//! session, the authorized API client, the video batch import workflow and
//! the paginated chat history loader. The `adminctl` binary is a thin
//! terminal front end over it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: session store trait and file/keyring/memory backends
//! - `api`: bearer-authenticated client, wire types and endpoint wrappers
//! - `catalog`: video catalog state, URL batch parser, import orchestrator
//! - `history`: paginated chat history loader
//! - `notify`: push notification drafts
//! - `analytics`: auto-pay statistics
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`, `commands`: command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use adminctl::{ApiClient, Config, MemorySessionStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/adminctl.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = ApiClient::from_config(&config, Arc::new(MemorySessionStore::new()))?;
//!     let login = client.login("admin@example.com", "secret").await?;
//!     println!("role: {}", login.user.role);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod notify;
pub mod session;

// Re-export commonly used types
pub use api::ApiClient;
pub use catalog::{ImportOrchestrator, ImportReport, VideoCatalog};
pub use config::Config;
pub use error::{AdminError, ApiError, Result};
pub use history::{HistoryLoader, HistorySource, LoadState};
pub use notify::NotificationDraft;
pub use session::{MemorySessionStore, Role, Session, SessionStore};
