//! Command handlers for adminctl
//!
//! Each submodule implements the screens of one area. Handlers only gather
//! input and render output (tables by default, JSON with `--json`); the
//! behavior itself lives in the library modules.

pub mod auth;
pub mod chats;
pub mod directory;
pub mod notify;
pub mod videos;

use std::io::BufRead;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{AdminError, Result};
use crate::session::{self, SessionStore};

/// Everything a command handler needs
#[derive(Debug, Clone)]
pub struct Context {
    /// Validated configuration
    pub config: Config,
    /// Client bound to the configured backend and session store
    pub client: ApiClient,
}

impl Context {
    /// Open the configured session store and build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the session store or HTTP client cannot be set up
    pub fn from_config(config: Config) -> Result<Self> {
        let store = session::open_store(&config.session)?;
        Self::with_store(config, store)
    }

    /// Build a context around an explicit session store
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn with_store(config: Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        let client = ApiClient::from_config(&config, store)?;
        Ok(Self { config, client })
    }

    /// The session store shared with the client
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        self.client.session()
    }
}

/// Print a value as pretty JSON on stdout
///
/// # Errors
///
/// Returns `AdminError::Serialization` if serialization fails
pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(AdminError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Render an optional timestamp for table cells
pub(crate) fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Render an optional text field for table cells
pub(crate) fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with "..."
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Read one secret line from stdin when it was not passed as an argument
///
/// # Errors
///
/// Returns `AdminError::Config` if stdin is closed or the value is blank
pub(crate) fn secret_or_stdin(value: Option<String>, what: &str) -> Result<String> {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        return Ok(value);
    }

    eprint!("{}: ", what);
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    if line.is_empty() {
        return Err(AdminError::Config(format!("{} is required", what)).into());
    }
    Ok(line)
}
