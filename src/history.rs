//! Paginated chat history loading
//!
//! The backend serves a conversation newest-first in fixed-size pages. The
//! loader keeps the messages of every page fetched so far in display order
//! (oldest at the front) and grows the list towards the past:
//!
//! ```text
//! Idle -> LoadingFirstPage -> Ready <-> LoadingOlderPage
//! ```
//!
//! Only the first page asks the view to scroll to the latest message.
//! Older pages are inserted above what is already shown, so a reader in the
//! middle of the history stays where they are.
//!
//! Each selection owns a [`CancellationToken`]. Selecting another
//! conversation (or closing the view) cancels the request in flight, and a
//! response that still arrives for a superseded selection is dropped instead
//! of overwriting newer state.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::api::types::{ChatMessage, HistoryPage};
use crate::api::{ApiClient, ApiResult};
use crate::error::ApiError;

/// Where history pages come from
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch page `page` (1 = newest) of a conversation
    async fn fetch_page(&self, conversation_id: &str, page: u32) -> ApiResult<HistoryPage>;
}

#[async_trait]
impl HistorySource for ApiClient {
    async fn fetch_page(&self, conversation_id: &str, page: u32) -> ApiResult<HistoryPage> {
        self.chat_history(conversation_id, page).await
    }
}

/// Loader state for the selected conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No conversation selected
    Idle,
    /// Page 1 requested, nothing to show yet
    LoadingFirstPage,
    /// Messages shown; older pages may be requested
    Ready,
    /// An older page is being fetched
    LoadingOlderPage,
}

#[derive(Debug)]
struct Inner {
    conversation: Option<String>,
    state: LoadState,
    messages: Vec<ChatMessage>,
    page: u32,
    has_more: bool,
    scroll_to_latest: bool,
    last_error: Option<ApiError>,
    generation: u64,
    cancel: CancellationToken,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            conversation: None,
            state: LoadState::Idle,
            messages: Vec::new(),
            page: 0,
            has_more: false,
            scroll_to_latest: false,
            last_error: None,
            generation: 0,
            cancel: CancellationToken::new(),
        }
    }
}

/// Point-in-time copy of the loader, for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    /// Selected conversation, if any
    pub conversation: Option<String>,
    /// Current state
    pub state: LoadState,
    /// Messages in display order, oldest first
    pub messages: Vec<ChatMessage>,
    /// Highest page loaded so far (0 before the first page arrives)
    pub page: u32,
    /// Whether the backend reported older pages
    pub has_more: bool,
    /// Error of the most recent load, cleared by the next successful load
    pub last_error: Option<ApiError>,
}

/// Incremental history loader for one chat view
pub struct HistoryLoader {
    source: Arc<dyn HistorySource>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for HistoryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLoader")
            .field("inner", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl HistoryLoader {
    /// Create an idle loader reading from `source`
    pub fn new(source: Arc<dyn HistorySource>) -> Self {
        Self {
            source,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current state
    pub fn state(&self) -> LoadState {
        self.lock().state
    }

    /// Messages in display order, oldest first
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    /// Whether older pages can still be requested
    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    /// Copy of the whole loader state
    pub fn snapshot(&self) -> HistorySnapshot {
        let inner = self.lock();
        HistorySnapshot {
            conversation: inner.conversation.clone(),
            state: inner.state,
            messages: inner.messages.clone(),
            page: inner.page,
            has_more: inner.has_more,
            last_error: inner.last_error.clone(),
        }
    }

    /// Whether the view should jump to the newest message after rendering
    pub fn scroll_to_latest(&self) -> bool {
        self.lock().scroll_to_latest
    }

    /// Consume the scroll request; returns true at most once per first page
    pub fn take_scroll_to_latest(&self) -> bool {
        std::mem::take(&mut self.lock().scroll_to_latest)
    }

    /// Select a conversation and load its newest page
    ///
    /// Prior messages are cleared immediately and any load still in flight
    /// is cancelled.
    ///
    /// # Errors
    ///
    /// - `Cancelled` if another selection superseded this one before the
    ///   page arrived
    /// - any API error from the page request; the loader is then `Ready`
    ///   with no messages and may be reselected to retry
    pub async fn select_conversation(&self, conversation_id: &str) -> ApiResult<usize> {
        let (generation, cancel) = {
            let mut inner = self.lock();
            inner.cancel.cancel();
            inner.cancel = CancellationToken::new();
            inner.generation += 1;
            inner.conversation = Some(conversation_id.to_string());
            inner.state = LoadState::LoadingFirstPage;
            inner.messages.clear();
            inner.page = 0;
            inner.has_more = false;
            inner.scroll_to_latest = false;
            inner.last_error = None;
            (inner.generation, inner.cancel.clone())
        };

        tracing::debug!(conversation = conversation_id, page = 1, "Loading chat history");
        let result = self.fetch(conversation_id, 1, &cancel).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(conversation = conversation_id, "Discarding superseded history page");
            return Err(ApiError::Cancelled);
        }
        inner.state = LoadState::Ready;

        match result {
            Ok(page) => {
                inner.has_more = page.pagination.has_more;
                inner.messages = page.data.unwrap_or_default();
                inner.page = 1;
                inner.scroll_to_latest = true;
                Ok(inner.messages.len())
            }
            Err(e) => {
                tracing::warn!(conversation = conversation_id, error = %e, "Failed to load chat history");
                inner.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Load the next older page and prepend it
    ///
    /// Does nothing (returns `Ok(0)`) unless the loader is `Ready` and the
    /// backend reported more pages; in particular a second trigger while a
    /// page is loading is ignored.
    ///
    /// # Errors
    ///
    /// - `Cancelled` if the conversation changed while the page was loading
    /// - any API error; messages, page number and `has_more` are unchanged
    ///   and the loader stays `Ready`
    pub async fn load_older(&self) -> ApiResult<usize> {
        let (generation, cancel, conversation, next_page) = {
            let mut inner = self.lock();
            if inner.state != LoadState::Ready || !inner.has_more {
                return Ok(0);
            }
            let Some(conversation) = inner.conversation.clone() else {
                return Ok(0);
            };
            inner.state = LoadState::LoadingOlderPage;
            inner.scroll_to_latest = false;
            (inner.generation, inner.cancel.clone(), conversation, inner.page + 1)
        };

        tracing::debug!(conversation = %conversation, page = next_page, "Loading older messages");
        let result = self.fetch(&conversation, next_page, &cancel).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            return Err(ApiError::Cancelled);
        }
        inner.state = LoadState::Ready;

        match result {
            Ok(page) => {
                let mut merged = page.data.unwrap_or_default();
                let added = merged.len();
                merged.append(&mut inner.messages);
                inner.messages = merged;
                inner.page = next_page;
                inner.has_more = page.pagination.has_more;
                inner.last_error = None;
                Ok(added)
            }
            Err(e) => {
                tracing::warn!(conversation = %conversation, page = next_page, error = %e, "Failed to load older messages");
                inner.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Drop the selection, cancelling any load in flight
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.cancel.cancel();
        let generation = inner.generation + 1;
        *inner = Inner {
            generation,
            ..Inner::default()
        };
    }

    async fn fetch(&self, conversation_id: &str, page: u32, cancel: &CancellationToken) -> ApiResult<HistoryPage> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.source.fetch_page(conversation_id, page) => result,
        }
    }
}
