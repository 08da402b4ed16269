//! Batch URL parsing for video imports
//!
//! Operators paste freeform text: one URL per line, several per line, or a
//! whole list dropped into a single input row. This module turns that text
//! into an ordered list of candidate URLs.
//!
//! Deduplication is deliberately absent. The backend detects videos that are
//! already stored and reports them as skipped; the only client-side
//! guarantee is that no empty candidate is ever forwarded.

use std::sync::OnceLock;

use regex::Regex;

use crate::api::types::PUBLIC_ID_LEN;
use crate::error::ApiError;

/// Message used when a batch contains no URL at all.
pub const EMPTY_BATCH_MESSAGE: &str = "at least one URL required";

/// Split pasted text into candidate URLs
///
/// Splits on any whitespace (newlines, spaces, tabs), drops empty tokens and
/// keeps first-seen order. Duplicates are kept.
///
/// # Examples
///
/// ```
/// use adminctl::catalog::parser::parse_urls;
///
/// let urls = parse_urls("https://youtu.be/a\n\n  https://youtu.be/b https://youtu.be/a\t");
/// assert_eq!(urls, vec!["https://youtu.be/a", "https://youtu.be/b", "https://youtu.be/a"]);
/// assert!(parse_urls(" \n\t ").is_empty());
/// ```
pub fn parse_urls(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Reject an empty batch before anything is sent
///
/// # Errors
///
/// Returns `ApiError::ValidationFailed` when `urls` holds no non-empty entry
pub fn ensure_non_empty(urls: &[String]) -> Result<(), ApiError> {
    if urls.iter().all(|url| url.trim().is_empty()) {
        return Err(ApiError::ValidationFailed(EMPTY_BATCH_MESSAGE.to_string()));
    }
    Ok(())
}

/// Editable list of URL input rows with smart-paste support
///
/// Mirrors an import form with one input per URL. Pasting several URLs into
/// a single row fans them out into that many rows instead of storing them
/// concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRows {
    rows: Vec<String>,
}

impl Default for ImportRows {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportRows {
    /// A form with a single empty row
    pub fn new() -> Self {
        Self {
            rows: vec![String::new()],
        }
    }

    /// Current row contents, in display order
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether every row is blank
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.trim().is_empty())
    }

    /// Replace the text of one row (typing)
    ///
    /// Out-of-range indices are ignored.
    pub fn set_row(&mut self, index: usize, value: impl Into<String>) {
        if let Some(row) = self.rows.get_mut(index) {
            *row = value.into();
        }
    }

    /// Append an empty row
    pub fn add_row(&mut self) {
        self.rows.push(String::new());
    }

    /// Remove a row; the last remaining row is cleared instead
    pub fn remove_row(&mut self, index: usize) {
        if index >= self.rows.len() {
            return;
        }
        if self.rows.len() == 1 {
            self.rows[0].clear();
        } else {
            self.rows.remove(index);
        }
    }

    /// Handle a paste into row `index`
    ///
    /// With two or more tokens the row is replaced by one row per token and
    /// the number of rows inserted is returned. A single token is appended to
    /// the row like an ordinary paste. Blank pastes change nothing.
    pub fn paste(&mut self, index: usize, text: &str) -> usize {
        if index >= self.rows.len() {
            return 0;
        }

        let tokens = parse_urls(text);
        match tokens.len() {
            0 => 0,
            1 => {
                self.rows[index].push_str(text.trim());
                1
            }
            n => {
                tracing::debug!(rows = n, index, "Fanning out multi-URL paste");
                self.rows.splice(index..=index, tokens);
                n
            }
        }
    }

    /// All non-empty candidates across rows, in row order
    pub fn urls(&self) -> Vec<String> {
        self.rows.iter().flat_map(|row| parse_urls(row)).collect()
    }

    /// Reset to a single empty row (after a successful import)
    pub fn clear(&mut self) {
        self.rows = vec![String::new()];
    }
}

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
        )
        .expect("video id pattern is valid")
    })
}

/// Extract the 11-character video id from a watch, short, embed or
/// `youtu.be` URL
///
/// Used for display only; the backend remains the authority on ids and
/// duplicates.
///
/// # Examples
///
/// ```
/// use adminctl::catalog::parser::extract_video_id;
///
/// assert_eq!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1").as_deref(), Some("dQw4w9WgXcQ"));
/// assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
/// assert_eq!(extract_video_id("https://example.com/video"), None);
/// ```
pub fn extract_video_id(url: &str) -> Option<String> {
    video_id_pattern()
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| id.len() == PUBLIC_ID_LEN)
}
