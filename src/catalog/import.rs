//! Batch import orchestration
//!
//! One submission carries every URL for one catalog in a single request.
//! The backend resolves the URLs, skips videos it already stores and reports
//! the counts; the orchestrator passes those counts through untouched and
//! then refetches the affected list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::parser::ensure_non_empty;
use super::VideoCatalog;
use crate::api::types::{BatchImportRequest, VideoRecord, VideoType};
use crate::api::ApiResult;
use crate::error::ApiError;

/// Outcome of one accepted batch
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Backend summary, e.g. "Imported 3 new videos. (Skipped 2 duplicates)"
    pub message: Option<String>,
    /// Newly created records
    pub imported_count: u64,
    /// Duplicates the backend skipped, when it reported them
    pub skipped_count: Option<u64>,
    /// Records the backend created in this batch
    pub created: Vec<VideoRecord>,
    /// Whether the affected list was refetched after the import
    pub list_refreshed: bool,
}

impl ImportReport {
    /// One-line summary for the operator
    pub fn summary(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match self.skipped_count {
            Some(skipped) => format!(
                "Imported {} new videos. (Skipped {} duplicates)",
                self.imported_count, skipped
            ),
            None => format!("Imported {} new videos.", self.imported_count),
        }
    }
}

/// Clears the in-flight flag when the submission ends, including when the
/// future is dropped mid-request.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submits URL batches for one catalog view
#[derive(Debug)]
pub struct ImportOrchestrator {
    catalog: Arc<VideoCatalog>,
    in_flight: AtomicBool,
}

impl ImportOrchestrator {
    /// Create an orchestrator that refreshes `catalog` after each import
    pub fn new(catalog: Arc<VideoCatalog>) -> Self {
        Self {
            catalog,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The catalog refreshed after imports
    pub fn catalog(&self) -> &Arc<VideoCatalog> {
        &self.catalog
    }

    /// Whether a submission is currently pending
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit one batch
    ///
    /// Checks run in this order, and none of them touches the network:
    /// empty batch, missing product category, missing or non-admin session,
    /// submission already pending. Blank entries are dropped before sending.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for an empty batch or a product import without
    ///   category
    /// - `Unauthenticated` / `Unauthorized` from the session gate
    /// - `Busy` while another submission is in flight
    /// - any API error from the batch request; local lists are unchanged
    pub async fn submit(
        &self,
        urls: &[String],
        video_type: VideoType,
        category: Option<&str>,
    ) -> ApiResult<ImportReport> {
        ensure_non_empty(urls)?;

        let category = category.map(str::trim).filter(|c| !c.is_empty());
        if video_type.requires_category() && category.is_none() {
            return Err(ApiError::ValidationFailed(
                "a category is required for product imports".to_string(),
            ));
        }

        self.catalog.ensure_admin()?;

        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("Import already in flight, rejecting submission");
            return Err(ApiError::Busy);
        };

        let request = BatchImportRequest {
            urls: urls
                .iter()
                .map(|url| url.trim())
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect(),
            video_type,
            category: if video_type.requires_category() {
                category.map(str::to_string)
            } else {
                None
            },
        };

        tracing::info!(count = request.urls.len(), %video_type, "Submitting batch import");
        let response = self.catalog.client().batch_import(&request).await?;

        let created = response.data.unwrap_or_default();
        let imported_count = response.imported_count.unwrap_or(created.len() as u64);
        tracing::info!(
            imported = imported_count,
            skipped = ?response.skipped_count,
            "Batch import accepted"
        );

        let list_refreshed = match self.catalog.refresh(video_type).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, %video_type, "Import succeeded but list refresh failed");
                false
            }
        };

        Ok(ImportReport {
            message: response.message,
            imported_count,
            skipped_count: response.skipped_count,
            created,
            list_refreshed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::session::{MemorySessionStore, Role, Session};
    use std::time::Duration;
    use url::Url;

    fn orchestrator(session: Option<Session>) -> ImportOrchestrator {
        let store = match session {
            Some(session) => MemorySessionStore::with_session(session),
            None => MemorySessionStore::new(),
        };
        let client = ApiClient::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            Duration::from_secs(1),
            Arc::new(store),
        )
        .unwrap();
        ImportOrchestrator::new(Arc::new(VideoCatalog::new(client, 1000)))
    }

    fn admin() -> Option<Session> {
        Some(Session::new("token", Role::Admin))
    }

    #[tokio::test]
    async fn test_empty_batch_is_validation_failure() {
        let orchestrator = orchestrator(admin());
        let err = orchestrator
            .submit(&[], VideoType::Leaders, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::ValidationFailed("at least one URL required".to_string())
        );
    }

    #[tokio::test]
    async fn test_validation_runs_before_session_check() {
        let orchestrator = orchestrator(None);
        let err = orchestrator
            .submit(&[" ".to_string()], VideoType::Leaders, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_products_require_category() {
        let orchestrator = orchestrator(admin());
        let urls = vec!["https://youtu.be/dQw4w9WgXcQ".to_string()];
        for category in [None, Some(""), Some("   ")] {
            let err = orchestrator
                .submit(&urls, VideoType::Products, category)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::ValidationFailed(_)));
        }
    }

    #[tokio::test]
    async fn test_missing_session_is_unauthenticated() {
        let orchestrator = orchestrator(None);
        let urls = vec!["https://youtu.be/dQw4w9WgXcQ".to_string()];
        let err = orchestrator
            .submit(&urls, VideoType::Leaders, None)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Unauthenticated);
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn test_second_submission_while_pending_is_busy() {
        let orchestrator = orchestrator(admin());
        let _held = InFlight::acquire(&orchestrator.in_flight).unwrap();
        assert!(orchestrator.is_busy());

        let urls = vec!["https://youtu.be/dQw4w9WgXcQ".to_string()];
        let err = orchestrator
            .submit(&urls, VideoType::Leaders, None)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Busy);
    }

    #[test]
    fn test_guard_releases_flag_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let _guard = InFlight::acquire(&flag).unwrap();
            assert!(InFlight::acquire(&flag).is_none());
        }
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_report_summary_prefers_backend_message() {
        let mut report = ImportReport {
            message: None,
            imported_count: 3,
            skipped_count: Some(2),
            created: Vec::new(),
            list_refreshed: true,
        };
        assert_eq!(report.summary(), "Imported 3 new videos. (Skipped 2 duplicates)");

        report.message = Some("Imported 3 new videos.".to_string());
        assert_eq!(report.summary(), "Imported 3 new videos.");
    }
}
