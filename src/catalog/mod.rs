//! Video catalog state and workflows
//!
//! [`VideoCatalog`] holds the client-side copy of the leaders and products
//! lists. The backend is the source of truth for every derived field
//! (title, public id), so each mutation is followed by a full refetch of the
//! affected list rather than a local splice.
//!
//! Submodules:
//!
//! - [`parser`]: pasted text to candidate URLs, smart paste rows
//! - [`import`]: batch import orchestration with an in-flight guard

use std::sync::Mutex;

use crate::api::types::{VideoRecord, VideoType, VideoUpdate};
use crate::api::{ApiClient, ApiResult};
use crate::error::ApiError;
use crate::session::{require_role, Role};

pub mod import;
pub mod parser;

pub use import::{ImportOrchestrator, ImportReport};
pub use parser::{extract_video_id, parse_urls, ImportRows};

#[derive(Debug, Default)]
struct CatalogState {
    leaders: Vec<VideoRecord>,
    products: Vec<VideoRecord>,
}

impl CatalogState {
    fn list_mut(&mut self, video_type: VideoType) -> &mut Vec<VideoRecord> {
        match video_type {
            VideoType::Leaders => &mut self.leaders,
            VideoType::Products => &mut self.products,
        }
    }

    fn list(&self, video_type: VideoType) -> &[VideoRecord] {
        match video_type {
            VideoType::Leaders => &self.leaders,
            VideoType::Products => &self.products,
        }
    }
}

/// Client-side view of both video lists
#[derive(Debug)]
pub struct VideoCatalog {
    client: ApiClient,
    list_limit: u32,
    state: Mutex<CatalogState>,
}

impl VideoCatalog {
    /// Create an empty catalog; nothing is fetched until a refresh
    pub fn new(client: ApiClient, list_limit: u32) -> Self {
        Self {
            client,
            list_limit,
            state: Mutex::new(CatalogState::default()),
        }
    }

    /// The client used for every catalog request
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Snapshot of the current list for `video_type`
    pub fn videos(&self, video_type: VideoType) -> Vec<VideoRecord> {
        self.state
            .lock()
            .map(|state| state.list(video_type).to_vec())
            .unwrap_or_default()
    }

    /// Look up one record in the current list
    pub fn find(&self, video_type: VideoType, id: &str) -> Option<VideoRecord> {
        self.state.lock().ok().and_then(|state| {
            state
                .list(video_type)
                .iter()
                .find(|video| video.id.as_str() == id)
                .cloned()
        })
    }

    pub(crate) fn ensure_admin(&self) -> ApiResult<()> {
        require_role(self.client.session().as_ref(), Role::Admin).map(|_| ())
    }

    fn replace(&self, video_type: VideoType, videos: Vec<VideoRecord>) -> ApiResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ApiError::Decode("catalog state lock poisoned".to_string()))?;
        *state.list_mut(video_type) = videos;
        Ok(())
    }

    /// Refetch one list from the backend and replace the local copy
    ///
    /// # Errors
    ///
    /// Any API error; the local list is left untouched on failure
    pub async fn refresh(&self, video_type: VideoType) -> ApiResult<Vec<VideoRecord>> {
        self.ensure_admin()?;
        let videos = self.client.list_videos(video_type, 1, self.list_limit).await?;
        tracing::debug!(%video_type, count = videos.len(), "Video list refreshed");
        self.replace(video_type, videos.clone())?;
        Ok(videos)
    }

    /// Refetch leaders and products concurrently
    ///
    /// # Errors
    ///
    /// The first API error from either request; neither list is replaced
    /// unless both succeed
    pub async fn refresh_all(&self) -> ApiResult<(Vec<VideoRecord>, Vec<VideoRecord>)> {
        self.ensure_admin()?;
        let (leaders, products) = futures::future::try_join(
            self.client.list_videos(VideoType::Leaders, 1, self.list_limit),
            self.client.list_videos(VideoType::Products, 1, self.list_limit),
        )
        .await?;

        tracing::debug!(
            leaders = leaders.len(),
            products = products.len(),
            "Video catalog refreshed"
        );
        self.replace(VideoType::Leaders, leaders.clone())?;
        self.replace(VideoType::Products, products.clone())?;
        Ok((leaders, products))
    }

    /// Save an edited record and refetch its list
    ///
    /// The category is only sent for products; for leaders it is dropped.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for a blank title (no request is sent), otherwise
    /// any API error from the update or the refetch
    pub async fn edit(
        &self,
        video_type: VideoType,
        id: &str,
        title: &str,
        description: &str,
        category: Option<&str>,
    ) -> ApiResult<Vec<VideoRecord>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::ValidationFailed("title is required".to_string()));
        }
        self.ensure_admin()?;

        let update = VideoUpdate {
            title: title.to_string(),
            description: description.to_string(),
            category: if video_type.requires_category() {
                category.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string)
            } else {
                None
            },
        };

        tracing::info!(%video_type, id, "Updating video");
        self.client.update_video(video_type, id, &update).await?;
        self.refresh(video_type).await
    }

    /// Delete a record and refetch its list
    ///
    /// # Errors
    ///
    /// Any API error from the delete or the refetch
    pub async fn delete(&self, video_type: VideoType, id: &str) -> ApiResult<Vec<VideoRecord>> {
        self.ensure_admin()?;
        tracing::info!(%video_type, id, "Deleting video");
        self.client.delete_video(video_type, id).await?;
        self.refresh(video_type).await
    }
}
