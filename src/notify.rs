//! Push notification composition
//!
//! A [`NotificationDraft`] is built up while composing, validated locally
//! (no request is sent for an invalid draft) and cleared once the backend
//! accepted it.

use serde_json::json;
use url::Url;

use crate::api::types::{NotificationPayload, NotificationResponse};
use crate::api::{ApiClient, ApiResult};
use crate::error::ApiError;
use crate::session::{require_role, Role};

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 50;
/// Maximum body length, in characters.
pub const BODY_MAX_CHARS: usize = 150;

/// Notification being composed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationDraft {
    /// Title shown in bold
    pub title: String,
    /// Message text
    pub body: String,
    /// Optional large image
    pub image_url: Option<String>,
    /// Optional page opened when the notification is tapped
    pub target_url: Option<String>,
}

fn optional_url(field: &str, value: Option<&str>) -> ApiResult<Option<String>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(raw.to_string())),
        _ => Err(ApiError::ValidationFailed(format!(
            "{} must be an http(s) URL",
            field
        ))),
    }
}

impl NotificationDraft {
    /// Start a draft with a title and body
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Characters left for the title (negative when over the limit)
    pub fn title_remaining(&self) -> i64 {
        TITLE_MAX_CHARS as i64 - self.title.trim().chars().count() as i64
    }

    /// Characters left for the body (negative when over the limit)
    pub fn body_remaining(&self) -> i64 {
        BODY_MAX_CHARS as i64 - self.body.trim().chars().count() as i64
    }

    /// Check the draft and build the request body
    ///
    /// The target URL travels as `data: {"url": ...}`.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for a blank or too long title/body, or a
    /// malformed image or target URL
    pub fn to_payload(&self) -> ApiResult<NotificationPayload> {
        let title = self.title.trim();
        let body = self.body.trim();

        if title.is_empty() || body.is_empty() {
            return Err(ApiError::ValidationFailed(
                "title and body are required".to_string(),
            ));
        }
        if self.title_remaining() < 0 {
            return Err(ApiError::ValidationFailed(format!(
                "title must be at most {} characters",
                TITLE_MAX_CHARS
            )));
        }
        if self.body_remaining() < 0 {
            return Err(ApiError::ValidationFailed(format!(
                "body must be at most {} characters",
                BODY_MAX_CHARS
            )));
        }

        let image_url = optional_url("image URL", self.image_url.as_deref())?;
        let target_url = optional_url("target URL", self.target_url.as_deref())?;

        Ok(NotificationPayload {
            title: title.to_string(),
            body: body.to_string(),
            image_url,
            data: target_url.map(|url| json!({ "url": url })),
        })
    }

    /// Validate, send, and clear the draft once the backend accepted it
    ///
    /// # Errors
    ///
    /// Validation errors (nothing sent), session errors, or any API error;
    /// the draft is kept on failure so it can be resent
    pub async fn send(&mut self, client: &ApiClient) -> ApiResult<NotificationResponse> {
        let payload = self.to_payload()?;
        require_role(client.session().as_ref(), Role::Admin)?;

        tracing::info!(has_image = payload.image_url.is_some(), "Sending push notification");
        let response = client.send_notification(&payload).await?;
        tracing::info!(delivered = response.success_count, "Notification sent");

        *self = Self::default();
        Ok(response)
    }
}
