//! Typed wrappers for the backend endpoints
//!
//! Each method builds the path and body for one endpoint, delegates to
//! [`ApiClient::request`] (or `public_request` for login/signup), and narrows
//! the JSON response into the types from [`super::types`].

use std::collections::BTreeMap;
use std::path::Path;

use reqwest::Method;
use serde_json::Value;

use super::types::{
    decode, Account, BatchImportRequest, BatchImportResponse, ChatMessage, HistoryPage,
    ListEnvelope, LoginRequest, LoginResponse, MessageResponse, NotificationPayload,
    NotificationResponse, SignupRequest, Subscriber, UserSummary, VideoRecord, VideoType,
    VideoUpdate,
};
use super::{path_segment, ApiClient, ApiResult};
use crate::error::ApiError;

/// Audio attached to a smart-response training entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Local file uploaded as the `audioFile` multipart field
    File(std::path::PathBuf),
    /// Already-hosted audio referenced by URL
    Url(String),
}

fn to_body<T: serde::Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

impl ApiClient {
    /// `POST /api/auth/login`
    pub async fn login(&self, login_id: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = to_body(&LoginRequest {
            login_id: login_id.to_string(),
            password: password.to_string(),
        })?;
        let value = self
            .public_request(Method::POST, "/api/auth/login", Some(&body))
            .await?;
        decode(value)
    }

    /// `POST /api/auth/admin/signup`
    pub async fn signup_admin(&self, request: &SignupRequest) -> ApiResult<MessageResponse> {
        let body = to_body(request)?;
        let value = self
            .public_request(Method::POST, "/api/auth/admin/signup", Some(&body))
            .await?;
        if value.is_null() {
            return Ok(MessageResponse::default());
        }
        decode(value)
    }

    /// `GET /api/admin/users`
    pub async fn list_users(&self) -> ApiResult<Vec<Account>> {
        self.get_list("/api/admin/users").await
    }

    /// `GET /api/admin/admins`
    pub async fn list_admins(&self) -> ApiResult<Vec<Account>> {
        self.get_list("/api/admin/admins").await
    }

    /// `GET /api/subscribers`
    pub async fn list_subscribers(&self) -> ApiResult<Vec<Subscriber>> {
        self.get_list("/api/subscribers").await
    }

    /// `GET /api/chat/all`
    pub async fn list_conversations(&self) -> ApiResult<Vec<UserSummary>> {
        self.get_list("/api/chat/all").await
    }

    /// `GET /api/chat/history/{userId}?page=N`
    pub async fn chat_history(&self, user_id: &str, page: u32) -> ApiResult<HistoryPage> {
        let path = format!("/api/chat/history/{}?page={}", path_segment(user_id), page);
        let value = self.request(Method::GET, &path, None).await?;
        decode(value)
    }

    /// `GET /api/chat/admin/chats`: every conversation keyed by user email
    pub async fn all_chats(&self) -> ApiResult<BTreeMap<String, Vec<ChatMessage>>> {
        let value = self.request(Method::GET, "/api/chat/admin/chats", None).await?;
        let data = value.get("data").cloned().unwrap_or(Value::Null);
        if data.is_null() {
            return Ok(BTreeMap::new());
        }
        decode(data)
    }

    /// `POST /api/chat/admin/smart-response`
    ///
    /// A file is sent as multipart (`question`, `answer`, `audioFile`); a URL
    /// is sent as JSON (`question`, `answer`, `audioUrl`).
    pub async fn smart_response(
        &self,
        question: &str,
        answer: &str,
        audio: &AudioSource,
    ) -> ApiResult<MessageResponse> {
        const PATH: &str = "/api/chat/admin/smart-response";

        let value = match audio {
            AudioSource::Url(url) => {
                let body = serde_json::json!({
                    "question": question,
                    "answer": answer,
                    "audioUrl": url,
                });
                self.request(Method::POST, PATH, Some(&body)).await?
            }
            AudioSource::File(path) => {
                let form = audio_form(question, answer, path).await?;
                self.request_multipart(Method::POST, PATH, form).await?
            }
        };

        if value.is_null() {
            return Ok(MessageResponse::default());
        }
        decode(value)
    }

    /// `GET /api/videos/{type}?page=N&limit=M`
    pub async fn list_videos(&self, video_type: VideoType, page: u32, limit: u32) -> ApiResult<Vec<VideoRecord>> {
        let path = format!("/api/videos/{}?page={}&limit={}", video_type.as_str(), page, limit);
        self.get_list(&path).await
    }

    /// `POST /api/videos/batch-scrape-import`
    pub async fn batch_import(&self, request: &BatchImportRequest) -> ApiResult<BatchImportResponse> {
        let body = to_body(request)?;
        let value = self
            .request(Method::POST, "/api/videos/batch-scrape-import", Some(&body))
            .await?;
        decode(value)
    }

    /// `PUT /api/videos/{type}/{id}`
    pub async fn update_video(&self, video_type: VideoType, id: &str, update: &VideoUpdate) -> ApiResult<()> {
        let body = to_body(update)?;
        let path = format!("/api/videos/{}/{}", video_type.as_str(), path_segment(id));
        self.request(Method::PUT, &path, Some(&body)).await?;
        Ok(())
    }

    /// `DELETE /api/videos/{type}/{id}`
    pub async fn delete_video(&self, video_type: VideoType, id: &str) -> ApiResult<()> {
        let path = format!("/api/videos/{}/{}", video_type.as_str(), path_segment(id));
        self.request(Method::DELETE, &path, None).await?;
        Ok(())
    }

    /// `POST /api/notifications/send`
    pub async fn send_notification(&self, payload: &NotificationPayload) -> ApiResult<NotificationResponse> {
        let body = to_body(payload)?;
        let value = self
            .request(Method::POST, "/api/notifications/send", Some(&body))
            .await?;
        if value.is_null() {
            return Ok(NotificationResponse::default());
        }
        decode(value)
    }

    async fn get_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let value = self.request(Method::GET, path, None).await?;
        let envelope: ListEnvelope<T> = decode(value)?;
        Ok(envelope.into_items())
    }
}

async fn audio_form(question: &str, answer: &str, path: &Path) -> ApiResult<reqwest::multipart::Form> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ApiError::ValidationFailed(format!("Cannot read audio file {}: {}", path.display(), e))
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    };

    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime)
        .map_err(|e| ApiError::ValidationFailed(e.to_string()))?;

    Ok(reqwest::multipart::Form::new()
        .text("question", question.to_string())
        .text("answer", answer.to_string())
        .part("audioFile", part))
}
