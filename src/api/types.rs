//! Wire types for the backend REST API
//!
//! The backend wraps most payloads in `{ success, message?, data }`. Shapes
//! are narrowed here, once, so that the rest of the crate never touches raw
//! JSON. Optional fields the backend sometimes omits are modelled as
//! `Option`; identifiers may arrive as numbers or strings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;
use crate::session::Role;

/// Identifier of a backend record, stored as text whatever its wire type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Integer(number) => Self(number.to_string()),
        })
    }
}

/// Parse an optional timestamp, reading unparseable values as absent
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        DateTime::parse_from_rfc3339(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }))
}

/// Read a role string, mapping null or missing to [`Role::Unknown`]
fn lenient_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|value| Role::from(value.as_str())).unwrap_or_default())
}

/// Standard list envelope: `{ success, message?, data: [T] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListEnvelope<T> {
    /// Backend success flag
    #[serde(default)]
    pub success: Option<bool>,
    /// Optional human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Payload; a missing or null list reads as empty
    #[serde(default)]
    pub data: Option<Vec<T>>,
}

impl<T> ListEnvelope<T> {
    /// The payload items, empty when the backend sent none
    pub fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

/// Decode a JSON value into `T`, reporting shape mismatches as
/// [`ApiError::Decode`].
pub fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// `POST /api/auth/login` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Member id or email
    pub login_id: String,
    /// Plain password, sent once over TLS
    pub password: String,
}

/// `POST /api/auth/login` response body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// Account summary
    pub user: LoginUser,
}

/// Account summary returned with a login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    /// Role of the account
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Role,
}

/// `POST /api/auth/admin/signup` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Optional display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Admin email
    pub email: String,
    /// Admin password
    pub password: String,
}

/// Response carrying only a message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    /// Backend success flag, when sent
    #[serde(default)]
    pub success: Option<bool>,
    /// Human-readable outcome
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// A registered account (regular user or admin)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: RecordId,
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Distributor id, when the member has one
    #[serde(default)]
    pub rcm_id: Option<String>,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Account role
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Role,
    /// Whether the subscription renews automatically
    #[serde(default)]
    pub auto_pay_status: bool,
    /// Next renewal date
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub next_billing_date: Option<DateTime<Utc>>,
    /// Registration time
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A newsletter/WhatsApp subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: RecordId,
    /// Subscriber name
    #[serde(default)]
    pub name: Option<String>,
    /// Phone number
    #[serde(default, alias = "phone_number")]
    pub phone_number: Option<String>,
    /// Subscription time
    #[serde(default, alias = "subscribed_at", deserialize_with = "lenient_timestamp")]
    pub subscribed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sender {
    /// The end user
    User,
    /// A human admin
    Admin,
    /// The assistant
    Ai,
    /// System notices
    #[serde(other)]
    System,
}

impl Sender {
    /// Whether the message came from the end user
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User)
    }
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Backend identifier, when sent
    #[serde(default, alias = "_id")]
    pub id: Option<RecordId>,
    /// Author
    pub sender: Sender,
    /// Message text
    #[serde(default)]
    pub message: String,
    /// Creation time; ordering key
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Conversation list entry from `GET /api/chat/all`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User identifier used for history lookups
    #[serde(alias = "_id", alias = "userId")]
    pub id: RecordId,
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Preview of the latest message
    #[serde(default)]
    pub last_message: Option<String>,
    /// Time of the latest message
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Pagination block of a history page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Whether older pages exist
    #[serde(default)]
    pub has_more: bool,
}

/// `GET /api/chat/history/{userId}?page=N` response
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPage {
    /// Messages of this page, oldest first
    #[serde(default)]
    pub data: Option<Vec<ChatMessage>>,
    /// Paging information
    #[serde(default)]
    pub pagination: Pagination,
}

impl HistoryPage {
    /// Messages of this page, empty when none were sent
    pub fn messages(&self) -> &[ChatMessage] {
        self.data.as_deref().unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Videos
// ---------------------------------------------------------------------------

/// Which catalog a video belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    /// Leaders' videos
    Leaders,
    /// Product videos; these carry a category
    Products,
}

impl VideoType {
    /// Both catalogs, in display order
    pub const ALL: [VideoType; 2] = [VideoType::Leaders, VideoType::Products];

    /// Path segment and wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leaders => "leaders",
            Self::Products => "products",
        }
    }

    /// Whether records of this type carry a category
    pub fn requires_category(&self) -> bool {
        matches!(self, Self::Products)
    }
}

impl fmt::Display for VideoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leaders" | "leader" => Ok(Self::Leaders),
            "products" | "product" => Ok(Self::Products),
            other => Err(ApiError::ValidationFailed(format!(
                "Unknown video type '{}'. Must be leaders or products",
                other
            ))),
        }
    }
}

/// Length of an external-platform video id.
pub const PUBLIC_ID_LEN: usize = 11;

/// A catalog entry created by the backend import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: RecordId,
    /// Title scraped at import, editable afterwards
    #[serde(default)]
    pub title: String,
    /// Description, editable
    #[serde(default)]
    pub description: Option<String>,
    /// Original watch URL
    #[serde(default)]
    pub video_url: String,
    /// External-platform id; exactly 11 characters when meaningful
    #[serde(default)]
    pub public_id: Option<String>,
    /// Product category; only meaningful for product videos
    #[serde(default)]
    pub category: Option<String>,
}

impl VideoRecord {
    /// The external id when it has the expected length
    pub fn valid_public_id(&self) -> Option<&str> {
        self.public_id
            .as_deref()
            .filter(|id| id.chars().count() == PUBLIC_ID_LEN)
    }

    /// URL for viewing the video: an embed URL when the public id is valid,
    /// otherwise the stored watch URL
    pub fn embed_url(&self) -> String {
        match self.valid_public_id() {
            Some(id) => format!("https://www.youtube.com/embed/{}?autoplay=0", id),
            None => self.video_url.clone(),
        }
    }
}

/// `POST /api/videos/batch-scrape-import` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchImportRequest {
    /// Candidate URLs, in paste order
    pub urls: Vec<String>,
    /// Target catalog
    pub video_type: VideoType,
    /// Category for product imports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// `POST /api/videos/batch-scrape-import` response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchImportResponse {
    /// Summary such as "Imported 10 new videos. (Skipped 5 duplicates)"
    #[serde(default)]
    pub message: Option<String>,
    /// Count of newly created records, when reported
    #[serde(default)]
    pub imported_count: Option<u64>,
    /// Count of duplicates skipped, when reported
    #[serde(default)]
    pub skipped_count: Option<u64>,
    /// Newly created records
    #[serde(default)]
    pub data: Option<Vec<VideoRecord>>,
}

/// `PUT /api/videos/{type}/{id}` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpdate {
    /// New title
    pub title: String,
    /// New description
    pub description: String,
    /// New category; only sent for product videos
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// `POST /api/notifications/send` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    /// Notification title
    pub title: String,
    /// Notification body
    pub body: String,
    /// Large image shown with the notification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Extra data; carries the tap target URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// `POST /api/notifications/send` response body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    /// Devices the notification was delivered to
    #[serde(default)]
    pub success_count: u64,
    /// Devices that rejected the notification
    #[serde(default)]
    pub failure_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_accepts_numbers_and_strings() {
        let a: RecordId = serde_json::from_value(json!(42)).unwrap();
        let b: RecordId = serde_json::from_value(json!("65f0c")).unwrap();
        assert_eq!(a.as_str(), "42");
        assert_eq!(b.as_str(), "65f0c");
    }

    #[test]
    fn test_list_envelope_null_data_is_empty() {
        let envelope: ListEnvelope<Account> =
            decode(json!({"success": true, "data": null})).unwrap();
        assert!(envelope.into_items().is_empty());

        let envelope: ListEnvelope<Account> = decode(json!({"success": true})).unwrap();
        assert!(envelope.into_items().is_empty());
    }

    #[test]
    fn test_account_optional_fields() {
        let account: Account = decode(json!({
            "id": 7,
            "fullName": "Asha",
            "email": "asha@example.com",
            "role": "USER",
            "autoPayStatus": true,
            "nextBillingDate": "2026-11-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(account.id.as_str(), "7");
        assert_eq!(account.role, Role::User);
        assert!(account.auto_pay_status);
        assert!(account.rcm_id.is_none());
        assert!(account.next_billing_date.is_some());
    }

    #[test]
    fn test_account_bad_date_reads_as_absent() {
        let account: Account = decode(json!({"_id": "a1", "nextBillingDate": "soon"})).unwrap();
        assert_eq!(account.id.as_str(), "a1");
        assert!(account.next_billing_date.is_none());
        assert_eq!(account.role, Role::Unknown);
    }

    #[test]
    fn test_subscriber_accepts_snake_case_aliases() {
        let sub: Subscriber = decode(json!({
            "id": 1,
            "name": "Ravi",
            "phone_number": "+911234",
            "subscribed_at": "2025-01-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(sub.phone_number.as_deref(), Some("+911234"));
        assert!(sub.subscribed_at.is_some());
    }

    #[test]
    fn test_sender_variants() {
        let user: Sender = serde_json::from_value(json!("USER")).unwrap();
        let ai: Sender = serde_json::from_value(json!("AI")).unwrap();
        let other: Sender = serde_json::from_value(json!("BOT")).unwrap();
        assert!(user.is_user());
        assert_eq!(ai, Sender::Ai);
        assert_eq!(other, Sender::System);
    }

    #[test]
    fn test_history_page_without_pagination() {
        let page: HistoryPage = decode(json!({"success": true, "data": []})).unwrap();
        assert!(!page.pagination.has_more);
        assert!(page.messages().is_empty());
    }

    #[test]
    fn test_video_type_parsing() {
        assert_eq!("leaders".parse::<VideoType>().unwrap(), VideoType::Leaders);
        assert_eq!("Products".parse::<VideoType>().unwrap(), VideoType::Products);
        assert!(matches!(
            "shorts".parse::<VideoType>(),
            Err(ApiError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_embed_url_uses_valid_public_id() {
        let mut video: VideoRecord = decode(json!({
            "id": 1,
            "title": "Intro",
            "videoUrl": "https://youtu.be/dQw4w9WgXcQ",
            "publicId": "dQw4w9WgXcQ"
        }))
        .unwrap();
        assert_eq!(
            video.embed_url(),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=0"
        );

        video.public_id = Some("short".to_string());
        assert_eq!(video.embed_url(), "https://youtu.be/dQw4w9WgXcQ");

        video.public_id = None;
        assert_eq!(video.embed_url(), "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_batch_request_omits_missing_category() {
        let request = BatchImportRequest {
            urls: vec!["https://youtu.be/a".to_string()],
            video_type: VideoType::Leaders,
            category: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["videoType"], "leaders");
        assert!(value.get("category").is_none());
    }

    #[test]
    fn test_video_update_serialization() {
        let update = VideoUpdate {
            title: "New".to_string(),
            description: "Desc".to_string(),
            category: Some("Health".to_string()),
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({"title": "New", "description": "Desc", "category": "Health"}));
    }

    #[test]
    fn test_decode_reports_shape_errors() {
        let err = decode::<LoginResponse>(json!({"token": 5})).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
