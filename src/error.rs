//! Error types for adminctl
//!
//! Two layers of errors live here:
//!
//! - [`ApiError`] is the taxonomy every screen reacts to (missing session,
//!   rejected credentials, validation, backend failures, unreachable server).
//!   The API client and the workflow components return it directly so callers
//!   can match on the kind.
//! - [`AdminError`] covers everything around it: configuration, session
//!   persistence, serialization. Application code propagates it through the
//!   `anyhow`-based [`Result`] alias.

use thiserror::Error;

/// Generic text shown when the backend cannot be reached at all.
pub const SERVER_UNREACHABLE: &str = "Server unreachable. Check the API URL and your connection.";

/// Failure of an operation against the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No session token is stored; nothing was sent over the network
    #[error("Not logged in")]
    Unauthenticated,

    /// A token exists but the role is wrong, or the backend answered 401/403
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Input rejected before any network call was made
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The backend answered with a failure status or `success: false`
    #[error("Request failed ({status}): {message}")]
    RequestFailed {
        /// HTTP status code of the response
        status: u16,
        /// Backend-provided `message`, or a generic description
        message: String,
    },

    /// No response was received
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Another submission from the same component is still pending
    #[error("Another request is already in progress")]
    Busy,

    /// The operation was superseded before it completed
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Whether the operator has to log in (again) before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Unauthorized(_))
    }

    /// Text to show the operator in place of the normal view.
    ///
    /// Backend messages are passed through verbatim; transport failures are
    /// collapsed into a generic "server unreachable" notice.
    pub fn operator_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please log in to continue.".to_string(),
            Self::Unauthorized(reason) => format!("Access denied: {}", reason),
            Self::ValidationFailed(message) => message.clone(),
            Self::RequestFailed { message, .. } => message.clone(),
            Self::NetworkError(_) => SERVER_UNREACHABLE.to_string(),
            Self::Decode(detail) => format!("The server sent an unexpected response ({})", detail),
            Self::Busy => "Please wait for the current request to finish.".to_string(),
            Self::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

/// Main error type for adminctl outside the request path
#[derive(Error, Debug)]
pub enum AdminError {
    /// Configuration-related errors (missing API URL, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Backend interaction errors
    #[error(transparent)]
    Api(#[from] ApiError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for adminctl operations
///
/// Uses `anyhow::Error` so that context can be attached while propagating;
/// the original [`AdminError`] or [`ApiError`] stays reachable through
/// `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

/// Find the [`ApiError`] inside an `anyhow` chain, if there is one.
pub fn api_error(error: &anyhow::Error) -> Option<&ApiError> {
    error.chain().find_map(|cause| {
        cause.downcast_ref::<ApiError>().or_else(|| match cause.downcast_ref::<AdminError>() {
            Some(AdminError::Api(api)) => Some(api),
            _ => None,
        })
    })
}
