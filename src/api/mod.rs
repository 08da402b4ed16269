//! Authorized HTTP access to the backend REST API
//!
//! [`ApiClient`] is the only place that knows the authorization header
//! format. Every protected request:
//!
//! 1. reads the session from the injected [`SessionStore`]; without a token
//!    it fails with [`ApiError::Unauthenticated`] and sends nothing,
//! 2. attaches `Authorization: Bearer <token>`,
//! 3. normalizes the outcome:
//!    - 401/403 → [`ApiError::Unauthorized`]
//!    - other non-2xx → [`ApiError::RequestFailed`] with the body's `message`
//!      field, or a generic description
//!    - 2xx with `"success": false` → [`ApiError::RequestFailed`] as well
//!    - no response → [`ApiError::NetworkError`]
//!    - otherwise the parsed JSON body
//!
//! Typed wrappers for each endpoint live in [`endpoints`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::{AdminError, ApiError, Result};
use crate::session::SessionStore;

pub mod endpoints;
pub mod types;

/// Outcome of a single request
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// HTTP client bound to one backend and one session store
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Construct a client for `base_url`
    ///
    /// No network I/O is performed at construction time.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Config` if the HTTP client cannot be built
    pub fn new(base_url: Url, timeout: Duration, session: Arc<dyn SessionStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("adminctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdminError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Construct a client from validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is missing or invalid
    pub fn from_config(config: &Config, session: Arc<dyn SessionStore>) -> Result<Self> {
        Self::new(config.base_url()?, config.timeout(), session)
    }

    /// The session store consulted for every protected request
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// The backend base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for an API path such as `/api/admin/users?x=1`
    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ApiError::ValidationFailed(format!("Invalid request path {}: {}", path, e)))
    }

    fn bearer_token(&self) -> ApiResult<String> {
        match self.session.get_session() {
            Ok(Some(session)) if session.is_authenticated() => Ok(session.token),
            Ok(_) => Err(ApiError::Unauthenticated),
            Err(e) => {
                tracing::warn!(error = %e, "Session store unreadable, treating as logged out");
                Err(ApiError::Unauthenticated)
            }
        }
    }

    /// Issue an authorized request and return the parsed JSON body
    ///
    /// # Errors
    ///
    /// See the module documentation for the error mapping. Without a stored
    /// token this fails with `Unauthenticated` before any network call.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        let token = match self.bearer_token() {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(%method, path, "No session token, request not sent");
                return Err(e);
            }
        };

        let mut builder = self.http.request(method.clone(), self.endpoint(path)?).bearer_auth(token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(method, path, builder).await
    }

    /// Issue an authorized multipart request
    ///
    /// # Errors
    ///
    /// Same mapping as [`ApiClient::request`]
    pub async fn request_multipart(
        &self,
        method: Method,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ApiResult<Value> {
        let token = self.bearer_token()?;
        let builder = self
            .http
            .request(method.clone(), self.endpoint(path)?)
            .bearer_auth(token)
            .multipart(form);
        self.execute(method, path, builder).await
    }

    /// Issue a request without credentials (login, signup)
    ///
    /// # Errors
    ///
    /// Same mapping as [`ApiClient::request`], minus the session check
    pub async fn public_request(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        let mut builder = self.http.request(method.clone(), self.endpoint(path)?);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(method, path, builder).await
    }

    async fn execute(&self, method: Method, path: &str, builder: RequestBuilder) -> ApiResult<Value> {
        tracing::debug!(%method, path, "Sending request");

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Request failed before a response arrived");
            ApiError::NetworkError(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::warn!(%method, path, %status, error = %e, "Failed to read response body");
            ApiError::NetworkError(e.to_string())
        })?;

        tracing::debug!(%method, path, status = status.as_u16(), "Response received");
        interpret_response(status, &text)
    }
}

/// Map a status code and raw body onto the error taxonomy
pub(crate) fn interpret_response(status: StatusCode, text: &str) -> ApiResult<Value> {
    let body: Option<Value> = if text.trim().is_empty() {
        None
    } else {
        serde_json::from_str(text).ok()
    };
    let message = body
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized(
            message.unwrap_or_else(|| generic_failure(status)),
        ));
    }

    if !status.is_success() {
        return Err(ApiError::RequestFailed {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| generic_failure(status)),
        });
    }

    match body {
        Some(value) => {
            if value.get("success").and_then(Value::as_bool) == Some(false) {
                return Err(ApiError::RequestFailed {
                    status: status.as_u16(),
                    message: message.unwrap_or_else(|| "The server reported a failure".to_string()),
                });
            }
            Ok(value)
        }
        None if text.trim().is_empty() => Ok(Value::Null),
        None => Err(ApiError::Decode("response body is not JSON".to_string())),
    }
}

fn generic_failure(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("Request failed with status {} {}", status.as_u16(), reason),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}

/// Percent-encode a value for use as one path segment
pub(crate) fn path_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
