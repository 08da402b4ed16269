//! Login session persistence
//!
//! The session is the single source of truth for "is there a logged-in
//! admin". It holds the bearer token and the role the backend reported at
//! login, and is consulted by every protected command before any request is
//! made.
//!
//! Storage is behind the [`SessionStore`] trait so commands and tests can be
//! handed a store explicitly instead of reading ambient global state. Both
//! persistent backends use the canonical keys `token` and `userRole`.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::config::{SessionBackend, SessionConfig};
use crate::error::{AdminError, ApiError, Result};

pub mod file_store;
pub mod keyring_store;

pub use file_store::FileSessionStore;
pub use keyring_store::KeyringSessionStore;

/// Persisted key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Persisted key holding the role string.
pub const ROLE_KEY: &str = "userRole";

/// Role reported by the backend at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// May use the admin screens
    Admin,
    /// Regular end user
    User,
    /// Anything else the backend sent, or no role at all
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "USER" => Self::User,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated session: bearer token plus role.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,

    /// Role the backend reported for this token
    #[serde(rename = "userRole", default)]
    pub role: Role,
}

impl Session {
    /// Create a session from a token and role
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    /// A non-empty token means the holder is authenticated.
    pub fn is_authenticated(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

// Keep the token out of logs and panic messages.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Storage for the current session.
///
/// Implementations must treat a stored empty token as "no session".
pub trait SessionStore: Send + Sync {
    /// Read the current session, if any
    fn get_session(&self) -> Result<Option<Session>>;

    /// Persist a session, replacing any previous one
    fn set_session(&self, session: &Session) -> Result<()>;

    /// Remove the stored session; succeeds when nothing is stored
    fn clear_session(&self) -> Result<()>;

    /// True iff a token is present and the stored role equals `required`
    fn is_authorized(&self, required: Role) -> bool {
        match self.get_session() {
            Ok(Some(session)) => session.is_authenticated() && session.role == required,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session");
                false
            }
        }
    }
}

/// Gate used by every protected screen before issuing requests.
///
/// Returns the session when it is authenticated with `required`; otherwise
/// `Unauthenticated` (no token) or `Unauthorized` (wrong role). A store that
/// cannot be read counts as "no session".
pub fn require_role(store: &dyn SessionStore, required: Role) -> std::result::Result<Session, ApiError> {
    let session = match store.get_session() {
        Ok(Some(session)) if session.is_authenticated() => session,
        Ok(_) => return Err(ApiError::Unauthenticated),
        Err(e) => {
            tracing::warn!(error = %e, "Session store unreadable, treating as logged out");
            return Err(ApiError::Unauthenticated);
        }
    };

    if session.role != required {
        return Err(ApiError::Unauthorized(format!(
            "only {} accounts can use this command (logged in as {})",
            required, session.role
        )));
    }

    Ok(session)
}

fn reject_empty(session: &Session) -> Result<()> {
    if !session.is_authenticated() {
        return Err(AdminError::Storage("Refusing to store a session with an empty token".into()).into());
    }
    Ok(())
}

/// In-memory session store
///
/// Used for tests and for embedding the library where nothing should touch
/// disk.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `session`
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get_session(&self) -> Result<Option<Session>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| AdminError::Storage("Session lock poisoned".into()))?;
        Ok(guard.clone().filter(Session::is_authenticated))
    }

    fn set_session(&self, session: &Session) -> Result<()> {
        reject_empty(session)?;
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| AdminError::Storage("Session lock poisoned".into()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| AdminError::Storage("Session lock poisoned".into()))?;
        *guard = None;
        Ok(())
    }
}

/// Open the session store selected by `config`
///
/// # Errors
///
/// Returns error if the default session file location cannot be determined
pub fn open_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match config.backend {
        SessionBackend::File => {
            let path = match &config.path {
                Some(path) => path.clone(),
                None => FileSessionStore::default_path()?,
            };
            tracing::debug!(path = %path.display(), "Using file session store");
            Arc::new(FileSessionStore::new(path))
        }
        SessionBackend::Keyring => {
            tracing::debug!("Using keyring session store");
            Arc::new(KeyringSessionStore::new())
        }
        SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_known_and_unknown_values() {
        assert_eq!(Role::from("ADMIN"), Role::Admin);
        assert_eq!(Role::from("user"), Role::User);
        assert_eq!(Role::from("MODERATOR"), Role::Unknown);
        assert_eq!(Role::from(""), Role::Unknown);
    }

    #[test]
    fn test_role_deserializes_unknown_strings() {
        let role: Role = serde_json::from_str("\"SUPERUSER\"").unwrap();
        assert_eq!(role, Role::Unknown);
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_session_serializes_canonical_keys() {
        let session = Session::new("abc", Role::Admin);
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["token"], "abc");
        assert_eq!(value["userRole"], "ADMIN");
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("super-secret", Role::Admin);
        let debug = format!("{:?}", session);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("Admin"));
    }

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemorySessionStore::new();
        assert!(store.get_session().unwrap().is_none());

        store.set_session(&Session::new("t1", Role::User)).unwrap();
        store.set_session(&Session::new("t2", Role::Admin)).unwrap();
        let session = store.get_session().unwrap().unwrap();
        assert_eq!(session.token, "t2");
        assert_eq!(session.role, Role::Admin);

        store.clear_session().unwrap();
        assert!(store.get_session().unwrap().is_none());
        store.clear_session().unwrap();
    }

    #[test]
    fn test_memory_store_rejects_empty_token() {
        let store = MemorySessionStore::new();
        assert!(store.set_session(&Session::new("  ", Role::Admin)).is_err());
        assert!(store.get_session().unwrap().is_none());
    }

    #[test]
    fn test_is_authorized_requires_token_and_matching_role() {
        let store = MemorySessionStore::new();
        assert!(!store.is_authorized(Role::Admin));

        store.set_session(&Session::new("t", Role::User)).unwrap();
        assert!(!store.is_authorized(Role::Admin));
        assert!(store.is_authorized(Role::User));

        store.set_session(&Session::new("t", Role::Admin)).unwrap();
        assert!(store.is_authorized(Role::Admin));
    }

    #[test]
    fn test_require_role_without_session_is_unauthenticated() {
        let store = MemorySessionStore::new();
        assert_eq!(
            require_role(&store, Role::Admin).unwrap_err(),
            ApiError::Unauthenticated
        );
    }

    #[test]
    fn test_require_role_with_wrong_role_is_unauthorized() {
        let store = MemorySessionStore::with_session(Session::new("t", Role::User));
        let err = require_role(&store, Role::Admin).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert!(err.requires_login());
    }

    #[test]
    fn test_require_role_returns_session() {
        let store = MemorySessionStore::with_session(Session::new("t", Role::Admin));
        let session = require_role(&store, Role::Admin).unwrap();
        assert_eq!(session.token, "t");
    }
}
