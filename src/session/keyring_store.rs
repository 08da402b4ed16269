//! Session persistence via the OS keyring
//!
//! The token and role are stored as two separate credentials under one
//! service name (Keychain on macOS, Secret Service on Linux, Windows
//! Credential Manager on Windows), keyed by the canonical `token` and
//! `userRole` names.

use super::{reject_empty, Role, Session, SessionStore, ROLE_KEY, TOKEN_KEY};
use crate::error::{AdminError, Result};

/// Default keyring service name.
const DEFAULT_SERVICE: &str = "adminctl";

/// Stateless accessor for the OS native keyring
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service: String,
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringSessionStore {
    /// Store under the default `adminctl` service
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Store under a custom service name, e.g. one per backend environment
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key).map_err(|e| AdminError::Keyring(e).into())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AdminError::Keyring(e).into()),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AdminError::Keyring(e).into()),
        }
    }
}

impl SessionStore for KeyringSessionStore {
    fn get_session(&self) -> Result<Option<Session>> {
        let Some(token) = self.read(TOKEN_KEY)? else {
            return Ok(None);
        };
        let role = self
            .read(ROLE_KEY)?
            .map(|raw| Role::from(raw.as_str()))
            .unwrap_or_default();

        Ok(Some(Session::new(token, role)).filter(Session::is_authenticated))
    }

    fn set_session(&self, session: &Session) -> Result<()> {
        reject_empty(session)?;
        self.entry(TOKEN_KEY)?
            .set_password(&session.token)
            .map_err(AdminError::Keyring)?;
        self.entry(ROLE_KEY)?
            .set_password(session.role.as_str())
            .map_err(AdminError::Keyring)?;
        tracing::debug!(service = %self.service, role = %session.role, "Session saved to keyring");
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        self.delete(TOKEN_KEY)?;
        self.delete(ROLE_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        let store = KeyringSessionStore::default();
        assert_eq!(store.service, "adminctl");
    }

    #[test]
    fn test_empty_token_rejected_before_keyring_access() {
        let store = KeyringSessionStore::with_service("adminctl-test-empty");
        assert!(store.set_session(&Session::new("", Role::Admin)).is_err());
    }

    #[test]
    #[ignore = "requires system keyring"]
    fn test_save_load_clear_roundtrip_via_keyring() {
        let store = KeyringSessionStore::with_service("adminctl-test-roundtrip");
        store
            .set_session(&Session::new("keyring-token", Role::Admin))
            .expect("save");

        let loaded = store.get_session().expect("load").expect("present");
        assert_eq!(loaded.token, "keyring-token");
        assert_eq!(loaded.role, Role::Admin);

        store.clear_session().expect("clear");
        assert!(store.get_session().expect("load after clear").is_none());
        store.clear_session().expect("second clear is a no-op");
    }
}
