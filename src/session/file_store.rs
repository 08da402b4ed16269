//! Session persistence in a JSON file
//!
//! The file holds the same two keys the browser console kept in local
//! storage:
//!
//! ```json
//! { "token": "<bearer token>", "userRole": "ADMIN" }
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;

use super::{reject_empty, Session, SessionStore};
use crate::error::{AdminError, Result};

/// File name used inside the data directory.
const SESSION_FILE: &str = "session.json";

/// Session store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store that reads and writes `path`
    ///
    /// Nothing is touched on disk until the first `set_session`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `session.json` in the platform data directory
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storage` if no home directory can be determined
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "adminctl", "adminctl")
            .ok_or_else(|| AdminError::Storage("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().join(SESSION_FILE))
    }

    /// Path of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get_session(&self) -> Result<Option<Session>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AdminError::Storage(format!(
                    "Failed to read session file {}: {}",
                    self.path.display(),
                    e
                ))
                .into())
            }
        };

        let session: Session = serde_json::from_str(&contents)
            .with_context(|| format!("Corrupt session file {}", self.path.display()))?;

        Ok(Some(session).filter(Session::is_authenticated))
    }

    fn set_session(&self, session: &Session) -> Result<()> {
        reject_empty(session)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create session directory")
                .map_err(|e| AdminError::Storage(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)
            .context("Failed to write session file")
            .map_err(|e| AdminError::Storage(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %self.path.display(), role = %session.role, "Session saved");
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AdminError::Storage(format!(
                "Failed to remove session file {}: {}",
                self.path.display(),
                e
            ))
            .into()),
        }
    }
}
