//! Session token held in client-persisted storage.
//!
//! # Design
//! The token lives behind a [`TokenStore`] owned by an explicit [`Session`]
//! that the request core reads on every call. Façades drive the lifecycle:
//! the token is set after login or registration and cleared after logout or
//! account deletion. Expiry is whatever the backend signals with a 401.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::ApiError;

/// Storage for the bearer token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<(), ApiError>;
    fn clear(&self) -> Result<(), ApiError>;
}

/// Token kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// Token persisted in a file so it survives restarts.
///
/// A missing or blank file means "no session".
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("could not read token file {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ApiError::Storage(e.to_string()))?;
        }
        fs::write(&self.path, token).map_err(|e| ApiError::Storage(e.to_string()))
    }

    fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Storage(e.to_string())),
        }
    }
}

/// Session context handed to the request core.
pub struct Session {
    store: Box<dyn TokenStore>,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Session with no token, kept in memory.
    pub fn anonymous() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: &str) -> Result<(), ApiError> {
        log::debug!("session token stored");
        self.store.save(token)
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        log::debug!("session token cleared");
        self.store.clear()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_token_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("tutor-core-{}", uuid::Uuid::new_v4()))
            .join("token")
    }

    #[test]
    fn memory_store_lifecycle() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());

        session.set_token("abc").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.clear().unwrap();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let path = temp_token_path();
        FileTokenStore::new(&path).save("persisted").unwrap();

        let reopened = Session::new(FileTokenStore::new(&path));
        assert_eq!(reopened.token().as_deref(), Some("persisted"));

        reopened.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(reopened.token(), None);
    }

    #[test]
    fn file_store_missing_file_means_no_session() {
        let store = FileTokenStore::new(temp_token_path());
        assert_eq!(store.load(), None);
        assert!(store.clear().is_ok());
    }

    #[test]
    fn debug_output_hides_token() {
        let session = Session::new(MemoryTokenStore::with_token("secret"));
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("authenticated: true"));
    }
}
