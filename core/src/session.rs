//! Bearer-token session.
//!
//! # Design
//! The token lives in an explicit `Session` owned by the client instead of in
//! process-wide state. Durable storage sits behind `TokenStore` and is read
//! once, in `Session::hydrate`; after that the in-memory copy is the source
//! of truth and every `set_token` / `clear` writes through.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::ApiError;

/// Durable storage for the session token.
pub trait TokenStore {
    fn load(&self) -> Result<Option<String>, ApiError>;
    fn save(&self, token: &str) -> Result<(), ApiError>;
    fn clear(&self) -> Result<(), ApiError>;
}

/// Keeps the token in memory only. Clones share the same slot, so a test can
/// keep a handle and inspect what the session persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.to_string()))),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, ApiError> {
        self.slot
            .lock()
            .map_err(|_| ApiError::Storage("token slot poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Stores the token as the sole contents of a file.
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

fn storage_err(path: &Path, e: std::io::Error) -> ApiError {
    ApiError::Storage(format!("{}: {e}", path.display()))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_err(&self.path, e)),
        }
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| storage_err(dir, e))?;
        }
        fs::write(&self.path, token).map_err(|e| storage_err(&self.path, e))
    }

    fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err(&self.path, e)),
        }
    }
}

/// The current bearer token plus the store it is persisted to.
pub struct Session {
    token: Option<String>,
    store: Box<dyn TokenStore>,
}

impl Session {
    /// Start with no token, ignoring anything already in `store`.
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            token: None,
            store: Box::new(store),
        }
    }

    /// Start with whatever token `store` already holds.
    pub fn hydrate(store: impl TokenStore + 'static) -> Result<Self, ApiError> {
        let token = store.load()?;
        debug!(restored = token.is_some(), "session hydrated");
        Ok(Self {
            token,
            store: Box::new(store),
        })
    }

    /// An in-memory session that persists nothing beyond the process.
    pub fn ephemeral() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Replace the token and persist it. The shape is not validated.
    pub fn set_token(&mut self, token: impl Into<String>) -> Result<(), ApiError> {
        let token = token.into();
        self.store.save(&token)?;
        self.token = Some(token);
        Ok(())
    }

    /// Forget the token in memory and in storage.
    pub fn clear(&mut self) -> Result<(), ApiError> {
        self.token = None;
        self.store.clear()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}
