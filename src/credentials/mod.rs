//! Credential store: one bearer token kept under a fixed key.
//!
//! Two interchangeable implementations sit behind `CredentialStore`:
//! - `FileCredentialStore`: owner-only JSON file, survives restarts
//! - `MemoryCredentialStore`: process-lifetime map
//!
//! The implementation is picked once at startup by `open_store`.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use thiserror::Error;
use zeroize::Zeroize;

use crate::config::{self, ClientConfig, StorageBackend};

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential store is corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

/// Key/value persistence for credentials.
pub trait CredentialStore {
    fn store(&self, key: &str, value: &str) -> Result<(), CredentialError>;
    fn read(&self, key: &str) -> Result<Option<String>, CredentialError>;
    fn remove(&self, key: &str) -> Result<(), CredentialError>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for Box<S> {
    fn store(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        (**self).store(key, value)
    }

    fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        (**self).read(key)
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        (**self).remove(key)
    }
}

// ═══════════════════════════════════════════════════════════
// BearerToken: zeroed on drop, redacted in Debug
// ═══════════════════════════════════════════════════════════

/// Opaque bearer credential sent in the `Authorization` header.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token. Surrounding whitespace is dropped; empty yields `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let mut raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            raw.zeroize();
            return None;
        }
        let token = Self(trimmed.to_string());
        raw.zeroize();
        Some(token)
    }

    /// The raw token value. Only for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

// ── Token helpers ────────────────────────────────────────

/// Store the session token, replacing any previous one.
pub fn save_token<S: CredentialStore + ?Sized>(
    store: &S,
    token: &BearerToken,
) -> Result<(), CredentialError> {
    store.store(config::TOKEN_KEY, token.expose())
}

/// Read the session token, if any.
pub fn load_token<S: CredentialStore + ?Sized>(
    store: &S,
) -> Result<Option<BearerToken>, CredentialError> {
    Ok(store.read(config::TOKEN_KEY)?.and_then(|raw| BearerToken::new(raw)))
}

/// Delete the session token. Deleting a missing token is not an error.
pub fn clear_token<S: CredentialStore + ?Sized>(store: &S) -> Result<(), CredentialError> {
    store.remove(config::TOKEN_KEY)
}

/// Open the store selected by configuration.
pub fn open_store(config: &ClientConfig) -> Box<dyn CredentialStore> {
    match config.storage {
        StorageBackend::File => {
            let path = config::credentials_path(&config.data_dir);
            tracing::debug!(path = %path.display(), "Using file credential store");
            Box::new(FileCredentialStore::new(path))
        }
        StorageBackend::Memory => {
            tracing::debug!("Using in-memory credential store");
            Box::new(MemoryCredentialStore::new())
        }
    }
}
