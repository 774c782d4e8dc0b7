use std::collections::HashMap;
use std::sync::Mutex;

use zeroize::Zeroize;

use super::{CredentialError, CredentialStore};

/// Volatile credential store. Values are zeroed when removed or replaced.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn store(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().map_err(|_| CredentialError::LockPoisoned)?;
        if let Some(mut previous) = entries.insert(key.to_string(), value.to_string()) {
            previous.zeroize();
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let entries = self.entries.lock().map_err(|_| CredentialError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().map_err(|_| CredentialError::LockPoisoned)?;
        if let Some(mut previous) = entries.remove(key) {
            previous.zeroize();
        }
        Ok(())
    }
}

impl Drop for MemoryCredentialStore {
    fn drop(&mut self) {
        if let Ok(entries) = self.entries.get_mut() {
            entries.values_mut().for_each(Zeroize::zeroize);
        }
    }
}
