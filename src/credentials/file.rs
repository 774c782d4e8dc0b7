use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{CredentialError, CredentialStore};

/// Persistent credential store: a JSON object in an owner-only file.
///
/// Writes go through a temp file in the same directory and are renamed into
/// place, so a crash mid-write leaves the previous contents intact.
pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            set_dir_permissions(dir)?;
        }

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, entries)?;
        tmp.as_file_mut().flush()?;
        tmp.as_file().sync_all()?;
        set_file_permissions(tmp.path())?;
        tmp.persist(&self.path).map_err(|e| CredentialError::Io(e.error))?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn store(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().map_err(|_| CredentialError::LockPoisoned)?;
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let _guard = self.write_lock.lock().map_err(|_| CredentialError::LockPoisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().map_err(|_| CredentialError::LockPoisoned)?;
        let mut entries = self.load()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }
}

// ═══════════════════════════════════════════
// Internal helpers
// ═══════════════════════════════════════════

/// Set directory permissions to owner-only (0o700 on Unix).
#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), CredentialError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), CredentialError> {
    Ok(())
}

/// Set file permissions to owner read/write only (0o600 on Unix).
#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), CredentialError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), CredentialError> {
    Ok(())
}
