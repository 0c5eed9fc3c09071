//! File-backed session store
//!
//! Keeps the session in `<ewallet_dir>/session.json`. Reads and writes take an
//! advisory lock on the file so two CLI invocations never interleave.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::result::{Error, Result};
use crate::domain::Session;
use crate::ports::SessionStore;

/// Session file name inside the ewallet directory
pub const SESSION_FILENAME: &str = "session.json";

/// Session store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store at `<dir>/session.json`
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SESSION_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_locked(&self, write: bool) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(&self.path)?;

        let locked = if write {
            file.lock_exclusive()
        } else {
            file.lock_shared()
        };
        locked.map_err(|e| Error::storage(format!("Failed to lock session file: {}", e)))?;
        Ok(file)
    }
}

impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut file = self.open_locked(false)?;
        let mut content = String::new();
        let read = file.read_to_string(&mut content);
        let _ = file.unlock();
        read?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        // A corrupt file means nobody is logged in; the next login overwrites it
        match serde_json::from_str::<Session>(&content) {
            Ok(session) if !session.token.is_empty() => Ok(Some(session)),
            _ => Ok(None),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let content = serde_json::to_string_pretty(session)?;

        let mut file = self.open_locked(true)?;
        let written = (|| -> std::io::Result<()> {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(content.as_bytes())?;
            file.sync_all()
        })();
        let _ = file.unlock();
        written?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        store.save(&Session::new("long-token-value", "+91-9876543210")).unwrap();
        store.save(&Session::new("tok", "+1-5551234")).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, Session::new("tok", "+1-5551234"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_logged_out() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SESSION_FILENAME), "{not json").unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save(&Session::new("tok", "+1-5551234")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
