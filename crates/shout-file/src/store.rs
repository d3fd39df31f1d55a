//! JSON file storage for the current session.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use shout_core::{CredentialStore, Session, StoreError};

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

/// File name of the session record inside the config directory.
pub const SESSION_FILE: &str = "session.json";

/// On-disk session record.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    did: String,
    handle: String,
    access_token: String,
    refresh_token: String,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            did: session.did().to_string(),
            handle: session.handle().to_string(),
            access_token: session.access_token().as_str().to_string(),
            refresh_token: session.refresh_token().as_str().to_string(),
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// A [`CredentialStore`] backed by a single JSON file.
///
/// A missing file means no session. Writes go to a temporary file in the
/// same directory and are renamed into place, so readers see either the old
/// record or the new one. Readers and writers in different processes are
/// serialized by an advisory lock on a sibling `.lock` file. On Unix the
/// record is readable by its owner only.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for the session file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The per-user location, e.g. `~/.config/shout/session.json` on Linux.
    pub fn default_location() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("", "", "shout").ok_or_else(|| StoreError::Unavailable {
            reason: "could not determine the user config directory".to_string(),
        })?;
        Ok(Self::new(dirs.config_dir().join(SESSION_FILE)))
    }

    /// Get the session file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| SESSION_FILE.to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    fn open_lock(&self) -> Result<File, StoreError> {
        let lock_path = self.lock_path();
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| io_error(&lock_path, e))
    }

    fn create_parent(&self) -> Result<(), StoreError> {
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o700);
        builder.create(parent).map_err(|e| io_error(parent, e))
    }

    fn read(&self) -> Result<Option<Session>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        lock.lock_shared().map_err(|e| io_error(&self.lock_path(), e))?;
        let contents = fs::read_to_string(&self.path);
        let _ = lock.unlock();

        let contents = match contents {
            Ok(contents) => contents,
            // Removed between the existence check and the read.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.path, e)),
        };

        let stored: StoredSession =
            serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                reason: format!("{}: {}", self.path.display(), e),
            })?;

        let session = Session::from_parts(
            &stored.did,
            &stored.handle,
            &stored.access_token,
            &stored.refresh_token,
        )
        .map_err(|e| StoreError::Corrupt {
            reason: format!("{}: {}", self.path.display(), e),
        })?;

        Ok(Some(session))
    }

    fn write(&self, session: &Session) -> Result<(), StoreError> {
        self.create_parent()?;

        let json = serde_json::to_string_pretty(&StoredSession::from(session)).map_err(|e| {
            StoreError::Corrupt {
                reason: e.to_string(),
            }
        })?;

        let lock = self.open_lock()?;
        lock.lock_exclusive()
            .map_err(|e| io_error(&self.lock_path(), e))?;

        let temp_path = self.temp_path();
        let result = write_private(&temp_path, json.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        let _ = lock.unlock();

        result.map_err(|e| io_error(&self.path, e))
    }

    fn remove(&self) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }

        let lock = self.open_lock()?;
        lock.lock_exclusive()
            .map_err(|e| io_error(&self.lock_path(), e))?;
        let result = match fs::remove_file(&self.path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        };
        let _ = lock.unlock();

        result.map_err(|e| io_error(&self.path, e))
    }
}

/// Write `contents` to a new file readable only by its owner.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[async_trait]
impl CredentialStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        let session = self.read()?;
        debug!(found = session.is_some(), "Loaded session record");
        Ok(session)
    }

    #[instrument(skip_all, fields(path = %self.path.display(), did = %session.did()))]
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.write(session)?;
        debug!("Saved session record");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear(&self) -> Result<(), StoreError> {
        self.remove()?;
        debug!("Cleared session record");
        Ok(())
    }
}
