//! Durable storage for the token pair.
//!
//! A single backing is used. [`FileTokenStore`] is what the CLI persists to;
//! [`MemoryTokenStore`] keeps the pair in-process. Both enforce that a pair is
//! stored whole or not at all.

use super::{
    error::StoreError,
    token::{unix_now, TokenPair},
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tracing::{debug, warn};
use ulid::Ulid;

/// Matches the lifetime of the session cookie the web console used to set.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub trait TokenStore: Send + Sync {
    /// Whatever is currently stored, unvalidated. Storage failures read as absent.
    fn read(&self) -> Option<TokenPair>;

    /// Persist both tokens in one operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair is incomplete or the backing cannot persist it.
    fn write(&self, pair: &TokenPair) -> Result<(), StoreError>;

    /// Remove both tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing cannot be cleared.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn read(&self) -> Option<TokenPair> {
        (**self).read()
    }

    fn write(&self, pair: &TokenPair) -> Result<(), StoreError> {
        (**self).write(pair)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    access: String,
    refresh: String,
    stored_at: i64,
}

/// Token pair persisted as a JSON document, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    max_age: Duration,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: DEFAULT_MAX_AGE,
        }
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "session".into(), |name| name.to_string_lossy());
        self.path.with_file_name(format!(".{name}.{}.tmp", Ulid::new()))
    }

    fn outlived(&self, stored_at: i64) -> bool {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        unix_now().saturating_sub(stored_at) >= max_age
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Option<TokenPair> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("Unable to read session file {}: {err}", self.path.display());
                return None;
            }
        };

        let record: StoredSession = match serde_json::from_slice(&contents) {
            Ok(record) => record,
            Err(err) => {
                warn!("Ignoring corrupt session file {}: {err}", self.path.display());
                return None;
            }
        };

        if self.outlived(record.stored_at) {
            debug!("stored session is older than {:?}", self.max_age);
            return None;
        }

        let pair = TokenPair::new(record.access, record.refresh);
        if !pair.is_complete() {
            debug!("stored session is missing a token");
            return None;
        }

        Some(pair)
    }

    fn write(&self, pair: &TokenPair) -> Result<(), StoreError> {
        if !pair.is_complete() {
            return Err(StoreError::IncompletePair);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let record = StoredSession {
            access: pair.access().expose_secret().to_string(),
            refresh: pair.refresh().expose_secret().to_string(),
            stored_at: unix_now(),
        };
        let payload = serde_json::to_vec_pretty(&record)?;

        let temp_path = self.temp_path();
        if let Err(err) = write_private(&temp_path, &payload) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }

        debug!("session written to {}", self.path.display());

        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn write_private(path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(payload)?;
    file.sync_all()
}

/// In-process store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    pair: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<TokenPair> {
        self.pair
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, pair: &TokenPair) -> Result<(), StoreError> {
        if !pair.is_complete() {
            return Err(StoreError::IncompletePair);
        }
        *self.pair.lock().unwrap_or_else(PoisonError::into_inner) = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.pair.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> FileTokenStore {
        let dir = std::env::temp_dir().join(format!("sb-admin-store-{}", Ulid::new()));
        FileTokenStore::new(dir.join("session.json"))
    }

    struct Cleanup(PathBuf);

    impl Drop for Cleanup {
        fn drop(&mut self) {
            if let Some(parent) = self.0.parent() {
                let _ = fs::remove_dir_all(parent);
            }
        }
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let store = temp_store();
        let _cleanup = Cleanup(store.path().to_path_buf());

        assert!(store.read().is_none());
        store.write(&TokenPair::new("access-1", "refresh-1")).unwrap();

        let pair = store.read().unwrap();
        assert_eq!(pair.access().expose_secret(), "access-1");
        assert_eq!(pair.refresh().expose_secret(), "refresh-1");

        store.write(&TokenPair::new("access-2", "refresh-2")).unwrap();
        assert_eq!(store.read().unwrap().access().expose_secret(), "access-2");

        store.clear().unwrap();
        assert!(store.read().is_none());
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let store = temp_store();
        let _cleanup = Cleanup(store.path().to_path_buf());
        store.write(&TokenPair::new("access", "refresh")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn incomplete_pairs_are_rejected_and_leave_store_untouched() {
        let store = temp_store();
        let _cleanup = Cleanup(store.path().to_path_buf());
        store.write(&TokenPair::new("access", "refresh")).unwrap();

        let result = store.write(&TokenPair::new("access-only", ""));
        assert!(matches!(result, Err(StoreError::IncompletePair)));
        assert_eq!(store.read().unwrap().access().expose_secret(), "access");
    }

    #[test]
    fn half_written_records_read_as_absent() {
        let store = temp_store();
        let _cleanup = Cleanup(store.path().to_path_buf());
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();

        fs::write(
            store.path(),
            format!(
                r#"{{"access":"a","refresh":"","stored_at":{}}}"#,
                unix_now()
            ),
        )
        .unwrap();
        assert!(store.read().is_none());

        fs::write(store.path(), r#"{"access":"a"}"#).unwrap();
        assert!(store.read().is_none());

        fs::write(store.path(), "not json").unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn records_older_than_max_age_read_as_absent() {
        let store = temp_store();
        let _cleanup = Cleanup(store.path().to_path_buf());
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();

        let stale = unix_now() - 8 * 24 * 60 * 60;
        fs::write(
            store.path(),
            format!(r#"{{"access":"a","refresh":"r","stored_at":{stale}}}"#),
        )
        .unwrap();
        assert!(store.read().is_none());

        let short_lived = store.clone().with_max_age(Duration::ZERO);
        short_lived.write(&TokenPair::new("a", "r")).unwrap();
        assert!(short_lived.read().is_none());
    }

    #[test]
    fn memory_store_behaves_like_file_store() {
        let store = MemoryTokenStore::new();
        assert!(store.read().is_none());

        store.write(&TokenPair::new("access", "refresh")).unwrap();
        assert!(store.read().is_some());

        assert!(matches!(
            store.write(&TokenPair::new("", "refresh")),
            Err(StoreError::IncompletePair)
        ));
        assert!(store.read().is_some());

        store.clear().unwrap();
        assert!(store.read().is_none());
    }
}
