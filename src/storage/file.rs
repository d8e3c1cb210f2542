//! JSON-file-based storage backend.
//!
//! Stores session, category lists and the pending queue in separate JSON
//! files under a configurable directory (default:
//! `$XDG_DATA_HOME/viccoin-rs/`).

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{CategoryLists, dequeue, enqueue};
use crate::category::CategoryContext;
use crate::error::{Result, VicCoinError};
use crate::models::{Transaction, TransactionId, UserProfile};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "viccoin-rs";

/// File name for the session (token and profile).
const SESSION_FILE: &str = "session.json";
/// File name for customized category lists.
const CATEGORIES_FILE: &str = "categories.json";
/// File name for the pending transaction queue.
const PENDING_FILE: &str = "pending.json";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// Contents of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Session {
    /// Bearer token in clear text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    /// Cached profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile: Option<UserProfile>,
}

/// File-backed storage that persists local state as JSON files.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file lock
/// on `storage.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]).
///
/// Read operations acquire a shared lock (allowing concurrent readers),
/// while write operations acquire an exclusive lock.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock          (cross-process lock sentinel)
///   session.json
///   categories.json
///   pending.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing all JSON files.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file storage rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist. Also
    /// opens (or creates) the `storage.lock` sentinel file used for
    /// cross-process advisory locking.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        tracing::debug!(dir = %dir.display(), "file storage opened");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/viccoin-rs/` (typically
    /// `~/.local/share/viccoin-rs/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                VicCoinError::Storage("could not determine platform data directory".into())
            })
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Returns the full path for a given file name.
    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Acquires an in-process mutex guard and a shared (read) file lock,
    /// executes `op`, then releases the file lock.
    ///
    /// The one `storage.lock` sentinel guards the whole directory. The
    /// state is three small files read on every command, so per-file locks
    /// would add nothing but ordering rules.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        // Only surface the unlock error when the operation succeeded.
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Acquires an in-process mutex guard and an exclusive (write) file
    /// lock, executes `op`, then releases the file lock.
    ///
    /// Locks the directory, not one file, so `clear_all` removing session,
    /// categories and queue is seen by other processes as a single step.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads and deserializes a JSON file. Returns the default value if
    /// the file does not exist.
    fn read_json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(VicCoinError::from),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Atomically writes a serialized JSON file (write-to-tmp then rename).
    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path(name);
        let tmp_path = self.path(&format!("{name}.tmp"));
        let json = serde_json::to_string_pretty(value).map_err(VicCoinError::from)?;
        fs::write(&tmp_path, json).map_err(storage_io_error)?;
        fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
        Ok(())
    }

    /// Reads a file under a shared lock.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        self.with_shared_lock(|| self.read_json(name))
    }

    /// Read-modify-write of a file under an exclusive lock.
    fn update<T, F>(&self, name: &str, op: F) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T),
    {
        self.with_exclusive_lock(|| {
            let mut value: T = self.read_json(name)?;
            op(&mut value);
            self.write_json(name, &value)
        })
    }

    /// Reads the stored token.
    fn read_token(&self) -> Result<Option<SecretString>> {
        let session: Session = self.load(SESSION_FILE)?;
        Ok(session.token.map(SecretString::from))
    }

    /// Stores the token.
    fn write_token(&self, token: &SecretString) -> Result<()> {
        self.update(SESSION_FILE, |session: &mut Session| {
            session.token = Some(token.expose_secret().to_owned());
        })
    }

    /// Reads the cached profile.
    fn read_profile(&self) -> Result<Option<UserProfile>> {
        let session: Session = self.load(SESSION_FILE)?;
        Ok(session.profile)
    }

    /// Caches the profile.
    fn write_profile(&self, profile: UserProfile) -> Result<()> {
        self.update(SESSION_FILE, |session: &mut Session| {
            session.profile = Some(profile);
        })
    }

    /// Deletes the session file.
    fn remove_session(&self) -> Result<()> {
        self.with_exclusive_lock(|| self.remove_files(&[SESSION_FILE]))
    }

    /// Reads one context's category list.
    fn read_category_list(&self, context: CategoryContext) -> Result<Option<Vec<String>>> {
        let lists: CategoryLists = self.load(CATEGORIES_FILE)?;
        Ok(lists.get(context))
    }

    /// Stores one context's category list.
    fn write_category_list(&self, context: CategoryContext, names: Vec<String>) -> Result<()> {
        self.update(CATEGORIES_FILE, |lists: &mut CategoryLists| {
            lists.set(context, names);
        })
    }

    /// Reads the pending queue.
    fn read_pending(&self) -> Result<Vec<Transaction>> {
        self.load(PENDING_FILE)
    }

    /// Adds to the pending queue.
    fn write_pending(&self, transaction: Transaction) -> Result<()> {
        self.update(PENDING_FILE, |queue: &mut Vec<Transaction>| {
            enqueue(queue, transaction);
        })
    }

    /// Drops entries from the pending queue.
    fn drop_pending(&self, ids: &[TransactionId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.update(PENDING_FILE, |queue: &mut Vec<Transaction>| {
            dequeue(queue, ids);
        })
    }

    /// Deletes all data files.
    ///
    /// The `storage.lock` sentinel is preserved.
    fn clear_all(&self) -> Result<()> {
        self.with_exclusive_lock(|| {
            self.remove_files(&[SESSION_FILE, CATEGORIES_FILE, PENDING_FILE])
        })
    }

    /// Removes the named files; missing files are ignored. Callers hold
    /// the exclusive lock.
    fn remove_files(&self, names: &[&str]) -> Result<()> {
        for name in names {
            match fs::remove_file(self.path(name)) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(storage_io_error(err)),
            }
        }
        Ok(())
    }
}

// ── Free-standing helpers ───────────────────────────────────────────────

/// Wraps an I/O error into a [`VicCoinError::Storage`]. The file name is
/// not attached; every file lives in the one data directory.
fn storage_io_error(err: std::io::Error) -> VicCoinError {
    VicCoinError::Storage(Box::new(err))
}

/// Wraps a mutex poison error into a [`VicCoinError::Storage`]. Not
/// recovered: files are replaced by rename, so a panicked writer leaves at
/// most a stray `.tmp`, and the next process starts with a fresh mutex.
fn lock_poison_error<T>(err: &std::sync::PoisonError<T>) -> VicCoinError {
    VicCoinError::Storage(err.to_string().into())
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for FileStorage {
    #[inline]
    fn token(&self) -> Result<Option<SecretString>> {
        self.read_token()
    }

    #[inline]
    fn set_token(&self, token: SecretString) -> Result<()> {
        self.write_token(&token)
    }

    #[inline]
    fn profile(&self) -> Result<Option<UserProfile>> {
        self.read_profile()
    }

    #[inline]
    fn set_profile(&self, profile: UserProfile) -> Result<()> {
        self.write_profile(profile)
    }

    #[inline]
    fn clear_session(&self) -> Result<()> {
        self.remove_session()
    }

    #[inline]
    fn category_list(&self, context: CategoryContext) -> Result<Option<Vec<String>>> {
        self.read_category_list(context)
    }

    #[inline]
    fn set_category_list(&self, context: CategoryContext, names: Vec<String>) -> Result<()> {
        self.write_category_list(context, names)
    }

    #[inline]
    fn pending_transactions(&self) -> Result<Vec<Transaction>> {
        self.read_pending()
    }

    #[inline]
    fn push_pending(&self, transaction: Transaction) -> Result<()> {
        self.write_pending(transaction)
    }

    #[inline]
    fn remove_pending(&self, ids: &[TransactionId]) -> Result<()> {
        self.drop_pending(ids)
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.clear_all()
    }
}

// ── Storage (async) implementation ──────────────────────────────────────

#[cfg(feature = "async")]
impl super::Storage for FileStorage {
    #[inline]
    fn token(&self) -> impl Future<Output = Result<Option<SecretString>>> + Send {
        core::future::ready(self.read_token())
    }

    #[inline]
    fn set_token(&self, token: SecretString) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.write_token(&token))
    }

    #[inline]
    fn profile(&self) -> impl Future<Output = Result<Option<UserProfile>>> + Send {
        core::future::ready(self.read_profile())
    }

    #[inline]
    fn set_profile(&self, profile: UserProfile) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.write_profile(profile))
    }

    #[inline]
    fn clear_session(&self) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.remove_session())
    }

    #[inline]
    fn category_list(
        &self,
        context: CategoryContext,
    ) -> impl Future<Output = Result<Option<Vec<String>>>> + Send {
        core::future::ready(self.read_category_list(context))
    }

    #[inline]
    fn set_category_list(
        &self,
        context: CategoryContext,
        names: Vec<String>,
    ) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.write_category_list(context, names))
    }

    #[inline]
    fn pending_transactions(&self) -> impl Future<Output = Result<Vec<Transaction>>> + Send {
        core::future::ready(self.read_pending())
    }

    #[inline]
    fn push_pending(&self, transaction: Transaction) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.write_pending(transaction))
    }

    #[inline]
    fn remove_pending(&self, ids: &[TransactionId]) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.drop_pending(ids))
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.clear_all())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{TransactionKind, UserId};

    /// Helper to create a [`FileStorage`] in a temporary directory.
    fn temp_storage() -> (FileStorage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        (storage, dir)
    }

    fn tx(id: &str, amount: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        Transaction::new(id, TransactionKind::Expense, amount, "Lazer", date)
    }

    fn profile() -> UserProfile {
        UserProfile {
            uid: UserId::new("u-1".to_owned()),
            name: "Vic".to_owned(),
            email: "vic@example.com".to_owned(),
        }
    }

    #[test]
    fn lockfile_created_on_construction() {
        let (storage, _dir) = temp_storage();
        assert!(storage.path(LOCK_FILE).exists());
    }

    #[test]
    fn clear_preserves_lockfile() {
        let (storage, _dir) = temp_storage();
        storage.write_token(&SecretString::from("jwt".to_owned())).unwrap();
        storage.clear_all().unwrap();
        assert!(storage.path(LOCK_FILE).exists());
        assert!(!storage.path(SESSION_FILE).exists());
    }

    #[test]
    fn token_and_profile_share_the_session_file() {
        let (storage, _dir) = temp_storage();
        storage.write_token(&SecretString::from("jwt".to_owned())).unwrap();
        storage.write_profile(profile()).unwrap();

        let raw = fs::read_to_string(storage.path(SESSION_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["token"], "jwt");
        assert_eq!(json["profile"]["nome"], "Vic");

        assert_eq!(storage.read_token().unwrap().unwrap().expose_secret(), "jwt");
        assert_eq!(storage.read_profile().unwrap(), Some(profile()));
    }

    #[test]
    fn state_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
            storage.write_pending(tx("local-1", 9.5)).unwrap();
            storage
                .write_category_list(CategoryContext::Expense, vec!["Pets".to_owned()])
                .unwrap();
        }
        let reopened = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let pending = reopened.read_pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id.as_inner(), "local-1");
        assert_eq!(
            reopened.read_category_list(CategoryContext::Expense).unwrap(),
            Some(vec!["Pets".to_owned()])
        );
    }

    #[test]
    fn drop_pending_with_no_ids_does_not_create_file() {
        let (storage, _dir) = temp_storage();
        storage.drop_pending(&[]).unwrap();
        assert!(!storage.path(PENDING_FILE).exists());
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        if let Ok(dir) = FileStorage::default_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }

    #[cfg(feature = "blocking")]
    mod blocking {
        use super::*;
        use crate::storage::BlockingStorage;

        #[test]
        fn empty_storage() {
            let (storage, _dir) = temp_storage();
            assert!(storage.token().unwrap().is_none());
            assert!(storage.profile().unwrap().is_none());
            assert!(storage.category_list(CategoryContext::Salary).unwrap().is_none());
            assert!(storage.pending_transactions().unwrap().is_empty());
        }

        #[test]
        fn clear_session_keeps_other_state() {
            let (storage, _dir) = temp_storage();
            storage.set_token(SecretString::from("jwt".to_owned())).unwrap();
            storage.push_pending(tx("local-1", 1.0)).unwrap();
            storage.clear_session().unwrap();
            assert!(storage.token().unwrap().is_none());
            assert_eq!(storage.pending_transactions().unwrap().len(), 1);
        }

        #[test]
        fn pending_replace_and_remove() {
            let (storage, _dir) = temp_storage();
            storage.push_pending(tx("local-1", 1.0)).unwrap();
            storage.push_pending(tx("local-2", 2.0)).unwrap();
            storage.push_pending(tx("local-1", 3.0)).unwrap();

            let queue = storage.pending_transactions().unwrap();
            assert_eq!(queue.len(), 2);
            assert!((queue[0].amount - 3.0).abs() < f64::EPSILON);

            storage.remove_pending(&[TransactionId::from("local-1")]).unwrap();
            let left = storage.pending_transactions().unwrap();
            assert_eq!(left.len(), 1);
            assert_eq!(left[0].id.as_inner(), "local-2");
        }

        #[test]
        fn clear_removes_everything() {
            let (storage, _dir) = temp_storage();
            storage.set_token(SecretString::from("jwt".to_owned())).unwrap();
            storage
                .set_category_list(CategoryContext::Income, vec!["Aluguel".to_owned()])
                .unwrap();
            storage.push_pending(tx("local-1", 1.0)).unwrap();
            storage.clear().unwrap();
            assert!(storage.token().unwrap().is_none());
            assert!(storage.category_list(CategoryContext::Income).unwrap().is_none());
            assert!(storage.pending_transactions().unwrap().is_empty());
        }
    }

    #[cfg(feature = "blocking")]
    #[test]
    fn concurrent_pushes_are_safe() {
        use std::sync::Arc;
        use std::thread;

        use crate::storage::BlockingStorage;

        let (opened, _dir) = temp_storage();
        let shared = Arc::new(opened);
        let num_threads: usize = 4;
        let items_per_thread: usize = 20;

        let handles: Vec<_> = (0..num_threads)
            .map(|thread_idx| {
                let storage = Arc::clone(&shared);
                thread::spawn(move || {
                    for item_idx in 0..items_per_thread {
                        let id = format!("local-{thread_idx}-{item_idx}");
                        storage.push_pending(tx(&id, 1.0)).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let queue = shared.pending_transactions().unwrap();
        assert_eq!(queue.len(), num_threads * items_per_thread);
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use super::*;
        use crate::storage::Storage;

        #[tokio::test]
        async fn token_roundtrip() {
            let (storage, _dir) = temp_storage();
            assert!(storage.token().await.unwrap().is_none());
            storage.set_token(SecretString::from("jwt".to_owned())).await.unwrap();
            assert_eq!(storage.token().await.unwrap().unwrap().expose_secret(), "jwt");
        }

        #[tokio::test]
        async fn pending_roundtrip() {
            let (storage, _dir) = temp_storage();
            storage.push_pending(tx("local-5", 4.0)).await.unwrap();
            let queue = storage.pending_transactions().await.unwrap();
            assert_eq!(queue.len(), 1);
            storage
                .remove_pending(&[TransactionId::from("local-5")])
                .await
                .unwrap();
            assert!(storage.pending_transactions().await.unwrap().is_empty());
        }
    }
}
