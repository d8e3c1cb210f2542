//! In-memory storage backend for testing.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! the storage traits. Ideal for unit tests and for running the facade
//! without touching the file system.

use std::sync::Mutex;

#[cfg(feature = "async")]
use core::future::{self, Future};

use secrecy::{ExposeSecret, SecretString};

use super::{CategoryLists, dequeue, enqueue};
use crate::category::CategoryContext;
use crate::error::{Result, VicCoinError};
use crate::models::{Transaction, TransactionId, UserProfile};

/// Thread-safe in-memory storage.
///
/// This type implements both [`super::Storage`] (async) and
/// [`super::BlockingStorage`] (blocking) traits. State lives as long as
/// the value does.
///
/// # Example
///
/// ```rust
/// use viccoin_rs::storage::InMemoryStorage;
///
/// let storage = InMemoryStorage::new();
/// // Use with the VicCoin or VicCoinBlocking builders:
/// // VicCoinBlocking::builder().storage(storage).build()
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// All state behind a single mutex for thread-safe interior mutability.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Session token in clear text.
    token: Option<String>,
    /// Cached profile.
    profile: Option<UserProfile>,
    /// Customized category lists.
    categories: CategoryLists,
    /// Transactions waiting for the service.
    pending: Vec<Transaction>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R, F: FnOnce(&mut Inner) -> R>(&self, op: F) -> Result<R> {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        Ok(op(&mut inner))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> VicCoinError {
    VicCoinError::Storage(err.to_string().into())
}

/// Builds a fresh secret from the stored clear-text token.
fn secret(token: Option<&String>) -> Option<SecretString> {
    token.map(|raw| SecretString::from(raw.clone()))
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for InMemoryStorage {
    #[inline]
    fn token(&self) -> Result<Option<SecretString>> {
        self.with_lock(|inner| secret(inner.token.as_ref()))
    }

    #[inline]
    fn set_token(&self, token: SecretString) -> Result<()> {
        self.with_lock(|inner| inner.token = Some(token.expose_secret().to_owned()))
    }

    #[inline]
    fn profile(&self) -> Result<Option<UserProfile>> {
        self.with_lock(|inner| inner.profile.clone())
    }

    #[inline]
    fn set_profile(&self, profile: UserProfile) -> Result<()> {
        self.with_lock(|inner| inner.profile = Some(profile))
    }

    #[inline]
    fn clear_session(&self) -> Result<()> {
        self.with_lock(|inner| {
            inner.token = None;
            inner.profile = None;
        })
    }

    #[inline]
    fn category_list(&self, context: CategoryContext) -> Result<Option<Vec<String>>> {
        self.with_lock(|inner| inner.categories.get(context))
    }

    #[inline]
    fn set_category_list(&self, context: CategoryContext, names: Vec<String>) -> Result<()> {
        self.with_lock(|inner| inner.categories.set(context, names))
    }

    #[inline]
    fn pending_transactions(&self) -> Result<Vec<Transaction>> {
        self.with_lock(|inner| inner.pending.clone())
    }

    #[inline]
    fn push_pending(&self, transaction: Transaction) -> Result<()> {
        self.with_lock(|inner| enqueue(&mut inner.pending, transaction))
    }

    #[inline]
    fn remove_pending(&self, ids: &[TransactionId]) -> Result<()> {
        self.with_lock(|inner| dequeue(&mut inner.pending, ids))
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.with_lock(|inner| *inner = Inner::default())
    }
}

// ── Storage (async) implementation ──────────────────────────────────────

#[cfg(feature = "async")]
impl super::Storage for InMemoryStorage {
    #[inline]
    fn token(&self) -> impl Future<Output = Result<Option<SecretString>>> + Send {
        future::ready(self.with_lock(|inner| secret(inner.token.as_ref())))
    }

    #[inline]
    fn set_token(&self, token: SecretString) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| inner.token = Some(token.expose_secret().to_owned())),
        )
    }

    #[inline]
    fn profile(&self) -> impl Future<Output = Result<Option<UserProfile>>> + Send {
        future::ready(self.with_lock(|inner| inner.profile.clone()))
    }

    #[inline]
    fn set_profile(&self, profile: UserProfile) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| inner.profile = Some(profile)))
    }

    #[inline]
    fn clear_session(&self) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| {
            inner.token = None;
            inner.profile = None;
        }))
    }

    #[inline]
    fn category_list(
        &self,
        context: CategoryContext,
    ) -> impl Future<Output = Result<Option<Vec<String>>>> + Send {
        future::ready(self.with_lock(|inner| inner.categories.get(context)))
    }

    #[inline]
    fn set_category_list(
        &self,
        context: CategoryContext,
        names: Vec<String>,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| inner.categories.set(context, names)))
    }

    #[inline]
    fn pending_transactions(&self) -> impl Future<Output = Result<Vec<Transaction>>> + Send {
        future::ready(self.with_lock(|inner| inner.pending.clone()))
    }

    #[inline]
    fn push_pending(&self, transaction: Transaction) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| enqueue(&mut inner.pending, transaction)))
    }

    #[inline]
    fn remove_pending(&self, ids: &[TransactionId]) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| dequeue(&mut inner.pending, ids)))
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| *inner = Inner::default()))
    }
}
