//! Pluggable storage backends for the app's local state.
//!
//! Persisted state is small: the session token, the cached profile of the
//! signed-in user, customized category lists and transactions the service
//! has not acknowledged yet. Nothing derived (reports, aggregates) is ever
//! stored.
//!
//! This module defines the [`Storage`] (async) and [`BlockingStorage`]
//! (blocking) traits via a shared macro, mirroring the client generation
//! pattern in [`crate::client`].

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

use serde::{Deserialize, Serialize};

use crate::category::CategoryContext;
use crate::models::{Transaction, TransactionId};

/// Customized category lists, one optional list per context.
///
/// A missing list means the user never changed that context's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct CategoryLists {
    /// Expense list.
    #[serde(rename = "despesa", default, skip_serializing_if = "Option::is_none")]
    expense: Option<Vec<String>>,
    /// Income list.
    #[serde(rename = "ganho", default, skip_serializing_if = "Option::is_none")]
    income: Option<Vec<String>>,
    /// Salary list.
    #[serde(rename = "salario", default, skip_serializing_if = "Option::is_none")]
    salary: Option<Vec<String>>,
    /// Generic list.
    #[serde(rename = "geral", default, skip_serializing_if = "Option::is_none")]
    generic: Option<Vec<String>>,
}

impl CategoryLists {
    /// Returns the stored list for `context`.
    fn get(&self, context: CategoryContext) -> Option<Vec<String>> {
        match context {
            CategoryContext::Expense => self.expense.clone(),
            CategoryContext::Income => self.income.clone(),
            CategoryContext::Salary => self.salary.clone(),
            CategoryContext::Generic => self.generic.clone(),
        }
    }

    /// Stores the list for `context`.
    fn set(&mut self, context: CategoryContext, names: Vec<String>) {
        let slot = match context {
            CategoryContext::Expense => &mut self.expense,
            CategoryContext::Income => &mut self.income,
            CategoryContext::Salary => &mut self.salary,
            CategoryContext::Generic => &mut self.generic,
        };
        *slot = Some(names);
    }
}

/// Inserts `transaction` into the queue, replacing an entry with the same
/// id in place.
fn enqueue(queue: &mut Vec<Transaction>, transaction: Transaction) {
    match queue.iter_mut().find(|queued| queued.id == transaction.id) {
        Some(existing) => *existing = transaction,
        None => queue.push(transaction),
    }
}

/// Drops queue entries whose id is in `ids`.
fn dequeue(queue: &mut Vec<Transaction>, ids: &[TransactionId]) {
    queue.retain(|queued| !ids.contains(&queued.id));
}

/// Generates a storage trait (async or blocking) with all methods.
///
/// Uses `@methods` to define the method list once, and `@method` to render
/// each method in async (`impl Future + Send`) or blocking (`fn`) style.
macro_rules! define_storage {
    // ── Entry points ────────────────────────────────────────────────
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: async_mode,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods async_mode);
        }
    };
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: blocking,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods blocking);
        }
    };

    // ── Single method list (shared between both variants) ───────────
    (@methods $mode:ident) => {
        // Session
        define_storage!(@method $mode, token,
            "Returns the stored session token.\n\nReturns `Ok(None)` if nobody is signed in.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Option<SecretString>>);
        define_storage!(@method $mode, set_token,
            "Stores the session token.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            token: SecretString, -> Result<()>);
        define_storage!(@method $mode, profile,
            "Returns the cached profile of the signed-in user.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Option<UserProfile>>);
        define_storage!(@method $mode, set_profile,
            "Caches the profile of the signed-in user.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            profile: UserProfile, -> Result<()>);
        define_storage!(@method $mode, clear_session,
            "Forgets the token and the cached profile. Category lists and\npending transactions are kept.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            -> Result<()>);

        // Category lists
        define_storage!(@method $mode, category_list,
            "Returns the customized category list for a context.\n\nReturns `Ok(None)` if the defaults were never changed.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            context: CategoryContext, -> Result<Option<Vec<String>>>);
        define_storage!(@method $mode, set_category_list,
            "Stores the category list for a context.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            context: CategoryContext, names: Vec<String>, -> Result<()>);

        // Pending transactions
        define_storage!(@method $mode, pending_transactions,
            "Returns transactions not yet acknowledged by the service, oldest first.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<Transaction>>);
        define_storage!(@method $mode, push_pending,
            "Queues a transaction for later submission. A queued transaction\nwith the same ID is replaced in place.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            transaction: Transaction, -> Result<()>);
        define_storage!(@method $mode, remove_pending,
            "Drops queued transactions by their IDs.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            ids: &[TransactionId], -> Result<()>);

        // Clear
        define_storage!(@method $mode, clear,
            "Removes all stored state.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            -> Result<()>);
    };

    // ── Blocking method renderer ────────────────────────────────────
    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    // ── Async method renderer (returns impl Future + Send) ──────────
    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_storage {
    //! Async storage trait definition.

    use secrecy::SecretString;

    use crate::category::CategoryContext;
    use crate::error::Result;
    use crate::models::{Transaction, TransactionId, UserProfile};

    define_storage! {
        trait_name: Storage,
        trait_doc: "Async storage backend for the app's local state.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_storage {
    //! Blocking storage trait definition.

    use secrecy::SecretString;

    use crate::category::CategoryContext;
    use crate::error::Result;
    use crate::models::{Transaction, TransactionId, UserProfile};

    define_storage! {
        trait_name: BlockingStorage,
        trait_doc: "Blocking storage backend for the app's local state.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_storage::Storage;
#[cfg(feature = "blocking")]
pub use blocking_storage::BlockingStorage;
