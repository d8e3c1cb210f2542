//! High-level VicCoin client with integrated storage.
//!
//! Combines the low-level HTTP client with a [`Storage`] /
//! [`BlockingStorage`] backend and applies the app's fail-soft rules:
//!
//! * when the summary or the list cannot be fetched, both are replaced by
//!   the example dataset ([`DataSource::Sample`]);
//! * when a new transaction cannot be submitted, it is kept with a local
//!   id and queued until [`VicCoin::reconcile_pending`] succeeds;
//! * refetching after a submit never undoes the local insert.
//!
//! [`Storage`]: crate::storage::Storage
//! [`BlockingStorage`]: crate::storage::BlockingStorage

use crate::clock::Clock;
use crate::models::{
    CategoryRef, FinancialSummary, NaiveDate, Transaction, TransactionId, TransactionKind,
};
use crate::report::sample;

/// Composable filter for transaction lists.
///
/// Use builder-style methods to chain multiple criteria. All conditions
/// are combined; a transaction must satisfy every set criterion to pass.
///
/// # Examples
///
/// ```
/// use viccoin_rs::models::{NaiveDate, TransactionKind};
/// use viccoin_rs::viccoin::TransactionFilter;
///
/// let filter = TransactionFilter::for_display()
///     .date_range(
///         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
///     )
///     .text("mercado");
/// assert!(filter.hide_salary);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Start date (inclusive).
    pub date_from: Option<NaiveDate>,
    /// End date (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Only this kind.
    pub kind: Option<TransactionKind>,
    /// Drop salary entries.
    pub hide_salary: bool,
    /// Raw category reference.
    pub category: Option<CategoryRef>,
    /// Description substring (case-insensitive).
    pub text: Option<String>,
}

impl TransactionFilter {
    /// Creates an empty filter that matches all transactions.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The filter of the main transaction list, which never shows salary
    /// entries.
    #[inline]
    #[must_use]
    pub fn for_display() -> Self {
        Self {
            hide_salary: true,
            ..Self::default()
        }
    }

    /// Restricts to transactions within the given date range (inclusive).
    /// Transactions with unparseable dates never match a date range.
    #[inline]
    #[must_use]
    pub const fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Restricts to one kind.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to one raw category reference.
    #[inline]
    #[must_use]
    pub fn category<C: Into<CategoryRef>>(mut self, category: C) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restricts to descriptions containing `needle`, ignoring case.
    #[inline]
    #[must_use]
    pub fn text<T: Into<String>>(mut self, needle: T) -> Self {
        self.text = Some(needle.into());
        self
    }

    /// Returns `true` if the transaction satisfies all set criteria.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_date(tx)
            && self.kind.is_none_or(|kind| tx.kind == kind)
            && !(self.hide_salary && tx.kind == TransactionKind::Salary)
            && self.category.as_ref().is_none_or(|category| tx.category == *category)
            && self.matches_text(tx)
    }

    /// Keeps the matching transactions, in their original order.
    #[must_use]
    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        transactions.into_iter().filter(|tx| self.matches(tx)).collect()
    }

    /// Checks date range criteria.
    fn matches_date(&self, tx: &Transaction) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        tx.parsed_date().is_some_and(|date| {
            self.date_from.is_none_or(|from| date >= from)
                && self.date_to.is_none_or(|to| date <= to)
        })
    }

    /// Checks description criteria.
    fn matches_text(&self, tx: &Transaction) -> bool {
        self.text.as_ref().is_none_or(|needle| {
            tx.description_or_empty()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        })
    }
}

/// Where a [`Snapshot`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Fetched from the service.
    Remote,
    /// The example dataset, shown because the service was unavailable.
    Sample,
}

/// Summary and transaction list as shown by the app.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Account totals.
    pub summary: FinancialSummary,
    /// Transactions, followed by any queued local ones.
    pub transactions: Vec<Transaction>,
    /// Origin of the data.
    pub source: DataSource,
}

impl Snapshot {
    /// The example dataset dated relative to `clock`.
    #[must_use]
    pub fn sample(clock: &dyn Clock) -> Self {
        Self {
            summary: sample::example_summary(),
            transactions: sample::example_transactions(clock),
            source: DataSource::Sample,
        }
    }

    /// Returns `true` when the service could not be reached.
    #[inline]
    #[must_use]
    pub fn is_sample(&self) -> bool {
        self.source == DataSource::Sample
    }
}

/// A queued transaction the service finally accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// Local id it was queued under.
    pub local_id: TransactionId,
    /// The transaction carrying the service's id.
    pub transaction: Transaction,
}

/// Result of [`VicCoin::reconcile_pending`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Transactions accepted and removed from the queue.
    pub sent: Vec<Reconciled>,
    /// Local ids still queued.
    pub failed: Vec<TransactionId>,
}

impl Reconciliation {
    /// Returns `true` when the queue is now empty.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Message used when a successful login carries no token.
const LOGIN_WITHOUT_TOKEN: &str = "resposta de login sem token";

/// Generates a high-level VicCoin facade (async or blocking).
macro_rules! define_viccoin {
    (
        facade_name: $facade:ident,
        builder_name: $builder:ident,
        http_client: $http_client:ty,
        storage_trait: $storage_trait:ident,
        facade_doc: $facade_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder<S: $storage_trait> {
            /// API token. When absent, the stored one can be restored.
            token: Option<String>,
            /// Base URL override (for testing).
            base_url: Option<String>,
            /// Storage backend.
            storage: Option<S>,
            /// Source of today's date.
            clock: Option<Box<dyn Clock>>,
        }

        impl<S: $storage_trait> $builder<S> {
            /// Sets the access token for API authentication.
            #[inline]
            #[must_use]
            pub fn token<T: Into<String>>(mut self, token: T) -> Self {
                self.token = Some(token.into());
                self
            }

            /// Overrides the base URL (useful for testing with a mock server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Sets the storage backend.
            #[inline]
            #[must_use]
            pub fn storage(mut self, storage: S) -> Self {
                self.storage = Some(storage);
                self
            }

            /// Sets the clock. Defaults to [`SystemClock`].
            #[inline]
            #[must_use]
            pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
                self.clock = Some(Box::new(clock));
                self
            }

            /// Builds the facade.
            ///
            /// # Errors
            ///
            /// Returns [`VicCoinError::Storage`] if no storage was provided.
            /// Returns [`VicCoinError::Http`] if the HTTP client fails to build.
            #[inline]
            pub fn build(self) -> Result<$facade<S>> {
                let storage = self.storage.ok_or_else(|| {
                    VicCoinError::Storage("storage backend is required".into())
                })?;

                let mut http_builder = <$http_client>::builder();
                if let Some(token) = self.token {
                    http_builder = http_builder.token(token);
                }
                if let Some(url) = self.base_url {
                    http_builder = http_builder.base_url(url);
                }
                let client = http_builder.build()?;
                let clock: Box<dyn Clock> = match self.clock {
                    Some(custom) => custom,
                    None => Box::new(SystemClock),
                };

                Ok($facade {
                    client,
                    storage,
                    clock,
                })
            }
        }

        #[doc = $facade_doc]
        #[derive(Debug)]
        pub struct $facade<S: $storage_trait> {
            /// Low-level HTTP client.
            client: $http_client,
            /// Storage backend.
            storage: S,
            /// Source of today's date.
            clock: Box<dyn Clock>,
        }

        impl<S: $storage_trait> $facade<S> {
            /// Creates a new builder for configuring the facade.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder<S> {
                $builder {
                    token: None,
                    base_url: None,
                    storage: None,
                    clock: None,
                }
            }

            // ── Session ──────────────────────────────────────────────

            /// Loads the stored token into the client unless one is
            /// already set. Returns whether a token is now available.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn restore_session(&mut self) -> Result<bool> {
                if self.client.has_token() {
                    return Ok(true);
                }
                match self.storage.token() $( .$await_ext )? ? {
                    Some(token) => {
                        self.client.set_token(token);
                        tracing::debug!("session restored from storage");
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }

            /// Signs in, storing the token and the profile.
            ///
            /// # Errors
            ///
            /// Returns an error if the credentials are refused, the
            /// response carries no token, or storage fails to write.
            #[tracing::instrument(skip_all, fields(email = %email))]
            pub $($async_kw)? fn login(
                &mut self,
                email: &str,
                password: SecretString,
            ) -> Result<LoginResponse> {
                let credentials = LoginRequest {
                    email: email.to_owned(),
                    password,
                };
                let response = self.client.login(&credentials) $( .$await_ext )? ?;
                let token = response.token.clone().ok_or_else(|| VicCoinError::Rejected {
                    message: LOGIN_WITHOUT_TOKEN.to_owned(),
                })?;
                self.storage
                    .set_token(SecretString::from(token.clone()))
                    $( .$await_ext )? ?;
                if let Some(profile) = response.user.clone() {
                    self.storage.set_profile(profile) $( .$await_ext )? ?;
                }
                self.client.set_token(SecretString::from(token));
                tracing::info!("signed in");
                Ok(response)
            }

            /// Creates an account. The service does not sign the new user
            /// in; call [`Self::login`] afterwards.
            ///
            /// # Errors
            ///
            /// Returns an error if the service refuses the data (e.g. the
            /// e-mail is taken) or cannot be reached.
            #[tracing::instrument(skip_all, fields(email = %email))]
            pub $($async_kw)? fn register(
                &self,
                name: &str,
                email: &str,
                password: SecretString,
            ) -> Result<UserResponse> {
                let account = RegisterRequest {
                    name: name.to_owned(),
                    email: email.to_owned(),
                    password,
                };
                let response = self.client.register(&account) $( .$await_ext )? ?;
                tracing::info!("account created");
                Ok(response)
            }

            /// Fetches the profile from the service and caches it.
            ///
            /// # Errors
            ///
            /// Returns an error if nobody is signed in, the request fails,
            /// or storage fails to write.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn refresh_profile(&self) -> Result<UserProfile> {
                let profile = self.client.profile() $( .$await_ext )? ?;
                self.storage.set_profile(profile.clone()) $( .$await_ext )? ?;
                tracing::debug!(uid = %profile.uid, "profile cached");
                Ok(profile)
            }

            /// Forgets the token and the cached profile.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to write.
            pub $($async_kw)? fn logout(&mut self) -> Result<()> {
                self.storage.clear_session() $( .$await_ext )? ?;
                self.client.clear_token();
                tracing::info!("signed out");
                Ok(())
            }

            /// Returns the cached profile of the signed-in user.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn profile(&self) -> Result<Option<UserProfile>> {
                self.storage.profile() $( .$await_ext )?
            }

            // ── Data ─────────────────────────────────────────────────

            /// Fetches the summary and then the list. When either request
            /// fails, both are replaced by the example dataset. Queued local
            /// transactions are appended in both cases.
            ///
            /// # Errors
            ///
            /// Only storage failures are reported; service failures are
            /// logged and recovered.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn snapshot(&self) -> Result<Snapshot> {
                let pending = self.storage.pending_transactions() $( .$await_ext )? ?;
                let mut snapshot = match self.fetch_remote() $( .$await_ext )? {
                    Ok(remote) => remote,
                    Err(err) => {
                        tracing::warn!(error = %err, "service unavailable, using example data");
                        Snapshot::sample(self.clock.as_ref())
                    }
                };
                tracing::debug!(
                    fetched = snapshot.transactions.len(),
                    pending = pending.len(),
                    sample = snapshot.is_sample(),
                    "snapshot ready"
                );
                snapshot.transactions.extend(pending);
                Ok(snapshot)
            }

            /// Returns the snapshot's transactions matching `filter`.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn transactions(
                &self,
                filter: &TransactionFilter,
            ) -> Result<Vec<Transaction>> {
                let snapshot = self.snapshot() $( .$await_ext )? ?;
                Ok(filter.apply(snapshot.transactions))
            }

            /// Builds the report for `period` from a fresh snapshot, using
            /// the stored category lists and the service's month
            /// comparison.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[tracing::instrument(skip_all, fields(period = %period))]
            pub $($async_kw)? fn report(&self, period: Period) -> Result<Report> {
                let snapshot = self.snapshot() $( .$await_ext )? ?;
                let options = ReportOptions {
                    tables: self.category_tables() $( .$await_ext )? ?,
                    comparison: snapshot.summary.comparison.clone(),
                };
                Ok(Report::build_with(
                    &snapshot.transactions,
                    period,
                    self.clock.as_ref(),
                    &options,
                ))
            }

            /// Fetches the report the service computes for `query`.
            /// Unlike [`Self::report`], this does not fall back to the
            /// example dataset.
            ///
            /// # Errors
            ///
            /// Returns an error if nobody is signed in, the request fails or
            /// the service rejects the query.
            #[inline]
            pub $($async_kw)? fn period_report(&self, query: &ReportQuery) -> Result<PeriodReport> {
                self.client.period_report(query) $( .$await_ext )?
            }

            // ── Categories ───────────────────────────────────────────

            /// Returns the category tables with stored customizations
            /// applied.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn category_tables(&self) -> Result<CategoryTables> {
                let mut tables = CategoryTables::default();
                for context in CategoryContext::ALL {
                    if let Some(names) = self.storage.category_list(context) $( .$await_ext )? ? {
                        tables.set_names(context, names);
                    }
                }
                Ok(tables)
            }

            /// Appends a category to `context` and stores the new list.
            ///
            /// # Errors
            ///
            /// Returns [`VicCoinError::Category`] if the name already
            /// exists, or a storage error.
            #[tracing::instrument(skip_all, fields(context = %context, name = %name))]
            pub $($async_kw)? fn add_category(
                &self,
                context: CategoryContext,
                name: &str,
            ) -> Result<Vec<String>> {
                let mut tables = self.category_tables() $( .$await_ext )? ?;
                tables.add(context, name)?;
                let names = tables.names(context).to_vec();
                self.storage
                    .set_category_list(context, names.clone())
                    $( .$await_ext )? ?;
                Ok(names)
            }

            // ── Writing ──────────────────────────────────────────────

            /// Starts a wizard for `kind`, dated by this facade's clock.
            #[inline]
            #[must_use]
            pub fn wizard(&self, kind: TransactionKind) -> TransactionWizard {
                TransactionWizard::new(kind, self.clock.as_ref())
            }

            /// Submits a finalized record.
            ///
            /// On failure the record is kept under a local id, queued and
            /// returned with `queued == true`. A record the service accepts
            /// without reporting an id keeps a local id and is neither
            /// persisted nor queued; it reappears with its service id on the
            /// next snapshot.
            ///
            /// # Errors
            ///
            /// Only storage failures are reported.
            #[tracing::instrument(skip_all, fields(kind = %record.kind))]
            pub $($async_kw)? fn submit(&self, record: NewTransaction) -> Result<SubmittedTransaction> {
                match self.client.create_transaction(&record) $( .$await_ext )? {
                    Ok(response) => match response.assigned_id().cloned() {
                        Some(id) => {
                            tracing::info!(%id, "transaction saved");
                            Ok(SubmittedTransaction {
                                transaction: record.into_transaction(id),
                                persisted: true,
                                queued: false,
                            })
                        }
                        None => {
                            tracing::warn!("transaction accepted without an id");
                            Ok(SubmittedTransaction {
                                transaction: record.into_transaction(TransactionId::local()),
                                persisted: false,
                                queued: false,
                            })
                        }
                    },
                    Err(err) => {
                        let transaction = record.into_transaction(TransactionId::local());
                        tracing::warn!(
                            error = %err,
                            id = %transaction.id,
                            "submit failed, transaction queued"
                        );
                        self.storage
                            .push_pending(transaction.clone())
                            $( .$await_ext )? ?;
                        Ok(SubmittedTransaction {
                            transaction,
                            persisted: false,
                            queued: true,
                        })
                    }
                }
            }

            /// Submits a record and then refetches the snapshot. The
            /// refetch is best effort and never undoes the insert.
            ///
            /// # Errors
            ///
            /// Only storage failures are reported.
            pub $($async_kw)? fn submit_and_refresh(
                &self,
                record: NewTransaction,
            ) -> Result<(SubmittedTransaction, Snapshot)> {
                let submitted = self.submit(record) $( .$await_ext )? ?;
                let snapshot = self.snapshot() $( .$await_ext )? ?;
                Ok((submitted, snapshot))
            }

            /// Replaces an existing transaction on the service.
            ///
            /// # Errors
            ///
            /// Returns [`VicCoinError::LocalTransaction`] without sending
            /// anything when `id` is a local id, or an error if the request
            /// fails or is rejected.
            #[inline]
            pub $($async_kw)? fn update_transaction(
                &self,
                id: &TransactionId,
                record: &NewTransaction,
            ) -> Result<SubmitResponse> {
                if id.is_local() {
                    return Err(VicCoinError::LocalTransaction { id: id.clone() });
                }
                self.client.update_transaction(id, record) $( .$await_ext )?
            }

            // ── Pending queue ────────────────────────────────────────

            /// Returns the queued local transactions.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn pending_transactions(&self) -> Result<Vec<Transaction>> {
                self.storage.pending_transactions() $( .$await_ext )?
            }

            /// Resubmits every queued transaction, oldest first. Each
            /// accepted one leaves the queue right after its acknowledgement;
            /// the others stay for the next attempt.
            ///
            /// # Errors
            ///
            /// Only storage failures are reported. Entries dequeued before
            /// the failure stay dequeued.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn reconcile_pending(&self) -> Result<Reconciliation> {
                let queued = self.storage.pending_transactions() $( .$await_ext )? ?;
                let mut outcome = Reconciliation::default();
                for local in queued {
                    let record = NewTransaction::from_transaction(&local);
                    match self.client.create_transaction(&record) $( .$await_ext )? {
                        Ok(response) => {
                            self.storage
                                .remove_pending(core::slice::from_ref(&local.id))
                                $( .$await_ext )? ?;
                            let id = response
                                .assigned_id()
                                .cloned()
                                .unwrap_or_else(|| local.id.clone());
                            outcome.sent.push(Reconciled {
                                transaction: record.into_transaction(id),
                                local_id: local.id,
                            });
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, id = %local.id, "still not accepted");
                            outcome.failed.push(local.id);
                        }
                    }
                }
                tracing::info!(
                    sent = outcome.sent.len(),
                    failed = outcome.failed.len(),
                    "pending queue reconciled"
                );
                Ok(outcome)
            }

            /// Drops queued transactions without sending them.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to write.
            #[inline]
            pub $($async_kw)? fn discard_pending(&self, ids: &[TransactionId]) -> Result<()> {
                self.storage.remove_pending(ids) $( .$await_ext )?
            }

            // ── Accessors ────────────────────────────────────────────

            /// Returns a reference to the underlying HTTP client.
            #[inline]
            #[must_use]
            pub const fn inner_client(&self) -> &$http_client {
                &self.client
            }

            /// Returns a reference to the storage backend.
            #[inline]
            #[must_use]
            pub const fn storage(&self) -> &S {
                &self.storage
            }

            /// Returns the clock.
            #[inline]
            #[must_use]
            pub fn clock(&self) -> &dyn Clock {
                self.clock.as_ref()
            }

            /// Fetches the summary and then the full list.
            $($async_kw)? fn fetch_remote(&self) -> Result<Snapshot> {
                let summary = self.client.summary() $( .$await_ext )? ?;
                let list = self
                    .client
                    .list_transactions(&ListQuery::new())
                    $( .$await_ext )? ?;
                Ok(Snapshot {
                    summary,
                    transactions: list.transactions,
                    source: DataSource::Remote,
                })
            }
        }
    };
}

// ── Async variant ───────────────────────────────────────────────────────

#[cfg(feature = "async")]
mod async_viccoin {
    //! Async high-level facade.

    use secrecy::SecretString;

    use super::{
        DataSource, LOGIN_WITHOUT_TOKEN, Reconciled, Reconciliation, Snapshot, TransactionFilter,
    };
    use crate::category::{CategoryContext, CategoryTables};
    use crate::client::{ListQuery, ReportQuery, VicCoinClient};
    use crate::clock::{Clock, SystemClock};
    use crate::error::{Result, VicCoinError};
    use crate::models::{
        LoginRequest, LoginResponse, NewTransaction, PeriodReport, RegisterRequest,
        SubmitResponse, SubmittedTransaction, Transaction, TransactionId, TransactionKind,
        UserProfile, UserResponse,
    };
    use crate::report::{Period, Report, ReportOptions};
    use crate::storage::Storage;
    use crate::wizard::TransactionWizard;

    define_viccoin! {
        facade_name: VicCoin,
        builder_name: VicCoinBuilder,
        http_client: VicCoinClient,
        storage_trait: Storage,
        facade_doc: "High-level async VicCoin client with integrated storage.\n\nUse [`VicCoin::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`VicCoin`] facade.",
        async_kw: async,
        await_kw: await,
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
mod blocking_viccoin {
    //! Blocking high-level facade.

    use secrecy::SecretString;

    use super::{
        DataSource, LOGIN_WITHOUT_TOKEN, Reconciled, Reconciliation, Snapshot, TransactionFilter,
    };
    use crate::category::{CategoryContext, CategoryTables};
    use crate::client::{ListQuery, ReportQuery, VicCoinBlockingClient};
    use crate::clock::{Clock, SystemClock};
    use crate::error::{Result, VicCoinError};
    use crate::models::{
        LoginRequest, LoginResponse, NewTransaction, PeriodReport, RegisterRequest,
        SubmitResponse, SubmittedTransaction, Transaction, TransactionId, TransactionKind,
        UserProfile, UserResponse,
    };
    use crate::report::{Period, Report, ReportOptions};
    use crate::storage::BlockingStorage;
    use crate::wizard::TransactionWizard;

    define_viccoin! {
        facade_name: VicCoinBlocking,
        builder_name: VicCoinBlockingBuilder,
        http_client: VicCoinBlockingClient,
        storage_trait: BlockingStorage,
        facade_doc: "High-level blocking VicCoin client with integrated storage.\n\nUse [`VicCoinBlocking::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`VicCoinBlocking`] facade.",
    }
}

#[cfg(feature = "async")]
pub use async_viccoin::{VicCoin, VicCoinBuilder};
#[cfg(feature = "blocking")]
pub use blocking_viccoin::{VicCoinBlocking, VicCoinBlockingBuilder};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 30).unwrap()
    }

    fn tx(id: &str, kind: TransactionKind, description: &str, day: u32) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        Transaction::new(id, kind, 10.0, "Lazer", date).with_description(description)
    }

    fn mixed() -> Vec<Transaction> {
        vec![
            tx("1", TransactionKind::Expense, "Supermercado", 2),
            tx("2", TransactionKind::Income, "Freela", 10),
            tx("3", TransactionKind::Salary, "Salário mensal", 5),
            tx("4", TransactionKind::Expense, "Mercado da esquina", 20),
        ]
    }

    fn ids(list: &[Transaction]) -> Vec<&str> {
        list.iter().map(|t| t.id.as_inner()).collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert_eq!(TransactionFilter::new().apply(mixed()).len(), 4);
    }

    #[test]
    fn display_filter_hides_salary() {
        let shown = TransactionFilter::for_display().apply(mixed());
        assert_eq!(ids(&shown), vec!["1", "2", "4"]);
    }

    #[test]
    fn filter_by_date_range() {
        let filter = TransactionFilter::new().date_range(
            NaiveDate::from_ymd_opt(2024, 5, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
        );
        assert_eq!(ids(&filter.apply(mixed())), vec!["2", "3"]);
    }

    #[test]
    fn unparseable_date_never_matches_a_range() {
        let mut broken = tx("x", TransactionKind::Expense, "?", 1);
        broken.date = "ontem".to_owned();
        let filter = TransactionFilter::new().date_range(today(), today());
        assert!(!filter.matches(&broken));
        assert!(TransactionFilter::new().matches(&broken));
    }

    #[test]
    fn filter_by_text_and_kind() {
        let filter = TransactionFilter::new()
            .kind(TransactionKind::Expense)
            .text("MERCADO");
        assert_eq!(ids(&filter.apply(mixed())), vec!["1", "4"]);
    }

    #[test]
    fn filter_by_category() {
        let mut other = tx("5", TransactionKind::Expense, "Uber", 3);
        other.category = CategoryRef::Index(2);
        let mut all = mixed();
        all.push(other);
        let filter = TransactionFilter::new().category(CategoryRef::Index(2));
        assert_eq!(ids(&filter.apply(all)), vec!["5"]);
    }

    #[test]
    fn sample_snapshot() {
        let snapshot = Snapshot::sample(&FixedClock::new(today()));
        assert!(snapshot.is_sample());
        assert_eq!(snapshot.transactions.len(), 12);
        assert!((snapshot.summary.balance - 2000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reconciliation_completeness() {
        let mut outcome = Reconciliation::default();
        assert!(outcome.is_complete());
        outcome.failed.push(TransactionId::local());
        assert!(!outcome.is_complete());
    }

    #[cfg(feature = "blocking")]
    mod blocking {
        use secrecy::SecretString;

        use super::*;
        use crate::category::CategoryContext;
        use crate::error::VicCoinError;
        use crate::models::NewTransaction;
        use crate::report::Period;
        use crate::storage::{BlockingStorage, InMemoryStorage};

        /// Nothing listens on the discard port, so every request fails fast.
        const UNREACHABLE: &str = "http://127.0.0.1:9";

        fn offline() -> VicCoinBlocking<InMemoryStorage> {
            VicCoinBlocking::builder()
                .token("tok")
                .base_url(UNREACHABLE)
                .storage(InMemoryStorage::new())
                .clock(FixedClock::new(today()))
                .build()
                .unwrap()
        }

        fn record() -> NewTransaction {
            NewTransaction {
                amount: 25.0,
                description: "Pizza".to_owned(),
                category: CategoryRef::from("Alimentação"),
                date: "2024-05-30".to_owned(),
                kind: TransactionKind::Expense,
                recurring: false,
            }
        }

        #[test]
        fn build_requires_storage() {
            let result = VicCoinBlocking::<InMemoryStorage>::builder().build();
            assert!(result.is_err());
        }

        #[test]
        fn offline_snapshot_uses_sample_data() {
            let snapshot = offline().snapshot().unwrap();
            assert_eq!(snapshot.source, DataSource::Sample);
            assert_eq!(snapshot.transactions.len(), 12);
        }

        #[test]
        fn offline_submit_is_queued_and_shown() {
            let facade = offline();
            let submitted = facade.submit(record()).unwrap();
            assert!(!submitted.persisted);
            assert!(submitted.queued);
            assert!(submitted.transaction.id.is_local());
            assert_eq!(facade.pending_transactions().unwrap().len(), 1);

            let (_, snapshot) = facade.submit_and_refresh(record()).unwrap();
            assert_eq!(snapshot.transactions.len(), 14);
            assert_eq!(facade.storage().pending_transactions().unwrap().len(), 2);
        }

        #[test]
        fn offline_reconcile_keeps_queue() {
            let facade = offline();
            let _submitted = facade.submit(record()).unwrap();
            let outcome = facade.reconcile_pending().unwrap();
            assert!(outcome.sent.is_empty());
            assert_eq!(outcome.failed.len(), 1);
            assert_eq!(facade.pending_transactions().unwrap().len(), 1);
        }

        #[test]
        fn discard_pending_empties_queue() {
            let facade = offline();
            let submitted = facade.submit(record()).unwrap();
            facade.discard_pending(&[submitted.transaction.id]).unwrap();
            assert!(facade.pending_transactions().unwrap().is_empty());
        }

        #[test]
        fn update_refuses_local_ids() {
            let facade = offline();
            let submitted = facade.submit(record()).unwrap();
            let err = facade
                .update_transaction(&submitted.transaction.id, &record())
                .unwrap_err();
            assert!(matches!(err, VicCoinError::LocalTransaction { .. }));
        }

        #[test]
        fn offline_report_uses_sample_data() {
            let report = offline().report(Period::Month).unwrap();
            assert_eq!(report.chart.labels.len(), 6);
            assert_eq!(report.categories.first().unwrap().display_name, "Moradia");
        }

        #[test]
        fn add_category_persists_and_rejects_duplicates() {
            let facade = offline();
            let names = facade
                .add_category(CategoryContext::Expense, "Pets")
                .unwrap();
            assert_eq!(names.last().map(String::as_str), Some("Pets"));
            assert_eq!(
                facade.storage().category_list(CategoryContext::Expense).unwrap(),
                Some(names)
            );

            let err = facade
                .add_category(CategoryContext::Expense, "pets")
                .unwrap_err();
            assert!(matches!(err, VicCoinError::Category(_)));
        }

        #[test]
        fn restore_session_reads_stored_token() {
            let storage = InMemoryStorage::new();
            storage.set_token(SecretString::from("stored".to_owned())).unwrap();
            let mut facade = VicCoinBlocking::builder()
                .base_url(UNREACHABLE)
                .storage(storage)
                .build()
                .unwrap();
            assert!(!facade.inner_client().has_token());
            assert!(facade.restore_session().unwrap());
            assert!(facade.inner_client().has_token());
        }

        #[test]
        fn wizard_uses_facade_clock() {
            let wizard = offline().wizard(TransactionKind::Income);
            assert_eq!(wizard.date(), today());
        }
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use core::future::Future;

        use secrecy::SecretString;
        use serde_json::json;
        use wiremock::matchers::{body_partial_json, header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use super::*;
        use crate::category::CategoryContext;
        use crate::client::ReportQuery;
        use crate::error::{Result, VicCoinError};
        use crate::models::{NewTransaction, ReportInterval, UserProfile};
        use crate::report::Period;
        use crate::storage::{InMemoryStorage, Storage};

        /// In-memory storage that cannot drop one queued id.
        #[derive(Debug)]
        struct StuckQueue {
            inner: InMemoryStorage,
            stuck: TransactionId,
        }

        impl Storage for StuckQueue {
            fn token(&self) -> impl Future<Output = Result<Option<SecretString>>> + Send {
                self.inner.token()
            }

            fn set_token(&self, token: SecretString) -> impl Future<Output = Result<()>> + Send {
                self.inner.set_token(token)
            }

            fn profile(&self) -> impl Future<Output = Result<Option<UserProfile>>> + Send {
                self.inner.profile()
            }

            fn set_profile(&self, profile: UserProfile) -> impl Future<Output = Result<()>> + Send {
                self.inner.set_profile(profile)
            }

            fn clear_session(&self) -> impl Future<Output = Result<()>> + Send {
                self.inner.clear_session()
            }

            fn category_list(
                &self,
                context: CategoryContext,
            ) -> impl Future<Output = Result<Option<Vec<String>>>> + Send {
                self.inner.category_list(context)
            }

            fn set_category_list(
                &self,
                context: CategoryContext,
                names: Vec<String>,
            ) -> impl Future<Output = Result<()>> + Send {
                self.inner.set_category_list(context, names)
            }

            fn pending_transactions(&self) -> impl Future<Output = Result<Vec<Transaction>>> + Send {
                self.inner.pending_transactions()
            }

            fn push_pending(&self, transaction: Transaction) -> impl Future<Output = Result<()>> + Send {
                self.inner.push_pending(transaction)
            }

            fn remove_pending(&self, ids: &[TransactionId]) -> impl Future<Output = Result<()>> + Send {
                let refused = ids.contains(&self.stuck);
                let removal = self.inner.remove_pending(ids);
                async move {
                    if refused {
                        Err(VicCoinError::Storage("disk full".into()))
                    } else {
                        removal.await
                    }
                }
            }

            fn clear(&self) -> impl Future<Output = Result<()>> + Send {
                self.inner.clear()
            }
        }

        fn facade(server: &MockServer) -> VicCoin<InMemoryStorage> {
            VicCoin::builder()
                .token("tok")
                .base_url(server.uri())
                .storage(InMemoryStorage::new())
                .clock(FixedClock::new(today()))
                .build()
                .unwrap()
        }

        fn record() -> NewTransaction {
            NewTransaction {
                amount: 80.0,
                description: "Farmácia".to_owned(),
                category: CategoryRef::from("Saúde"),
                date: "2024-05-29".to_owned(),
                kind: TransactionKind::Expense,
                recurring: false,
            }
        }

        async fn mount_data(server: &MockServer) {
            Mock::given(method("GET"))
                .and(path("/transacoes/resumo/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "success": true, "totalDespesas": 150, "totalGanhos": 1000, "saldo": 850,
                    "comparativo_mes_anterior": {"percentual_variacao": 12, "direcao": "aumento"}
                })))
                .mount(server)
                .await;
            Mock::given(method("GET"))
                .and(path("/transacoes/listar/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "success": true,
                    "transacoes": [
                        {"id": "a", "tipo": "despesa", "valor": 150, "categoria": 1, "data": "2024-05-20"},
                        {"id": "b", "tipo": "ganho", "valor": 1000, "categoria": "Freelance", "data": "2024-05-21"}
                    ]
                })))
                .mount(server)
                .await;
        }

        #[tokio::test]
        async fn remote_snapshot_appends_pending() {
            let server = MockServer::start().await;
            mount_data(&server).await;
            let viccoin = facade(&server);
            let queued = record().into_transaction(TransactionId::local());
            viccoin.storage().push_pending(queued).await.unwrap();

            let snapshot = viccoin.snapshot().await.unwrap();
            assert_eq!(snapshot.source, DataSource::Remote);
            assert_eq!(snapshot.transactions.len(), 3);
            assert!(snapshot.transactions[2].id.is_local());
        }

        #[tokio::test]
        async fn failed_list_replaces_both_with_sample() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/transacoes/resumo/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"saldo": 1})))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/transacoes/listar/"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server)
                .await;

            let snapshot = facade(&server).snapshot().await.unwrap();
            assert!(snapshot.is_sample());
            assert!((snapshot.summary.balance - 2000.0).abs() < f64::EPSILON);
        }

        #[tokio::test]
        async fn report_uses_stored_categories_and_comparison() {
            let server = MockServer::start().await;
            mount_data(&server).await;
            let viccoin = facade(&server);
            viccoin
                .storage()
                .set_category_list(CategoryContext::Expense, vec!["Mercado".to_owned()])
                .await
                .unwrap();

            let report = viccoin.report(Period::Month).await.unwrap();
            assert_eq!(report.categories[0].display_name, "Mercado");
            assert!(report.insights.iter().any(|i| i.id == "spending-trend"));
        }

        #[tokio::test]
        async fn submit_uses_server_id() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/transacoes/despesa/"))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                    "success": true, "data": {"despesa_id": "srv-1"}
                })))
                .mount(&server)
                .await;

            let viccoin = facade(&server);
            let submitted = viccoin.submit(record()).await.unwrap();
            assert!(submitted.persisted);
            assert!(!submitted.queued);
            assert_eq!(submitted.transaction.id.as_inner(), "srv-1");
            assert!(viccoin.pending_transactions().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn submit_accepted_without_id_is_not_persisted() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/transacoes/despesa/"))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
                .expect(1)
                .mount(&server)
                .await;

            let viccoin = facade(&server);
            let submitted = viccoin.submit(record()).await.unwrap();
            assert!(!submitted.persisted);
            assert!(!submitted.queued);
            assert!(submitted.transaction.id.is_local());
            assert!(viccoin.pending_transactions().await.unwrap().is_empty());

            let err = viccoin
                .update_transaction(&submitted.transaction.id, &record())
                .await
                .unwrap_err();
            assert!(matches!(err, VicCoinError::LocalTransaction { .. }));
        }

        #[tokio::test]
        async fn salary_submit_sends_receipt_date() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/transacoes/salario/"))
                .and(body_partial_json(json!({"data_recebimento": "2024-05-05"})))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                    "success": true, "salario_id": "s-1"
                })))
                .expect(1)
                .mount(&server)
                .await;

            let salary = NewTransaction {
                kind: TransactionKind::Salary,
                date: "2024-05-05".to_owned(),
                ..record()
            };
            let submitted = facade(&server).submit(salary).await.unwrap();
            assert!(submitted.persisted);
            assert_eq!(submitted.transaction.date, "2024-05-05");
        }

        #[tokio::test]
        async fn rejected_submit_is_queued() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/transacoes/despesa/"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;

            let viccoin = facade(&server);
            let submitted = viccoin.submit(record()).await.unwrap();
            assert!(!submitted.persisted);
            let queue = viccoin.pending_transactions().await.unwrap();
            assert_eq!(queue.len(), 1);
            assert_eq!(queue[0].id, submitted.transaction.id);
        }

        #[tokio::test]
        async fn reconcile_sends_queue() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/transacoes/despesa/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "success": true, "despesa_id": "srv-9"
                })))
                .expect(2)
                .mount(&server)
                .await;

            let viccoin = facade(&server);
            for _ in 0..2 {
                let queued = record().into_transaction(TransactionId::local());
                viccoin.storage().push_pending(queued).await.unwrap();
            }
            let outcome = viccoin.reconcile_pending().await.unwrap();
            assert!(outcome.is_complete());
            assert_eq!(outcome.sent.len(), 2);
            assert_eq!(outcome.sent[0].transaction.id.as_inner(), "srv-9");
            assert!(outcome.sent[0].local_id.is_local());
            assert!(viccoin.pending_transactions().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn reconcile_dequeues_each_acknowledged_item() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/transacoes/despesa/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "success": true, "despesa_id": "srv-3"
                })))
                .expect(2)
                .mount(&server)
                .await;

            let first = record().into_transaction(TransactionId::local());
            let second = record().into_transaction(TransactionId::local());
            let storage = StuckQueue {
                inner: InMemoryStorage::new(),
                stuck: second.id.clone(),
            };
            storage.push_pending(first).await.unwrap();
            storage.push_pending(second.clone()).await.unwrap();
            let viccoin = VicCoin::builder()
                .token("tok")
                .base_url(server.uri())
                .storage(storage)
                .build()
                .unwrap();

            let err = viccoin.reconcile_pending().await.unwrap_err();
            assert!(matches!(err, VicCoinError::Storage(_)));
            let queue = viccoin.pending_transactions().await.unwrap();
            assert_eq!(queue.len(), 1);
            assert_eq!(queue[0].id, second.id);
        }

        #[tokio::test]
        async fn register_does_not_sign_in() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/users/register/"))
                .and(body_partial_json(json!({"nome": "Vic", "email": "vic@example.com"})))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                    "success": true,
                    "message": "Usuário registrado com sucesso",
                    "user": {"uid": "u-8", "nome": "Vic", "email": "vic@example.com"}
                })))
                .expect(1)
                .mount(&server)
                .await;

            let viccoin = VicCoin::builder()
                .base_url(server.uri())
                .storage(InMemoryStorage::new())
                .build()
                .unwrap();
            let response = viccoin
                .register("Vic", "vic@example.com", SecretString::from("pw".to_owned()))
                .await
                .unwrap();
            assert_eq!(response.user.unwrap().uid.as_inner(), "u-8");
            assert!(!viccoin.inner_client().has_token());
            assert!(viccoin.storage().token().await.unwrap().is_none());
        }

        #[tokio::test]
        async fn refresh_profile_caches_it() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/users/perfil/"))
                .and(header("authorization", "Bearer tok"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "success": true,
                    "user": {"uid": "u-2", "nome": "Ana", "email": "ana@example.com"}
                })))
                .expect(1)
                .mount(&server)
                .await;

            let viccoin = facade(&server);
            let profile = viccoin.refresh_profile().await.unwrap();
            assert_eq!(profile.name, "Ana");
            assert_eq!(viccoin.profile().await.unwrap(), Some(profile));
        }

        #[tokio::test]
        async fn period_report_comes_from_service() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/transacoes/relatorio/"))
                .and(query_param("periodo", "anual"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "success": true,
                    "relatorio": {"total_despesas": 10, "total_ganhos": 30, "saldo_periodo": 20}
                })))
                .expect(1)
                .mount(&server)
                .await;

            let query = ReportQuery::new().interval(ReportInterval::Yearly);
            let report = facade(&server).period_report(&query).await.unwrap();
            assert!((report.balance - 20.0).abs() < f64::EPSILON);
        }

        #[tokio::test]
        async fn login_stores_session_and_authorizes_requests() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/users/login/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "success": true,
                    "token": "jwt-7",
                    "user": {"uid": "u-7", "nome": "Vic", "email": "vic@example.com"}
                })))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/transacoes/resumo/"))
                .and(header("authorization", "Bearer jwt-7"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"saldo": 5})))
                .expect(1)
                .mount(&server)
                .await;

            let mut viccoin = VicCoin::builder()
                .base_url(server.uri())
                .storage(InMemoryStorage::new())
                .build()
                .unwrap();
            let _response = viccoin
                .login("vic@example.com", SecretString::from("pw".to_owned()))
                .await
                .unwrap();
            let profile = viccoin.profile().await.unwrap().unwrap();
            assert_eq!(profile.name, "Vic");
            assert!(viccoin.storage().token().await.unwrap().is_some());

            let summary = viccoin.inner_client().summary().await.unwrap();
            assert!((summary.balance - 5.0).abs() < f64::EPSILON);

            viccoin.logout().await.unwrap();
            assert!(!viccoin.inner_client().has_token());
            assert!(viccoin.profile().await.unwrap().is_none());
        }

        #[tokio::test]
        async fn login_without_token_is_rejected() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/users/login/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
                .mount(&server)
                .await;

            let mut viccoin = facade(&server);
            let err = viccoin
                .login("a@b.c", SecretString::from("pw".to_owned()))
                .await
                .unwrap_err();
            assert!(matches!(err, VicCoinError::Rejected { .. }));
        }
    }
}
