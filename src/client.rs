//! HTTP client for the VicCoin API.
//!
//! Provides both async and blocking client variants behind feature flags.
//! Every response is checked twice: a non-2xx status becomes
//! [`VicCoinError::Api`](crate::error::VicCoinError::Api) and a `200 OK`
//! body carrying `"success": false` becomes
//! [`VicCoinError::Rejected`](crate::error::VicCoinError::Rejected).

use crate::format::format_date_for_api;
use crate::models::{
    FinancialSummary, LoginResponse, NaiveDate, PeriodReportResponse, ReportInterval,
    SubmitResponse, TransactionId, TransactionKind, TransactionList, UserResponse,
};

/// Base URL for the VicCoin API.
const DEFAULT_BASE_URL: &str = "https://viccoin.onrender.com/api";

/// Financial summary endpoint path.
const SUMMARY_PATH: &str = "/transacoes/resumo/";

/// Transaction list endpoint path.
const LIST_PATH: &str = "/transacoes/listar/";

/// Prefix of the per-kind create and update endpoints.
const TRANSACTIONS_PREFIX: &str = "/transacoes";

/// Period report endpoint path.
const REPORT_PATH: &str = "/transacoes/relatorio/";

/// Login endpoint path.
const LOGIN_PATH: &str = "/users/login/";

/// Sign-up endpoint path.
const REGISTER_PATH: &str = "/users/register/";

/// Profile endpoint path.
const PROFILE_PATH: &str = "/users/perfil/";

/// Message used when the profile endpoint answers without a user.
const PROFILE_WITHOUT_USER: &str = "resposta de perfil sem usuário";

/// Message used when the service rejects a request without saying why.
const NO_DETAILS: &str = "sem detalhes";

/// Filters for `GET /transacoes/listar/`.
///
/// ```
/// use viccoin_rs::client::ListQuery;
/// use viccoin_rs::models::TransactionKind;
///
/// let query = ListQuery::new().kind(TransactionKind::Expense).limit(20);
/// assert_eq!(query.kind, Some(TransactionKind::Expense));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Only return transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Maximum number of transactions to return.
    pub limit: Option<u32>,
}

impl ListQuery {
    /// A query without filters.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            kind: None,
            limit: None,
        }
    }

    /// Restricts the list to one kind.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Caps the number of returned transactions.
    #[inline]
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Endpoint path including the query string.
    fn path(self) -> String {
        let mut params = Vec::new();
        if let Some(kind) = self.kind {
            params.push(format!("tipo={}", kind.as_str()));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limite={limit}"));
        }
        if params.is_empty() {
            LIST_PATH.to_owned()
        } else {
            format!("{LIST_PATH}?{}", params.join("&"))
        }
    }
}

/// Filters for `GET /transacoes/relatorio/`. Every field is optional;
/// the service defaults the limit to 100 per kind.
///
/// ```
/// use viccoin_rs::client::ReportQuery;
/// use viccoin_rs::models::ReportInterval;
///
/// let query = ReportQuery::new().interval(ReportInterval::Monthly);
/// assert_eq!(query.interval, Some(ReportInterval::Monthly));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportQuery {
    /// Current week, month or year.
    pub interval: Option<ReportInterval>,
    /// First day (inclusive).
    pub start: Option<NaiveDate>,
    /// Last day (inclusive).
    pub end: Option<NaiveDate>,
    /// Only transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Maximum number of transactions per kind.
    pub limit: Option<u32>,
}

impl ReportQuery {
    /// A query without filters.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: None,
            start: None,
            end: None,
            kind: None,
            limit: None,
        }
    }

    /// Reports on the current week, month or year.
    #[inline]
    #[must_use]
    pub const fn interval(mut self, interval: ReportInterval) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Reports on an explicit date range (inclusive).
    #[inline]
    #[must_use]
    pub const fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Restricts the report to one kind.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Caps the number of transactions per kind.
    #[inline]
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Endpoint path including the query string.
    fn path(self) -> String {
        let mut params = Vec::new();
        if let Some(interval) = self.interval {
            params.push(format!("periodo={}", interval.as_str()));
        }
        if let Some(start) = self.start {
            params.push(format!("data_inicio={}", format_date_for_api(start)));
        }
        if let Some(end) = self.end {
            params.push(format!("data_fim={}", format_date_for_api(end)));
        }
        if let Some(kind) = self.kind {
            params.push(format!("tipo={}", kind.as_str()));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limite={limit}"));
        }
        if params.is_empty() {
            REPORT_PATH.to_owned()
        } else {
            format!("{REPORT_PATH}?{}", params.join("&"))
        }
    }
}

/// Path of the create endpoint for `kind`, or of the update endpoint
/// when `id` is given.
fn transaction_path(kind: TransactionKind, id: Option<&TransactionId>) -> String {
    id.map_or_else(
        || format!("{TRANSACTIONS_PREFIX}/{}/", kind.as_str()),
        |existing| format!("{TRANSACTIONS_PREFIX}/{}/{existing}/", kind.as_str()),
    )
}

/// Responses carrying the service's `success` flag.
trait Acknowledgement {
    /// Returns the service's message when it flagged the request as
    /// failed.
    fn rejection(&self) -> Option<String>;
}

/// Implements [`Acknowledgement`] for response types with `success` and
/// `message: Option<String>` fields.
macro_rules! impl_acknowledgement {
    ($($response:ty),+ $(,)?) => {
        $(
            impl Acknowledgement for $response {
                fn rejection(&self) -> Option<String> {
                    if self.success {
                        None
                    } else {
                        Some(
                            self.message
                                .clone()
                                .unwrap_or_else(|| NO_DETAILS.to_owned()),
                        )
                    }
                }
            }
        )+
    };
}

impl_acknowledgement!(
    FinancialSummary,
    TransactionList,
    SubmitResponse,
    LoginResponse,
    UserResponse,
    PeriodReportResponse,
);

/// Generates a VicCoin client (async or blocking) with builder, methods, and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        request_type: $req_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// Access token for API authentication.
            token: Option<SecretString>,
            /// Base URL override (for testing).
            base_url: Option<String>,
        }

        impl $builder {
            /// Sets the access token for API authentication.
            #[inline]
            #[must_use]
            pub fn token<T: Into<String>>(mut self, token: T) -> Self {
                self.token = Some(SecretString::from(token.into()));
                self
            }

            /// Overrides the base URL (useful for testing with a mock server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Builds the client.
            ///
            /// A client without a token can only call `login`; every other
            /// endpoint fails with [`VicCoinError::MissingToken`].
            ///
            /// # Errors
            ///
            /// Returns [`VicCoinError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let base_url = self
                    .base_url
                    .as_deref()
                    .unwrap_or(DEFAULT_BASE_URL)
                    .trim_end_matches('/')
                    .to_owned();
                tracing::debug!(base_url = %base_url, has_token = self.token.is_some(), "building client");
                let http = <$http_type>::builder().build()?;

                Ok($client {
                    http,
                    token: self.token,
                    base_url,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Bearer access token.
            token: Option<SecretString>,
            /// API base URL, without a trailing slash.
            base_url: String,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    token: None,
                    base_url: None,
                }
            }

            /// Replaces the access token, e.g. after a login.
            #[inline]
            pub fn set_token(&mut self, token: SecretString) {
                self.token = Some(token);
            }

            /// Forgets the access token.
            #[inline]
            pub fn clear_token(&mut self) {
                self.token = None;
            }

            /// Returns `true` when a token is configured.
            #[inline]
            #[must_use]
            pub const fn has_token(&self) -> bool {
                self.token.is_some()
            }

            /// Returns the API base URL.
            #[inline]
            #[must_use]
            pub fn base_url(&self) -> &str {
                &self.base_url
            }

            /// Fetches account totals via `GET /transacoes/resumo/`.
            ///
            /// # Errors
            ///
            /// Returns an error if no token is set, the HTTP request fails,
            /// the server returns a non-success status or rejects the
            /// request, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn summary(&self) -> Result<FinancialSummary> {
                let request = self.authorized(self.http.get(self.url(SUMMARY_PATH)))?;
                self.execute(request) $( .$await_ext )?
            }

            /// Lists transactions via `GET /transacoes/listar/`.
            ///
            /// # Errors
            ///
            /// Returns an error if no token is set, the HTTP request fails,
            /// the server returns a non-success status or rejects the
            /// request, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(kind = ?query.kind, limit = ?query.limit))]
            pub $($async_kw)? fn list_transactions(
                &self,
                query: &ListQuery,
            ) -> Result<TransactionList> {
                let request = self.authorized(self.http.get(self.url(&query.path())))?;
                self.execute(request) $( .$await_ext )?
            }

            /// Creates a transaction via `POST /transacoes/{tipo}/`. The
            /// endpoint is chosen by the record's kind.
            ///
            /// # Errors
            ///
            /// Returns an error if no token is set, the HTTP request fails,
            /// the server returns a non-success status or rejects the
            /// record, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(kind = %record.kind))]
            pub $($async_kw)? fn create_transaction(
                &self,
                record: &NewTransaction,
            ) -> Result<SubmitResponse> {
                let path = transaction_path(record.kind, None);
                let request = self.authorized(self.http.post(self.url(&path)).json(record))?;
                self.execute(request) $( .$await_ext )?
            }

            /// Replaces an existing transaction via
            /// `PUT /transacoes/{tipo}/{id}/`.
            ///
            /// # Errors
            ///
            /// Returns an error if no token is set, the HTTP request fails,
            /// the server returns a non-success status or rejects the
            /// record, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(kind = %record.kind, id = %id))]
            pub $($async_kw)? fn update_transaction(
                &self,
                id: &TransactionId,
                record: &NewTransaction,
            ) -> Result<SubmitResponse> {
                let path = transaction_path(record.kind, Some(id));
                let request = self.authorized(self.http.put(self.url(&path)).json(record))?;
                self.execute(request) $( .$await_ext )?
            }

            /// Exchanges credentials for a token via `POST /users/login/`.
            ///
            /// The returned token is not stored in the client; see
            /// [`Self::set_token`].
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server
            /// returns a non-success status or refuses the credentials, or
            /// the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(email = %credentials.email))]
            pub $($async_kw)? fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
                let request = self.http.post(self.url(LOGIN_PATH)).json(credentials);
                self.execute(request) $( .$await_ext )?
            }

            /// Fetches the service's own report via
            /// `GET /transacoes/relatorio/`. An acknowledged response
            /// without a report yields an empty one.
            ///
            /// # Errors
            ///
            /// Returns an error if no token is set, the HTTP request fails,
            /// the server returns a non-success status or rejects the
            /// query, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(interval = ?query.interval, kind = ?query.kind))]
            pub $($async_kw)? fn period_report(&self, query: &ReportQuery) -> Result<PeriodReport> {
                let request = self.authorized(self.http.get(self.url(&query.path())))?;
                let response: PeriodReportResponse = self.execute(request) $( .$await_ext )? ?;
                Ok(response.report.unwrap_or_default())
            }

            /// Creates an account via `POST /users/register/`. The service
            /// answers with the new profile but no token; sign in
            /// afterwards.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server
            /// returns a non-success status (e.g. the e-mail is taken) or
            /// refuses the data, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(email = %account.email))]
            pub $($async_kw)? fn register(&self, account: &RegisterRequest) -> Result<UserResponse> {
                let request = self.http.post(self.url(REGISTER_PATH)).json(account);
                self.execute(request) $( .$await_ext )?
            }

            /// Fetches the signed-in user's profile via
            /// `GET /users/perfil/`.
            ///
            /// # Errors
            ///
            /// Returns an error if no token is set, the HTTP request fails,
            /// the server returns a non-success status or answers without a
            /// user, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn profile(&self) -> Result<UserProfile> {
                let request = self.authorized(self.http.get(self.url(PROFILE_PATH)))?;
                let response: UserResponse = self.execute(request) $( .$await_ext )? ?;
                response.user.ok_or_else(|| VicCoinError::Rejected {
                    message: PROFILE_WITHOUT_USER.to_owned(),
                })
            }

            /// Joins `path` onto the base URL.
            fn url(&self, path: &str) -> String {
                format!("{}{path}", self.base_url)
            }

            /// Adds the bearer token to `request`.
            fn authorized(&self, request: $req_type) -> Result<$req_type> {
                let token = self.token.as_ref().ok_or(VicCoinError::MissingToken)?;
                Ok(request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret())))
            }

            /// Sends `request` and deserializes the acknowledged response.
            $($async_kw)? fn execute<Resp: DeserializeOwned + Acknowledgement>(
                &self,
                request: $req_type,
            ) -> Result<Resp> {
                let response: $resp_type = request.send() $( .$await_ext )? ?;

                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if !status.is_success() {
                    let message = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    tracing::debug!(status = status.as_u16(), message = %message, "API error");
                    return Err(VicCoinError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }

                let body = response.text() $( .$await_ext )? ?;
                tracing::trace!(body_len = body.len(), "parsing response body");
                let parsed: Resp = serde_json::from_str(&body)?;
                match parsed.rejection() {
                    Some(message) => {
                        tracing::debug!(message = %message, "request rejected");
                        Err(VicCoinError::Rejected { message })
                    }
                    None => Ok(parsed),
                }
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the VicCoin API.

    use reqwest::header::AUTHORIZATION;
    use secrecy::{ExposeSecret, SecretString};
    use serde::de::DeserializeOwned;

    use super::{
        Acknowledgement, DEFAULT_BASE_URL, LOGIN_PATH, ListQuery, PROFILE_PATH,
        PROFILE_WITHOUT_USER, REGISTER_PATH, ReportQuery, SUMMARY_PATH, transaction_path,
    };
    use crate::error::{Result, VicCoinError};
    use crate::models::{
        FinancialSummary, LoginRequest, LoginResponse, NewTransaction, PeriodReport,
        PeriodReportResponse, RegisterRequest, SubmitResponse, TransactionId, TransactionList,
        UserProfile, UserResponse,
    };

    define_client! {
        client_name: VicCoinClient,
        builder_name: VicCoinClientBuilder,
        http_type: reqwest::Client,
        request_type: reqwest::RequestBuilder,
        response_type: reqwest::Response,
        client_doc: "Async client for the VicCoin API.\n\nUse [`VicCoinClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`VicCoinClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the VicCoin API.

    use reqwest::header::AUTHORIZATION;
    use secrecy::{ExposeSecret, SecretString};
    use serde::de::DeserializeOwned;

    use super::{
        Acknowledgement, DEFAULT_BASE_URL, LOGIN_PATH, ListQuery, PROFILE_PATH,
        PROFILE_WITHOUT_USER, REGISTER_PATH, ReportQuery, SUMMARY_PATH, transaction_path,
    };
    use crate::error::{Result, VicCoinError};
    use crate::models::{
        FinancialSummary, LoginRequest, LoginResponse, NewTransaction, PeriodReport,
        PeriodReportResponse, RegisterRequest, SubmitResponse, TransactionId, TransactionList,
        UserProfile, UserResponse,
    };

    define_client! {
        client_name: VicCoinBlockingClient,
        builder_name: VicCoinBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        request_type: reqwest::blocking::RequestBuilder,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) client for the VicCoin API.\n\nUse [`VicCoinBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`VicCoinBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{VicCoinClient, VicCoinClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{VicCoinBlockingClient, VicCoinBlockingClientBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_without_filters() {
        assert_eq!(ListQuery::new().path(), "/transacoes/listar/");
    }

    #[test]
    fn list_query_with_filters() {
        let query = ListQuery::new().kind(TransactionKind::Income).limit(5);
        assert_eq!(query.path(), "/transacoes/listar/?tipo=ganho&limite=5");
        let only_limit = ListQuery::new().limit(50);
        assert_eq!(only_limit.path(), "/transacoes/listar/?limite=50");
    }

    #[test]
    fn report_query_paths() {
        assert_eq!(ReportQuery::new().path(), "/transacoes/relatorio/");
        let query = ReportQuery::new()
            .between(
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            )
            .kind(TransactionKind::Expense)
            .limit(20);
        assert_eq!(
            query.path(),
            "/transacoes/relatorio/?data_inicio=2024-05-01&data_fim=2024-05-31&tipo=despesa&limite=20"
        );
        let weekly = ReportQuery::new().interval(ReportInterval::Weekly);
        assert_eq!(weekly.path(), "/transacoes/relatorio/?periodo=semanal");
    }

    #[test]
    fn transaction_paths() {
        assert_eq!(
            transaction_path(TransactionKind::Salary, None),
            "/transacoes/salario/"
        );
        let id = TransactionId::new("d-9".to_owned());
        assert_eq!(
            transaction_path(TransactionKind::Expense, Some(&id)),
            "/transacoes/despesa/d-9/"
        );
    }

    #[test]
    fn rejection_uses_message_or_placeholder() {
        let json = r#"{"success": false}"#;
        let list: TransactionList = serde_json::from_str(json).unwrap();
        assert_eq!(list.rejection().as_deref(), Some(NO_DETAILS));

        let summary = FinancialSummary::from_totals(1.0, 2.0);
        assert!(summary.rejection().is_none());
    }
}

#[cfg(all(test, feature = "async"))]
mod http_tests {
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::VicCoinError;
    use crate::models::{CategoryRef, LoginRequest, NewTransaction, RegisterRequest};

    fn client(server: &MockServer) -> VicCoinClient {
        VicCoinClient::builder()
            .token("tok-1")
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    fn record(kind: TransactionKind) -> NewTransaction {
        NewTransaction {
            amount: 12.5,
            description: "Cinema".to_owned(),
            category: CategoryRef::from("Lazer"),
            date: "2024-05-30".to_owned(),
            kind,
            recurring: false,
        }
    }

    #[tokio::test]
    async fn summary_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transacoes/resumo/"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "totalDespesas": 3000,
                "totalGanhos": 5000,
                "saldo": 2000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summary = client(&server).summary().await.unwrap();
        assert!((summary.balance - 2000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn list_sends_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transacoes/listar/"))
            .and(query_param("tipo", "despesa"))
            .and(query_param("limite", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "transacoes": [
                    {"id": "1", "tipo": "despesa", "valor": "45,90", "categoria": 1, "data": "2024-05-01"}
                ]
            })))
            .mount(&server)
            .await;

        let query = ListQuery::new().kind(TransactionKind::Expense).limit(10);
        let list = client(&server).list_transactions(&query).await.unwrap();
        assert_eq!(list.transactions.len(), 1);
        assert!((list.transactions[0].amount - 45.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn create_posts_to_kind_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transacoes/ganho/"))
            .and(body_partial_json(json!({"valor": 12.5, "tipo": "ganho", "categoria": "Lazer"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "message": "Ganho adicionado com sucesso",
                "ganho_id": "g-42"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .create_transaction(&record(TransactionKind::Income))
            .await
            .unwrap();
        assert_eq!(response.assigned_id().map(TransactionId::as_inner), Some("g-42"));
    }

    #[tokio::test]
    async fn salary_posts_receipt_date() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transacoes/salario/"))
            .and(body_partial_json(json!({
                "data_recebimento": "2024-05-30",
                "tipo": "salario"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "salario_id": "s-3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .create_transaction(&record(TransactionKind::Salary))
            .await
            .unwrap();
        assert_eq!(response.assigned_id().map(TransactionId::as_inner), Some("s-3"));
    }

    #[tokio::test]
    async fn update_puts_to_id_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/transacoes/despesa/d-7/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let id = TransactionId::new("d-7".to_owned());
        let response = client(&server)
            .update_transaction(&id, &record(TransactionKind::Expense))
            .await
            .unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transacoes/resumo/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Token inválido"))
            .mount(&server)
            .await;

        let err = client(&server).summary().await.unwrap_err();
        assert!(matches!(err, VicCoinError::Api { status: 401, .. }));
        assert!(err.to_string().contains("Token inválido"));
    }

    #[tokio::test]
    async fn success_false_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transacoes/despesa/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Valor é obrigatório"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_transaction(&record(TransactionKind::Expense))
            .await
            .unwrap_err();
        assert!(matches!(err, VicCoinError::Rejected { .. }));
        assert!(err.to_string().contains("Valor é obrigatório"));
    }

    #[tokio::test]
    async fn missing_token_fails_before_sending() {
        let server = MockServer::start().await;
        let anonymous = VicCoinClient::builder().base_url(server.uri()).build().unwrap();
        let err = anonymous.summary().await.unwrap_err();
        assert!(matches!(err, VicCoinError::MissingToken));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_does_not_need_a_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login/"))
            .and(body_partial_json(json!({"email": "vic@example.com", "password": "hunter2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "jwt-1",
                "user": {"uid": "u-1", "nome": "Vic", "email": "vic@example.com"}
            })))
            .mount(&server)
            .await;

        let anonymous = VicCoinClient::builder().base_url(server.uri()).build().unwrap();
        let credentials = LoginRequest {
            email: "vic@example.com".to_owned(),
            password: SecretString::from("hunter2".to_owned()),
        };
        let response = anonymous.login(&credentials).await.unwrap();
        assert_eq!(response.token.as_deref(), Some("jwt-1"));
    }

    #[tokio::test]
    async fn register_sends_nome_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/register/"))
            .and(body_partial_json(json!({
                "nome": "Vic",
                "email": "vic@example.com",
                "password": "hunter2"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "message": "Usuário registrado com sucesso",
                "user": {"uid": "u-1", "nome": "Vic", "email": "vic@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let anonymous = VicCoinClient::builder().base_url(server.uri()).build().unwrap();
        let account = RegisterRequest {
            name: "Vic".to_owned(),
            email: "vic@example.com".to_owned(),
            password: SecretString::from("hunter2".to_owned()),
        };
        let response = anonymous.register(&account).await.unwrap();
        assert_eq!(response.user.unwrap().uid.as_inner(), "u-1");
    }

    #[tokio::test]
    async fn register_with_taken_email_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/register/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "message": "Email já está em uso"
            })))
            .mount(&server)
            .await;

        let account = RegisterRequest {
            name: "Vic".to_owned(),
            email: "vic@example.com".to_owned(),
            password: SecretString::from("hunter2".to_owned()),
        };
        let err = client(&server).register(&account).await.unwrap_err();
        assert!(matches!(err, VicCoinError::Api { status: 400, .. }));
        assert!(err.to_string().contains("Email já está em uso"));
    }

    #[tokio::test]
    async fn profile_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/perfil/"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "user": {"uid": "u-5", "nome": "Ana", "email": "ana@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client(&server).profile().await.unwrap();
        assert_eq!(profile.name, "Ana");
    }

    #[tokio::test]
    async fn profile_without_user_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/perfil/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let err = client(&server).profile().await.unwrap_err();
        assert!(matches!(err, VicCoinError::Rejected { .. }));
    }

    #[tokio::test]
    async fn period_report_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transacoes/relatorio/"))
            .and(query_param("periodo", "mensal"))
            .and(query_param("tipo", "despesa"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "relatorio": {
                    "periodo": {"tipo": "mensal"},
                    "transacoes": [
                        {"id": "d-1", "tipo": "despesa", "valor": 80, "categoria": "Saúde", "data": "2024-05-10"}
                    ],
                    "total_despesas": 80,
                    "total_ganhos": 0,
                    "saldo_periodo": -80,
                    "categorias": {"Saúde": 80}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = ReportQuery::new()
            .interval(ReportInterval::Monthly)
            .kind(TransactionKind::Expense);
        let report = client(&server).period_report(&query).await.unwrap();
        assert_eq!(report.transactions.len(), 1);
        assert!((report.balance + 80.0).abs() < f64::EPSILON);
        assert_eq!(report.categories_by_total(), vec![("Saúde", 80.0)]);
    }

    #[tokio::test]
    async fn period_report_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transacoes/relatorio/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Período inválido"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .period_report(&ReportQuery::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Período inválido"));
    }

    #[cfg(feature = "blocking")]
    #[tokio::test]
    async fn blocking_client_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transacoes/resumo/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_despesas": 10, "total_ganhos": 30, "saldo": 20
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let summary = tokio::task::spawn_blocking(move || {
            VicCoinBlockingClient::builder()
                .token("tok-1")
                .base_url(uri)
                .build()
                .unwrap()
                .summary()
        })
        .await
        .unwrap()
        .unwrap();
        assert!((summary.total_income - 30.0).abs() < f64::EPSILON);
    }
}
