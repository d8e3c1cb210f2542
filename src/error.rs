//! Error types for the VicCoin library.

/// All errors that can occur when talking to the VicCoin API or the local
/// storage backends.
#[derive(Debug, thiserror::Error)]
pub enum VicCoinError {
    /// HTTP transport failed (connection, TLS, body read).
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or a placeholder when it could not be read.
        message: String,
    },

    /// The server answered `200 OK` but flagged the request as failed
    /// (`"success": false`).
    #[error("request rejected by server: {message}")]
    Rejected {
        /// Message reported by the server, if any.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// A category with the same name already exists.
    #[error(transparent)]
    Category(#[from] crate::category::DuplicateCategory),

    /// The transaction only exists locally, so the service cannot update
    /// it.
    #[error("transaction {id} has no service id yet")]
    LocalTransaction {
        /// The local id.
        id: crate::models::TransactionId,
    },

    /// No access token was configured or stored.
    #[error("no access token available; log in first")]
    MissingToken,
}

/// Convenience alias used across the crate.
pub type Result<T> = core::result::Result<T, VicCoinError>;
