//! Error types for the embedding boundary

/// Result type for embedding operations.
///
/// A convenience alias using [`EmbedError`] as the error type, used
/// throughout the crate for operations that can fail.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Error type for all embedding-provider operations.
///
/// Two categories matter to callers and are kept distinct:
///
/// - **Configuration errors** ([`EmbedError::InvalidConfig`]) are raised at
///   provider construction — a missing API key, a blank model name. They are
///   fatal and never worth retrying.
/// - **Call-time errors** (the remaining variants) are raised while talking
///   to the provider — network failures, non-success HTTP statuses, bodies
///   that don't decode. They are propagated to the caller, which owns any
///   retry policy; nothing inside this crate retries.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// Provider configuration is unusable (missing key, blank model, ...)
    #[error("Invalid embedding configuration: {message}")]
    InvalidConfig { message: String },

    /// The HTTP request itself failed (connect, timeout, decode)
    #[error("Embedding request failed: {source}")]
    Request {
        #[from]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status
    #[error("Embedding provider returned {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider answered 2xx but the payload doesn't line up with the
    /// request (wrong row count, out-of-range row index)
    #[error("Malformed embedding response: {message}")]
    MalformedResponse { message: String },
}

impl EmbedError {
    /// Create an invalid configuration error with a custom message.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a malformed-response error with a custom message.
    pub fn malformed_response<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}
