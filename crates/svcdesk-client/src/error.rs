//! Service-desk client error types.

/// Errors from service-desk API calls.
#[derive(Debug, thiserror::Error)]
pub enum ServiceDeskError {
    /// HTTP transport error outside candidate resolution (client setup).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// A single-route call returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Every candidate endpoint for a logical resource failed.
    ///
    /// `message` is the diagnostic of the last candidate attempted.
    #[error("{message}")]
    ResolutionExhausted {
        resource: String,
        attempts: usize,
        message: String,
    },
    /// The backend accepted the credentials but returned no bearer token.
    #[error("no token in {endpoint} response")]
    MissingToken { endpoint: String },
    /// The requested operation has no route for this record kind.
    #[error("{operation} is not available for {kind}")]
    Unsupported {
        operation: &'static str,
        kind: &'static str,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ServiceDeskError {
    /// Whether the caller should offer a retry (profile/contract/account flows).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ResolutionExhausted { .. } | Self::Http { .. })
    }
}
