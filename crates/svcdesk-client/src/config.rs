//! Service-desk client configuration.
//!
//! One base URL covers every route the client calls; candidate endpoints are
//! derived from it. Defaults point to the hosted test backend. Override via
//! environment variables or explicit construction for other deployments.

use url::Url;
use zeroize::Zeroizing;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "https://testinvoice.inservice.ge/api";

/// Bearer token for API authentication. `Debug` never prints the value and
/// the buffer is zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Configuration for connecting to the service-desk backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every route is appended to (e.g. `https://host/api`).
    pub base_url: Url,
    /// Bearer token from a previous sign-in, if any.
    pub api_token: Option<BearerToken>,
    /// Request timeout in seconds. `None` keeps the transport default.
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Configuration for `base_url` with no token and the transport timeout.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            api_token: None,
            timeout_secs: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SVCDESK_BASE_URL` (default: `https://testinvoice.inservice.ge/api`)
    /// - `SVCDESK_API_TOKEN` (optional)
    /// - `SVCDESK_TIMEOUT_SECS` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("SVCDESK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match std::env::var("SVCDESK_TIMEOUT_SECS") {
            Ok(s) => Some(
                s.parse()
                    .map_err(|_| ConfigError::InvalidTimeout(s.clone()))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            base_url: parse_url("SVCDESK_BASE_URL", &raw)?,
            api_token: std::env::var("SVCDESK_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .map(BearerToken::new),
            timeout_secs,
        })
    }

    /// Create a configuration pointing to a local mock server (for testing).
    pub fn local_mock(port: u16, token: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("localhost", &format!("http://127.0.0.1:{port}"))?,
            api_token: token.map(BearerToken::new),
            timeout_secs: Some(5),
        })
    }

    /// Base URL as a string with any trailing `/` removed, ready for
    /// `format!("{base}/app/...")`.
    pub fn base(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("unsupported scheme {other}"),
        )),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("SVCDESK_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error("bearer token contains characters not allowed in an HTTP header")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = ClientConfig::local_mock(9000, Some("test-token")).unwrap();
        assert_eq!(cfg.api_token.as_ref().map(BearerToken::as_str), Some("test-token"));
        assert_eq!(cfg.timeout_secs, Some(5));
        assert_eq!(cfg.base(), "http://127.0.0.1:9000");
    }

    #[test]
    fn base_trims_trailing_slash_but_keeps_path() {
        let cfg = ClientConfig::new("https://example.com/api/").unwrap();
        assert_eq!(cfg.base(), "https://example.com/api");
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(matches!(
            ClientConfig::new("ftp://example.com"),
            Err(ConfigError::InvalidUrl(_, _))
        ));
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = ClientConfig::local_mock(9000, Some("secret-value")).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("secret-value"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
