//! # svcdesk-client -- Typed Rust client for the service-desk backend
//!
//! Access for service/repair-ticket clients to their account, contract,
//! orders, repairs, scheduled services and history.
//!
//! ## Architecture
//!
//! - [`resolver`]: the Endpoint Resolver. Resources whose path differs
//!   between backend deployments are fetched by trying an ordered list of
//!   candidate requests until one succeeds.
//! - [`candidates`]: which candidate URLs, in which order, per resource.
//! - [`status`]: status dictionaries (cached per base URL and resource
//!   type, never failing) and status label resolution.
//! - [`fields`]: ordered alias lists for reading loosely typed records.
//! - [`account`], [`auth`], [`records`]: typed sub-clients.
//! - [`storage`]: session key-value storage.
//!
//! Leaves first: the resolver has no dependency on the status module; the
//! status dictionary and the account client are built on the resolver.

pub mod account;
pub mod auth;
pub mod candidates;
pub mod config;
pub mod error;
pub mod fields;
pub mod records;
pub mod resolver;
pub mod status;
pub mod storage;

pub use config::{BearerToken, ClientConfig};
pub use error::ServiceDeskError;
pub use resolver::EndpointResolver;
pub use status::{ResourceType, StatusDictionary, StatusMap};

use std::time::Duration;

use reqwest::header::HeaderValue;

/// Top-level service-desk client. Holds the shared HTTP pool, resolver and
/// status dictionary cache.
///
/// Clones (including those from [`ServiceDeskClient::with_token`]) share the
/// connection pool and the status dictionary cache.
#[derive(Debug, Clone)]
pub struct ServiceDeskClient {
    http: reqwest::Client,
    resolver: EndpointResolver,
    statuses: StatusDictionary,
    base: String,
    token: Option<BearerToken>,
}

impl ServiceDeskClient {
    /// Create a new client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ServiceDeskError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| ServiceDeskError::Http {
            endpoint: "client_init".into(),
            source: e,
        })?;

        if let Some(token) = &config.api_token {
            validate_token(token)?;
        }

        let resolver = EndpointResolver::new(http.clone());
        Ok(Self {
            http,
            statuses: StatusDictionary::new(resolver.clone()),
            resolver,
            base: config.base(),
            token: config.api_token,
        })
    }

    /// A client acting with `token`, sharing this client's pool and caches.
    pub fn with_token(&self, token: BearerToken) -> Result<Self, ServiceDeskError> {
        validate_token(&token)?;
        Ok(Self {
            token: Some(token),
            ..self.clone()
        })
    }

    /// Base URL without a trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    /// Access the account (profile, contract, deletion, logout) client.
    pub fn account(&self) -> account::AccountClient {
        account::AccountClient::new(
            self.resolver.clone(),
            self.statuses.clone(),
            self.base.clone(),
            self.token.clone(),
        )
    }

    /// Access the sign-in / registration client.
    pub fn auth(&self) -> auth::AuthClient {
        auth::AuthClient::new(self.resolver.clone(), self.base.clone())
    }

    /// Access the orders / repairs / services client.
    pub fn records(&self) -> records::RecordsClient {
        records::RecordsClient::new(
            self.http.clone(),
            self.statuses.clone(),
            self.base.clone(),
            self.token.clone(),
        )
    }

    /// The shared status dictionary cache.
    pub fn statuses(&self) -> &StatusDictionary {
        &self.statuses
    }

    /// The endpoint resolver, for resources without a dedicated client.
    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Load the status dictionary for `kind` with this client's token.
    pub async fn status_map(&self, kind: Option<ResourceType>) -> std::sync::Arc<StatusMap> {
        self.statuses
            .load(&self.base, self.token.as_ref().map(BearerToken::as_str), kind)
            .await
    }
}

fn validate_token(token: &BearerToken) -> Result<(), ServiceDeskError> {
    HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map(|_| ())
        .map_err(|_| ServiceDeskError::Config(config::ConfigError::InvalidToken))
}
