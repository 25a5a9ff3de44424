//! # svcdesk-cli -- Command-line front end for the service-desk backend
//!
//! Provides the `svcdesk` binary: sign-in, the account panel, record lists
//! and the status dictionaries, all through [`svcdesk_client`].
//!
//! ## Subcommands
//!
//! - `svcdesk login` / `logout` / `register` / `forgot-password`: session
//!   management. The token is kept in a JSON session file.
//! - `svcdesk account`: profile and contract overview, plus
//!   `account delete --yes`.
//! - `svcdesk list` / `history` / `show`: orders, repairs and services.
//! - `svcdesk statuses`: the status dictionary for a resource type.
//!
//! ```bash
//! svcdesk login --email me@example.ge --password '...'
//! svcdesk account
//! svcdesk list repairs
//! svcdesk history orders --year 2024
//! svcdesk statuses services --json
//! ```

pub mod account;
pub mod auth;
pub mod records;
pub mod session;
pub mod statuses;

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use svcdesk_client::storage::FileStore;
use svcdesk_client::{ClientConfig, ServiceDeskClient};

/// Everything a subcommand needs: the client, the session file and the
/// output mode.
#[derive(Debug)]
pub struct CliContext {
    pub client: ServiceDeskClient,
    pub store: FileStore,
    /// Print machine-readable JSON instead of text.
    pub json: bool,
}

impl CliContext {
    /// Build the context from the environment, with command-line overrides.
    pub fn new(base_url: Option<&str>, session_file: Option<PathBuf>, json: bool) -> Result<Self> {
        let mut config = ClientConfig::from_env().context("invalid SVCDESK_* environment")?;
        if let Some(url) = base_url {
            config.base_url = ClientConfig::new(url)
                .with_context(|| format!("invalid --base-url {url}"))?
                .base_url;
        }
        let path = match session_file {
            Some(path) => path,
            None => session::default_path()?,
        };
        Ok(Self {
            client: ServiceDeskClient::new(config).context("failed to build HTTP client")?,
            store: FileStore::new(path),
            json,
        })
    }

    /// A client carrying the stored session token, or the `SVCDESK_API_TOKEN`
    /// token when no session is stored.
    pub fn signed_in(&self) -> Result<ServiceDeskClient> {
        match session::load_token(&self.store)? {
            Some(token) => Ok(self.client.with_token(token)?),
            None if self.client.token().is_some() => Ok(self.client.clone()),
            None => anyhow::bail!("not signed in; run `svcdesk login` first"),
        }
    }

    /// Print `value` as pretty JSON.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("failed to serialize output")?
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svcdesk_client::storage::{SessionStore, StorageKey};
    use svcdesk_client::BearerToken;

    fn context(dir: &tempfile::TempDir) -> CliContext {
        CliContext::new(
            Some("http://127.0.0.1:9/api"),
            Some(dir.path().join("session.json")),
            false,
        )
        .unwrap()
    }

    #[test]
    fn base_url_override_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        assert_eq!(ctx.client.base_url(), "http://127.0.0.1:9/api");
        assert_eq!(ctx.store.path(), dir.path().join("session.json"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliContext::new(Some("ftp://x"), Some(dir.path().join("s.json")), false)
            .unwrap_err();
        assert!(format!("{err:#}").contains("--base-url"));
    }

    #[test]
    fn signed_in_uses_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        ctx.store.set(StorageKey::Token.as_str(), "stored").unwrap();
        let client = ctx.signed_in().unwrap();
        assert_eq!(client.token().map(BearerToken::as_str), Some("stored"));
    }
}
